use sha2::{Digest, Sha256};

/// Length of the hex fingerprint kept for dedupe and logging.
const FINGERPRINT_LEN: usize = 16;

/// Analysis script text plus a content fingerprint.
///
/// Owned by the runner that generated it and dropped when the investigation
/// completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedScript {
    text: String,
    fingerprint: String,
}

impl GeneratedScript {
    /// Wrap script text, computing `sha256(text)[..16]` as its fingerprint.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let digest = Sha256::digest(text.as_bytes());
        let mut fingerprint = hex::encode(digest);
        fingerprint.truncate(FINGERPRINT_LEN);
        Self { text, fingerprint }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_and_short() {
        let a = GeneratedScript::new("print(1)");
        let b = GeneratedScript::new(String::from("print(1)"));
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), FINGERPRINT_LEN);
        assert_ne!(a.fingerprint(), GeneratedScript::new("print(2)").fingerprint());
    }
}
