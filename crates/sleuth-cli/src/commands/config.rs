use sleuth_config::SleuthConfig;

use crate::cli::GlobalFlags;
use crate::output::output;

const REDACTED: &str = "<redacted>";

/// Handle `sleuth config`.
pub fn handle(config: &SleuthConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&redacted(config), flags.format)
}

fn redacted(config: &SleuthConfig) -> SleuthConfig {
    let mut shown = config.clone();
    if shown.anthropic.is_configured() {
        shown.anthropic.api_key = REDACTED.to_string();
    }
    shown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_is_never_printed() {
        let mut config = SleuthConfig::default();
        config.anthropic.api_key = "sk-ant-secret".into();
        let json = serde_json::to_string(&redacted(&config)).unwrap();
        assert!(!json.contains("sk-ant-secret"));
        assert!(json.contains(REDACTED));
    }

    #[test]
    fn missing_key_stays_empty() {
        let shown = redacted(&SleuthConfig::default());
        assert!(shown.anthropic.api_key.is_empty());
    }
}
