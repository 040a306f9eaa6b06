//! Extraction of the structured record from raw console output.
//!
//! Scripts may print progress lines, warnings, or a stray traceback around
//! their result. The parser looks for the last line that decodes as a JSON
//! object or array, then falls back to the whole text, then to the last
//! multi-line JSON block. Bare scalars never count as a record.
//!
//! Parsing runs inline on the orchestrator's poll loop, so every step is
//! linear in the output size. The multi-line scan only tries lines that open
//! a bracket in column zero, as `json.dumps(indent=...)` writes them, and
//! gives up after [`MAX_BLOCK_ATTEMPTS`] candidates.
//!
//! Python's `json.dumps` writes `NaN` and `Infinity` for non-finite floats.
//! Those tokens are rewritten to `null` before a second decode attempt.

use serde_json::Value;

/// Upper bound on multi-line decode attempts per output.
pub const MAX_BLOCK_ATTEMPTS: usize = 64;

/// Raw text that held no decodable record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub raw: String,
    pub error: String,
}

impl std::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no JSON record in output: {}", self.error)
    }
}

/// Stateless; parsing the same text always gives the same result.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputParser;

impl OutputParser {
    /// Extract the result record from `raw`.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseFailure`] value carrying the raw text when nothing
    /// decodes.
    pub fn parse(raw: &str) -> Result<Value, ParseFailure> {
        for line in raw.lines().rev() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(record) = decode_record(line) {
                return Ok(record);
            }
        }

        let whole = raw.trim();
        if let Some(record) = decode_record(whole) {
            return Ok(record);
        }

        if let Some(record) = trailing_block(whole) {
            return Ok(record);
        }

        let error = if whole.is_empty() {
            String::from("output was empty")
        } else {
            serde_json::from_str::<Value>(whole)
                .err()
                .map_or_else(|| String::from("output holds only scalars"), |e| e.to_string())
        };
        Err(ParseFailure {
            raw: raw.to_string(),
            error,
        })
    }
}

/// Pretty-printed record that runs to the end of `text`, after noise lines.
fn trailing_block(text: &str) -> Option<Value> {
    if !(text.ends_with('}') || text.ends_with(']')) {
        return None;
    }
    let line_starts: Vec<usize> = std::iter::once(0)
        .chain(text.match_indices('\n').map(|(idx, _)| idx + 1))
        .collect();

    line_starts
        .into_iter()
        .rev()
        .filter(|&offset| text[offset..].starts_with(['{', '[']))
        .take(MAX_BLOCK_ATTEMPTS)
        .find_map(|offset| decode_record(text[offset..].trim_end()))
}

fn decode_record(text: &str) -> Option<Value> {
    if !(text.starts_with('{') || text.starts_with('[')) {
        return None;
    }
    let value = serde_json::from_str::<Value>(text)
        .ok()
        .or_else(|| serde_json::from_str::<Value>(&replace_non_finite(text)).ok())?;
    (value.is_object() || value.is_array()).then_some(value)
}

/// Replace bare `NaN`, `Infinity`, and `-Infinity` tokens outside strings
/// with `null`.
fn replace_non_finite(text: &str) -> String {
    const TOKENS: &[&str] = &["-Infinity", "Infinity", "NaN"];

    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = text;

    while let Some(ch) = rest.chars().next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
        } else if ch == '"' {
            in_string = true;
        } else if let Some(token) = TOKENS.iter().find(|t| rest.starts_with(**t)) {
            out.push_str("null");
            rest = &rest[token.len()..];
            continue;
        }
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    out
}
