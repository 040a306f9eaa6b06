//! Prompting the text-generation capability for an analysis script.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use sleuth_core::capability::GenerateCapability;
use sleuth_core::entities::{GeneratedScript, Hypothesis, SampleDescriptor};
use sleuth_core::enums::{ColumnType, HypothesisCategory};
use sleuth_core::errors::GenerationError;

/// Fixed file name the sandbox writes the payload to.
pub const DATA_HANDLE: &str = "data.csv";

const SYSTEM_PROMPT: &str = r#"You write small, self-contained Python analysis scripts that test one data-quality hypothesis.

Rules:
- Use only pandas, numpy, and the standard json module. Do not touch the network, other files, subprocesses, or environment variables.
- Load the data with exactly: df = pd.read_csv("data.csv")
- The data may be a sample of a larger table and some columns may have been dropped. Check that every column you use exists before using it, and handle an empty frame.
- Convert numpy scalars to plain Python types before serializing. Never emit NaN or Infinity; use null instead.
- As the very last statement, print exactly one JSON object with json.dumps. Include concrete counts, ratios, and a few example values as evidence.
- Respond with the script only. No explanation, no markdown."#;

/// Turns a hypothesis plus schema into an executable script.
#[derive(Clone)]
pub struct ScriptGenerator {
    capability: Arc<dyn GenerateCapability>,
}

impl std::fmt::Debug for ScriptGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptGenerator").finish_non_exhaustive()
    }
}

impl ScriptGenerator {
    #[must_use]
    pub fn new(capability: Arc<dyn GenerateCapability>) -> Self {
        Self { capability }
    }

    /// Ask the capability for a script. One call, no retry.
    ///
    /// # Errors
    ///
    /// Returns the capability's [`GenerationError`] unchanged, or
    /// [`GenerationError::EmptyResponse`] when nothing is left after fence
    /// stripping.
    pub async fn generate(
        &self,
        hypothesis: &Hypothesis,
        schema: &BTreeMap<String, ColumnType>,
        sample: &SampleDescriptor,
    ) -> Result<GeneratedScript, GenerationError> {
        let user = user_prompt(hypothesis, schema, sample);
        let text = self.capability.generate(SYSTEM_PROMPT, &user).await?;
        let script = strip_code_fences(&text);
        if script.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(GeneratedScript::new(script))
    }
}

/// System instructions shared by every request.
#[must_use]
pub const fn system_prompt() -> &'static str {
    SYSTEM_PROMPT
}

/// Per-hypothesis request text.
#[must_use]
pub fn user_prompt(
    hypothesis: &Hypothesis,
    schema: &BTreeMap<String, ColumnType>,
    sample: &SampleDescriptor,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Hypothesis id: {}", hypothesis.id);
    let _ = writeln!(out, "Category: {}", hypothesis.category);
    let _ = writeln!(out, "Description: {}", hypothesis.description);
    if hypothesis.affected_columns.is_empty() {
        let _ = writeln!(out, "Affected columns: (not specified, consider all)");
    } else {
        let _ = writeln!(
            out,
            "Affected columns: {}",
            hypothesis.affected_columns.join(", ")
        );
    }
    if !hypothesis.thresholds.is_empty() {
        let thresholds = hypothesis
            .thresholds
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "Thresholds: {thresholds}");
    }

    let _ = writeln!(out, "\nColumns in {DATA_HANDLE}:");
    for (name, column_type) in schema {
        if sample.dropped_columns.contains(name) {
            continue;
        }
        let _ = writeln!(out, "- {name}: {column_type}");
    }

    let _ = writeln!(
        out,
        "\nThe file holds {} of {} rows.",
        sample.row_count, sample.source_rows
    );
    if !sample.dropped_columns.is_empty() {
        let _ = writeln!(
            out,
            "These columns were removed to save space and are NOT in the file: {}",
            sample.dropped_columns.join(", ")
        );
    }
    if let Some(cap) = sample.truncation_cap {
        let _ = writeln!(out, "Text values were cut to at most {cap} characters.");
    }

    let _ = write!(out, "\nApproach: {}", category_hint(hypothesis.category));
    out
}

fn category_hint(category: HypothesisCategory) -> &'static str {
    match category {
        HypothesisCategory::MissingValues => {
            "count nulls and blank strings per affected column, with ratios to the row count."
        }
        HypothesisCategory::Duplicates => {
            "count fully duplicated rows and duplicated key values, with a few example keys."
        }
        HypothesisCategory::Outliers => {
            "use the IQR rule (1.5 x IQR unless a threshold says otherwise) and report bounds, count, and extreme examples."
        }
        HypothesisCategory::InconsistentCategories => {
            "list distinct values with counts and group variants that differ only in case, spacing, or spelling."
        }
        HypothesisCategory::Format => {
            "count values that fail the expected pattern or type conversion, with examples."
        }
        HypothesisCategory::Temporal => {
            "parse dates, report the range, gaps, out-of-order or future dates, and per-period counts."
        }
        HypothesisCategory::Other => "gather whatever counts best confirm or refute the description.",
    }
}

/// Remove a leading ```` ``` ```` / ```` ```python ```` fence line and a
/// trailing fence, then trim.
#[must_use]
pub fn strip_code_fences(text: &str) -> String {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        body = rest.split_once('\n').map_or("", |(_, after)| after);
    }
    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }
    body.trim().to_string()
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    struct Echo(&'static str);

    #[async_trait]
    impl GenerateCapability for Echo {
        async fn generate(&self, system: &str, _user: &str) -> Result<String, GenerationError> {
            assert!(system.contains("data.csv"));
            Ok(self.0.to_string())
        }
    }

    fn schema() -> BTreeMap<String, ColumnType> {
        BTreeMap::from([
            ("Turnover".to_string(), ColumnType::Numeric),
            ("Notes".to_string(), ColumnType::String),
        ])
    }

    #[rstest]
    #[case("```python\nprint(1)\n```", "print(1)")]
    #[case("```py\nprint(1)\n```\n", "print(1)")]
    #[case("```\nimport json\nprint(json.dumps({}))\n```", "import json\nprint(json.dumps({}))")]
    #[case("  print(1)  ", "print(1)")]
    #[case("print(1)\n```", "print(1)")]
    #[case("```", "")]
    fn fences_are_stripped(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_code_fences(input), expected);
    }

    #[test]
    fn user_prompt_describes_sample() {
        let hypothesis = Hypothesis::new("h1", HypothesisCategory::Outliers, "Turnover spikes")
            .with_columns(["Turnover"])
            .with_threshold("iqr_multiplier", 3.0);
        let sample = SampleDescriptor {
            row_count: 25,
            source_rows: 1_000,
            dropped_columns: vec!["Notes".into()],
            truncation_cap: Some(200),
            ..SampleDescriptor::default()
        };
        let prompt = user_prompt(&hypothesis, &schema(), &sample);

        assert!(prompt.contains("Hypothesis id: h1"));
        assert!(prompt.contains("Category: outliers"));
        assert!(prompt.contains("Thresholds: iqr_multiplier=3"));
        assert!(prompt.contains("- Turnover: numeric"));
        assert!(!prompt.contains("- Notes"));
        assert!(prompt.contains("25 of 1000 rows"));
        assert!(prompt.contains("NOT in the file: Notes"));
        assert!(prompt.contains("IQR"));
    }

    #[tokio::test]
    async fn generate_strips_fences_and_fingerprints() {
        let generator = ScriptGenerator::new(Arc::new(Echo("```python\nprint('{}')\n```")));
        let hypothesis = Hypothesis::new("h", HypothesisCategory::Other, "d");
        let script = generator
            .generate(&hypothesis, &schema(), &SampleDescriptor::default())
            .await
            .unwrap();
        assert_eq!(script.text(), "print('{}')");
        assert_eq!(script.fingerprint().len(), 16);
    }

    #[tokio::test]
    async fn fence_only_response_is_empty() {
        let generator = ScriptGenerator::new(Arc::new(Echo("```\n```")));
        let hypothesis = Hypothesis::new("h", HypothesisCategory::Other, "d");
        let err = generator
            .generate(&hypothesis, &schema(), &SampleDescriptor::default())
            .await
            .unwrap_err();
        assert_eq!(err, GenerationError::EmptyResponse);
    }
}
