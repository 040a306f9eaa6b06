//! Serde roundtrip and JsonSchema validation tests for boundary entities.

use schemars::schema_for;
use serde_json::json;
use sleuth_core::entities::*;
use sleuth_core::enums::*;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn sample() -> SampleDescriptor {
    SampleDescriptor {
        row_count: 300,
        estimated_tokens: 11_250,
        dropped_columns: vec!["free_text_notes".into()],
        truncated_fields: 4,
        truncation_cap: Some(200),
        source_rows: 52_000,
        source_columns: 23,
    }
}

roundtrip_and_validate!(
    hypothesis_roundtrip,
    Hypothesis,
    Hypothesis::new(
        "sales_outliers_turnover",
        HypothesisCategory::Outliers,
        "Turnover has extreme values outside 1.5×IQR",
    )
    .with_columns(["Turnover"])
    .with_threshold("iqr_multiplier", 1.5)
);

roundtrip_and_validate!(
    successful_investigation_roundtrip,
    Investigation,
    Investigation {
        generation_attempts: 1,
        fingerprint: Some("3f2a9c0b11d4e5f6".into()),
        duration_ms: 4_210,
        sample: Some(sample()),
        ..Investigation::succeeded(
            "import pandas as pd\nprint('{}')",
            json!({"outlier_count": 17, "columns": ["Turnover"]}),
        )
    }
);

roundtrip_and_validate!(
    parse_failure_investigation_roundtrip,
    Investigation,
    Investigation {
        code: "print('oops')".into(),
        failure: None,
        raw_output: Some("oops".into()),
        ..Investigation::failed(InvestigationStage::Parsing, "no JSON record in output")
    }
);

roundtrip_and_validate!(
    enriched_issue_roundtrip,
    Issue,
    Issue {
        severity: Severity::High,
        category: FixCategory::SmartFixes,
        affected_rows: Some(412),
        investigation: Some(Investigation {
            failure: Some(FailureKind::Timeout),
            ..Investigation::failed(InvestigationStage::Executing, "execution timed out")
        }),
        ..Issue::new("sales_dupes", "duplicates", "Sale ID repeats across rows")
            .with_columns(["Sale ID"])
            .investigate()
    }
);

#[test]
fn issue_type_uses_wire_name() {
    let issue = Issue::new("x", "format", "bad dates");
    let json = serde_json::to_value(&issue).unwrap();
    assert_eq!(json["type"], "format");
    assert_eq!(json["codeInvestigation"], false);
    assert!(json.get("investigation").is_none());
}
