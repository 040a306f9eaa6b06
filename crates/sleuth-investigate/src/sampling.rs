//! Budget-aware row/column sampling.
//!
//! The selector estimates the token cost of the dense CSV encoding from a
//! small spread of rows, picks a row count that fits the budget, and then
//! measures the real payload. When the measured payload is still over budget it applies,
//! in order: one pass of long-field truncation, one row rescale from the
//! measured cost, a fall back to the row floor, and finally column drops.
//! Every step runs at most once and columns are only dropped at the floor.
//!
//! Row choice keeps the dataset's shape: a head third, a seeded random middle
//! third, and a tail third, emitted in original order.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;
use sleuth_config::SamplingConfig;
use sleuth_core::dataset::{Dataset, EncodedRows};
use sleuth_core::entities::SampleDescriptor;

/// A chosen subset plus the exact payload that will be shipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub descriptor: SampleDescriptor,
    /// Selected row indices, ascending.
    pub rows: Vec<usize>,
    /// Kept column indices, in dataset order.
    pub columns: Vec<usize>,
    /// Dense CSV encoding of `rows` × `columns`.
    pub payload: String,
}

#[derive(Debug, Clone)]
pub struct SampleSelector {
    config: SamplingConfig,
}

impl SampleSelector {
    #[must_use]
    pub const fn new(config: SamplingConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &SamplingConfig {
        &self.config
    }

    /// Estimated tokens for `text` at the configured chars-per-token ratio.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn estimate_tokens(&self, text: &str) -> usize {
        (text.chars().count() as f64 / self.config.chars_per_token).ceil() as usize
    }

    /// Reduce `dataset` to a sample that fits the token budget.
    ///
    /// Never fails. An empty dataset yields a sample with `row_count == 0`.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn select(&self, dataset: &Dataset) -> Sample {
        let cfg = &self.config;
        let total_rows = dataset.row_count();
        let mut columns: Vec<usize> = (0..dataset.column_count()).collect();

        if total_rows == 0 || columns.is_empty() {
            return Sample {
                descriptor: SampleDescriptor {
                    source_rows: total_rows,
                    source_columns: columns.len(),
                    ..SampleDescriptor::default()
                },
                rows: Vec::new(),
                columns,
                payload: String::new(),
            };
        }

        let tokens_per_row = self.sampled_tokens_per_row(dataset, &columns);
        let max_safe_rows = if tokens_per_row > 0.0 {
            (cfg.token_budget as f64 / tokens_per_row).floor() as usize
        } else {
            usize::MAX
        };
        let cap = cfg.target_rows.max(cfg.min_rows);
        let mut selected = cap.min(max_safe_rows).max(cfg.min_rows).min(total_rows);

        let mut rows = choose_rows(total_rows, selected, cfg.seed);
        let mut truncate_at = None;
        let (mut encoded, mut tokens) = self.encode(dataset, &rows, &columns, truncate_at);

        if tokens > cfg.token_budget {
            truncate_at = Some(cfg.field_char_cap);
            (encoded, tokens) = self.encode(dataset, &rows, &columns, truncate_at);
        }

        // Skewed data can defeat the estimate; rescale once from the real cost.
        if tokens > cfg.token_budget && selected > cfg.min_rows {
            let per_row = tokens as f64 / selected as f64;
            selected = ((cfg.token_budget as f64 / per_row).floor() as usize)
                .clamp(cfg.min_rows, selected - 1);
            rows = choose_rows(total_rows, selected, cfg.seed);
            (encoded, tokens) = self.encode(dataset, &rows, &columns, truncate_at);
        }
        if tokens > cfg.token_budget && selected > cfg.min_rows {
            selected = cfg.min_rows;
            rows = choose_rows(total_rows, selected, cfg.seed);
            (encoded, tokens) = self.encode(dataset, &rows, &columns, truncate_at);
        }

        // Columns only go once the row floor itself is over budget.
        let mut dropped_columns = Vec::new();
        if tokens > cfg.token_budget && selected <= cfg.min_rows {
            for column in drop_order(dataset, &columns) {
                if tokens <= cfg.token_budget || columns.len() <= 1 {
                    break;
                }
                columns.retain(|&c| c != column);
                dropped_columns.push(dataset.columns()[column].name.clone());
                (encoded, tokens) = self.encode(dataset, &rows, &columns, truncate_at);
            }
        }

        tracing::debug!(
            dataset = dataset.id(),
            rows = rows.len(),
            tokens,
            dropped = dropped_columns.len(),
            truncated = encoded.truncated_fields,
            "sample selected"
        );

        Sample {
            descriptor: SampleDescriptor {
                row_count: rows.len(),
                estimated_tokens: tokens,
                dropped_columns,
                truncated_fields: encoded.truncated_fields,
                truncation_cap: truncate_at,
                source_rows: total_rows,
                source_columns: dataset.column_count(),
            },
            rows,
            columns,
            payload: encoded.text,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn sampled_tokens_per_row(&self, dataset: &Dataset, columns: &[usize]) -> f64 {
        let total = dataset.row_count();
        let sample_len = self.config.estimate_rows.clamp(1, total);
        let picked: Vec<usize> = (0..sample_len).map(|i| i * total / sample_len).collect();
        let text = dataset.encode(&picked, columns, None).text;
        text.chars().count() as f64 / sample_len as f64 / self.config.chars_per_token
    }

    fn encode(
        &self,
        dataset: &Dataset,
        rows: &[usize],
        columns: &[usize],
        truncate_at: Option<usize>,
    ) -> (EncodedRows, usize) {
        let encoded = dataset.encode(rows, columns, truncate_at);
        let tokens = self.estimate_tokens(&encoded.text);
        (encoded, tokens)
    }
}

/// Pick `selected` of `total` row indices: head third, seeded middle third,
/// tail third, ascending.
#[must_use]
pub fn choose_rows(total: usize, selected: usize, seed: u64) -> Vec<usize> {
    if selected >= total {
        return (0..total).collect();
    }
    let head = selected / 3;
    let tail = selected / 3;
    let middle = selected - head - tail;
    let middle_end = total - tail;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut picked_middle: Vec<usize> = index::sample(&mut rng, middle_end - head, middle)
        .into_iter()
        .map(|i| i + head)
        .collect();
    picked_middle.sort_unstable();

    let mut rows = Vec::with_capacity(selected);
    rows.extend(0..head);
    rows.extend(picked_middle);
    rows.extend(middle_end..total);
    rows
}

/// Non-numeric columns by descending cardinality, then numeric ones.
fn drop_order(dataset: &Dataset, columns: &[usize]) -> Vec<usize> {
    let mut ranked: Vec<(bool, usize, usize)> = columns
        .iter()
        .map(|&c| {
            let numeric = dataset.columns()[c].column_type.is_numeric();
            (numeric, dataset.cardinality(c), c)
        })
        .collect();
    ranked.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)).then(a.2.cmp(&b.2)));
    ranked.into_iter().map(|(_, _, c)| c).collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use sleuth_core::dataset::{CellValue, Column};
    use sleuth_core::enums::ColumnType;

    use super::*;

    fn numeric_dataset(rows: usize, cols: usize) -> Dataset {
        let columns = (0..cols)
            .map(|c| Column::new(format!("c{c}"), ColumnType::Numeric))
            .collect();
        let data = (0..rows)
            .map(|r| {
                (0..cols)
                    .map(|c| CellValue::Int(((r * 7919 + c * 104_729) % 100_000) as i64))
                    .collect()
            })
            .collect();
        Dataset::new("numbers", columns, data).unwrap()
    }

    fn selector(budget: usize, target_rows: usize) -> SampleSelector {
        SampleSelector::new(SamplingConfig {
            token_budget: budget,
            target_rows,
            ..SamplingConfig::default()
        })
    }

    #[test]
    fn empty_dataset_yields_empty_sample() {
        let ds = numeric_dataset(0, 4);
        let sample = selector(120_000, 10_000).select(&ds);
        assert!(sample.descriptor.is_empty());
        assert_eq!(sample.descriptor.estimated_tokens, 0);
        assert_eq!(sample.descriptor.source_columns, 4);
        assert!(sample.payload.is_empty());
    }

    #[test]
    fn small_dataset_is_taken_whole() {
        let ds = numeric_dataset(10, 3);
        let sample = selector(120_000, 10_000).select(&ds);
        assert_eq!(sample.rows, (0..10).collect::<Vec<_>>());
        assert_eq!(sample.payload, ds.encode(&sample.rows, &[0, 1, 2], None).text);
        assert_eq!(sample.descriptor.truncation_cap, None);
    }

    #[rstest]
    #[case(120_000, 10_000)]
    #[case(120_000, 100)]
    #[case(120_000, 3)]
    #[case(2_000, 10_000)]
    #[case(50, 10_000)]
    fn selected_rows_stay_within_bounds(#[case] budget: usize, #[case] cap: usize) {
        let ds = numeric_dataset(5_000, 6);
        let sample = selector(budget, cap).select(&ds);
        let selected = sample.descriptor.row_count;
        assert!(selected >= 25, "selected {selected} below floor");
        assert!(selected <= cap.max(25).min(5_000), "selected {selected} above cap");
        assert_eq!(sample.rows.len(), selected);
    }

    #[test]
    fn wide_table_fits_budget() {
        let ds = numeric_dataset(20_000, 50);
        let sample = selector(120_000, 10_000).select(&ds);
        assert!(sample.descriptor.row_count <= 10_000);
        assert!(sample.descriptor.estimated_tokens <= 120_000);
        assert_eq!(
            sample.descriptor.estimated_tokens,
            selector(120_000, 10_000).estimate_tokens(&sample.payload)
        );
    }

    #[test]
    #[ignore = "allocates a million-row table"]
    fn million_by_fifty_fits_budget() {
        let ds = numeric_dataset(1_000_000, 50);
        let sample = selector(120_000, 10_000).select(&ds);
        assert!(sample.descriptor.row_count <= 10_000);
        assert!(sample.descriptor.estimated_tokens <= 120_000);
    }

    #[test]
    fn long_text_is_truncated_before_dropping_columns() {
        let columns = vec![
            Column::new("id", ColumnType::Numeric),
            Column::new("notes", ColumnType::String),
        ];
        let rows = (0..40)
            .map(|r| vec![CellValue::Int(r), CellValue::Text("x".repeat(1_000))])
            .collect();
        let ds = Dataset::new("notes", columns, rows).unwrap();

        let sample = SampleSelector::new(SamplingConfig {
            token_budget: 5_000,
            ..SamplingConfig::default()
        })
        .select(&ds);

        assert_eq!(sample.descriptor.truncation_cap, Some(200));
        assert!(sample.descriptor.truncated_fields > 0);
        assert!(sample.descriptor.dropped_columns.is_empty());
        assert!(sample.descriptor.estimated_tokens <= 5_000);
    }

    #[test]
    fn high_cardinality_text_is_dropped_first() {
        let columns = vec![
            Column::new("amount", ColumnType::Numeric),
            Column::new("region", ColumnType::Categorical),
            Column::new("comment", ColumnType::String),
        ];
        let rows = (0..100)
            .map(|r| {
                vec![
                    CellValue::Int(r),
                    CellValue::Text(if r % 2 == 0 { "north" } else { "south" }.into()),
                    CellValue::Text(format!("{r}-{}", "y".repeat(150))),
                ]
            })
            .collect();
        let ds = Dataset::new("comments", columns, rows).unwrap();

        let sample = SampleSelector::new(SamplingConfig {
            token_budget: 300,
            ..SamplingConfig::default()
        })
        .select(&ds);

        assert_eq!(sample.descriptor.row_count, 25);
        assert_eq!(sample.descriptor.dropped_columns[0], "comment");
        assert!(sample.payload.starts_with("amount"));
    }

    #[test]
    fn skewed_rows_shrink_rows_before_columns() {
        let columns = vec![
            Column::new("kind", ColumnType::Categorical),
            Column::new("note", ColumnType::String),
        ];
        // Every row the estimate reads is short; the rest are long.
        let rows = (0..5_000)
            .map(|r| {
                let note = if r % 100 == 0 { "x".to_owned() } else { "y".repeat(150) };
                vec![CellValue::Text("a".into()), CellValue::Text(note)]
            })
            .collect();
        let ds = Dataset::new("skewed", columns, rows).unwrap();

        let sample = selector(20_000, 10_000).select(&ds);

        assert!(sample.descriptor.dropped_columns.is_empty());
        assert_eq!(sample.columns, vec![0, 1]);
        assert!(sample.descriptor.row_count >= 25);
        assert!(sample.descriptor.row_count < 5_000);
        assert!(sample.descriptor.estimated_tokens <= 20_000);
    }

    #[test]
    fn columns_are_dropped_only_at_the_row_floor() {
        let columns = vec![
            Column::new("id", ColumnType::Numeric),
            Column::new("body", ColumnType::String),
        ];
        let rows = (0..500)
            .map(|r| vec![CellValue::Int(r), CellValue::Text(format!("{r}{}", "w".repeat(190)))])
            .collect();
        let ds = Dataset::new("bodies", columns, rows).unwrap();

        let sample = selector(1_000, 10_000).select(&ds);

        assert_eq!(sample.descriptor.dropped_columns, vec!["body".to_owned()]);
        assert_eq!(sample.descriptor.row_count, 25);
        assert!(sample.descriptor.estimated_tokens <= 1_000);
    }

    #[test]
    fn single_column_is_never_dropped() {
        let columns = vec![Column::new("blob", ColumnType::String)];
        let rows = (0..30)
            .map(|r| vec![CellValue::Text(format!("{r}{}", "z".repeat(500)))])
            .collect();
        let ds = Dataset::new("blob", columns, rows).unwrap();
        let sample = selector(100, 10_000).select(&ds);
        assert!(sample.descriptor.dropped_columns.is_empty());
        assert_eq!(sample.columns, vec![0]);
        assert_eq!(sample.descriptor.row_count, 25);
    }

    #[test]
    fn row_choice_is_deterministic_and_shaped() {
        let rows = choose_rows(1_000, 90, 42);
        assert_eq!(rows.len(), 90);
        assert_eq!(rows, choose_rows(1_000, 90, 42));
        assert!(rows.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(&rows[..30], &(0..30).collect::<Vec<_>>()[..]);
        assert_eq!(&rows[60..], &(970..1_000).collect::<Vec<_>>()[..]);
        assert!(rows[30..60].iter().all(|&r| (30..970).contains(&r)));
    }
}
