// ============================================================
// SCHEMA CLASSIFIER
// ============================================================
// Partition columns into numeric and categorical from a bounded sample

use crate::domain::dataset::{CellValue, ColumnRole, ColumnRoles, Dataset};

/// Classify every column of `dataset` by inspecting at most `sample_rows`
/// leading rows. Later rows never change a column's role.
pub fn classify_columns(dataset: &Dataset, sample_rows: usize) -> ColumnRoles {
    let sample = &dataset.rows()[..dataset.row_count().min(sample_rows)];

    let entries = dataset
        .columns()
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let role = classify_values(sample.iter().map(|row| row.get(index)));
            (name.clone(), role)
        })
        .collect();

    ColumnRoles::new(entries)
}

fn classify_values<'a>(values: impl Iterator<Item = &'a CellValue>) -> ColumnRole {
    let mut saw_number = false;

    for value in values {
        match value {
            CellValue::Text(_) => return ColumnRole::Categorical,
            CellValue::Number(_) => saw_number = true,
            CellValue::Missing => {}
        }
    }

    if saw_number {
        ColumnRole::Numeric
    } else {
        ColumnRole::Unclassified
    }
}
