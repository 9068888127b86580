// ============================================================
// DATASET TYPES
// ============================================================
// Loaded tabular data: a fixed schema plus rows aligned to it

use serde::{Deserialize, Serialize};

use super::CellValue;

static MISSING: CellValue = CellValue::Missing;

/// A single record, positionally aligned with its dataset's columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    values: Vec<CellValue>,
}

impl Row {
    pub fn new(values: Vec<CellValue>) -> Self {
        Self { values }
    }

    /// Value at a column position; out-of-range positions read as missing
    pub fn get(&self, index: usize) -> &CellValue {
        self.values.get(index).unwrap_or(&MISSING)
    }

    pub fn values(&self) -> &[CellValue] {
        &self.values
    }
}

/// Ordered rows plus the column schema derived from the header.
///
/// Every row is padded (or truncated) to the schema width on construction, so
/// all rows expose the same ordered set of columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDataset")]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Row>,
}

#[derive(Deserialize)]
struct RawDataset {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl From<RawDataset> for Dataset {
    fn from(raw: RawDataset) -> Self {
        Dataset::new(raw.columns, raw.rows)
    }
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|row| {
                let mut values = row.values;
                values.resize(width, CellValue::Missing);
                Row { values }
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column in row order
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().map(move |row| row.get(index))
    }

    /// Look up a cell by row position and column name
    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|r| r.get(index))
    }
}
