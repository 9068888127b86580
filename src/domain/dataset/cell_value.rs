// ============================================================
// CELL VALUE
// ============================================================
// Tagged scalar stored in every dataset cell

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar value of one cell after type inference.
///
/// Serialized untagged, so the wire form is a JSON number, a JSON string or `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Missing,
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Hashable identity used when grouping rows by value.
    pub fn group_key(&self) -> GroupKey {
        match self {
            CellValue::Number(n) => GroupKey::Number(n.to_bits()),
            CellValue::Text(s) => GroupKey::Text(s.clone()),
            CellValue::Missing => GroupKey::Missing,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Missing => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Number(u64),
    Text(String),
    Missing,
}
