// ============================================================
// ANALYSIS RESULT TYPES
// ============================================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Descriptive statistics keyed `"<column>_<metric>"`.
///
/// Ordered so that serializing the same result twice yields identical bytes.
pub type StatisticsMap = BTreeMap<String, f64>;

/// The metrics computed for every numeric column with data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Mean,
    Median,
    Std,
    Min,
    Max,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Mean,
        Metric::Median,
        Metric::Std,
        Metric::Min,
        Metric::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Mean => "mean",
            Metric::Median => "median",
            Metric::Std => "std",
            Metric::Min => "min",
            Metric::Max => "max",
        }
    }

    pub fn key(&self, column: &str) -> String {
        format!("{}_{}", column, self.as_str())
    }
}

/// Output of one analysis call, as consumed by the chat channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub statistics: StatisticsMap,
    pub insights: Vec<String>,
}

/// A persisted analysis run tied to a dataset and the query that produced it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: String,
    pub dataset_id: String,
    pub query: String,
    pub results: AnalysisResult,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_keys() {
        let keys: Vec<String> = Metric::ALL.iter().map(|m| m.key("Age")).collect();
        assert_eq!(
            keys,
            vec!["Age_mean", "Age_median", "Age_std", "Age_min", "Age_max"]
        );
    }
}
