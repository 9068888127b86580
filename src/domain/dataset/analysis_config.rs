// ============================================================
// ANALYSIS CONFIGURATION
// ============================================================
// Tunables for column classification and insight thresholds

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of leading rows inspected when classifying a column (default: 100)
    pub sample_rows: usize,

    /// Mean age above which the dataset is reported as elderly-skewed (default: 65)
    pub elderly_age_threshold: f64,

    /// Mean age below which the dataset is reported as younger-skewed (default: 35)
    pub young_age_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rows: 100,
            elderly_age_threshold: 65.0,
            young_age_threshold: 35.0,
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rows == 0 {
            return Err("sample_rows must be > 0".to_string());
        }
        if !self.elderly_age_threshold.is_finite() || !self.young_age_threshold.is_finite() {
            return Err("age thresholds must be finite".to_string());
        }
        if self.young_age_threshold >= self.elderly_age_threshold {
            return Err("young_age_threshold must be < elderly_age_threshold".to_string());
        }
        Ok(())
    }
}
