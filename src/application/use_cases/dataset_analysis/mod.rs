// ============================================================
// DATASET ANALYSIS USE CASE
// ============================================================
// Orchestrate classification, statistics and insight generation

mod classifier;
mod insights;
mod statistics;

pub use classifier::classify_columns;
pub use insights::{find_column, format_one_decimal, generate_insights, InsightContext};
pub use statistics::compute_statistics;

use tracing::debug;

use crate::domain::dataset::{AnalysisConfig, AnalysisResult, Dataset, StatisticsMap};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::csv::CsvLoader;

pub const EMPTY_DATASET_INSIGHT: &str =
    "Dataset is empty; no statistics or insights could be derived";

/// Dataset analysis engine
#[derive(Debug, Clone, Default)]
pub struct DatasetAnalyzer {
    config: AnalysisConfig,
}

impl DatasetAnalyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate().map_err(|e| {
            AppError::ValidationError(format!("Invalid analysis config: {}", e))
        })?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze an already loaded dataset against a user query.
    ///
    /// Pure and deterministic: the same dataset and query always produce an
    /// identical result.
    pub fn analyze(&self, dataset: &Dataset, query: &str) -> AnalysisResult {
        let roles = classify_columns(dataset, self.config.sample_rows);
        let numeric = roles.numeric();
        let categorical = roles.categorical();

        let summary = format!(
            "Analyzed {} records with {} numeric and {} categorical variables.",
            dataset.row_count(),
            numeric.len(),
            categorical.len()
        );

        if dataset.is_empty() {
            return AnalysisResult {
                summary,
                statistics: StatisticsMap::new(),
                insights: vec![EMPTY_DATASET_INSIGHT.to_string()],
            };
        }

        let statistics = compute_statistics(dataset, &numeric);
        let insights = generate_insights(&InsightContext {
            dataset,
            query,
            numeric_columns: &numeric,
            categorical_columns: &categorical,
            statistics: &statistics,
            config: &self.config,
        });

        debug!(
            rows = dataset.row_count(),
            numeric = numeric.len(),
            categorical = categorical.len(),
            statistics = statistics.len(),
            insights = insights.len(),
            "Dataset analysis complete"
        );

        AnalysisResult {
            summary,
            statistics,
            insights,
        }
    }

    /// Load delimited text and analyze it; load failures propagate unchanged
    pub fn analyze_content(&self, content: &str, query: &str) -> Result<AnalysisResult> {
        let dataset = CsvLoader::new().load(content)?;
        Ok(self.analyze(&dataset, query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATIENTS: &str = "patient_id,Age,gender,systolic_bp,notes\n\
        1,72,F,130,\n\
        2,81,F,145,follow up\n\
        3,58,M,120,\n\
        4,69.8,M,,\n\
        5,70.2,F,138,stable\n";

    #[test]
    fn test_analyze_patient_table() {
        let analyzer = DatasetAnalyzer::default();
        let result = analyzer.analyze_content(PATIENTS, "any trend?").unwrap();

        assert_eq!(
            result.summary,
            "Analyzed 5 records with 3 numeric and 2 categorical variables."
        );
        assert_eq!(result.statistics["Age_mean"], 70.2);
        assert_eq!(result.statistics["systolic_bp_median"], 134.0);
        assert!(!result.statistics.contains_key("notes_mean"));
        assert_eq!(
            result.insights,
            vec![
                "Average age in dataset: 70.2 years",
                "Dataset primarily contains elderly patients (avg age > 65)",
                "F: 60.0% of patients",
                "M: 40.0% of patients",
                "Consider time-series analysis if temporal data is available",
            ]
        );
    }

    #[test]
    fn test_overflowing_literal_does_not_poison_statistics() {
        let analyzer = DatasetAnalyzer::default();
        let result = analyzer
            .analyze_content("age,gender\n1e999,F\n40,M\n", "")
            .unwrap();

        assert_eq!(
            result.summary,
            "Analyzed 2 records with 0 numeric and 2 categorical variables."
        );
        assert!(result.statistics.values().all(|v| v.is_finite()));
        assert!(result.insights.iter().all(|i| !i.contains("inf")));

        let json = serde_json::to_string(&result.statistics).unwrap();
        assert!(!json.contains("null"));
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let analyzer = DatasetAnalyzer::default();
        let dataset = CsvLoader::new().load(PATIENTS).unwrap();

        let first = serde_json::to_string(&analyzer.analyze(&dataset, "correlation")).unwrap();
        let second = serde_json::to_string(&analyzer.analyze(&dataset, "correlation")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_summary_reports_row_count() {
        let analyzer = DatasetAnalyzer::default();
        let result = analyzer.analyze_content("x\n1\n2\n3", "").unwrap();
        assert!(result.summary.contains("Analyzed 3 records"));
    }

    #[test]
    fn test_correlation_query_uses_numeric_count() {
        let analyzer = DatasetAnalyzer::default();
        let result = analyzer
            .analyze_content(PATIENTS, "show correlation please")
            .unwrap();
        assert!(result
            .insights
            .contains(&"Found 3 numeric variables available for correlation analysis".to_string()));
    }

    #[test]
    fn test_empty_dataset_degrades() {
        let analyzer = DatasetAnalyzer::default();
        let result = analyzer.analyze_content("age,gender\n", "trend").unwrap();

        assert_eq!(
            result.summary,
            "Analyzed 0 records with 0 numeric and 0 categorical variables."
        );
        assert!(result.statistics.is_empty());
        assert_eq!(result.insights, vec![EMPTY_DATASET_INSIGHT.to_string()]);
    }

    #[test]
    fn test_empty_input_is_a_parse_error() {
        let analyzer = DatasetAnalyzer::default();
        assert!(matches!(
            analyzer.analyze_content("", "anything"),
            Err(AppError::ParseError(_))
        ));
    }

    #[test]
    fn test_malformed_input_returns_no_result() {
        let analyzer = DatasetAnalyzer::default();
        let err = analyzer
            .analyze_content("a,b\n1,2,3\n\"open", "")
            .unwrap_err();
        match err {
            AppError::ParseError(issues) => assert_eq!(issues.len(), 2),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = AnalysisConfig {
            sample_rows: 0,
            ..Default::default()
        };
        assert!(DatasetAnalyzer::new(config).is_err());
    }
}
