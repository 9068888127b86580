// ============================================================
// INSIGHT GENERATOR
// ============================================================
// Rule-based observations over statistics, column roles and the query.
// Rules run in a fixed order; insights render top to bottom.

use std::collections::HashMap;

use crate::domain::dataset::{AnalysisConfig, Dataset, GroupKey, Metric, StatisticsMap};

const AGE_PATTERN: &str = "age";
const GENDER_PATTERN: &str = "gender";
const CORRELATION_KEYWORD: &str = "correlation";
const TREND_KEYWORD: &str = "trend";

/// Inputs shared by every insight rule
pub struct InsightContext<'a> {
    pub dataset: &'a Dataset,
    pub query: &'a str,
    pub numeric_columns: &'a [&'a str],
    pub categorical_columns: &'a [&'a str],
    pub statistics: &'a StatisticsMap,
    pub config: &'a AnalysisConfig,
}

pub fn generate_insights(ctx: &InsightContext<'_>) -> Vec<String> {
    let mut insights = Vec::new();

    age_insights(ctx, &mut insights);
    gender_insights(ctx, &mut insights);
    query_insights(ctx, &mut insights);

    insights
}

/// First column whose name contains `pattern`, ignoring case
pub fn find_column<'a>(columns: &[&'a str], pattern: &str) -> Option<&'a str> {
    let pattern = pattern.to_lowercase();
    columns
        .iter()
        .copied()
        .find(|name| name.to_lowercase().contains(&pattern))
}

fn age_insights(ctx: &InsightContext<'_>, insights: &mut Vec<String>) {
    let Some(column) = find_column(ctx.numeric_columns, AGE_PATTERN) else {
        return;
    };
    let Some(&mean) = ctx.statistics.get(&Metric::Mean.key(column)) else {
        return;
    };

    insights.push(format!(
        "Average age in dataset: {} years",
        format_one_decimal(mean)
    ));

    if mean > ctx.config.elderly_age_threshold {
        insights.push(format!(
            "Dataset primarily contains elderly patients (avg age > {})",
            ctx.config.elderly_age_threshold
        ));
    } else if mean < ctx.config.young_age_threshold {
        insights.push(format!(
            "Dataset primarily contains younger patients (avg age < {})",
            ctx.config.young_age_threshold
        ));
    }
}

fn gender_insights(ctx: &InsightContext<'_>, insights: &mut Vec<String>) {
    let Some(column) = find_column(ctx.categorical_columns, GENDER_PATTERN) else {
        return;
    };
    let Some(index) = ctx.dataset.column_index(column) else {
        return;
    };

    let total = ctx.dataset.row_count();
    if total == 0 {
        return;
    }

    // Groups keep first-encounter order
    let mut positions: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<(String, usize)> = Vec::new();

    for value in ctx.dataset.column_values(index) {
        let position = *positions.entry(value.group_key()).or_insert_with(|| {
            groups.push((value.to_string(), 0));
            groups.len() - 1
        });
        groups[position].1 += 1;
    }

    for (label, count) in groups {
        let percentage = count as f64 / total as f64 * 100.0;
        insights.push(format!(
            "{}: {}% of patients",
            label,
            format_one_decimal(percentage)
        ));
    }
}

fn query_insights(ctx: &InsightContext<'_>, insights: &mut Vec<String>) {
    let query = ctx.query.to_lowercase();

    if query.contains(CORRELATION_KEYWORD) && ctx.numeric_columns.len() >= 2 {
        insights.push(format!(
            "Found {} numeric variables available for correlation analysis",
            ctx.numeric_columns.len()
        ));
    }

    if query.contains(TREND_KEYWORD) {
        insights.push("Consider time-series analysis if temporal data is available".to_string());
    }
}

/// One decimal place from the exact binary value, ties rounded away from zero
/// (0.25 -> "0.3", 0.15 -> "0.1" since 0.15 is stored just below the tie)
pub fn format_one_decimal(value: f64) -> String {
    // An exact tie at one decimal is an odd multiple of 0.25; scaling by 4 is exact
    let quarters = value.abs() * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 == 1.0 {
        return format!("{:.1}", (value * 10.0).round() / 10.0);
    }
    format!("{:.1}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::{CellValue, Row};

    fn gender_dataset(values: &[&str]) -> Dataset {
        Dataset::new(
            vec!["gender".to_string()],
            values
                .iter()
                .map(|v| Row::new(vec![CellValue::Text(v.to_string())]))
                .collect(),
        )
    }

    fn run(
        dataset: &Dataset,
        query: &str,
        numeric: &[&str],
        categorical: &[&str],
        statistics: &StatisticsMap,
    ) -> Vec<String> {
        let config = AnalysisConfig::default();
        generate_insights(&InsightContext {
            dataset,
            query,
            numeric_columns: numeric,
            categorical_columns: categorical,
            statistics,
            config: &config,
        })
    }

    fn stats(pairs: &[(&str, f64)]) -> StatisticsMap {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_elderly_age_insight_follows_mean() {
        let empty = Dataset::new(vec!["Age".into()], vec![]);
        let insights = run(&empty, "", &["Age"], &[], &stats(&[("Age_mean", 70.2)]));

        assert_eq!(
            insights,
            vec![
                "Average age in dataset: 70.2 years".to_string(),
                "Dataset primarily contains elderly patients (avg age > 65)".to_string(),
            ]
        );
    }

    #[test]
    fn test_younger_age_insight() {
        let empty = Dataset::new(vec!["patient_age_years".into()], vec![]);
        let insights = run(
            &empty,
            "",
            &["patient_age_years"],
            &[],
            &stats(&[("patient_age_years_mean", 28.04)]),
        );

        assert_eq!(insights[0], "Average age in dataset: 28.0 years");
        assert_eq!(
            insights[1],
            "Dataset primarily contains younger patients (avg age < 35)"
        );
    }

    #[test]
    fn test_middle_age_has_no_skew_insight() {
        let empty = Dataset::new(vec!["AGE".into()], vec![]);
        let insights = run(&empty, "", &["AGE"], &[], &stats(&[("AGE_mean", 50.0)]));
        assert_eq!(insights, vec!["Average age in dataset: 50.0 years".to_string()]);
    }

    #[test]
    fn test_first_age_column_wins() {
        let empty = Dataset::new(vec!["age".into(), "stage".into()], vec![]);
        let insights = run(
            &empty,
            "",
            &["age", "stage"],
            &[],
            &stats(&[("age_mean", 50.0), ("stage_mean", 2.0)]),
        );
        assert_eq!(insights.len(), 1);
        assert!(insights[0].contains("50.0"));
    }

    #[test]
    fn test_age_without_mean_is_silent() {
        let empty = Dataset::new(vec!["age".into()], vec![]);
        assert!(run(&empty, "", &["age"], &[], &StatisticsMap::new()).is_empty());
    }

    #[test]
    fn test_gender_distribution() {
        let data = gender_dataset(&["F", "F", "M"]);
        let insights = run(&data, "", &[], &["gender"], &StatisticsMap::new());

        assert_eq!(
            insights,
            vec![
                "F: 66.7% of patients".to_string(),
                "M: 33.3% of patients".to_string(),
            ]
        );
    }

    #[test]
    fn test_gender_column_match_is_case_insensitive() {
        let data = Dataset::new(
            vec!["Patient_Gender".into()],
            vec![
                Row::new(vec![CellValue::Text("M".into())]),
                Row::new(vec![CellValue::Missing]),
            ],
        );
        let insights = run(&data, "", &[], &["Patient_Gender"], &StatisticsMap::new());

        assert_eq!(
            insights,
            vec![
                "M: 50.0% of patients".to_string(),
                "Unknown: 50.0% of patients".to_string(),
            ]
        );
    }

    #[test]
    fn test_correlation_advisory_counts_numeric_columns() {
        let empty = Dataset::new(vec![], vec![]);
        let insights = run(
            &empty,
            "show CORRELATION please",
            &["bp", "hr", "bmi"],
            &[],
            &StatisticsMap::new(),
        );
        assert_eq!(
            insights,
            vec!["Found 3 numeric variables available for correlation analysis".to_string()]
        );
    }

    #[test]
    fn test_correlation_needs_two_numeric_columns() {
        let empty = Dataset::new(vec![], vec![]);
        let insights = run(&empty, "correlation", &["bp"], &[], &StatisticsMap::new());
        assert!(insights.is_empty());
    }

    #[test]
    fn test_trend_advisory() {
        let empty = Dataset::new(vec![], vec![]);
        let insights = run(&empty, "Any Trends?", &[], &[], &StatisticsMap::new());
        assert_eq!(
            insights,
            vec!["Consider time-series analysis if temporal data is available".to_string()]
        );
    }

    #[test]
    fn test_unrelated_query_emits_nothing() {
        let empty = Dataset::new(vec![], vec![]);
        let insights = run(&empty, "hello", &["a", "b", "c"], &[], &StatisticsMap::new());
        assert!(insights.is_empty());
    }

    #[test]
    fn test_format_one_decimal_rounds_ties_up() {
        assert_eq!(format_one_decimal(6.25), "6.3");
        assert_eq!(format_one_decimal(0.25), "0.3");
        assert_eq!(format_one_decimal(-0.25), "-0.3");
        assert_eq!(format_one_decimal(0.75), "0.8");
        assert_eq!(format_one_decimal(66.666), "66.7");
        assert_eq!(format_one_decimal(100.0), "100.0");
    }

    #[test]
    fn test_format_one_decimal_uses_stored_value_near_ties() {
        assert_eq!(format_one_decimal(0.15), "0.1");
        assert_eq!(format_one_decimal(1.05), "1.1");
        assert_eq!(format_one_decimal(2.45), "2.5");
        assert_eq!(format_one_decimal(70.2), "70.2");
        assert_eq!(format_one_decimal(60.0), "60.0");
    }
}
