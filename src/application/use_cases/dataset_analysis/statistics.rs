// ============================================================
// STATISTICS ENGINE
// ============================================================
// Descriptive statistics for numeric columns

use crate::domain::dataset::{Dataset, Metric, StatisticsMap};

/// Compute mean, median, population std, min and max for each named column.
///
/// Missing and NaN values are skipped. A column left with no values adds no
/// keys at all.
pub fn compute_statistics(dataset: &Dataset, numeric_columns: &[&str]) -> StatisticsMap {
    let mut statistics = StatisticsMap::new();

    for column in numeric_columns {
        let Some(index) = dataset.column_index(column) else {
            continue;
        };

        let values: Vec<f64> = dataset
            .column_values(index)
            .filter_map(|v| v.as_number())
            .filter(|n| !n.is_nan())
            .collect();

        let Some(summary) = Summary::of(&values) else {
            continue;
        };

        for metric in Metric::ALL {
            statistics.insert(metric.key(column), summary.get(metric));
        }
    }

    statistics
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Summary {
    mean: f64,
    median: f64,
    std: f64,
    min: f64,
    max: f64,
}

impl Summary {
    fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        // Summing in sorted order keeps the result independent of row order
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Some(Self {
            mean,
            median: median_of_sorted(&sorted),
            std: variance.sqrt(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
        })
    }

    fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Mean => self.mean,
            Metric::Median => self.median,
            Metric::Std => self.std,
            Metric::Min => self.min,
            Metric::Max => self.max,
        }
    }
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
