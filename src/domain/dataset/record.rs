use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Dataset;

/// An uploaded dataset together with its storage metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub id: String,
    pub name: String,
    pub uploaded_at: DateTime<Utc>,
    pub dataset: Dataset,
}

impl DatasetRecord {
    pub fn new(name: String, dataset: Dataset) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            uploaded_at: Utc::now(),
            dataset,
        }
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            uploaded_at: self.uploaded_at,
            row_count: self.dataset.row_count(),
            columns: self.dataset.columns().to_vec(),
        }
    }
}

/// Dataset metadata without the row data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    pub id: String,
    pub name: String,
    pub uploaded_at: DateTime<Utc>,
    pub row_count: usize,
    pub columns: Vec<String>,
}
