// ============================================================
// DATASET UPLOAD USE CASE
// ============================================================
// Decode, load, check and store an uploaded CSV file

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::application::use_cases::dataset_analysis::find_column;
use crate::domain::dataset::{Dataset, DatasetRecord, DatasetSummary};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::csv::{decode_upload, CsvLoader};
use crate::infrastructure::db::sqlite::DatasetRepository;

/// Column name fragments a healthcare dataset is expected to carry
const EXPECTED_COLUMN_PATTERNS: [&str; 3] = ["age", "gender", "id"];

const MAX_NAME_LENGTH: usize = 255;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadOutcome {
    #[serde(flatten)]
    pub dataset: DatasetSummary,
    /// Non-fatal findings about the dataset's shape
    pub warnings: Vec<String>,
}

pub struct DatasetUploadUseCase {
    repository: Arc<DatasetRepository>,
}

impl DatasetUploadUseCase {
    pub fn new(repository: Arc<DatasetRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, name: &str, bytes: &[u8]) -> Result<UploadOutcome> {
        validate_file_name(name)?;

        let content = decode_upload(bytes, name);
        let dataset = CsvLoader::new().load(&content)?;
        if dataset.is_empty() {
            return Err(AppError::EmptyDataset);
        }

        let warnings = validate_healthcare_columns(&dataset);
        for warning in &warnings {
            warn!(file_name = name, "{}", warning);
        }

        let record = DatasetRecord::new(name.to_string(), dataset);
        self.repository.insert_dataset(&record).await?;

        info!(
            dataset_id = %record.id,
            file_name = name,
            rows = record.dataset.row_count(),
            columns = record.dataset.columns().len(),
            "Stored uploaded dataset"
        );

        Ok(UploadOutcome {
            dataset: record.summary(),
            warnings,
        })
    }

    pub async fn list(&self) -> Result<Vec<DatasetSummary>> {
        self.repository.list_datasets().await
    }
}

fn validate_file_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_NAME_LENGTH {
        return Err(AppError::ValidationError(format!(
            "File name must be 1-{} characters",
            MAX_NAME_LENGTH
        )));
    }
    if !trimmed.to_lowercase().ends_with(".csv") {
        return Err(AppError::ValidationError(
            "Please upload a CSV file".to_string(),
        ));
    }
    Ok(())
}

/// Report expected healthcare columns that are absent
pub fn validate_healthcare_columns(dataset: &Dataset) -> Vec<String> {
    if dataset.is_empty() {
        return vec!["Dataset is empty".to_string()];
    }

    let columns: Vec<&str> = dataset.columns().iter().map(String::as_str).collect();
    EXPECTED_COLUMN_PATTERNS
        .iter()
        .filter(|pattern| find_column(&columns, pattern).is_none())
        .map(|pattern| format!("No column found matching pattern: {}", pattern))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn use_case() -> DatasetUploadUseCase {
        let repository = DatasetRepository::connect("sqlite::memory:").await.unwrap();
        DatasetUploadUseCase::new(Arc::new(repository))
    }

    #[tokio::test]
    async fn test_upload_stores_dataset() {
        let upload = use_case().await;
        let outcome = upload
            .execute("patients.csv", b"patient_id,age,gender\n1,70,F\n2,64,M\n")
            .await
            .unwrap();

        assert_eq!(outcome.dataset.row_count, 2);
        assert_eq!(outcome.dataset.columns, vec!["patient_id", "age", "gender"]);
        assert!(outcome.warnings.is_empty());

        let listed = upload.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, outcome.dataset.id);
    }

    #[tokio::test]
    async fn test_upload_warns_on_missing_columns() {
        let upload = use_case().await;
        let outcome = upload
            .execute("vitals.csv", b"heart_rate,bp\n60,120\n")
            .await
            .unwrap();

        assert_eq!(
            outcome.warnings,
            vec![
                "No column found matching pattern: age",
                "No column found matching pattern: gender",
                "No column found matching pattern: id",
            ]
        );
    }

    #[tokio::test]
    async fn test_upload_rejects_header_only_file() {
        let upload = use_case().await;
        let result = upload.execute("empty.csv", b"age,gender\n").await;
        assert!(matches!(result, Err(AppError::EmptyDataset)));
        assert!(upload.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_rejects_malformed_csv() {
        let upload = use_case().await;
        let result = upload.execute("bad.csv", b"a,b\n1,2,3\n").await;
        assert!(matches!(result, Err(AppError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_upload_rejects_non_csv_name() {
        let upload = use_case().await;
        let result = upload.execute("notes.txt", b"a\n1\n").await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }
}
