pub mod use_cases;

pub use use_cases::chat::ChatUseCase;
pub use use_cases::dataset_analysis::DatasetAnalyzer;
pub use use_cases::dataset_upload::{DatasetUploadUseCase, UploadOutcome};
