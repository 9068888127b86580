pub mod chat;
pub mod dataset_analysis;
pub mod dataset_upload;
