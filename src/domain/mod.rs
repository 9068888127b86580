pub mod chat;
pub mod dataset;
pub mod error;
pub mod llm_config;
