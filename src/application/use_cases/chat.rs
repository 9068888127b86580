// ============================================================
// CHAT USE CASE
// ============================================================
// Answer a chat message with a model reply plus dataset analysis

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};
use validator::Validate;

use crate::application::use_cases::dataset_analysis::DatasetAnalyzer;
use crate::domain::chat::{ChatMessage, ChatRequest, ChatResponse, ChatRole};
use crate::domain::dataset::{AnalysisRecord, DatasetRecord};
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::infrastructure::db::sqlite::DatasetRepository;
use crate::infrastructure::llm_clients::LLMClient;
use crate::infrastructure::response::clean_llm_response;

const SYSTEM_PROMPT: &str = "You are a healthcare data analysis assistant. \
Answer questions about uploaded patient datasets clearly and concisely. \
Do not invent figures that are not present in the data.";

pub struct ChatUseCase {
    repository: Arc<DatasetRepository>,
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    llm_config: LLMConfig,
    analyzer: DatasetAnalyzer,
}

impl ChatUseCase {
    pub fn new(
        repository: Arc<DatasetRepository>,
        llm_client: Arc<dyn LLMClient + Send + Sync>,
        llm_config: LLMConfig,
        analyzer: DatasetAnalyzer,
    ) -> Self {
        Self {
            repository,
            llm_client,
            llm_config,
            analyzer,
        }
    }

    pub async fn execute(&self, request: ChatRequest) -> Result<ChatResponse> {
        request
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let dataset = match &request.dataset_id {
            Some(id) => Some(self.repository.get_dataset(id).await?),
            None => None,
        };

        let prompt = build_prompt(&request.message, dataset.as_ref());
        let reply = self
            .llm_client
            .generate(&self.llm_config, SYSTEM_PROMPT, &prompt)
            .await
            .map_err(|e| {
                error!(error = %e, "Text generation failed");
                e
            })?;
        let reply = clean_llm_response(&reply);

        let user_message = ChatMessage::new(
            ChatRole::User,
            request.message.clone(),
            request.dataset_id.clone(),
        );
        let assistant_message = ChatMessage::new(
            ChatRole::Assistant,
            reply.clone(),
            request.dataset_id.clone(),
        );

        let analysis = dataset.as_ref().map(|record| AnalysisRecord {
            id: uuid::Uuid::new_v4().to_string(),
            dataset_id: record.id.clone(),
            query: request.message.clone(),
            results: self.analyzer.analyze(&record.dataset, &request.message),
            created_at: Utc::now(),
        });

        self.repository
            .insert_chat_exchange(&[user_message, assistant_message], analysis.as_ref())
            .await?;

        if let Some(record) = &analysis {
            info!(
                dataset_id = %record.dataset_id,
                insights = record.results.insights.len(),
                "Answered chat message with analysis"
            );
        }

        let analysis = analysis.map(|record| record.results);

        Ok(ChatResponse {
            message: reply,
            analysis,
        })
    }

    /// Transcript for one dataset, oldest first
    pub async fn history(&self, dataset_id: &str) -> Result<Vec<ChatMessage>> {
        // Surface unknown ids as NotFound rather than an empty transcript
        self.repository.get_dataset(dataset_id).await?;
        self.repository.list_chat_messages(dataset_id).await
    }
}

fn build_prompt(message: &str, dataset: Option<&DatasetRecord>) -> String {
    let mut prompt = format!(
        "User query: {}\nDataset available: {}\n",
        message,
        if dataset.is_some() { "Yes" } else { "No" }
    );

    if let Some(record) = dataset {
        prompt.push_str(&format!(
            "Dataset name: {}\nDataset rows: {}\nDataset columns: {}\n",
            record.name,
            record.dataset.row_count(),
            record.dataset.columns().join(", ")
        ));
    }

    prompt.push_str("\nProvide a helpful response about healthcare data analysis.");
    prompt
}
