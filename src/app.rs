use std::sync::Arc;

use actix_web::web;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::application::{ChatUseCase, DatasetAnalyzer, DatasetUploadUseCase};
use crate::domain::error::Result;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::db::sqlite::DatasetRepository;
use crate::infrastructure::llm_clients::OpenAIClient;
use crate::interfaces::http::{start_server, HttpState};

/// Load configuration, wire the use cases and serve the HTTP API until shutdown
pub async fn run() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config = AppConfig::load()?;
    info!(
        database = %config.database.url,
        llm_base_url = %config.llm.base_url,
        model = %config.llm.model,
        "Starting healthlens"
    );

    let repository = Arc::new(DatasetRepository::connect(&config.database.url).await?);
    let analyzer = DatasetAnalyzer::new(config.analysis.clone())?;

    let state = web::Data::new(HttpState {
        upload_use_case: DatasetUploadUseCase::new(repository.clone()),
        chat_use_case: ChatUseCase::new(
            repository,
            Arc::new(OpenAIClient::default()),
            config.llm.clone(),
            analyzer,
        ),
    });

    start_server(state, &config.server)?.await?;
    info!("Server stopped");
    Ok(())
}
