use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::dataset::AnalysisConfig;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;

const DEFAULT_CONFIG_FILE: &str = "healthlens.toml";
const ENV_PREFIX: &str = "HEALTHLENS_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://healthlens.db".to_string(),
        }
    }
}

/// Service configuration: defaults, then `healthlens.toml`, then
/// `HEALTHLENS_*` environment variables (nested keys split on `__`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub llm: LLMConfig,
    pub analysis: AnalysisConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            info!(path = %path.display(), "Loaded environment file");
        }

        let file = std::env::var("HEALTHLENS_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        Self::from_figment(
            Self::base_figment()
                .merge(Toml::file(file))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    pub fn base_figment() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: AppConfig = figment
            .extract()
            .map_err(|e| AppError::ValidationError(format!("Invalid configuration: {}", e)))?;

        config.analysis.validate().map_err(|e| {
            AppError::ValidationError(format!("Invalid analysis config: {}", e))
        })?;

        Ok(config)
    }
}
