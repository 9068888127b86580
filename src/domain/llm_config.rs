use serde::{Deserialize, Serialize};

/// Connection settings for an OpenAI-compatible chat completions endpoint
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LLMConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1234/v1".to_string(),
            model: "llama-3.3-70b-instruct".to_string(),
            api_key: None,
            max_tokens: Some(512),
            temperature: Some(0.7),
        }
    }
}
