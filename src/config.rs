use config::{Config, ConfigError, Environment};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub document: DocumentConfig,
    pub openai: OpenAiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DocumentConfig {
    /// Path to the policy PDF
    pub pdf_path: String,
    /// Directory holding the persisted index + metadata artifacts
    pub index_dir: String,
    pub top_k: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenAiConfig {
    /// Base URL of an OpenAI-compatible API
    pub api_base: String,
    /// Set to "mock" to run with deterministic stub clients
    pub api_key: String,
    pub embed_model: String,
    pub gen_model: String,
    pub embed_batch_size: usize,
    pub temperature: f32,
}

impl AppConfig {
    pub fn build() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            // Start with defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.rust_log", "info,policy_copilot=debug")?
            .set_default("document.pdf_path", "data/policy_handbook.pdf")?
            .set_default("document.index_dir", "data")?
            .set_default("document.top_k", 5)?
            .set_default("document.chunk_size", 900)?
            .set_default("document.chunk_overlap", 150)?
            .set_default("openai.api_base", "https://api.openai.com/v1")?
            .set_default("openai.api_key", "mock")?
            .set_default("openai.embed_model", "text-embedding-3-small")?
            .set_default("openai.gen_model", "gpt-4o-mini")?
            .set_default("openai.embed_batch_size", 64)?
            .set_default("openai.temperature", 0.2)?
            // Environment variables override defaults,
            // e.g. `APP_OPENAI__API_KEY=sk-...` sets `OpenAiConfig.api_key`
            .add_source(Environment::default().separator("__").prefix("APP"));

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()
    }

    /// Reject value combinations that would break the pipeline, before
    /// anything is served.
    fn validate(self) -> Result<Self, ConfigError> {
        if self.document.chunk_size == 0 {
            return Err(ConfigError::Message(
                "document.chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.document.chunk_overlap >= self.document.chunk_size {
            return Err(ConfigError::Message(format!(
                "document.chunk_overlap ({}) must be smaller than document.chunk_size ({})",
                self.document.chunk_overlap, self.document.chunk_size
            )));
        }
        Ok(self)
    }
}
