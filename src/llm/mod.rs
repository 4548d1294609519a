pub mod anthropic;
pub mod client;
pub mod openai;

use std::sync::Arc;

pub use client::LlmClient;

use crate::config::{Config, ProviderKind};

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stage: String,
}

#[derive(Debug, Clone)]
pub struct GenerateResponse {
    pub content: String,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub finish_reason: String,
    pub provider: String,
}

#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    async fn generate(&self, req: &GenerateRequest) -> anyhow::Result<GenerateResponse>;
    fn name(&self) -> &str;
}

/// Instantiates the provider for `kind` using the credentials in `config`.
/// Credentials were checked when the config was built.
pub fn build_provider(kind: ProviderKind, config: &Config) -> Arc<dyn Provider> {
    let key = config.api_keys.for_provider(kind).unwrap_or_default();
    match kind {
        ProviderKind::OpenAi => Arc::new(openai::OpenAIProvider::new(key)),
        ProviderKind::Google => Arc::new(openai::OpenAIProvider::new_google(key)),
        ProviderKind::Ollama => {
            Arc::new(openai::OpenAIProvider::new_ollama(&config.ollama_base_url))
        }
        ProviderKind::Anthropic => Arc::new(anthropic::AnthropicProvider::new(key)),
    }
}
