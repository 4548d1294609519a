pub mod config;
pub mod error;
pub mod llm;
pub mod lookup;
pub mod pipeline;
pub mod profile;
pub mod routes;
pub mod telemetry;

#[cfg(test)]
mod test_support;

use std::sync::Arc;
use std::time::Duration;

pub use config::Config;

use config::LookupStrategy;
use error::ConfigError;
use llm::LlmClient;
use lookup::{ProfileLookup, SearchAgentLookup, TavilyLookup, TavilySearch};
use pipeline::{GenerationSettings, Summarizer};
use profile::{FixtureSource, ProfileSource, ProxycurlClient};

#[derive(Clone)]
pub struct AppState {
    pub summarizer: Arc<Summarizer>,
    /// Ceiling on one whole summarization, upstream calls included.
    pub request_timeout: Duration,
}

/// Wires the lookup, profile source and model client chosen by `config`.
pub fn build_summarizer(config: &Config) -> Result<Summarizer, ConfigError> {
    let llm_client = Arc::new(LlmClient::from_config(config));
    let search = TavilySearch::new(&config.tavily_api_key, &config.tavily_base_url);

    let lookup: Arc<dyn ProfileLookup> = match config.lookup_strategy {
        LookupStrategy::Search => Arc::new(TavilyLookup::new(search)),
        LookupStrategy::Agent => Arc::new(SearchAgentLookup::new(
            llm_client.clone(),
            search,
            &config.llm_model,
            config.agent_max_iterations,
            config.agent_max_execution,
        )),
    };

    let source: Arc<dyn ProfileSource> =
        match (&config.profile_fixture_path, &config.proxycurl_api_key) {
            (Some(path), _) => Arc::new(FixtureSource::new(path.clone())),
            (None, Some(api_key)) => {
                Arc::new(ProxycurlClient::new(api_key, &config.proxycurl_base_url))
            }
            (None, None) => return Err(ConfigError::Missing("PROXYCURL_API_KEY".to_string())),
        };

    Ok(Summarizer::new(
        lookup,
        source,
        llm_client,
        GenerationSettings {
            model: config.llm_model.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
        },
    ))
}
