use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Google,
    Ollama,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Google => "google",
            ProviderKind::Ollama => "ollama",
        }
    }

    /// Environment variable holding the credential, if the provider needs one.
    pub fn api_key_var(&self) -> Option<&'static str> {
        match self {
            ProviderKind::OpenAi => Some("OPENAI_API_KEY"),
            ProviderKind::Anthropic => Some("ANTHROPIC_API_KEY"),
            ProviderKind::Google => Some("GOOGLE_API_KEY"),
            ProviderKind::Ollama => None,
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" => Ok(ProviderKind::Anthropic),
            "google" => Ok(ProviderKind::Google),
            "ollama" => Ok(ProviderKind::Ollama),
            other => Err(format!("unknown provider {other:?}")),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStrategy {
    /// Single search call, first hit wins.
    Search,
    /// Model-driven search loop with bounded iterations and wall time.
    Agent,
}

impl FromStr for LookupStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "search" => Ok(LookupStrategy::Search),
            "agent" => Ok(LookupStrategy::Agent),
            other => Err(format!("unknown lookup strategy {other:?}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiKeys {
    pub openai: Option<String>,
    pub anthropic: Option<String>,
    pub google: Option<String>,
}

impl ApiKeys {
    pub fn for_provider(&self, kind: ProviderKind) -> Option<&str> {
        match kind {
            ProviderKind::OpenAi => self.openai.as_deref(),
            ProviderKind::Anthropic => self.anthropic.as_deref(),
            ProviderKind::Google => self.google.as_deref(),
            ProviderKind::Ollama => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: String,
    pub llm_provider: ProviderKind,
    pub llm_model: String,
    pub fallback_provider: Option<ProviderKind>,
    pub fallback_model: String,
    pub ollama_base_url: String,
    pub api_keys: ApiKeys,
    pub lookup_strategy: LookupStrategy,
    pub tavily_api_key: String,
    pub tavily_base_url: String,
    pub proxycurl_api_key: Option<String>,
    pub proxycurl_base_url: String,
    pub profile_fixture_path: Option<PathBuf>,
    pub agent_max_iterations: u32,
    pub agent_max_execution: Duration,
    pub request_timeout: Duration,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    pub otel_service_name: String,
    pub otel_exporter_endpoint: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source and checks
    /// every required credential up front.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or_default = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let llm_provider: ProviderKind = parse_var(&var, "LLM_PROVIDER", "openai")?;
        let fallback_provider = match var("FALLBACK_PROVIDER") {
            None => None,
            Some(v) if v.eq_ignore_ascii_case("none") => None,
            Some(v) => Some(v.parse::<ProviderKind>().map_err(|reason| ConfigError::Invalid {
                var: "FALLBACK_PROVIDER".to_string(),
                reason,
            })?),
        };

        let api_keys = ApiKeys {
            openai: var("OPENAI_API_KEY"),
            anthropic: var("ANTHROPIC_API_KEY"),
            google: var("GOOGLE_API_KEY"),
        };

        for kind in std::iter::once(llm_provider).chain(fallback_provider) {
            if let Some(key_var) = kind.api_key_var()
                && api_keys.for_provider(kind).is_none()
            {
                return Err(ConfigError::Missing(key_var.to_string()));
            }
        }

        let profile_fixture_path = var("PROFILE_FIXTURE_PATH").map(PathBuf::from);
        let proxycurl_api_key = var("PROXYCURL_API_KEY");
        if profile_fixture_path.is_none() && proxycurl_api_key.is_none() {
            return Err(ConfigError::Missing("PROXYCURL_API_KEY".to_string()));
        }

        let tavily_api_key = var("TAVILY_API_KEY")
            .ok_or_else(|| ConfigError::Missing("TAVILY_API_KEY".to_string()))?;

        Ok(Self {
            port: parse_var(&var, "APP_PORT", "8080")?,
            environment: or_default("APP_ENVIRONMENT", "development"),
            llm_provider,
            llm_model: or_default("LLM_MODEL", "gpt-4.1-mini"),
            fallback_provider,
            fallback_model: or_default("FALLBACK_MODEL", "claude-haiku-4-5-20251001"),
            ollama_base_url: or_default("OLLAMA_BASE_URL", "http://localhost:11434"),
            api_keys,
            lookup_strategy: parse_var(&var, "LOOKUP_STRATEGY", "search")?,
            tavily_api_key,
            tavily_base_url: or_default("TAVILY_BASE_URL", "https://api.tavily.com"),
            proxycurl_api_key,
            proxycurl_base_url: or_default("PROXYCURL_BASE_URL", "https://nubela.co/proxycurl/api"),
            profile_fixture_path,
            agent_max_iterations: parse_var(&var, "AGENT_MAX_ITERATIONS", "10")?,
            agent_max_execution: Duration::from_secs(parse_var(
                &var,
                "AGENT_MAX_EXECUTION_SECS",
                "30",
            )?),
            request_timeout: Duration::from_secs(parse_var(&var, "REQUEST_TIMEOUT_SECS", "120")?),
            llm_temperature: parse_var(&var, "LLM_TEMPERATURE", "0.0")?,
            llm_max_tokens: parse_var(&var, "LLM_MAX_TOKENS", "1024")?,
            otel_service_name: or_default("OTEL_SERVICE_NAME", "profile-summarizer"),
            otel_exporter_endpoint: or_default(
                "OTEL_EXPORTER_OTLP_ENDPOINT",
                "http://localhost:4317",
            ),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_var<T, V>(var: &V, key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    V: Fn(&str) -> Option<String>,
{
    let raw = var(key).unwrap_or_else(|| default.to_string());
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var: key.to_string(),
        reason: e.to_string(),
    })
}
