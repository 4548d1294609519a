pub mod agent;
pub mod tavily;

use reqwest::Url;

pub use agent::SearchAgentLookup;
pub use tavily::{TavilyLookup, TavilySearch};

/// Text the search tooling reports when it has nothing to offer.
pub const NOT_FOUND_SENTINEL: &str = "No LinkedIn URL found";

/// Resolves a person's name to a candidate profile URL.
#[async_trait::async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn resolve(&self, name: &str) -> anyhow::Result<Option<Url>>;
    fn name(&self) -> &str;
}

/// Turns free-form lookup output into a URL. Sentinels, blanks and anything
/// that is not an absolute http(s) URL mean "not found".
pub fn parse_candidate(raw: &str) -> Option<Url> {
    let candidate = raw
        .trim()
        .trim_matches(|c: char| matches!(c, '<' | '>' | '"' | '\'' | '`' | '(' | ')' | '.' | ','));

    if candidate.is_empty()
        || candidate == NOT_FOUND_SENTINEL
        || candidate.eq_ignore_ascii_case("NOT_FOUND")
    {
        return None;
    }

    let url = Url::parse(candidate).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

/// Answers every name with the same outcome.
pub struct StaticLookup {
    answer: Option<Url>,
}

impl StaticLookup {
    pub fn found(url: &str) -> Self {
        Self {
            answer: parse_candidate(url),
        }
    }

    pub fn not_found() -> Self {
        Self { answer: None }
    }
}

#[async_trait::async_trait]
impl ProfileLookup for StaticLookup {
    async fn resolve(&self, _name: &str) -> anyhow::Result<Option<Url>> {
        Ok(self.answer.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}
