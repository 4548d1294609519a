use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::{ProfileLookup, parse_candidate};

const PROFILE_DOMAINS: &[&str] = &["linkedin.com"];

/// Tavily web search API.
pub struct TavilySearch {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: u32,
    search_depth: &'static str,
    include_domains: &'a [&'a str],
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl TavilySearch {
    pub fn new(api_key: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[tracing::instrument(
        name = "tavily.search",
        skip(self, include_domains),
        fields(search.results)
    )]
    pub async fn search(
        &self,
        query: &str,
        include_domains: &[&str],
        max_results: u32,
    ) -> anyhow::Result<Vec<SearchHit>> {
        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&SearchRequest {
                query,
                max_results,
                search_depth: "basic",
                include_domains,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Tavily search error ({status}): {body}");
        }

        let results = response.json::<SearchResponse>().await?.results;
        tracing::Span::current().record("search.results", results.len());
        Ok(results)
    }
}

/// One search, first hit wins.
pub struct TavilyLookup {
    search: TavilySearch,
}

impl TavilyLookup {
    pub fn new(search: TavilySearch) -> Self {
        Self { search }
    }
}

#[async_trait::async_trait]
impl ProfileLookup for TavilyLookup {
    async fn resolve(&self, name: &str) -> anyhow::Result<Option<Url>> {
        let query = format!("{name} LinkedIn profile");
        let hits = self.search.search(&query, PROFILE_DOMAINS, 5).await?;
        Ok(hits.first().and_then(|hit| parse_candidate(&hit.url)))
    }

    fn name(&self) -> &str {
        "tavily"
    }
}
