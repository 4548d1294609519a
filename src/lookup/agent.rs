use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;

use super::tavily::{SearchHit, TavilySearch};
use super::{ProfileLookup, parse_candidate};
use crate::llm::{GenerateRequest, LlmClient};

const SYSTEM_PROMPT: &str = "You locate LinkedIn profile URLs for people. \
You can run web searches restricted to linkedin.com.\n\
Reply with exactly one line and nothing else:\n\
SEARCH: <query>      to run a search and see its results\n\
ANSWER: <url>        when you have found the person's LinkedIn profile URL\n\
ANSWER: NOT_FOUND    when no matching profile exists";

const SEARCH_DOMAINS: &[&str] = &["linkedin.com"];
const RESULTS_PER_SEARCH: u32 = 5;
const SNIPPET_CHARS: usize = 200;

#[derive(Debug, PartialEq)]
enum AgentStep {
    Search(String),
    Answer(String),
    Unrecognized,
}

fn parse_step(reply: &str) -> AgentStep {
    for line in reply.lines().map(str::trim) {
        let Some((keyword, rest)) = line.split_once(':') else {
            continue;
        };
        let rest = rest.trim();
        match keyword.trim().to_ascii_uppercase().as_str() {
            "SEARCH" if !rest.is_empty() => return AgentStep::Search(rest.to_string()),
            "ANSWER" => return AgentStep::Answer(rest.to_string()),
            _ => {}
        }
    }
    AgentStep::Unrecognized
}

fn render_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "no results".to_string();
    }
    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            let mut line = format!("{}. {} ({})", i + 1, hit.url, hit.title);
            let snippet: String = hit.content.trim().chars().take(SNIPPET_CHARS).collect();
            if !snippet.is_empty() {
                line.push_str(&format!("\n   {snippet}"));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Lets the model drive a search loop. The loop is capped by an iteration
/// count and a wall-clock budget; hitting either cap means "not found".
pub struct SearchAgentLookup {
    llm: Arc<LlmClient>,
    search: TavilySearch,
    model: String,
    max_iterations: u32,
    max_execution: Duration,
}

impl SearchAgentLookup {
    pub fn new(
        llm: Arc<LlmClient>,
        search: TavilySearch,
        model: impl Into<String>,
        max_iterations: u32,
        max_execution: Duration,
    ) -> Self {
        Self {
            llm,
            search,
            model: model.into(),
            max_iterations,
            max_execution,
        }
    }

    async fn run(&self, name: &str) -> anyhow::Result<Option<Url>> {
        let mut transcript = format!("Find the LinkedIn profile URL for {name}.\n");

        for iteration in 1..=self.max_iterations {
            let reply = self
                .llm
                .generate(&GenerateRequest {
                    model: self.model.clone(),
                    system: SYSTEM_PROMPT.to_string(),
                    prompt: transcript.clone(),
                    temperature: 0.0,
                    max_tokens: 256,
                    stage: "lookup".to_string(),
                })
                .await?
                .content;

            match parse_step(&reply) {
                AgentStep::Answer(answer) => {
                    tracing::info!(iteration, answer = %answer, "Lookup agent answered");
                    return Ok(parse_candidate(&answer));
                }
                AgentStep::Search(query) => {
                    let hits = self
                        .search
                        .search(&query, SEARCH_DOMAINS, RESULTS_PER_SEARCH)
                        .await?;
                    tracing::debug!(
                        iteration,
                        query = %query,
                        hits = hits.len(),
                        "Lookup agent searched"
                    );
                    transcript.push_str(&format!(
                        "\nSEARCH: {query}\nResults:\n{}\n",
                        render_hits(&hits)
                    ));
                }
                AgentStep::Unrecognized => {
                    transcript.push_str(&format!(
                        "\n{}\nThat reply was not understood. Answer with SEARCH: or ANSWER: only.\n",
                        reply.trim()
                    ));
                }
            }
        }

        tracing::warn!(
            max_iterations = self.max_iterations,
            "Lookup agent stopped at the iteration limit"
        );
        Ok(None)
    }
}

#[async_trait::async_trait]
impl ProfileLookup for SearchAgentLookup {
    #[tracing::instrument(
        name = "lookup.agent",
        skip(self),
        fields(agent.max_iterations = self.max_iterations)
    )]
    async fn resolve(&self, name: &str) -> anyhow::Result<Option<Url>> {
        match tokio::time::timeout(self.max_execution, self.run(name)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    max_execution_ms = self.max_execution.as_millis() as u64,
                    "Lookup agent stopped at the time limit"
                );
                Ok(None)
            }
        }
    }

    fn name(&self) -> &str {
        "agent"
    }
}
