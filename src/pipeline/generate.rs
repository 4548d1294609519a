use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::llm::{GenerateRequest, LlmClient};
use crate::profile::CleanProfile;

/// Final answer: a summary and exactly two facts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryResult {
    pub summary: String,
    pub interesting_facts: [String; 2],
}

#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// `interesting_facts` as models actually return it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FactsField {
    List(Vec<String>),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct StructuredSummary {
    summary: Option<String>,
    interesting_facts: Option<FactsField>,
}

const SYSTEM_PROMPT: &str = "You are an assistant that generates professional summaries of \
LinkedIn profiles. The summary should be well-structured, clear, and informative.";

fn build_prompt(profile: &CleanProfile, composed: &str) -> String {
    let profile_json = serde_json::to_string_pretty(profile).unwrap_or_default();
    format!(
        "Given the following information about a person, create:\n\
        1. A concise summary of their professional background.\n\
        2. Two interesting facts about them, focusing on their skills or unique achievements.\n\n\
        Overview:\n{composed}\n\n\
        Profile fields:\n{profile_json}\n\n\
        Return only JSON with this exact structure:\n\
        {{\n  \"summary\": \"a brief summary of the person's profile\",\n  \
        \"interesting_facts\": [\"first fact\", \"second fact\"]\n}}"
    )
}

#[tracing::instrument(
    name = "pipeline_stage generate",
    skip(llm_client, settings, profile, composed),
    fields(
        pipeline.stage = "generate",
        gen_ai.request.model = %settings.model,
        summary.length,
    )
)]
pub async fn generate_summary(
    llm_client: &LlmClient,
    settings: &GenerationSettings,
    profile: &CleanProfile,
    composed: &str,
) -> Result<SummaryResult, AppError> {
    let resp = llm_client
        .generate(&GenerateRequest {
            model: settings.model.clone(),
            system: SYSTEM_PROMPT.to_string(),
            prompt: build_prompt(profile, composed),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            stage: "generate".to_string(),
        })
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;

    let result = parse_summary_response(&resp.content)?;
    tracing::Span::current().record("summary.length", result.summary.len());
    Ok(result)
}

pub(crate) fn parse_summary_response(content: &str) -> Result<SummaryResult, AppError> {
    let json_str = extract_json(content);
    let raw: StructuredSummary = serde_json::from_str(&json_str)
        .map_err(|e| AppError::Validation(format!("model output is not the expected JSON: {e}")))?;

    let summary = raw
        .summary
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("model output has no summary".into()))?;

    let facts = raw
        .interesting_facts
        .ok_or_else(|| AppError::Validation("model output has no interesting_facts".into()))?;

    Ok(SummaryResult {
        summary,
        interesting_facts: normalize_facts(facts)?,
    })
}

/// Splits a run-on fact string after each literal ". ", keeping the period.
pub fn split_facts(text: &str) -> Vec<String> {
    text.split_inclusive(". ").map(str::to_string).collect()
}

/// Trims, drops empties, keeps the first two. Fewer than two is an error.
pub fn normalize_facts(facts: FactsField) -> Result<[String; 2], AppError> {
    let facts = match facts {
        FactsField::List(items) => items,
        FactsField::Text(text) => split_facts(&text),
    };

    let mut kept = facts
        .iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .map(str::to_string);

    match (kept.next(), kept.next()) {
        (Some(first), Some(second)) => Ok([first, second]),
        (first, _) => Err(AppError::Validation(format!(
            "expected 2 interesting facts, found {}",
            usize::from(first.is_some())
        ))),
    }
}

/// Pulls the JSON object out of a reply that may wrap it in prose or fences.
pub(crate) fn extract_json(content: &str) -> String {
    if let Some(start) = content.find("```json")
        && let Some(end) = content[start + 7..].find("```")
    {
        return content[start + 7..start + 7 + end].trim().to_string();
    }
    if let Some(start) = content.find("```")
        && let Some(end) = content[start + 3..].find("```")
    {
        let inner = content[start + 3..start + 3 + end].trim();
        if inner.starts_with('{') {
            return inner.to_string();
        }
    }
    if let Some(start) = content.find('{')
        && let Some(end) = content.rfind('}')
        && start < end
    {
        return content[start..=end].to_string();
    }
    content.to_string()
}
