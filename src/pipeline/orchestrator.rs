use std::sync::Arc;
use std::time::Instant;

use opentelemetry::KeyValue;
use reqwest::Url;

use super::generate::{GenerationSettings, SummaryResult, generate_summary};
use crate::error::AppError;
use crate::llm::LlmClient;
use crate::lookup::ProfileLookup;
use crate::profile::{self, CleanProfile, ProfileSource};
use crate::telemetry::metrics::{LOOKUP_RESULTS, PROFILE_FIELDS_RETAINED, SUMMARY_DURATION};

/// Runs lookup, fetch, clean, compose and the model call strictly in order.
pub struct Summarizer {
    lookup: Arc<dyn ProfileLookup>,
    source: Arc<dyn ProfileSource>,
    llm_client: Arc<LlmClient>,
    settings: GenerationSettings,
}

impl Summarizer {
    pub fn new(
        lookup: Arc<dyn ProfileLookup>,
        source: Arc<dyn ProfileSource>,
        llm_client: Arc<LlmClient>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            lookup,
            source,
            llm_client,
            settings,
        }
    }

    pub fn lookup_name(&self) -> &str {
        self.lookup.name()
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    #[tracing::instrument(
        name = "pipeline summarize",
        skip(self),
        fields(
            lookup.strategy = %self.lookup.name(),
            profile.source = %self.source.name(),
            profile.url,
            profile.fields,
            summary.duration_ms,
        )
    )]
    pub async fn summarize(&self, name: &str) -> Result<SummaryResult, AppError> {
        let start = Instant::now();
        let span = tracing::Span::current();

        // Stage 1: resolve the profile URL
        let profile_url = self.resolve_profile_url(name).await?;
        span.record("profile.url", profile_url.as_str());

        // Stage 2: fetch the raw record
        let raw = self.source.fetch(profile_url.as_str()).await?;

        // Stage 3: clean and compose
        let (clean, composed) = clean_and_compose(&raw);
        span.record("profile.fields", clean.field_count());
        PROFILE_FIELDS_RETAINED.record(clean.field_count() as f64, &[]);

        // Stage 4: structured re-summarization
        let result =
            generate_summary(&self.llm_client, &self.settings, &clean, &composed).await?;

        let duration = start.elapsed();
        SUMMARY_DURATION.record(duration.as_secs_f64(), &[]);
        span.record("summary.duration_ms", duration.as_millis() as u64);

        Ok(result)
    }

    #[tracing::instrument(
        name = "pipeline_stage lookup",
        skip(self),
        fields(pipeline.stage = "lookup", lookup.outcome)
    )]
    async fn resolve_profile_url(&self, name: &str) -> Result<Url, AppError> {
        let outcome = self.lookup.resolve(name).await;
        let label = match &outcome {
            Ok(Some(_)) => "found",
            Ok(None) => "not_found",
            Err(_) => "error",
        };
        tracing::Span::current().record("lookup.outcome", label);
        LOOKUP_RESULTS.add(
            1,
            &[
                KeyValue::new("lookup.strategy", self.lookup.name().to_string()),
                KeyValue::new("lookup.outcome", label),
            ],
        );

        match outcome {
            Ok(Some(url)) => Ok(url),
            Ok(None) => Err(AppError::NotFound(format!(
                "could not find a LinkedIn profile for {name}"
            ))),
            Err(e) => Err(AppError::Upstream(format!("profile lookup failed: {e}"))),
        }
    }
}

#[tracing::instrument(
    name = "pipeline_stage clean",
    skip(raw),
    fields(pipeline.stage = "clean", profile.raw_fields = raw.len())
)]
fn clean_and_compose(raw: &profile::RawProfile) -> (CleanProfile, String) {
    let clean = profile::clean(raw);
    let composed = profile::compose(&clean);
    (clean, composed)
}
