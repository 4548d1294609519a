use std::sync::Arc;
use std::time::Instant;

use opentelemetry::KeyValue;
use tracing::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use super::{GenerateRequest, GenerateResponse, Provider, build_provider};
use crate::config::Config;
use crate::telemetry::metrics::{
    GEN_AI_ERROR_COUNT, GEN_AI_FALLBACK_COUNT, GEN_AI_OPERATION_DURATION, GEN_AI_TOKEN_USAGE,
};

pub struct Fallback {
    pub provider: Arc<dyn Provider>,
    pub model: String,
}

/// Single-shot model client. A failed primary call is handed to the
/// fallback provider once, if one is configured; nothing is retried.
pub struct LlmClient {
    primary: Arc<dyn Provider>,
    fallback: Option<Fallback>,
}

impl LlmClient {
    pub fn new(primary: Arc<dyn Provider>) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        self.fallback = Some(Fallback {
            provider,
            model: model.into(),
        });
        self
    }

    pub fn from_config(config: &Config) -> Self {
        let client = Self::new(build_provider(config.llm_provider, config));
        match config.fallback_provider {
            Some(kind) => {
                client.with_fallback(build_provider(kind, config), &config.fallback_model)
            }
            None => client,
        }
    }

    async fn generate_once(
        &self,
        provider: &dyn Provider,
        req: &GenerateRequest,
    ) -> anyhow::Result<GenerateResponse> {
        let provider_name = provider.name().to_string();
        let span_display_name = format!("gen_ai.chat {}", req.model);
        let (server_addr, server_port) = server_for(&provider_name);
        let start = Instant::now();

        let span = tracing::info_span!(
            "gen_ai.chat",
            otel.name = %span_display_name,
            gen_ai.operation.name = "chat",
            gen_ai.provider.name = %provider_name,
            gen_ai.request.model = %req.model,
            server.address = %server_addr,
            server.port = server_port,
            gen_ai.request.temperature = req.temperature,
            gen_ai.request.max_tokens = req.max_tokens as i64,
            gen_ai.response.model = tracing::field::Empty,
            gen_ai.usage.input_tokens = tracing::field::Empty,
            gen_ai.usage.output_tokens = tracing::field::Empty,
            gen_ai.response.finish_reasons = tracing::field::Empty,
            pipeline.stage = %req.stage,
            otel.status_code = tracing::field::Empty,
            error.type = tracing::field::Empty,
        );

        {
            let mut user_event_attrs =
                vec![KeyValue::new("gen_ai.prompt", truncate(&req.prompt, 1000))];
            if !req.system.is_empty() {
                user_event_attrs.push(KeyValue::new(
                    "gen_ai.system_instructions",
                    truncate(&req.system, 500),
                ));
            }
            span.add_event("gen_ai.user.message", user_event_attrs);
        }

        let result = provider.generate(req).instrument(span.clone()).await;
        let duration = start.elapsed().as_secs_f64();

        let provider_kv = KeyValue::new("gen_ai.provider.name", provider_name.clone());
        let model_kv = KeyValue::new("gen_ai.request.model", req.model.clone());

        match result {
            Ok(mut resp) => {
                resp.provider = provider_name;

                span.record("gen_ai.response.model", resp.model.as_str());
                span.record("gen_ai.usage.input_tokens", resp.input_tokens as i64);
                span.record("gen_ai.usage.output_tokens", resp.output_tokens as i64);
                if !resp.finish_reason.is_empty() {
                    span.record(
                        "gen_ai.response.finish_reasons",
                        resp.finish_reason.as_str(),
                    );
                }
                span.add_event(
                    "gen_ai.assistant.message",
                    vec![KeyValue::new(
                        "gen_ai.completion",
                        truncate(&resp.content, 2000),
                    )],
                );

                let op_kv = KeyValue::new("gen_ai.operation.name", "chat");
                let token_counts = [("input", resp.input_tokens), ("output", resp.output_tokens)];
                for (token_type, count) in token_counts {
                    GEN_AI_TOKEN_USAGE.record(
                        f64::from(count),
                        &[
                            KeyValue::new("gen_ai.token.type", token_type),
                            op_kv.clone(),
                            provider_kv.clone(),
                            model_kv.clone(),
                        ],
                    );
                }
                GEN_AI_OPERATION_DURATION.record(duration, &[op_kv, provider_kv, model_kv]);

                Ok(resp)
            }
            Err(err) => {
                span.record("otel.status_code", "ERROR");
                span.record("error.type", classify_error(&err));
                GEN_AI_ERROR_COUNT.add(1, &[provider_kv, model_kv]);
                Err(err)
            }
        }
    }

    pub async fn generate(&self, req: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let primary_err = match self.generate_once(self.primary.as_ref(), req).await {
            Ok(resp) => return Ok(resp),
            Err(err) => err,
        };

        let Some(fallback) = &self.fallback else {
            return Err(anyhow::anyhow!(
                "provider {} failed: {}",
                self.primary.name(),
                primary_err
            ));
        };

        tracing::warn!(
            primary_provider = %self.primary.name(),
            fallback_provider = %fallback.provider.name(),
            error = %primary_err,
            "Primary provider failed, falling back"
        );
        GEN_AI_FALLBACK_COUNT.add(1, &[]);

        let fallback_req = GenerateRequest {
            model: fallback.model.clone(),
            ..req.clone()
        };
        self.generate_once(fallback.provider.as_ref(), &fallback_req)
            .await
    }
}

fn server_for(provider_name: &str) -> (&'static str, i64) {
    match provider_name {
        "openai" => ("api.openai.com", 443),
        "anthropic" => ("api.anthropic.com", 443),
        "google" => ("generativelanguage.googleapis.com", 443),
        "ollama" => ("localhost", 11434),
        _ => ("unknown", 443),
    }
}

fn classify_error(err: &anyhow::Error) -> &'static str {
    let msg = err.to_string().to_lowercase();
    if msg.contains("rate limit") || msg.contains("429") {
        "rate_limit"
    } else if msg.contains("timeout") || msg.contains("timed out") || msg.contains("deadline") {
        "timeout"
    } else if msg.contains("401")
        || msg.contains("403")
        || msg.contains("auth")
        || msg.contains("api key")
    {
        "auth_error"
    } else if msg.contains("400") || msg.contains("422") || msg.contains("invalid") {
        "invalid_request"
    } else if msg.contains("500")
        || msg.contains("502")
        || msg.contains("503")
        || msg.contains("server")
    {
        "server_error"
    } else if msg.contains("connect")
        || msg.contains("dns")
        || msg.contains("network")
        || msg.contains("reset")
    {
        "network_error"
    } else {
        "unknown_error"
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        s.char_indices()
            .take_while(|&(i, c)| i + c.len_utf8() <= max)
            .map(|(_, c)| c)
            .collect()
    }
}
