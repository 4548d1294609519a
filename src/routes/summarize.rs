use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::pipeline::SummaryResult;

#[derive(Debug, Deserialize)]
pub struct SummarizeBody {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SummarizeResponse {
    pub summary: String,
    pub interesting_fact_1: String,
    pub interesting_fact_2: String,
}

impl From<SummaryResult> for SummarizeResponse {
    fn from(result: SummaryResult) -> Self {
        let [interesting_fact_1, interesting_fact_2] = result.interesting_facts;
        Self {
            summary: result.summary,
            interesting_fact_1,
            interesting_fact_2,
        }
    }
}

pub async fn summarize(
    State(state): State<AppState>,
    body: Result<Json<SummarizeBody>, JsonRejection>,
) -> AppResult<Json<SummarizeResponse>> {
    let name = body
        .ok()
        .and_then(|Json(body)| body.name)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::BadRequest("Name is required".into()))?;

    tracing::info!(person.name = %name, "Summarization requested");

    let result = tokio::time::timeout(state.request_timeout, state.summarizer.summarize(&name))
        .await
        .map_err(|_| {
            AppError::Upstream(format!(
                "summarization did not finish within {}s",
                state.request_timeout.as_secs_f64()
            ))
        })??;
    Ok(Json(result.into()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{Request, StatusCode, header::CONTENT_TYPE},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::AppState;
    use crate::llm::client::tests::ScriptedProvider;
    use crate::llm::{GenerateRequest, GenerateResponse, LlmClient, Provider};
    use crate::lookup::{ProfileLookup, StaticLookup};
    use crate::pipeline::{GenerationSettings, Summarizer};
    use crate::profile::FixtureSource;
    use crate::routes::create_router;
    use crate::test_support::SAMPLE_PROFILE_PATH;

    const GOOD_REPLY: &str = r#"{"summary": "Ada is a mathematician.", "interesting_facts": ["She wrote the first algorithm.", "She speaks French."]}"#;

    fn app(lookup: Arc<dyn ProfileLookup>, reply: &str) -> axum::Router {
        app_with(
            lookup,
            Arc::new(ScriptedProvider::replying(reply)),
            Duration::from_secs(30),
        )
    }

    fn app_with(
        lookup: Arc<dyn ProfileLookup>,
        provider: Arc<dyn Provider>,
        request_timeout: Duration,
    ) -> axum::Router {
        let summarizer = Summarizer::new(
            lookup,
            Arc::new(FixtureSource::new(SAMPLE_PROFILE_PATH)),
            Arc::new(LlmClient::new(provider)),
            GenerationSettings {
                model: "gpt-4.1-mini".to_string(),
                temperature: 0.0,
                max_tokens: 512,
            },
        );
        create_router(AppState {
            summarizer: Arc::new(summarizer),
            request_timeout,
        })
    }

    fn found() -> Arc<dyn ProfileLookup> {
        Arc::new(StaticLookup::found("https://www.linkedin.com/in/ada-lovelace/"))
    }

    async fn post(app: axum::Router, body: &str) -> (StatusCode, Value) {
        post_to(app, "/api/summarize", body).await
    }

    async fn post_to(app: axum::Router, path: &str, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::post(path)
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_summarize_ok() {
        let (status, body) = post(app(found(), GOOD_REPLY), r#"{"name": "Ada Lovelace"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"], "Ada is a mathematician.");
        assert_eq!(body["interesting_fact_1"], "She wrote the first algorithm.");
        assert_eq!(body["interesting_fact_2"], "She speaks French.");
    }

    #[tokio::test]
    async fn test_missing_name_is_bad_request() {
        let bodies = [
            r#"{}"#,
            r#"{"name": "   "}"#,
            r#"{"name": null}"#,
            r#"{"name": 7}"#,
            "not json",
        ];
        for body in bodies {
            let (status, json) = post(app(found(), GOOD_REPLY), body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(json["error"], "Name is required");
        }
    }

    #[tokio::test]
    async fn test_not_found_is_generic_500() {
        let (status, body) = post(
            app(Arc::new(StaticLookup::not_found()), GOOD_REPLY),
            r#"{"name": "Nobody"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], crate::error::INTERNAL_ERROR_MESSAGE);
        assert!(!body.to_string().contains("Nobody"));
    }

    #[tokio::test]
    async fn test_bad_model_output_is_generic_500() {
        let (status, body) = post(
            app(found(), r#"{"summary": "Ada.", "interesting_facts": ["one"]}"#),
            r#"{"name": "Ada Lovelace"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], crate::error::INTERNAL_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_unprefixed_summarize_path() {
        let (status, body) =
            post_to(app(found(), GOOD_REPLY), "/summarize", r#"{"name": "Ada Lovelace"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["interesting_fact_2"], "She speaks French.");
    }

    struct HangingProvider;

    #[async_trait::async_trait]
    impl Provider for HangingProvider {
        async fn generate(&self, _req: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            anyhow::bail!("unreachable")
        }

        fn name(&self) -> &str {
            "hanging"
        }
    }

    #[tokio::test]
    async fn test_slow_upstream_is_generic_500() {
        let app = app_with(
            found(),
            Arc::new(HangingProvider),
            Duration::from_millis(100),
        );
        let (status, body) = post(app, r#"{"name": "Ada Lovelace"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], crate::error::INTERNAL_ERROR_MESSAGE);
        assert_eq!(body["status"], 500);
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(found(), GOOD_REPLY)
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_response_from_result() {
        let response = super::SummarizeResponse::from(crate::pipeline::SummaryResult {
            summary: "s".into(),
            interesting_facts: ["a".into(), "b".into()],
        });
        assert_eq!(response.interesting_fact_1, "a");
        assert_eq!(response.interesting_fact_2, "b");
    }
}
