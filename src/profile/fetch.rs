use std::path::PathBuf;
use std::time::Instant;

use opentelemetry::KeyValue;
use serde_json::Value;

use super::RawProfile;
use crate::error::AppError;
use crate::telemetry::metrics::PROFILE_FETCH_DURATION;

#[async_trait::async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch(&self, profile_url: &str) -> Result<RawProfile, AppError>;
    fn name(&self) -> &str;
}

fn into_profile(value: Value, origin: &str) -> Result<RawProfile, AppError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(AppError::Upstream(format!(
            "{origin} returned a non-object profile: {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Proxycurl person-profile endpoint.
pub struct ProxycurlClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl ProxycurlClient {
    pub fn new(api_key: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl ProfileSource for ProxycurlClient {
    #[tracing::instrument(
        name = "profile.fetch",
        skip(self),
        fields(profile.source = "proxycurl", http.response.status_code)
    )]
    async fn fetch(&self, profile_url: &str) -> Result<RawProfile, AppError> {
        let start = Instant::now();

        let response = self
            .client
            .get(format!("{}/v2/linkedin", self.base_url))
            .bearer_auth(&self.api_key)
            .query(&[
                ("url", profile_url),
                ("skills", "include"),
                ("use_cache", "if-present"),
                ("fallback_to_cache", "on-error"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("profile request failed: {e}")))?;

        let status = response.status();
        tracing::Span::current().record("http.response.status_code", status.as_u16());
        PROFILE_FETCH_DURATION.record(
            start.elapsed().as_secs_f64(),
            &[
                KeyValue::new("profile.source", "proxycurl"),
                KeyValue::new("http.status_code", status.as_u16().to_string()),
            ],
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "profile API returned {status}: {body}"
            )));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("profile body is not JSON: {e}")))?;
        into_profile(value, "profile API")
    }

    fn name(&self) -> &str {
        "proxycurl"
    }
}

/// Serves one static profile for every URL. Used for offline runs and tests.
pub struct FixtureSource {
    path: PathBuf,
}

impl FixtureSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl ProfileSource for FixtureSource {
    #[tracing::instrument(
        name = "profile.fetch",
        skip(self),
        fields(profile.source = "fixture", fixture.path = %self.path.display())
    )]
    async fn fetch(&self, profile_url: &str) -> Result<RawProfile, AppError> {
        let data = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            AppError::Internal(format!("cannot read fixture {}: {e}", self.path.display()))
        })?;
        let value: Value = serde_json::from_str(&data).map_err(|e| {
            AppError::Internal(format!("fixture {} is not JSON: {e}", self.path.display()))
        })?;
        tracing::debug!("Serving profile from fixture");
        into_profile(value, "fixture")
    }

    fn name(&self) -> &str {
        "fixture"
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Json, Router,
        extract::Query,
        http::{HeaderMap, StatusCode},
        routing::get,
    };
    use serde_json::json;
    use std::collections::HashMap;

    use super::*;
    use crate::test_support::{SAMPLE_PROFILE_PATH, serve};

    const PROFILE_URL: &str = "https://www.linkedin.com/in/ada-lovelace/";

    #[tokio::test]
    async fn test_proxycurl_sends_bearer_and_url() {
        let router = Router::new().route(
            "/v2/linkedin",
            get(
                |headers: HeaderMap, Query(params): Query<HashMap<String, String>>| async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    Json(json!({
                        "full_name": "Ada Lovelace",
                        "seen_auth": auth,
                        "seen_url": params.get("url"),
                        "seen_skills": params.get("skills"),
                        "seen_cache": params.get("use_cache"),
                    }))
                },
            ),
        );
        let client = ProxycurlClient::new("pc-key", &serve(router).await);

        let profile = client.fetch(PROFILE_URL).await.unwrap();
        assert_eq!(profile["full_name"], "Ada Lovelace");
        assert_eq!(profile["seen_auth"], "Bearer pc-key");
        assert_eq!(profile["seen_url"], PROFILE_URL);
        assert_eq!(profile["seen_skills"], "include");
        assert_eq!(profile["seen_cache"], "if-present");
    }

    #[tokio::test]
    async fn test_proxycurl_non_success_is_upstream_error() {
        let router = Router::new().route(
            "/v2/linkedin",
            get(|| async { (StatusCode::PAYMENT_REQUIRED, "out of credits") }),
        );
        let client = ProxycurlClient::new("pc-key", &serve(router).await);

        let err = client.fetch(PROFILE_URL).await.unwrap_err();
        match err {
            AppError::Upstream(msg) => {
                assert!(msg.contains("402"), "{msg}");
                assert!(msg.contains("out of credits"), "{msg}");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_proxycurl_rejects_non_object_body() {
        let router = Router::new().route("/v2/linkedin", get(|| async { Json(json!([1, 2])) }));
        let client = ProxycurlClient::new("pc-key", &serve(router).await);

        let err = client.fetch(PROFILE_URL).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(ref msg) if msg.contains("array")));
    }

    #[tokio::test]
    async fn test_fixture_source_ignores_url() {
        let source = FixtureSource::new(SAMPLE_PROFILE_PATH);
        let profile = tokio_test::assert_ok!(source.fetch("https://example.com/anything").await);
        assert_eq!(profile["full_name"], "Ada Lovelace");
        assert_eq!(source.name(), "fixture");
    }

    #[tokio::test]
    async fn test_missing_fixture_is_an_error() {
        let source = FixtureSource::new("/nonexistent/profile.json");
        let err = tokio_test::assert_err!(source.fetch(PROFILE_URL).await);
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn test_json_kind_names() {
        assert_eq!(json_kind(&json!(null)), "null");
        assert_eq!(json_kind(&json!("x")), "string");
        assert_eq!(json_kind(&json!({})), "object");
    }
}
