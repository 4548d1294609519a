use axum::Router;
use tokio::net::TcpListener;

use crate::profile::RawProfile;

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{addr}")
}

pub const SAMPLE_PROFILE_PATH: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/data/sample_profile.json");

pub fn sample_profile() -> RawProfile {
    serde_json::from_str(include_str!("../data/sample_profile.json")).unwrap()
}

pub fn raw(value: serde_json::Value) -> RawProfile {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
