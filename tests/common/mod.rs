//! Shared fixtures: an in-process mock backend on an ephemeral port and a
//! client wired to it.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use base64::Engine;
use serde_json::Value;

use appraisal::api::ApiClient;
use appraisal::config::ClientConfig;
use appraisal::identity::SessionStore;

/// Serve `app` under `/api` on 127.0.0.1 with an OS-assigned port and return
/// the base URL clients should use.
pub async fn spawn_backend(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.expect("bind 127.0.0.1:0");
    let addr = listener.local_addr().expect("local addr");
    let app = Router::new().nest("/api", app);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock backend");
    });
    format!("http://{}/api", addr)
}

pub fn config_for(base: &str) -> ClientConfig {
    ClientConfig::default().with_api_base(base).expect("mock base url")
}

pub fn client_for(base: &str) -> ApiClient {
    ApiClient::new(&config_for(base), Arc::new(SessionStore::in_memory()))
}

/// Unsigned JWT-shaped token carrying `claims`.
pub fn token_with_claims(claims: &Value) -> String {
    let enc = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    format!(
        "{}.{}.sig",
        enc.encode(br#"{"alg":"none"}"#),
        enc.encode(serde_json::to_vec(claims).expect("claims json"))
    )
}
