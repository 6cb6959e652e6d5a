use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::identity::SessionStore;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid request path: {0}")]
    InvalidPath(String),
    #[error("unexpected payload: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// HTTP access to the backend. Every request carries the session's bearer
/// token when one is stored and goes out without it otherwise.
#[derive(Clone)]
pub struct ApiClient {
    base: Url,
    client: reqwest::Client,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> Self {
        Self::with_client(config.api_base.clone(), reqwest::Client::new(), session)
    }

    pub fn with_client(base: Url, client: reqwest::Client, session: Arc<SessionStore>) -> Self {
        Self { base, client, session }
    }

    pub fn base(&self) -> &Url { &self.base }

    pub fn session(&self) -> &Arc<SessionStore> { &self.session }

    /// Append `path` to the base URL's path. `Url::join` would drop the base
    /// path (`/api`) for absolute paths like `/auth/me`, so join by hand.
    pub fn url_for(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.base.as_str().trim_end_matches('/');
        let rel = path.trim_start_matches('/');
        Url::parse(&format!("{}/{}", base, rel)).map_err(|_| ApiError::InvalidPath(path.to_string()))
    }

    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(token) = self.session.token() {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(v) => { headers.insert(AUTHORIZATION, v); }
                Err(_) => warn!(target: "appraisal::api", "stored token is not a valid header value; sending request without it"),
            }
        }
        headers
    }

    pub async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        let url = self.url_for(path)?;
        debug!(target: "appraisal::api", "GET {}", url);
        let resp = self.client.get(url).headers(self.auth_headers()).query(query).send().await?;
        read_body(resp).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        let url = self.url_for(path)?;
        debug!(target: "appraisal::api", "POST {}", url);
        let resp = self.client.post(url).headers(self.auth_headers()).json(body).send().await?;
        read_body(resp).await
    }

    pub async fn put_json<B: Serialize + ?Sized>(&self, path: &str, body: Option<&B>) -> Result<Value, ApiError> {
        let url = self.url_for(path)?;
        debug!(target: "appraisal::api", "PUT {}", url);
        let mut req = self.client.put(url).headers(self.auth_headers());
        if let Some(b) = body { req = req.json(b); }
        read_body(req.send().await?).await
    }
}

/// 2xx bodies parse as JSON, with empty or non-JSON bodies reading as `null`.
async fn read_body(resp: reqwest::Response) -> Result<Value, ApiError> {
    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    let text = resp.text().await?;
    if !status.is_success() {
        return Err(ApiError::Status { status: status.as_u16(), message: error_message(&text, status) });
    }
    Ok(serde_json::from_str(&text).unwrap_or(Value::Null))
}

/// Best human-readable message from an error body: a bare string body, a
/// `message` field, raw text, or the status reason as a last resort.
pub fn error_message(body: &str, status: StatusCode) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::String(s)) if !s.is_empty() => s,
        Ok(Value::Object(m)) => m
            .get("message")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| fallback_reason(status)),
        Ok(_) => fallback_reason(status),
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => fallback_reason(status),
    }
}

fn fallback_reason(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("request failed").to_string()
}
