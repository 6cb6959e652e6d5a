use serde_json::{Map, Value};
use tracing::debug;

use super::claims::decode_claims;
use super::normalize::normalize_user;
use super::user::NormalizedUser;
use crate::api::{ApiClient, ApiError};
use crate::config::ClientConfig;

/// Result of asking one candidate endpoint who we are.
#[derive(Debug)]
enum Probe {
    Found(Map<String, Value>),
    /// The server rejected the token; no other endpoint will think differently.
    Unauthorized,
    /// 404, transport failure, or a body that is not a record.
    Miss,
}

/// Finds the best available identity for the current session: profile
/// endpoints first (first record wins, no merging), then the token's own claims.
pub struct IdentityResolver {
    api: ApiClient,
    paths: Vec<String>,
    anonymous_probe: bool,
}

impl IdentityResolver {
    pub fn new(api: ApiClient, config: &ClientConfig) -> Self {
        Self { api, paths: config.me_paths.clone(), anonymous_probe: config.anonymous_probe }
    }

    pub fn with_paths(api: ApiClient, paths: Vec<String>) -> Self {
        Self { api, paths, anonymous_probe: true }
    }

    pub fn paths(&self) -> &[String] { &self.paths }

    async fn probe(&self, path: &str) -> Probe {
        match self.api.get_json(path, &[]).await {
            Ok(Value::Object(m)) => Probe::Found(m),
            Ok(_) => {
                debug!(target: "appraisal::identity", "probe {} returned a non-record body", path);
                Probe::Miss
            }
            Err(ApiError::Unauthorized) => Probe::Unauthorized,
            Err(e) => {
                debug!(target: "appraisal::identity", "probe {} failed: {}", path, e);
                Probe::Miss
            }
        }
    }

    /// Never fails; `None` means no source produced an identity.
    pub async fn resolve(&self) -> Option<NormalizedUser> {
        let token = self.api.session().token();
        if token.is_some() || self.anonymous_probe {
            for path in &self.paths {
                match self.probe(path).await {
                    Probe::Found(m) => {
                        debug!(target: "appraisal::identity", "identity resolved via {}", path);
                        return Some(normalize_user(&m));
                    }
                    Probe::Unauthorized => {
                        debug!(target: "appraisal::identity", "probe {} unauthorized; skipping remaining candidates", path);
                        break;
                    }
                    Probe::Miss => continue,
                }
            }
        }
        let claims = decode_claims(token.as_deref()?)?;
        debug!(target: "appraisal::identity", "identity resolved from token claims");
        Some(normalize_user(&claims))
    }

    /// Re-resolve and store the result. Keeps the stored user when nothing
    /// fresher turns up.
    pub async fn refresh(&self) -> Option<NormalizedUser> {
        match self.resolve().await {
            Some(fresh) => {
                self.api.session().set_user(&fresh);
                Some(fresh)
            }
            None => self.api.session().user(),
        }
    }
}
