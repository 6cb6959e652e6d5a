use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::{ApiClient, ApiError};
use crate::error::{AppError, AppResult};
use crate::identity::{IdentityResolver, NormalizedUser, SessionCleared, SessionStore, LOGIN_PATH, POST_LOGIN_PATH};

pub const TOKEN_PATH: &str = "/auth/token";

#[derive(Debug, Clone, Serialize)]
pub struct TokenRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// `None` when neither a profile endpoint nor the token's claims gave an identity.
    pub user: Option<NormalizedUser>,
    pub redirect_to: String,
}

/// `access_token` wins over `token`; empty strings do not count.
pub fn extract_token(body: &Value) -> Option<String> {
    ["access_token", "token"]
        .iter()
        .find_map(|k| body.get(*k).and_then(|v| v.as_str()).filter(|s| !s.is_empty()))
        .map(|s| s.to_string())
}

/// Exchange credentials for a token, store it, then resolve and store the user.
///
/// `from` is the page the guard bounced the user from; login returns there, or
/// to the profile page when there is nowhere to return to.
pub async fn login(
    api: &ApiClient,
    resolver: &IdentityResolver,
    email: &str,
    password: &str,
    from: Option<&str>,
) -> AppResult<LoginOutcome> {
    let body = api
        .post_json(TOKEN_PATH, &TokenRequest { email, password })
        .await
        .map_err(|e| match e {
            ApiError::Unauthorized => AppError::auth("invalid_credentials", "invalid email or password"),
            other => AppError::from(other),
        })?;
    let token = extract_token(&body).ok_or_else(|| AppError::auth("token_missing", "login response carried no token"))?;

    let session = api.session();
    session.set_session(&token, None);
    let user = resolver.resolve().await;
    if let Some(u) = &user {
        session.set_user(u);
    }
    info!(target: "appraisal::api", "login ok email={} role={:?}", email, user.as_ref().and_then(|u| u.role.as_deref()));

    let redirect_to = from
        .filter(|p| !p.is_empty() && *p != LOGIN_PATH)
        .unwrap_or(POST_LOGIN_PATH)
        .to_string();
    Ok(LoginOutcome { user, redirect_to })
}

/// Clear the session; the returned signal names where to go next.
pub fn logout(session: &SessionStore) -> SessionCleared {
    info!(target: "appraisal::api", "logout");
    session.clear_session()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn token_extraction_order() {
        assert_eq!(extract_token(&json!({"access_token": "a", "token": "b"})).as_deref(), Some("a"));
        assert_eq!(extract_token(&json!({"access_token": "", "token": "b"})).as_deref(), Some("b"));
        assert_eq!(extract_token(&json!({"token": "b", "token_type": "Bearer"})).as_deref(), Some("b"));
        assert_eq!(extract_token(&json!({"access_token": 5})), None);
        assert_eq!(extract_token(&json!("raw")), None);
    }
}
