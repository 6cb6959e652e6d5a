//! Unified application error model and mapping helpers.
//! Every surface of the client (session flows, views, the CLI) reports failures
//! through `AppError`; transport-level detail lives in `api::ApiError` and is
//! folded in here once it needs to reach a user.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::api::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    UserInput { code: String, message: String },
    NotFound { code: String, message: String },
    Auth { code: String, message: String },
    Transport { code: String, message: String },
    Internal { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::UserInput { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Auth { code, .. }
            | AppError::Transport { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::UserInput { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Auth { message, .. }
            | AppError::Transport { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn user<S: Into<String>>(code: S, msg: S) -> Self { AppError::UserInput { code: code.into(), message: msg.into() } }
    pub fn not_found<S: Into<String>>(code: S, msg: S) -> Self { AppError::NotFound { code: code.into(), message: msg.into() } }
    pub fn auth<S: Into<String>>(code: S, msg: S) -> Self { AppError::Auth { code: code.into(), message: msg.into() } }
    pub fn transport<S: Into<String>>(code: S, msg: S) -> Self { AppError::Transport { code: code.into(), message: msg.into() } }
    pub fn internal<S: Into<String>>(code: S, msg: S) -> Self { AppError::Internal { code: code.into(), message: msg.into() } }

    /// True when the failure means the session is no longer valid and the
    /// caller should send the user back through login.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Auth { code, .. } if code == "unauthorized")
    }

    /// Map to the HTTP status the failure corresponds to.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::UserInput { .. } => 400,
            AppError::NotFound { .. } => 404,
            AppError::Auth { .. } => 401,
            AppError::Transport { .. } => 503,
            AppError::Internal { .. } => 500,
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal { code: "internal_error".into(), message: err.to_string() }
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized => AppError::auth("unauthorized", "session is no longer valid"),
            ApiError::Status { status: 404, message } => AppError::not_found("not_found".to_string(), message),
            ApiError::Status { status, message } if (400..500).contains(&status) => {
                AppError::user(format!("http_{status}"), message)
            }
            ApiError::Status { status, message } => AppError::transport(format!("http_{status}"), message),
            ApiError::Transport(e) => AppError::transport("transport_error".to_string(), e.to_string()),
            ApiError::InvalidPath(p) => AppError::internal("invalid_path".to_string(), p),
            ApiError::Decode(m) => AppError::internal("decode_error".to_string(), m),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
