//! appraisal: client core for a performance-review backend.
//!
//! The session/authorization layer lives under `identity` (token storage, user
//! normalization, identity resolution, route guarding); `evaluations` holds the
//! record model and the pure filter/aggregation over it; `api` talks to the
//! backend and `views` wraps list loads with a latest-request guard.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod evaluations;
pub mod identity;
pub mod views;

pub use config::ClientConfig;
pub use error::{AppError, AppResult};
