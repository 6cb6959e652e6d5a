//! Backend access. `client` owns transport and the bearer-header contract;
//! the other modules are per-endpoint contracts, since list shapes differ from
//! one endpoint to the next.

pub mod auth;
pub mod client;
pub mod evaluations;
pub mod users;

pub use client::{error_message, ApiClient, ApiError};
