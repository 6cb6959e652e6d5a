//! Client configuration.
//!
//! Values come from environment variables; the binary lets command-line flags
//! override them. Unset variables fall back to the defaults below.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use reqwest::Url;

pub const ENV_API_BASE: &str = "APPRAISAL_API_BASE";
pub const ENV_ME_PATHS: &str = "APPRAISAL_ME_PATHS";
pub const ENV_STATE_DIR: &str = "APPRAISAL_STATE_DIR";
pub const ENV_ANONYMOUS_PROBE: &str = "APPRAISAL_ANONYMOUS_PROBE";

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8080/api";
pub const DEFAULT_ME_PATHS: [&str; 4] = ["/auth/me", "/users/me", "/me", "/users/current"];

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL; endpoint paths are appended to its path.
    pub api_base: Url,
    /// Ordered profile endpoints probed by the identity resolver.
    pub me_paths: Vec<String>,
    /// Directory holding `session.json`. `None` keeps the session in memory.
    pub state_dir: Option<PathBuf>,
    /// Probe profile endpoints even when no token is stored.
    pub anonymous_probe: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_BASE).expect("DEFAULT_API_BASE is a valid URL"),
            me_paths: default_me_paths(),
            state_dir: None,
            anonymous_probe: true,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        if let Ok(base) = env::var(ENV_API_BASE) {
            cfg.api_base = parse_api_base(&base)?;
        }
        if let Some(paths) = env::var(ENV_ME_PATHS).ok().and_then(|v| parse_me_paths(&v)) {
            cfg.me_paths = paths;
        }
        if let Ok(dir) = env::var(ENV_STATE_DIR) {
            if !dir.trim().is_empty() { cfg.state_dir = Some(PathBuf::from(dir)); }
        }
        if let Some(b) = parse_bool_env(ENV_ANONYMOUS_PROBE) {
            cfg.anonymous_probe = b;
        }
        Ok(cfg)
    }

    pub fn with_api_base(mut self, base: &str) -> Result<Self> {
        self.api_base = parse_api_base(base)?;
        Ok(self)
    }

    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = Some(dir.into());
        self
    }
}

pub fn default_me_paths() -> Vec<String> {
    DEFAULT_ME_PATHS.iter().map(|s| s.to_string()).collect()
}

/// Split a comma-separated path list. Blank entries are dropped; an empty
/// result means "not configured" so the defaults stay in effect.
pub fn parse_me_paths(raw: &str) -> Option<Vec<String>> {
    let paths: Vec<String> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect();
    if paths.is_empty() { None } else { Some(paths) }
}

fn parse_api_base(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    Url::parse(trimmed).with_context(|| format!("invalid API base URL: {}", trimmed))
}

pub fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_bool_env(name: &str) -> Option<bool> {
    env::var(name).ok().and_then(|v| parse_bool(&v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn me_paths_from_comma_list() {
        let p = parse_me_paths(" /profile , ,/whoami,").unwrap();
        assert_eq!(p, vec!["/profile".to_string(), "/whoami".to_string()]);
        assert!(parse_me_paths(" , ").is_none());
        assert!(parse_me_paths("").is_none());
    }

    #[test]
    fn defaults() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.api_base.as_str(), "http://127.0.0.1:8080/api");
        assert_eq!(cfg.me_paths, vec!["/auth/me", "/users/me", "/me", "/users/current"]);
        assert!(cfg.state_dir.is_none());
        assert!(cfg.anonymous_probe);
    }

    #[test]
    fn bool_parsing() {
        assert_eq!(parse_bool("Yes"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn api_base_override() {
        let cfg = ClientConfig::default().with_api_base("https://reviews.example.com/api").unwrap();
        assert_eq!(cfg.api_base.host_str(), Some("reviews.example.com"));
        assert!(ClientConfig::default().with_api_base("not a url").is_err());
    }
}
