//! Session store: the bearer token and the normalized user record.
//!
//! The store is an explicit object shared by `Arc`; nothing here is process
//! global. Persisted state mirrors a browser key/value area: two fixed keys,
//! `token` and `user`, the latter holding the user record serialized as a
//! string. A user record that no longer parses reads as absent.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::{debug, warn};

use super::user::NormalizedUser;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const SESSION_FILE: &str = "session.json";
pub const LOGIN_PATH: &str = "/login";

pub type SessionToken = String;

/// Snapshot of what the store holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<SessionToken>,
    pub user: Option<NormalizedUser>,
}

impl Session {
    /// A user without a token does not count as signed in.
    pub fn is_authenticated(&self) -> bool { self.token.is_some() }
}

/// Returned by `clear_session`; navigating to `redirect_to` is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCleared {
    pub redirect_to: &'static str,
}

pub struct SessionStore {
    /// `None` keeps everything in memory.
    file: Option<PathBuf>,
    entries: RwLock<BTreeMap<String, String>>,
}

impl SessionStore {
    pub fn in_memory() -> Self {
        Self { file: None, entries: RwLock::new(BTreeMap::new()) }
    }

    /// Open a file-backed store under `dir`, loading any session persisted by a
    /// previous run. An unreadable file starts an empty session.
    pub fn open(dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let file = dir.join(SESSION_FILE);
        let entries = match std::fs::read(&file) {
            Ok(bytes) => match serde_json::from_slice::<BTreeMap<String, String>>(&bytes) {
                Ok(m) => m,
                Err(e) => {
                    warn!(target: "appraisal::identity", "session file {:?} unreadable, starting empty: {}", file, e);
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
        Ok(Self { file: Some(file), entries: RwLock::new(entries) })
    }

    pub fn set_session(&self, token: &str, user: Option<&NormalizedUser>) {
        let mut m = self.entries.write();
        m.clear();
        m.insert(TOKEN_KEY.to_string(), token.to_string());
        if let Some(u) = user {
            if let Ok(s) = serde_json::to_string(u) { m.insert(USER_KEY.to_string(), s); }
        }
        self.persist(&m);
        debug!(target: "appraisal::identity", "session.set user={:?}", user.and_then(|u| u.email.as_deref()));
    }

    pub fn set_token(&self, token: &str) {
        let mut m = self.entries.write();
        m.insert(TOKEN_KEY.to_string(), token.to_string());
        self.persist(&m);
    }

    pub fn set_user(&self, user: &NormalizedUser) {
        let mut m = self.entries.write();
        if let Ok(s) = serde_json::to_string(user) { m.insert(USER_KEY.to_string(), s); }
        self.persist(&m);
    }

    pub fn token(&self) -> Option<SessionToken> {
        self.entries.read().get(TOKEN_KEY).cloned()
    }

    pub fn user(&self) -> Option<NormalizedUser> {
        let raw = self.entries.read().get(USER_KEY).cloned()?;
        match serde_json::from_str::<NormalizedUser>(&raw) {
            Ok(u) => Some(u),
            Err(e) => {
                debug!(target: "appraisal::identity", "stored user record unreadable: {}", e);
                None
            }
        }
    }

    pub fn snapshot(&self) -> Session {
        Session { token: self.token(), user: self.user() }
    }

    pub fn is_authenticated(&self) -> bool { self.token().is_some() }

    /// Erase everything in one step: the in-memory map and the session file.
    pub fn clear_session(&self) -> SessionCleared {
        let mut m = self.entries.write();
        m.clear();
        if let Some(file) = &self.file {
            if let Err(e) = std::fs::remove_file(file) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(target: "appraisal::identity", "failed to remove session file {:?}: {}", file, e);
                }
            }
        }
        debug!(target: "appraisal::identity", "session.clear");
        SessionCleared { redirect_to: LOGIN_PATH }
    }

    /// Write-then-rename so a reader never sees half a file.
    fn persist(&self, entries: &BTreeMap<String, String>) {
        let Some(file) = &self.file else { return; };
        let tmp = file.with_extension("json.tmp");
        let res = serde_json::to_vec_pretty(entries)
            .map_err(std::io::Error::other)
            .and_then(|bytes| write_private(&tmp, &bytes))
            .and_then(|_| std::fs::rename(&tmp, file));
        if let Err(e) = res {
            warn!(target: "appraisal::identity", "failed to persist session to {:?}: {}", file, e);
        }
    }

    #[cfg(test)]
    pub(crate) fn put_raw(&self, key: &str, value: &str) {
        let mut m = self.entries.write();
        m.insert(key.to_string(), value.to_string());
        self.persist(&m);
    }
}

/// Create `path` readable by the owner only; the file holds a bearer token.
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e),
        _ => {}
    }
    let mut opts = std::fs::OpenOptions::new();
    opts.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    let mut f = opts.open(path)?;
    f.write_all(bytes)?;
    f.flush()
}

impl Default for SessionStore {
    fn default() -> Self { Self::in_memory() }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;
