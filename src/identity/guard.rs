//! Route-level access control.
//!
//! Evaluated synchronously on every navigation against the locally stored
//! session snapshot; it never waits on the network, so a role change on the
//! server shows up only after the next identity refresh.

use tracing::debug;

use super::session::{Session, SessionStore, LOGIN_PATH};

/// Where an authenticated user lands when a route is not for their role.
pub const DEFAULT_LANDING: &str = "/";
/// Where login sends the user when no original destination was captured.
pub const POST_LOGIN_PATH: &str = "/profile";
/// Target of the catch-all route.
pub const FALLBACK_PATH: &str = "/profile";

pub const EMPLOYEE: &str = "EMPLOYEE";
pub const MANAGER: &str = "MANAGER";
pub const ADMIN: &str = "ADMIN";

/// Roles a route accepts. Empty means any authenticated identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteRequirement {
    roles: Vec<String>,
}

impl RouteRequirement {
    pub fn any() -> Self { Self::default() }

    pub fn roles<S: AsRef<str>>(roles: &[S]) -> Self {
        Self { roles: roles.iter().map(|r| r.as_ref().to_string()).collect() }
    }

    pub fn is_open(&self) -> bool { self.roles.is_empty() }

    pub fn allows(&self, role: Option<&str>) -> bool {
        if self.is_open() { return true; }
        match role {
            Some(r) => self.roles.iter().any(|x| x == r),
            None => false,
        }
    }

    pub fn role_list(&self) -> &[String] { &self.roles }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardState {
    Unauthenticated,
    AuthenticatedNoRole,
    AuthenticatedWithRole,
    Authorized,
    Redirected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Authorized,
    /// `from` carries the originally requested path for the post-login redirect.
    Redirect { to: String, from: Option<String> },
}

impl Decision {
    pub fn state(&self) -> GuardState {
        match self {
            Decision::Authorized => GuardState::Authorized,
            Decision::Redirect { .. } => GuardState::Redirected,
        }
    }

    pub fn is_authorized(&self) -> bool { matches!(self, Decision::Authorized) }
}

/// Where the session stands before the route is considered.
pub fn classify(session: &Session) -> GuardState {
    if !session.is_authenticated() {
        return GuardState::Unauthenticated;
    }
    match session.user.as_ref().and_then(|u| u.role.as_deref()) {
        Some(_) => GuardState::AuthenticatedWithRole,
        None => GuardState::AuthenticatedNoRole,
    }
}

/// Decide one navigation attempt to `path` guarded by `requirement`.
pub fn check(session: &Session, requirement: &RouteRequirement, path: &str) -> Decision {
    let role = session.user.as_ref().and_then(|u| u.role.as_deref());
    let decision = match classify(session) {
        GuardState::Unauthenticated => Decision::Redirect { to: LOGIN_PATH.to_string(), from: Some(path.to_string()) },
        _ if !requirement.allows(role) => Decision::Redirect { to: DEFAULT_LANDING.to_string(), from: None },
        _ => Decision::Authorized,
    };
    debug!(target: "appraisal::identity", "guard path={} role={:?} decision={:?}", path, role, decision);
    decision
}

pub struct AccessGuard<'a> {
    store: &'a SessionStore,
}

impl<'a> AccessGuard<'a> {
    pub fn new(store: &'a SessionStore) -> Self { Self { store } }

    pub fn check(&self, requirement: &RouteRequirement, path: &str) -> Decision {
        check(&self.store.snapshot(), requirement, path)
    }

    /// Resolve `path` against the application route table and guard it.
    pub fn navigate(&self, path: &str) -> Decision {
        let route_path = path.split(['?', '#']).next().unwrap_or(path);
        match find_route(route_path) {
            Some(Route { access: Access::Public, .. }) => Decision::Authorized,
            Some(Route { access: Access::Roles(roles), .. }) => {
                self.check(&RouteRequirement::roles(*roles), path)
            }
            None => Decision::Redirect { to: FALLBACK_PATH.to_string(), from: None },
        }
    }
}

/// True when no roles are asked for, or the stored user holds one of them.
pub fn has_role(store: &SessionStore, roles: Option<&[&str]>) -> bool {
    let Some(roles) = roles else { return true; };
    let user = store.user();
    match user.as_ref().and_then(|u| u.role.as_deref()) {
        Some(r) => roles.contains(&r),
        None => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Signed-in users holding one of these roles; empty means any signed-in user.
    Roles(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub access: Access,
}

const STAFF: &[&str] = &[EMPLOYEE, MANAGER, ADMIN];
const LEADS: &[&str] = &[MANAGER, ADMIN];

pub const ROUTES: &[Route] = &[
    Route { path: LOGIN_PATH, access: Access::Public },
    Route { path: "/", access: Access::Roles(&[]) },
    Route { path: "/profile", access: Access::Roles(&[]) },
    Route { path: "/evaluations", access: Access::Roles(STAFF) },
    Route { path: "/evaluate", access: Access::Roles(STAFF) },
    Route { path: "/evaluations/new", access: Access::Roles(STAFF) },
    Route { path: "/users", access: Access::Roles(LEADS) },
];

pub fn find_route(path: &str) -> Option<&'static Route> {
    let normalized = if path.len() > 1 { path.trim_end_matches('/') } else { path };
    ROUTES.iter().find(|r| r.path == normalized)
}

#[cfg(test)]
#[path = "guard_tests.rs"]
mod guard_tests;
