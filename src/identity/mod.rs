//! Session and authorization layer: token storage, identity normalization and
//! resolution, and route guarding.
//! Keep the public surface thin and split implementation across sub-modules.

mod user;
mod session;
mod normalize;
mod claims;
mod resolver;
mod guard;

pub use user::{NormalizedUser, UserId};
pub use session::{Session, SessionCleared, SessionStore, SessionToken, LOGIN_PATH, SESSION_FILE};
pub use normalize::{first_match, normalize_user, normalize_value, Rule};
pub use claims::decode_claims;
pub use resolver::IdentityResolver;
pub use guard::{
    check, classify, find_route, has_role, Access, AccessGuard, Decision, GuardState, Route, RouteRequirement,
    ADMIN, DEFAULT_LANDING, EMPLOYEE, FALLBACK_PATH, MANAGER, POST_LOGIN_PATH, ROUTES,
};
