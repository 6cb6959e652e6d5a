//! Map heterogeneous identity payloads (token claims, profile endpoint bodies)
//! onto `NormalizedUser`.
//!
//! Each field has an ordered list of extraction rules. Rules are tried in order
//! and the first one that yields a usable value of the right shape wins; a
//! value of the wrong shape (e.g. a number where an email string is expected)
//! does not stop the chain. Normalization never fails: a field whose whole
//! chain comes up empty is simply absent.

use serde_json::{Map, Value};

use super::user::{NormalizedUser, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// The value under a key.
    Key(&'static str),
    /// First element of a list under a key; a scalar is taken as-is.
    FirstOf(&'static str),
    /// Two string values joined by a single space, only when both are present.
    Joined(&'static str, &'static str),
}

pub const ROLE_RULES: &[Rule] = &[
    Rule::Key("role"),
    Rule::FirstOf("roles"),
    Rule::FirstOf("authorities"),
    Rule::FirstOf("permissions"),
];

pub const FULL_NAME_RULES: &[Rule] = &[
    Rule::Key("fullName"),
    Rule::Key("name"),
    Rule::Key("displayName"),
    Rule::Joined("firstName", "lastName"),
];

pub const EMAIL_RULES: &[Rule] = &[
    Rule::Key("email"),
    Rule::Key("mail"),
    Rule::Key("preferred_username"),
    Rule::Key("username"),
    Rule::Key("userName"),
    Rule::Key("login"),
    Rule::Key("sub"),
];

pub const ID_RULES: &[Rule] = &[Rule::Key("id"), Rule::Key("userId"), Rule::Key("uuid")];

impl Rule {
    fn extract(&self, raw: &Map<String, Value>) -> Option<Value> {
        match *self {
            Rule::Key(k) => raw.get(k).filter(|v| !v.is_null()).cloned(),
            Rule::FirstOf(k) => match raw.get(k)? {
                Value::Array(items) => items.first().filter(|v| !v.is_null()).cloned(),
                Value::Null => None,
                other => Some(other.clone()),
            },
            Rule::Joined(a, b) => {
                let first = raw.get(a)?.as_str()?;
                let last = raw.get(b)?.as_str()?;
                Some(Value::String(format!("{} {}", first, last)))
            }
        }
    }
}

/// Run `rules` in order and return the first extracted value `accept` takes.
pub fn first_match<T>(raw: &Map<String, Value>, rules: &[Rule], accept: impl Fn(&Value) -> Option<T>) -> Option<T> {
    rules.iter().find_map(|r| r.extract(raw).and_then(|v| accept(&v)))
}

fn as_text(v: &Value) -> Option<String> {
    v.as_str().map(|s| s.to_string())
}

/// Roles sometimes arrive as `{ "name": "ADMIN", ... }` records.
fn as_role(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Object(m) => m.get("name").and_then(|n| n.as_str()).map(|s| s.to_string()),
        _ => None,
    }
}

fn as_id(v: &Value) -> Option<UserId> {
    match v {
        // Ids past i64 or with a fraction are kept verbatim rather than dropped.
        Value::Number(n) => Some(n.as_i64().map(UserId::Number).unwrap_or_else(|| UserId::Text(n.to_string()))),
        Value::String(s) => Some(UserId::Text(s.clone())),
        _ => None,
    }
}

pub fn normalize_user(raw: &Map<String, Value>) -> NormalizedUser {
    NormalizedUser {
        id: first_match(raw, ID_RULES, as_id),
        email: first_match(raw, EMAIL_RULES, as_text),
        full_name: first_match(raw, FULL_NAME_RULES, as_text),
        role: first_match(raw, ROLE_RULES, as_role),
    }
}

/// Convenience over an arbitrary JSON value; anything that is not a record
/// normalizes to an empty user.
pub fn normalize_value(raw: &Value) -> NormalizedUser {
    match raw.as_object() {
        Some(m) => normalize_user(m),
        None => NormalizedUser::default(),
    }
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod normalize_tests;
