use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Backend user ids arrive as numbers or strings depending on the provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum UserId {
    Number(i64),
    Text(String),
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UserId::Number(n) => write!(f, "{}", n),
            UserId::Text(s) => f.write_str(s),
        }
    }
}

/// Canonical identity shape produced by the normalizer and kept in the session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl NormalizedUser {
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.email.is_none() && self.full_name.is_none() && self.role.is_none()
    }

    pub fn has_any_role(&self, roles: &[String]) -> bool {
        match self.role.as_deref() {
            Some(r) => roles.iter().any(|x| x == r),
            None => false,
        }
    }
}
