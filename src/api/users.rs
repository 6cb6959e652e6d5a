use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::{ApiClient, ApiError};
use crate::evaluations::model::list_items;

pub const USERS_PATH: &str = "/users";

/// One row of the user directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUser {
    pub id: i64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub manager_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Flat list expected; a non-list body is an empty directory and rows that do
/// not parse are dropped.
pub fn users_from_body(body: &Value) -> Vec<DirectoryUser> {
    list_items(body)
        .iter()
        .filter_map(|v| match serde_json::from_value::<DirectoryUser>(v.clone()) {
            Ok(u) => Some(u),
            Err(e) => {
                debug!(target: "appraisal::api", "skipping directory row: {}", e);
                None
            }
        })
        .collect()
}

fn user_from_body(body: Value) -> Result<DirectoryUser, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::Decode(format!("user record: {}", e)))
}

pub async fn list(api: &ApiClient) -> Result<Vec<DirectoryUser>, ApiError> {
    let body = api.get_json(USERS_PATH, &[]).await?;
    Ok(users_from_body(&body))
}

pub async fn by_email(api: &ApiClient, email: &str) -> Result<DirectoryUser, ApiError> {
    let body = api.get_json(&format!("/users/email/{}", urlencoding::encode(email)), &[]).await?;
    user_from_body(body)
}

pub async fn update_my_profile(api: &ApiClient, full_name: &str) -> Result<DirectoryUser, ApiError> {
    let body = api.put_json("/users/me", Some(&json!({ "fullName": full_name }))).await?;
    user_from_body(body)
}

pub async fn assign_manager(api: &ApiClient, user_id: i64, manager_id: i64) -> Result<(), ApiError> {
    api.put_json::<Value>(&format!("/users/{}/manager/{}", user_id, manager_id), None).await?;
    Ok(())
}

pub async fn register(api: &ApiClient, req: &RegisterUser) -> Result<DirectoryUser, ApiError> {
    let body = api.post_json("/users/register", req).await?;
    user_from_body(body)
}
