use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::{ApiClient, ApiError};
use crate::error::{AppError, AppResult};
use crate::evaluations::model::list_items;
use crate::evaluations::{records_from_body, EvaluationRecord, NewEvaluation};
use crate::identity::LOGIN_PATH;

pub const GIVEN_PATH: &str = "/evaluations/me/given";
pub const RECEIVED_PATH: &str = "/evaluations/me/received";
pub const SUMMARY_PATH: &str = "/evaluations/me";
pub const CREATE_PATH: &str = "/evaluations";
/// Where a saved evaluation sends the user.
pub const LIST_PAGE: &str = "/evaluations";

/// Server-side narrowing for `GET /evaluations/me/received`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceivedQuery {
    pub year: Option<i32>,
    pub quarter: Option<String>,
    pub kind: Option<String>,
}

impl ReceivedQuery {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut p = Vec::new();
        if let Some(y) = self.year { p.push(("year", y.to_string())); }
        if let Some(q) = self.quarter.as_deref().filter(|s| !s.is_empty()) { p.push(("quarter", q.to_string())); }
        if let Some(t) = self.kind.as_deref().filter(|s| !s.is_empty()) { p.push(("type", t.to_string())); }
        p
    }
}

/// `GET /evaluations/me` aggregate, when the backend offers it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationSummary {
    #[serde(default)]
    pub total_evaluations: u64,
    #[serde(default)]
    pub average_score: f64,
    #[serde(default)]
    pub evaluations_by_type: BTreeMap<String, u64>,
    #[serde(skip)]
    pub recent_evaluations: Vec<EvaluationRecord>,
}

pub async fn given(api: &ApiClient) -> Result<Vec<EvaluationRecord>, ApiError> {
    let body = api.get_json(GIVEN_PATH, &[]).await?;
    Ok(records_from_body(&body))
}

pub async fn received(api: &ApiClient, query: &ReceivedQuery) -> Result<Vec<EvaluationRecord>, ApiError> {
    let body = api.get_json(RECEIVED_PATH, &query.params()).await?;
    Ok(records_from_body(&body))
}

pub async fn for_user(api: &ApiClient, user_id: i64) -> Result<Vec<EvaluationRecord>, ApiError> {
    let body = api.get_json(&format!("/evaluations/{}", user_id), &[]).await?;
    Ok(records_from_body(&body))
}

pub async fn summary(api: &ApiClient) -> Result<EvaluationSummary, ApiError> {
    let body = api.get_json(SUMMARY_PATH, &[]).await?;
    Ok(summary_from_body(&body))
}

/// A body that does not look like a summary reads as an empty one.
pub fn summary_from_body(body: &Value) -> EvaluationSummary {
    if !body.is_object() { return EvaluationSummary::default(); }
    let mut s: EvaluationSummary = serde_json::from_value(body.clone()).unwrap_or_default();
    if let Some(recent) = body.get("recentEvaluations") {
        s.recent_evaluations = list_items(recent).iter().filter_map(EvaluationRecord::from_value).collect();
    }
    s
}

pub async fn create(api: &ApiClient, new: &NewEvaluation) -> Result<Value, ApiError> {
    api.post_json(CREATE_PATH, new).await
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Saved { redirect_to: String },
    /// The session was cleared; the caller must send the user to `redirect_to`.
    SessionExpired { redirect_to: String },
}

/// Submit a new evaluation from a form. A missing token or a 401 ends the
/// session instead of surfacing as an error.
pub async fn submit(api: &ApiClient, new: NewEvaluation) -> AppResult<SubmitOutcome> {
    let new = new.normalized();
    if new.employee_email.is_empty() {
        return Err(AppError::user("employee_email_required", "employee email is required"));
    }
    if api.session().token().is_none() {
        return Ok(SubmitOutcome::SessionExpired { redirect_to: LOGIN_PATH.to_string() });
    }
    match create(api, &new).await {
        Ok(_) => {
            info!(target: "appraisal::api", "evaluation saved for {}", new.employee_email);
            Ok(SubmitOutcome::Saved { redirect_to: LIST_PAGE.to_string() })
        }
        Err(ApiError::Unauthorized) => {
            warn!(target: "appraisal::api", "evaluation submit rejected with 401; ending session");
            let cleared = api.session().clear_session();
            Ok(SubmitOutcome::SessionExpired { redirect_to: cleared.redirect_to.to_string() })
        }
        Err(e) => Err(AppError::from(e)),
    }
}
