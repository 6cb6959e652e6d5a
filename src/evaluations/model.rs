//! Evaluation records as the list endpoints return them.
//!
//! Each endpoint names its fields a little differently (`evaluatorName` vs
//! `employeeName`, `date` vs `createdAt`, period given as year/quarter or as a
//! `periodStart` date). Records are read with the same ordered-rule extraction
//! the identity normalizer uses, so a record carrying both spellings of a field
//! is still accepted. Scores are kept exactly as the endpoint sent them.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::identity::{first_match, Rule};

const ID_RULES: &[Rule] = &[Rule::Key("id"), Rule::Key("evaluationId")];
const NAME_RULES: &[Rule] = &[
    Rule::Key("evaluatorName"),
    Rule::Key("employeeName"),
    Rule::Key("evaluateeName"),
    Rule::Key("fullName"),
];
const EMAIL_RULES: &[Rule] = &[Rule::Key("evaluatorEmail"), Rule::Key("employeeEmail"), Rule::Key("email")];
const SCORE_RULES: &[Rule] = &[Rule::Key("score")];
const TYPE_RULES: &[Rule] = &[Rule::Key("type"), Rule::Key("evaluationType")];
const YEAR_RULES: &[Rule] = &[Rule::Key("periodYear"), Rule::Key("year")];
const QUARTER_RULES: &[Rule] = &[Rule::Key("periodQuarter"), Rule::Key("quarter")];
const DATE_RULES: &[Rule] = &[Rule::Key("date"), Rule::Key("createdAt"), Rule::Key("periodStart")];
const PERIOD_START_RULES: &[Rule] = &[Rule::Key("periodStart"), Rule::Key("date"), Rule::Key("createdAt")];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRecord {
    pub id: Option<i64>,
    pub evaluator_name: Option<String>,
    pub evaluator_email: Option<String>,
    pub score: Option<f64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub period_year: Option<i32>,
    pub period_quarter: Option<String>,
    pub date: Option<String>,
}

fn as_text(v: &Value) -> Option<String> {
    v.as_str().map(|s| s.to_string())
}

fn as_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_year(v: &Value) -> Option<i32> {
    as_i64(v).and_then(|y| i32::try_from(y).ok())
}

/// Quarters arrive as `"Q3"`, `"q3"`, `3` or `"3"`; all become `"Q3"`.
pub fn normalize_quarter(v: &Value) -> Option<String> {
    match v {
        Value::Number(n) => quarter_label(n.as_i64()?),
        Value::String(s) => parse_quarter(s),
        _ => None,
    }
}

/// String form of `normalize_quarter`, for quarters typed by a user.
pub fn parse_quarter(s: &str) -> Option<String> {
    let t = s.trim();
    let digits = t.strip_prefix('Q').or_else(|| t.strip_prefix('q')).unwrap_or(t);
    quarter_label(digits.parse().ok()?)
}

fn quarter_label(n: i64) -> Option<String> {
    (1..=4).contains(&n).then(|| format!("Q{}", n))
}

/// Accepts plain dates and RFC 3339 timestamps.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let t = s.trim();
    NaiveDate::parse_from_str(t, "%Y-%m-%d")
        .ok()
        .or_else(|| chrono::DateTime::parse_from_rfc3339(t).ok().map(|d| d.date_naive()))
        .or_else(|| t.get(..10).and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()))
}

impl EvaluationRecord {
    /// Lenient read of one list item; `None` when the item is not a record.
    pub fn from_value(v: &Value) -> Option<Self> {
        let m = v.as_object()?;
        Some(Self::from_map(m))
    }

    pub fn from_map(m: &Map<String, Value>) -> Self {
        let period_start = first_match(m, PERIOD_START_RULES, as_text).and_then(|s| parse_date(&s));
        let period_year = first_match(m, YEAR_RULES, as_year).or_else(|| period_start.map(|d| d.year()));
        let period_quarter = first_match(m, QUARTER_RULES, normalize_quarter)
            .or_else(|| period_start.map(|d| format!("Q{}", d.month0() / 3 + 1)));
        Self {
            id: first_match(m, ID_RULES, as_i64),
            evaluator_name: first_match(m, NAME_RULES, as_text),
            evaluator_email: first_match(m, EMAIL_RULES, as_text),
            score: first_match(m, SCORE_RULES, as_f64),
            kind: first_match(m, TYPE_RULES, as_text),
            period_year,
            period_quarter,
            date: first_match(m, DATE_RULES, as_text),
        }
    }
}

/// Read a list body. Endpoints answer with a bare array or a record wrapping
/// the array (`evaluations`, `content`, `data`); anything else is an empty list.
/// Items that are not records are skipped.
pub fn records_from_body(body: &Value) -> Vec<EvaluationRecord> {
    list_items(body).iter().filter_map(EvaluationRecord::from_value).collect()
}

pub fn list_items(body: &Value) -> &[Value] {
    match body {
        Value::Array(items) => items,
        Value::Object(m) => ["evaluations", "content", "data", "items"]
            .iter()
            .find_map(|k| m.get(*k).and_then(|v| v.as_array()))
            .map(|v| v.as_slice())
            .unwrap_or(&[]),
        _ => &[],
    }
}

/// Body of `POST /evaluations`. The creation contract scores 0 to 100, while
/// list views may display a different scale; nothing here converts between them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewEvaluation {
    pub employee_email: String,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
    pub score: Option<f64>,
    pub comments: Option<String>,
}

pub const CREATE_SCORE_MIN: f64 = 0.0;
pub const CREATE_SCORE_MAX: f64 = 100.0;

impl NewEvaluation {
    pub fn new(employee_email: impl Into<String>) -> Self {
        Self { employee_email: employee_email.into(), ..Default::default() }
    }

    /// Self-evaluation: the subject is the signed-in user.
    pub fn for_self(user: &crate::identity::NormalizedUser) -> Self {
        Self::new(user.email.clone().unwrap_or_default())
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(clamp_create_score(score));
        self
    }

    pub fn with_period(mut self, start: Option<&str>, end: Option<&str>) -> Self {
        self.period_start = non_blank(start);
        self.period_end = non_blank(end);
        self
    }

    pub fn with_comments(mut self, comments: Option<&str>) -> Self {
        self.comments = non_blank(comments);
        self
    }

    /// Blank optional fields travel as `null`.
    pub fn normalized(mut self) -> Self {
        self.employee_email = self.employee_email.trim().to_string();
        self.period_start = non_blank(self.period_start.as_deref());
        self.period_end = non_blank(self.period_end.as_deref());
        self.comments = non_blank(self.comments.as_deref());
        self.score = self.score.filter(|s| s.is_finite()).map(clamp_create_score);
        self
    }
}

pub fn clamp_create_score(score: f64) -> f64 {
    score.clamp(CREATE_SCORE_MIN, CREATE_SCORE_MAX)
}

fn non_blank(v: Option<&str>) -> Option<String> {
    v.map(str::trim).filter(|s| !s.is_empty()).map(|s| s.to_string())
}
