//! Client-side filtering and aggregation over a fetched evaluation list.
//!
//! Headline numbers (count, average) follow the current filter. Breakdowns and
//! option lists are taken over the full list so every available value stays
//! selectable whatever is currently filtered.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::model::{parse_quarter, EvaluationRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Free text matched against evaluator name and email.
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub quarter: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

fn selected(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Records carry `"Q2"`; a selection of `q2` or `2` means the same quarter.
fn quarter_key(q: &str) -> String {
    parse_quarter(q).unwrap_or_else(|| q.to_string())
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty() && self.year.is_none() && selected(&self.quarter).is_none() && selected(&self.kind).is_none()
    }

    pub fn matches(&self, r: &EvaluationRecord) -> bool {
        self.matches_text(r)
            && self.year.map_or(true, |y| r.period_year == Some(y))
            && selected(&self.quarter).map_or(true, |q| r.period_quarter.as_deref() == Some(quarter_key(q).as_str()))
            && selected(&self.kind).map_or(true, |t| r.kind.as_deref() == Some(t))
    }

    fn matches_text(&self, r: &EvaluationRecord) -> bool {
        let needle = self.query.trim().to_lowercase();
        if needle.is_empty() { return true; }
        [r.evaluator_name.as_deref(), r.evaluator_email.as_deref()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Records passing the filter.
    pub count: usize,
    /// Mean score of the filtered records that carry one; 0 when there are none.
    pub average_score: f64,
    /// Over the full list.
    pub by_type: BTreeMap<String, usize>,
    /// Over the full list.
    pub by_year: BTreeMap<i32, usize>,
}

/// Values offered by the filter controls, drawn from the full list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Newest first.
    pub years: Vec<i32>,
    pub quarters: Vec<String>,
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOutcome {
    pub filtered: Vec<EvaluationRecord>,
    pub stats: Statistics,
    pub options: FilterOptions,
}

pub fn average_score<'a>(records: impl IntoIterator<Item = &'a EvaluationRecord>) -> f64 {
    let (sum, n) = records
        .into_iter()
        .filter_map(|r| r.score)
        .filter(|s| s.is_finite())
        .fold((0.0_f64, 0_usize), |(sum, n), s| (sum + s, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

pub fn filter_options(records: &[EvaluationRecord]) -> FilterOptions {
    let years: BTreeSet<i32> = records.iter().filter_map(|r| r.period_year).collect();
    let quarters: BTreeSet<String> = records.iter().filter_map(|r| r.period_quarter.clone()).collect();
    let types: BTreeSet<String> = records.iter().filter_map(|r| r.kind.clone()).collect();
    FilterOptions {
        years: years.into_iter().rev().collect(),
        quarters: quarters.into_iter().collect(),
        types: types.into_iter().collect(),
    }
}

pub fn filter_evaluations(records: &[EvaluationRecord], filter: &FilterState) -> FilterOutcome {
    let filtered: Vec<EvaluationRecord> = records.iter().filter(|r| filter.matches(r)).cloned().collect();

    let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_year: BTreeMap<i32, usize> = BTreeMap::new();
    for r in records {
        if let Some(t) = &r.kind { *by_type.entry(t.clone()).or_insert(0) += 1; }
        if let Some(y) = r.period_year { *by_year.entry(y).or_insert(0) += 1; }
    }

    let stats = Statistics {
        count: filtered.len(),
        average_score: average_score(&filtered),
        by_type,
        by_year,
    };
    FilterOutcome { filtered, stats, options: filter_options(records) }
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod filter_tests;
