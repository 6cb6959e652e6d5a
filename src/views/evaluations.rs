use parking_lot::RwLock;
use serde::Serialize;

use super::sequencer::{Loader, ViewState};
use crate::api::evaluations::{self, ReceivedQuery};
use crate::api::ApiClient;
use crate::evaluations::{filter_evaluations, EvaluationRecord, FilterOutcome, FilterState};

pub const EVALUATIONS_LOAD_FAILED: &str = "Could not load evaluations.";

/// What the evaluations page renders: load status plus the filtered list and
/// its statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvaluationsSnapshot {
    pub loading: bool,
    pub error: Option<String>,
    pub filter: FilterState,
    pub outcome: FilterOutcome,
}

/// Evaluations received by the signed-in user. The whole list is fetched once
/// and filtered locally, so changing the filter never hits the network.
pub struct EvaluationsView {
    api: ApiClient,
    loader: Loader<Vec<EvaluationRecord>>,
    filter: RwLock<FilterState>,
}

impl EvaluationsView {
    pub fn new(api: ApiClient) -> Self {
        Self { api, loader: Loader::new(EVALUATIONS_LOAD_FAILED), filter: RwLock::new(FilterState::default()) }
    }

    pub async fn load(&self) -> bool {
        self.loader.load(evaluations::received(&self.api, &ReceivedQuery::default())).await
    }

    pub fn filter(&self) -> FilterState { self.filter.read().clone() }

    pub fn set_filter(&self, filter: FilterState) { *self.filter.write() = filter; }

    pub fn clear_filter(&self) { *self.filter.write() = FilterState::default(); }

    pub fn state(&self) -> ViewState<Vec<EvaluationRecord>> { self.loader.state() }

    pub fn snapshot(&self) -> EvaluationsSnapshot {
        let st = self.loader.state();
        let filter = self.filter();
        let outcome = filter_evaluations(&st.data, &filter);
        EvaluationsSnapshot { loading: st.loading, error: st.error, filter, outcome }
    }
}

/// Evaluations the signed-in user wrote. Flat list, no filtering.
pub struct GivenEvaluationsView {
    api: ApiClient,
    loader: Loader<Vec<EvaluationRecord>>,
}

impl GivenEvaluationsView {
    pub fn new(api: ApiClient) -> Self {
        Self { api, loader: Loader::new(EVALUATIONS_LOAD_FAILED) }
    }

    pub async fn load(&self) -> bool {
        self.loader.load(evaluations::given(&self.api)).await
    }

    pub fn state(&self) -> ViewState<Vec<EvaluationRecord>> { self.loader.state() }
}
