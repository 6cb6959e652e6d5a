use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, warn};

use crate::api::ApiError;

/// Identifies one load. Only the most recently issued ticket may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self { Self::default() }

    pub fn begin(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewState<T> {
    pub data: T,
    pub loading: bool,
    /// Display message for the last failed load; cleared by the next success.
    pub error: Option<String>,
}

/// Holds one view's data and commits only responses to the latest request.
pub struct Loader<T> {
    seq: RequestSequencer,
    state: RwLock<ViewState<T>>,
    failure_message: &'static str,
}

impl<T: Clone + Default> Loader<T> {
    pub fn new(failure_message: &'static str) -> Self {
        Self { seq: RequestSequencer::new(), state: RwLock::new(ViewState::default()), failure_message }
    }

    /// Run `fetch` and commit its outcome. Returns false when a newer load was
    /// started while this one was in flight, in which case nothing changes.
    pub async fn load<F>(&self, fetch: F) -> bool
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        let ticket = self.seq.begin();
        self.state.write().loading = true;
        let result = fetch.await;

        let mut st = self.state.write();
        if !self.seq.is_current(ticket) {
            debug!(target: "appraisal::views", "discarding superseded response {:?}", ticket);
            return false;
        }
        st.loading = false;
        match result {
            Ok(data) => {
                st.data = data;
                st.error = None;
            }
            Err(e) => {
                warn!(target: "appraisal::views", "load failed: {}", e);
                st.error = Some(self.failure_message.to_string());
            }
        }
        true
    }

    pub fn state(&self) -> ViewState<T> { self.state.read().clone() }
}
