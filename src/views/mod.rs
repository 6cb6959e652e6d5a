//! Page-level loaders. Each view issues its own requests and keeps only the
//! response to the most recent one; a slow earlier response never overwrites a
//! newer result.

mod evaluations;
mod sequencer;
mod users;

pub use evaluations::{EvaluationsSnapshot, EvaluationsView, GivenEvaluationsView, EVALUATIONS_LOAD_FAILED};
pub use sequencer::{Loader, RequestSequencer, Ticket, ViewState};
pub use users::{UsersView, USERS_LOAD_FAILED};
