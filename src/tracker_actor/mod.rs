//! Order tracking: polls the backend, diffs against the last snapshot, and raises one
//! notification per qualifying status transition.

mod diff;
mod service;

pub use diff::{status_changes, OrderSnapshot, StatusChanged};
pub use service::{FetchSettings, TrackerService};
