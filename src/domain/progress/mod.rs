//! Progress module - the persisted form of a partially answered session.

mod record;

pub use record::{InProgressAssessmentRecord, ReplayedResponses};
