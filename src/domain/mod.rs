//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machines)
//! - `questionnaire` - Questions, answers and the response ledger
//! - `session` - Session controller, metadata and observable state
//! - `progress` - Persisted form of a partially answered session
//! - `report` - Completed reports, summary lifecycle and history bucketing

pub mod foundation;
pub mod progress;
pub mod questionnaire;
pub mod report;
pub mod session;
