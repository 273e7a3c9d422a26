//! Session module - one user's run through a questionnaire.
//!
//! # Components
//!
//! - `SessionMetadata` / `SessionKey` - what is being assessed
//! - `LoadState` - question loading lifecycle
//! - `SessionController` - navigation, answers and restore
//! - `SessionSnapshot` - observable state for the UI

mod controller;
mod errors;
mod load_state;
mod metadata;
mod snapshot;

pub use controller::{RestoreOutcome, RestoreSkip, SessionController};
pub use errors::SessionError;
pub use load_state::LoadState;
pub use metadata::{SessionKey, SessionMetadata};
pub use snapshot::SessionSnapshot;

#[cfg(test)]
pub(crate) use metadata::fixtures;
