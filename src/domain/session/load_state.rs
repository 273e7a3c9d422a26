//! Lifecycle of loading the question set.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Where a session is in loading its questions.
///
/// ```text
/// Empty -> Loading -> Loaded
///             ^  \
///             |   v
///           LoadFailed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    #[default]
    Empty,
    Loading,
    LoadFailed,
    Loaded,
}

impl LoadState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadState::Loaded)
    }
}

impl StateMachine for LoadState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use LoadState::*;
        matches!(
            (self, target),
            (Empty, Loading) | (Loading, Loaded) | (Loading, LoadFailed) | (LoadFailed, Loading)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use LoadState::*;
        match self {
            Empty => vec![Loading],
            Loading => vec![Loaded, LoadFailed],
            LoadFailed => vec![Loading],
            Loaded => vec![],
        }
    }
}
