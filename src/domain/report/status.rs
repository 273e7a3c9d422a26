//! AI summary status.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle of a report's AI summary.
///
/// `Pending` means the summary has not been attempted yet (typically the
/// report was completed offline). `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiSummaryStatus {
    Pending,
    Completed,
    Failed,
}

impl AiSummaryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiSummaryStatus::Pending => "pending",
            AiSummaryStatus::Completed => "completed",
            AiSummaryStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for AiSummaryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for AiSummaryStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use AiSummaryStatus::*;
        matches!((self, target), (Pending, Completed) | (Pending, Failed))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use AiSummaryStatus::*;
        match self {
            Pending => vec![Completed, Failed],
            Completed | Failed => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_moves_to_either_outcome() {
        assert!(AiSummaryStatus::Pending.can_transition_to(&AiSummaryStatus::Completed));
        assert!(AiSummaryStatus::Pending.can_transition_to(&AiSummaryStatus::Failed));
    }

    #[test]
    fn outcomes_are_terminal() {
        assert!(AiSummaryStatus::Completed.is_terminal());
        assert!(AiSummaryStatus::Failed.is_terminal());
        assert!(AiSummaryStatus::Failed
            .transition_to(AiSummaryStatus::Pending)
            .is_err());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&AiSummaryStatus::Pending).unwrap(),
            "\"pending\""
        );
    }
}
