//! Report history and summary retry configuration

use serde::Deserialize;

use crate::domain::report::WeekStart;

/// How report history is grouped
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct HistoryConfig {
    /// First day of the week for the "This Week" bucket
    #[serde(default)]
    pub week_start: WeekStart,
}

/// When pending AI summaries are retried
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct RetryConfig {
    /// Also retry every pending report of the user on reconnect, not just
    /// the one on screen
    #[serde(default)]
    pub sweep_all_pending: bool,
}
