//! Report module - the immutable outcome of a completed assessment.
//!
//! # Components
//!
//! - `Report` - aggregate with derived compliance counts
//! - `AiSummaryStatus` - pending / completed / failed lifecycle
//! - `AiSummary` - structured summary content
//! - `history` - grouping of reports into time buckets

mod aggregate;
mod counts;
pub mod history;
mod status;
mod summary;

pub use aggregate::{Report, ReportDraft};
pub use counts::ComplianceCounts;
pub use history::{bucket, BucketLabel, HistoryBucket, WeekStart};
pub use status::AiSummaryStatus;
pub use summary::{AiSummary, SummaryIssue};

#[cfg(test)]
pub(crate) use aggregate::fixtures as aggregate_fixtures;
