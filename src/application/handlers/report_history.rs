//! ReportHistoryQuery - a user's reports grouped into time buckets.

use chrono::{DateTime, Local, TimeZone};
use std::cmp::Reverse;
use std::sync::Arc;

use crate::application::ReportStore;
use crate::domain::foundation::{DomainError, UserId};
use crate::domain::report::{bucket, HistoryBucket, WeekStart};

/// Query handler for the report history screen.
pub struct ReportHistoryQuery {
    reports: Arc<ReportStore>,
    week_start: WeekStart,
}

impl ReportHistoryQuery {
    pub fn new(reports: Arc<ReportStore>, week_start: WeekStart) -> Self {
        Self {
            reports,
            week_start,
        }
    }

    /// Buckets relative to the local clock.
    pub async fn handle(&self, user_id: &UserId) -> Result<Vec<HistoryBucket>, DomainError> {
        self.handle_at(user_id, &Local::now()).await
    }

    /// Buckets relative to `now`, newest report first within each bucket.
    pub async fn handle_at<Tz>(
        &self,
        user_id: &UserId,
        now: &DateTime<Tz>,
    ) -> Result<Vec<HistoryBucket>, DomainError>
    where
        Tz: TimeZone,
    {
        let mut reports = self.reports.list_for_user(user_id).await?;
        reports.sort_by_key(|r| Reverse(r.completed_at()));
        tracing::debug!(user_id = %user_id, count = reports.len(), "Bucketing report history");
        Ok(bucket(reports, now, self.week_start))
    }
}
