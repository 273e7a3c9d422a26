//! Grouping of completed reports into history buckets.
//!
//! Pure calendar arithmetic in the caller's time zone. Bucket boundaries are
//! local midnights, so a report from 23:59 yesterday is "Yesterday" even if it
//! was a few minutes ago.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Report;

/// First day of the calendar week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
    Saturday,
}

impl WeekStart {
    pub fn weekday(&self) -> Weekday {
        match self {
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Saturday => Weekday::Sat,
        }
    }
}

/// Label of a history bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketLabel {
    Today,
    Yesterday,
    ThisWeek,
    ThisMonth,
    Month { year: i32, month: u32 },
}

impl fmt::Display for BucketLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketLabel::Today => f.write_str("Today"),
            BucketLabel::Yesterday => f.write_str("Yesterday"),
            BucketLabel::ThisWeek => f.write_str("This Week"),
            BucketLabel::ThisMonth => f.write_str("This Month"),
            BucketLabel::Month { year, month } => match NaiveDate::from_ymd_opt(*year, *month, 1) {
                Some(date) => write!(f, "{}", date.format("%B %Y")),
                None => write!(f, "{}-{:02}", year, month),
            },
        }
    }
}

/// Reports that share a label, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryBucket {
    pub label: BucketLabel,
    pub reports: Vec<Report>,
}

/// Local boundaries computed once per call.
struct Boundaries<Tz: TimeZone> {
    today: DateTime<Tz>,
    yesterday: DateTime<Tz>,
    this_week: DateTime<Tz>,
    this_month: DateTime<Tz>,
}

impl<Tz: TimeZone> Boundaries<Tz> {
    fn new(now: &DateTime<Tz>, week_start: WeekStart) -> Self {
        let tz = now.timezone();
        let today = now.date_naive();
        let yesterday = today - Duration::days(1);

        let days_into_week = (7 + today.weekday().num_days_from_monday()
            - week_start.weekday().num_days_from_monday())
            % 7;
        let week = today - Duration::days(i64::from(days_into_week));
        let month = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today);

        Self {
            today: local_midnight(&tz, today),
            yesterday: local_midnight(&tz, yesterday),
            this_week: local_midnight(&tz, week),
            this_month: local_midnight(&tz, month),
        }
    }

    fn label(&self, at: &DateTime<Tz>) -> BucketLabel {
        if *at >= self.today {
            BucketLabel::Today
        } else if *at >= self.yesterday {
            BucketLabel::Yesterday
        } else if *at >= self.this_week {
            BucketLabel::ThisWeek
        } else if *at >= self.this_month {
            BucketLabel::ThisMonth
        } else {
            BucketLabel::Month {
                year: at.year(),
                month: at.month(),
            }
        }
    }
}

/// Start of `date` in `tz`.
///
/// When midnight does not exist (a DST gap at 00:00) the first valid hour of
/// the day is used instead.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    (0..4)
        .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
        .find_map(|time| tz.from_local_datetime(&date.and_time(time)).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

fn priority(label: &BucketLabel) -> (u8, i32, u32) {
    match label {
        BucketLabel::Today => (0, 0, 0),
        BucketLabel::Yesterday => (1, 0, 0),
        BucketLabel::ThisWeek => (2, 0, 0),
        BucketLabel::ThisMonth => (3, 0, 0),
        // Newest month first.
        BucketLabel::Month { year, month } => (4, -*year, 12 - *month),
    }
}

/// Groups reports by when they were completed, relative to `now`.
///
/// Each report lands in exactly one bucket: the first of Today, Yesterday,
/// This Week, This Month whose local start it is on or after, otherwise the
/// bucket of its calendar month. Empty buckets are omitted. Named buckets come
/// first in that order, then months from most recent to oldest.
pub fn bucket<Tz: TimeZone>(
    reports: Vec<Report>,
    now: &DateTime<Tz>,
    week_start: WeekStart,
) -> Vec<HistoryBucket> {
    let bounds = Boundaries::new(now, week_start);
    let tz = now.timezone();

    let mut buckets: Vec<HistoryBucket> = Vec::new();
    for report in reports {
        let at = report.completed_at().as_datetime().with_timezone(&tz);
        let label = bounds.label(&at);
        match buckets.iter_mut().find(|b| b.label == label) {
            Some(existing) => existing.reports.push(report),
            None => buckets.push(HistoryBucket {
                label,
                reports: vec![report],
            }),
        }
    }

    buckets.sort_by_key(|b| priority(&b.label));
    buckets
}
