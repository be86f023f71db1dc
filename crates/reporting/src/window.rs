use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

/// Inclusive time window a report covers.
///
/// Both bounds are inclusive. Windows built from calendar dates expand the
/// end date to the last second of that day, so an order confirmed at any
/// point on the end date still counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Window spanning the given calendar dates, end date inclusive.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Self {
        let start = start.and_time(NaiveTime::MIN).and_utc();
        let end = end.and_time(NaiveTime::MIN).and_utc() + Duration::seconds(86_399);
        Self { start, end }
    }

    /// The seven days ending at `now`. Used when a report is requested
    /// without an explicit range.
    pub fn trailing_week(now: DateTime<Utc>) -> Self {
        Self {
            start: now - Duration::days(7),
            end: now,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn from_dates_expands_end_to_last_second() {
        let w = ReportWindow::from_dates(
            NaiveDate::from_ymd_opt(2025, 6, 2).expect("valid date"),
            NaiveDate::from_ymd_opt(2025, 6, 8).expect("valid date"),
        );
        assert_eq!(w.start, Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap());
        assert_eq!(w.end, Utc.with_ymd_and_hms(2025, 6, 8, 23, 59, 59).unwrap());
    }

    #[test]
    fn contains_is_inclusive_on_both_ends() {
        let w = ReportWindow::from_dates(
            NaiveDate::from_ymd_opt(2025, 6, 2).expect("valid date"),
            NaiveDate::from_ymd_opt(2025, 6, 8).expect("valid date"),
        );
        assert!(w.contains(w.start));
        assert!(w.contains(w.end));
        assert!(!w.contains(w.end + Duration::seconds(1)));
        assert!(!w.contains(w.start - Duration::seconds(1)));
    }

    #[test]
    fn trailing_week_covers_seven_days() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let w = ReportWindow::trailing_week(now);
        assert!(w.contains(now - Duration::days(7)));
        assert!(w.contains(now));
        assert!(!w.contains(now - Duration::days(7) - Duration::seconds(1)));
    }
}
