// Calendar helpers. Every "day" and "hour" in this crate is measured in
// the configured reference timezone.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use botmetrics_common::models::TimeRange;

use crate::Error;

/// Midnight of `date` in `tz`. When midnight falls into a DST gap the first
/// valid instant after it is used.
fn local_midnight(date: NaiveDate, tz: Tz) -> Result<DateTime<Utc>, Error> {
    let naive: NaiveDateTime = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| Error::Internal(format!("no local midnight for {} in {}", date, tz)))
}

/// `[date 00:00:00.000, date 23:59:59.999]` in `tz`, as UTC instants.
pub fn day_window(date: NaiveDate, tz: Tz) -> Result<TimeRange, Error> {
    let next = date
        .succ_opt()
        .ok_or_else(|| Error::Validation(format!("date {} is out of range", date)))?;
    let start = local_midnight(date, tz)?;
    let end = local_midnight(next, tz)? - Duration::milliseconds(1);
    TimeRange::new(start, end)
}

/// Calendar date of `ts` in `tz`.
pub fn local_date(ts: DateTime<Utc>, tz: Tz) -> NaiveDate {
    ts.with_timezone(&tz).date_naive()
}

/// Start of the local hour containing `ts`. Computed on the UTC instant so
/// the repeated hour of a DST fall-back still yields one bucket per hour.
pub fn hour_bucket(ts: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let local = ts.with_timezone(&tz);
    ts - Duration::minutes(local.minute() as i64)
        - Duration::seconds(local.second() as i64)
        - Duration::nanoseconds(local.nanosecond() as i64)
}

/// `start..=end`, one entry per day. Empty when `start > end`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// Instant before which samples are past the retention window.
pub fn retention_cutoff(now: DateTime<Utc>, max_age_days: u32) -> DateTime<Utc> {
    now - Duration::days(max_age_days as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn utc_day_window_bounds() {
        let w = day_window(date(2024, 3, 15), Tz::UTC).unwrap();
        assert_eq!(w.start, Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
        assert_eq!(
            w.end,
            Utc.with_ymd_and_hms(2024, 3, 15, 23, 59, 59).unwrap() + Duration::milliseconds(999)
        );
    }

    #[test]
    fn offset_day_window() {
        let w = day_window(date(2024, 1, 10), chrono_tz::America::New_York).unwrap();
        assert_eq!(w.start, Utc.with_ymd_and_hms(2024, 1, 10, 5, 0, 0).unwrap());
    }

    #[test]
    fn hour_bucket_truncates() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 15, 10, 42, 17).unwrap();
        assert_eq!(
            hour_bucket(ts, Tz::UTC),
            Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap()
        );
        // Half-hour offsets bucket on local hours.
        assert_eq!(
            hour_bucket(ts, chrono_tz::Asia::Kolkata),
            Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap()
        );
    }

    #[test]
    fn hour_bucket_in_repeated_dst_hour() {
        let tz = chrono_tz::America::New_York;
        // 01:10 and 01:40 EDT, the first pass through 01:00 on fall-back day.
        let a = Utc.with_ymd_and_hms(2024, 11, 3, 5, 10, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 11, 3, 5, 40, 0).unwrap();
        let start = Utc.with_ymd_and_hms(2024, 11, 3, 5, 0, 0).unwrap();
        assert_eq!(hour_bucket(a, tz), start);
        assert_eq!(hour_bucket(b, tz), start);

        // 01:20 EST, the second pass, is its own hour.
        let c = Utc.with_ymd_and_hms(2024, 11, 3, 6, 20, 0).unwrap();
        assert_eq!(
            hour_bucket(c, tz),
            Utc.with_ymd_and_hms(2024, 11, 3, 6, 0, 0).unwrap()
        );
    }

    #[test]
    fn inclusive_day_iteration() {
        let days: Vec<_> = days_inclusive(date(2024, 2, 27), date(2024, 3, 1)).collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[2], date(2024, 2, 29));
        assert_eq!(days_inclusive(date(2024, 3, 2), date(2024, 3, 1)).count(), 0);
    }
}
