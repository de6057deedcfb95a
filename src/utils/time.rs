use chrono::{DateTime, NaiveDate, Utc};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// This is the standard way of converting a date to a string in bloomlog file names.
pub fn date_to_file_name(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Whole days from `from` to `to`, rounded towards negative infinity.
pub fn floor_days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

/// Whole days from `from` to `to`, rounded towards positive infinity.
pub fn ceil_days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    -(from - to).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::{ceil_days_between, date_to_file_name, floor_days_between};

    #[test]
    fn test_floor_days_between() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();

        assert_eq!(floor_days_between(start, start), 0);
        assert_eq!(floor_days_between(start, start + Duration::hours(23)), 0);
        assert_eq!(floor_days_between(start, start + Duration::hours(49)), 2);
        assert_eq!(floor_days_between(start, start - Duration::hours(1)), -1);
    }

    #[test]
    fn test_ceil_days_between() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();

        assert_eq!(ceil_days_between(start, start), 0);
        assert_eq!(ceil_days_between(start, start + Duration::hours(1)), 1);
        assert_eq!(ceil_days_between(start, start + Duration::days(2)), 2);
        assert_eq!(ceil_days_between(start, start - Duration::hours(25)), -1);
        assert_eq!(ceil_days_between(start, start - Duration::days(2)), -2);
    }

    #[test]
    fn test_date_to_file_name() {
        let date = chrono::NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        assert_eq!(date_to_file_name(date), "2025-01-09");
    }
}
