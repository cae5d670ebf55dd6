use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::errors::{Error, Result};

/// Default pipeline timezone. The data source publishes in Istanbul time.
pub const DEFAULT_PIPELINE_TZ: Tz = chrono_tz::Europe::Istanbul;

/// Converts a UTC instant to a calendar date in the given timezone.
pub fn pipeline_date_from_utc(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// "Today" for a job run. Computed once per invocation and passed down.
pub fn pipeline_today(tz: Tz) -> NaiveDate {
    pipeline_date_from_utc(Utc::now(), tz)
}

/// Parses an IANA timezone name such as `Europe/Istanbul`.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| Error::InvalidConfigValue(format!("Unknown timezone '{}'", name)))
}

/// `date - days`.
pub fn days_before(date: NaiveDate, days: i64) -> NaiveDate {
    date - Duration::days(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_late_utc_evening_is_next_day_in_istanbul() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 14, 22, 30, 0).unwrap();
        assert_eq!(
            pipeline_date_from_utc(instant, DEFAULT_PIPELINE_TZ),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("Europe/Istanbul").unwrap(), DEFAULT_PIPELINE_TZ);
        assert!(matches!(
            parse_timezone("Mars/Olympus"),
            Err(Error::InvalidConfigValue(_))
        ));
    }

    #[test]
    fn test_days_before() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(days_before(today, 200), NaiveDate::from_ymd_opt(2023, 6, 29).unwrap());
    }
}
