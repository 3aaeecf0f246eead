//! Date-range helpers shared by reports and snapshots.

use chrono::{Datelike, NaiveDate, TimeDelta};

use super::error::ReportError;

/// Rejects ranges where `from > to`.
pub fn validate_range(from: NaiveDate, to: NaiveDate) -> Result<(), ReportError> {
    if from > to {
        return Err(ReportError::InvalidDateRange { from, to });
    }
    Ok(())
}

/// The period of equal length ending the day before `from`.
///
/// Returns `None` at the edge of the representable calendar.
#[must_use]
pub fn previous_period(from: NaiveDate, to: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let length = to.signed_duration_since(from);
    let prev_to = from.pred_opt()?;
    let prev_from = prev_to.checked_sub_signed(length)?;
    Some((prev_from, prev_to))
}

/// `YYYY-MM` key of `date`.
#[must_use]
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// First and last day of the `YYYY-MM` month.
#[must_use]
pub fn month_bounds(key: &str) -> Option<(NaiveDate, NaiveDate)> {
    let (year, month) = key.split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.checked_sub_signed(TimeDelta::days(1))?))
}

/// Month keys from `from` through `to`, inclusive.
#[must_use]
pub fn months_between(from: NaiveDate, to: NaiveDate) -> Vec<String> {
    let mut keys = Vec::new();
    let (mut year, mut month) = (from.year(), from.month());
    while (year, month) <= (to.year(), to.month()) {
        keys.push(format!("{year:04}-{month:02}"));
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_previous_period_has_equal_length() {
        let (from, to) = previous_period(day(2025, 3, 1), day(2025, 3, 31)).unwrap();
        assert_eq!(to, day(2025, 2, 28));
        assert_eq!(from, day(2025, 1, 29));

        let (from, to) = previous_period(day(2025, 3, 10), day(2025, 3, 10)).unwrap();
        assert_eq!((from, to), (day(2025, 3, 9), day(2025, 3, 9)));
    }

    #[test]
    fn test_months_between_spans_year_end() {
        assert_eq!(
            months_between(day(2024, 11, 15), day(2025, 2, 1)),
            vec!["2024-11", "2024-12", "2025-01", "2025-02"]
        );
        assert_eq!(month_key(day(2025, 7, 4)), "2025-07");
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(month_bounds("2024-02"), Some((day(2024, 2, 1), day(2024, 2, 29))));
        assert_eq!(month_bounds("2024-12"), Some((day(2024, 12, 1), day(2024, 12, 31))));
        assert_eq!(month_bounds("2024-13"), None);
        assert_eq!(month_bounds("summary"), None);
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range(day(2025, 1, 1), day(2025, 1, 1)).is_ok());
        assert_eq!(
            validate_range(day(2025, 2, 1), day(2025, 1, 1)),
            Err(ReportError::InvalidDateRange {
                from: day(2025, 2, 1),
                to: day(2025, 1, 1)
            })
        );
    }
}
