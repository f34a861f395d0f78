//! Calendar arithmetic used by the alert rules.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime};

/// Adds calendar months, clamping the day to the end of the target month
/// (Jan 31 + 1 month is Feb 28, or Feb 29 in a leap year).
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// The month/day of `date` placed in `year`.
///
/// Feb 29 falls back to Feb 28 when `year` is not a leap year.
pub fn same_day_in_year(date: NaiveDate, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, date.month(), date.day()).or_else(|| {
        if date.month() == 2 && date.day() == 29 {
            NaiveDate::from_ymd_opt(year, 2, 28)
        } else {
            None
        }
    })
}

/// The next recurrence of `date`'s month/day on or after `today`.
pub fn next_occurrence(date: NaiveDate, today: NaiveDate) -> Option<NaiveDate> {
    let this_year = same_day_in_year(date, today.year())?;
    if this_year >= today {
        Some(this_year)
    } else {
        same_day_in_year(date, today.year() + 1)
    }
}

/// Whole days from `from` to `to`; negative when `to` is in the past.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// Midnight at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Day/month/year rendering used in alert messages.
pub fn display(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_add_months_clamps_day() {
        assert_eq!(add_months(ymd(2025, 1, 31), 1), Some(ymd(2025, 2, 28)));
        assert_eq!(add_months(ymd(2024, 1, 31), 1), Some(ymd(2024, 2, 29)));
        assert_eq!(add_months(ymd(2025, 3, 31), 1), Some(ymd(2025, 4, 30)));
        assert_eq!(add_months(ymd(2025, 11, 15), 3), Some(ymd(2026, 2, 15)));
    }

    #[test]
    fn test_leap_day_in_common_year() {
        assert_eq!(same_day_in_year(ymd(1992, 2, 29), 2025), Some(ymd(2025, 2, 28)));
        assert_eq!(same_day_in_year(ymd(1992, 2, 29), 2028), Some(ymd(2028, 2, 29)));
    }

    #[test]
    fn test_next_occurrence_rolls_forward() {
        let today = ymd(2025, 6, 1);
        assert_eq!(next_occurrence(ymd(1990, 6, 20), today), Some(ymd(2025, 6, 20)));
        assert_eq!(next_occurrence(ymd(1990, 6, 1), today), Some(ymd(2025, 6, 1)));
        assert_eq!(next_occurrence(ymd(1990, 5, 31), today), Some(ymd(2026, 5, 31)));
    }

    #[test]
    fn test_next_occurrence_from_leap_day() {
        assert_eq!(
            next_occurrence(ymd(2000, 2, 29), ymd(2025, 2, 1)),
            Some(ymd(2025, 2, 28))
        );
        // Past Feb 28 in a common year, the next one is the real leap day.
        assert_eq!(
            next_occurrence(ymd(2000, 2, 29), ymd(2027, 3, 1)),
            Some(ymd(2028, 2, 29))
        );
    }

    #[test]
    fn test_days_between_sign() {
        assert_eq!(days_between(ymd(2025, 6, 1), ymd(2025, 6, 20)), 19);
        assert_eq!(days_between(ymd(2025, 6, 20), ymd(2025, 6, 1)), -19);
    }

    #[test]
    fn test_display_format() {
        assert_eq!(display(ymd(2025, 6, 20)), "20/06/2025");
    }
}
