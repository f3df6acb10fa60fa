use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::types::PaymentFrequency;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// due date for period `period` counted from `base`, moved to `day_of_month`
pub fn due_date_for_period(
    base: DateTime<Utc>,
    period: u32,
    frequency: PaymentFrequency,
    day_of_month: u32,
) -> DateTime<Utc> {
    let months = period.saturating_mul(frequency.months_per_period());
    let advanced = base
        .date_naive()
        .checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX);
    start_of_day(with_day_clamped(advanced, day_of_month))
}

/// midnight utc of `now`'s calendar day
pub fn start_of_today(now: DateTime<Utc>) -> DateTime<Utc> {
    start_of_day(now.date_naive())
}

/// a due date is overdue once its calendar day is behind `now`'s
pub fn is_overdue(due_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    due_date < start_of_today(now)
}

/// whole days past due, rounded up; zero when not overdue
pub fn days_overdue(due_date: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    if !is_overdue(due_date, now) {
        return 0;
    }
    let elapsed = (now - due_date).num_milliseconds();
    let days = (elapsed + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY;
    u32::try_from(days.max(0)).unwrap_or(u32::MAX)
}

/// calendar days from `now` to `due_date`, negative once past due
pub fn days_until_due(due_date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (due_date.date_naive() - now.date_naive()).num_days()
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn with_day_clamped(date: NaiveDate, day: u32) -> NaiveDate {
    let last = days_in_month(date.year(), date.month());
    let day = day.clamp(1, last);
    date.with_day(day).unwrap_or(date)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_due_dates_monthly() {
        let base = at(2024, 1, 20, 9);
        assert_eq!(due_date_for_period(base, 1, PaymentFrequency::Monthly, 5), at(2024, 2, 5, 0));
        assert_eq!(due_date_for_period(base, 12, PaymentFrequency::Monthly, 5), at(2025, 1, 5, 0));
    }

    #[test]
    fn test_due_dates_quarterly_and_half_yearly() {
        let base = at(2024, 1, 1, 0);
        assert_eq!(due_date_for_period(base, 2, PaymentFrequency::Quarterly, 1), at(2024, 7, 1, 0));
        assert_eq!(due_date_for_period(base, 1, PaymentFrequency::HalfYearly, 1), at(2024, 7, 1, 0));
    }

    #[test]
    fn test_day_clamped_to_month_end() {
        let base = at(2024, 1, 31, 0);
        assert_eq!(due_date_for_period(base, 1, PaymentFrequency::Monthly, 30), at(2024, 2, 29, 0));
        assert_eq!(due_date_for_period(base, 13, PaymentFrequency::Monthly, 30), at(2025, 2, 28, 0));
    }

    #[test]
    fn test_overdue_boundaries() {
        let now = at(2024, 3, 10, 12);
        assert!(!is_overdue(now, now));
        assert!(!is_overdue(at(2024, 3, 10, 0), now));
        assert!(is_overdue(now - Duration::days(1), now));
        assert!(!is_overdue(now + Duration::days(3), now));
    }

    #[test]
    fn test_days_overdue_rounds_up() {
        let due = at(2024, 3, 1, 0);
        assert_eq!(days_overdue(due, at(2024, 3, 1, 18)), 0);
        assert_eq!(days_overdue(due, at(2024, 3, 2, 0)), 1);
        assert_eq!(days_overdue(due, at(2024, 3, 2, 6)), 2);
        assert_eq!(days_overdue(due, due + Duration::days(91)), 91);
    }

    #[test]
    fn test_days_until_due_is_signed() {
        let now = at(2024, 3, 10, 15);
        assert_eq!(days_until_due(at(2024, 3, 13, 0), now), 3);
        assert_eq!(days_until_due(at(2024, 3, 10, 0), now), 0);
        assert_eq!(days_until_due(at(2024, 3, 8, 0), now), -2);
    }
}
