/// Pure date/time utility functions (Discord-agnostic)
use chrono::{DateTime, Datelike, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;

/// Check if a given year is a leap year
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Check if a specific date exists (considering leap years)
pub fn date_exists(year: i32, month: u32, day: u32) -> bool {
    NaiveDate::from_ymd_opt(year, month, day).is_some()
}

/// Month and day on which a birthday is observed in the given year.
///
/// Feb 29 falls back to Feb 28 when `year` is not a leap year.
pub fn observed_month_day(day: u32, month: u32, year: i32) -> (u32, u32) {
    if month == 2 && day == 29 && !is_leap_year(year) {
        (2, 28)
    } else {
        (month, day)
    }
}

/// Date on which a birthday is observed in the given year
pub fn observed_date(day: u32, month: u32, year: i32) -> Option<NaiveDate> {
    let (month, day) = observed_month_day(day, month, year);
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Check if a birthday falls on the given date (ignoring birth year)
pub fn matches_birthday(day: u32, month: u32, today: NaiveDate) -> bool {
    observed_month_day(day, month, today.year()) == (today.month(), today.day())
}

/// Age in whole years as of `today`, at day granularity
pub fn calculate_age(day: u32, month: u32, birth_year: i32, today: NaiveDate) -> i32 {
    let (obs_month, obs_day) = observed_month_day(day, month, today.year());
    let mut age = today.year() - birth_year;

    if today.month() < obs_month || (today.month() == obs_month && today.day() < obs_day) {
        age -= 1;
    }

    age
}

/// Resolve a wall-clock time in `tz`, picking the earliest instant on DST overlaps
pub fn local_datetime(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(dt1, _dt2) => dt1,
        // Skipped by a DST gap, read it as UTC instead
        LocalResult::None => tz.from_utc_datetime(&naive),
    }
}

/// Next instant at which a yearly `(day, month)` falls due at local time `at`.
///
/// The anchor in the reference year is kept unless it is strictly before
/// `reference`, in which case the following year is used.
pub fn next_occurrence(
    day: u32,
    month: u32,
    reference: &DateTime<Tz>,
    at: NaiveTime,
) -> Option<DateTime<Tz>> {
    let tz = reference.timezone();
    let anchor = |year: i32| {
        observed_date(day, month, year).map(|date| local_datetime(&tz, date.and_time(at)))
    };

    let this_year = anchor(reference.year())?;
    if this_year < *reference {
        anchor(reference.year() + 1)
    } else {
        Some(this_year)
    }
}

/// Parse a `D/M/YYYY` argument into `(day, month, year)`.
///
/// Only the shape and ranges are checked here; whether the date actually
/// exists is left to the registry.
pub fn parse_date_argument(input: &str) -> Option<(u32, u32, i32)> {
    let mut parts = input.split('/');
    let (day, month, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let numeric = |s: &str, min_len: usize, max_len: usize| {
        (min_len..=max_len).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
    };
    if !numeric(day, 1, 2) || !numeric(month, 1, 2) || !numeric(year, 4, 4) {
        return None;
    }

    let day: u32 = day.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let year: i32 = year.parse().ok()?;

    if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
        return None;
    }

    Some((day, month, year))
}

/// Format a date as un-padded `D/M/YYYY`
pub fn format_date_input(day: u32, month: u32, year: i32) -> String {
    format!("{}/{}/{}", day, month, year)
}

/// Get month name from month number (1-12)
pub fn get_month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}
