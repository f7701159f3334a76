//! Proleptic Gregorian calendar tables
//!
//! Years use astronomical numbering (year 0 is 1 BCE) so that calendar
//! arithmetic never has to skip a year.

pub const MILLIS_PER_SECOND: i64 = 1_000;
pub const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
pub const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
pub const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

const DAYS_OF_MONTH_ORDINARY: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const DAYS_OF_MONTH_LEAP: [u8; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Check if a year is a leap year
pub const fn is_leap_year(year: i64) -> bool {
    (year & 3) == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in a month, or 0 for a month outside 1..=12
pub const fn days_in_month(year: i64, month: u8) -> u8 {
    if month < 1 || month > 12 {
        return 0;
    }
    let table = if is_leap_year(year) {
        &DAYS_OF_MONTH_LEAP
    } else {
        &DAYS_OF_MONTH_ORDINARY
    };
    table[(month - 1) as usize]
}

/// Check that a year/month/day triple names a real calendar day
pub const fn is_valid_date(year: i64, month: u8, day: u8) -> bool {
    day >= 1 && day <= days_in_month(year, month)
}

/// Check that hour, minute and millisecond-of-minute are in range
pub const fn is_valid_time(hour: u8, minute: u8, millisecond: i32) -> bool {
    hour < 24 && minute < 60 && millisecond >= 0 && millisecond < 60_000
}
