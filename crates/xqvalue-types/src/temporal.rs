//! Date, time, timezone and duration field sets

use crate::calendar::{self, MILLIS_PER_MINUTE};
use serde::{Deserialize, Serialize};

/// Wire sentinel for "no timezone" in both timezone bytes
pub const TIMEZONE_NULL: i8 = 127;

/// A timezone offset from UTC, at most 14 hours in either direction
///
/// Hour and minute always carry the same sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Timezone {
    hour: i8,
    minute: i8,
}

impl Timezone {
    pub const UTC: Timezone = Timezone { hour: 0, minute: 0 };

    /// Build a timezone from signed hour and minute parts
    pub fn new(hour: i8, minute: i8) -> Option<Self> {
        if minute.abs() > 59 || (hour > 0 && minute < 0) || (hour < 0 && minute > 0) {
            return None;
        }
        Self::from_offset_minutes(hour as i32 * 60 + minute as i32)
    }

    /// Build a timezone from a total offset in minutes
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        if minutes.abs() > 14 * 60 {
            return None;
        }
        Some(Self {
            hour: (minutes / 60) as i8,
            minute: (minutes % 60) as i8,
        })
    }

    pub const fn hour(&self) -> i8 {
        self.hour
    }

    pub const fn minute(&self) -> i8 {
        self.minute
    }

    /// Total offset from UTC in minutes
    pub const fn offset_minutes(&self) -> i32 {
        self.hour as i32 * 60 + self.minute as i32
    }

    /// Total offset from UTC in milliseconds
    pub const fn offset_millis(&self) -> i64 {
        self.offset_minutes() as i64 * MILLIS_PER_MINUTE
    }

    /// Encode an optional timezone as its two wire bytes
    pub fn to_wire(timezone: Option<Timezone>) -> (i8, i8) {
        timezone.map_or((TIMEZONE_NULL, TIMEZONE_NULL), |tz| (tz.hour, tz.minute))
    }

    /// Decode the two wire bytes; `Err` carries the offending pair
    pub fn from_wire(hour: i8, minute: i8) -> Result<Option<Timezone>, (i8, i8)> {
        if hour == TIMEZONE_NULL && minute == TIMEZONE_NULL {
            return Ok(None);
        }
        Self::new(hour, minute).map(Some).ok_or((hour, minute))
    }
}

impl TryFrom<i32> for Timezone {
    type Error = String;

    fn try_from(minutes: i32) -> Result<Self, Self::Error> {
        Self::from_offset_minutes(minutes)
            .ok_or_else(|| format!("timezone offset {minutes} minutes is outside -14:00..+14:00"))
    }
}

impl From<Timezone> for i32 {
    fn from(tz: Timezone) -> Self {
        tz.offset_minutes()
    }
}

/// Fields of an xs:dateTime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct XsDateTime {
    pub year: i16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    /// Seconds and milliseconds within the minute (`seconds * 1000 + ms`)
    pub millisecond: i32,
    pub timezone: Option<Timezone>,
}

impl XsDateTime {
    pub fn new(date: XsDate, time: XsTime) -> Self {
        Self {
            year: date.year,
            month: date.month,
            day: date.day,
            hour: time.hour,
            minute: time.minute,
            millisecond: time.millisecond,
            timezone: date.timezone,
        }
    }

    /// Check every field against the calendar
    pub fn is_valid(&self) -> bool {
        calendar::is_valid_date(self.year as i64, self.month, self.day)
            && calendar::is_valid_time(self.hour, self.minute, self.millisecond)
    }

    pub fn date(&self) -> XsDate {
        XsDate {
            year: self.year,
            month: self.month,
            day: self.day,
            timezone: self.timezone,
        }
    }

    pub fn time(&self) -> XsTime {
        XsTime {
            hour: self.hour,
            minute: self.minute,
            millisecond: self.millisecond,
            timezone: self.timezone,
        }
    }

    /// Whole seconds within the minute
    pub const fn second(&self) -> i32 {
        self.millisecond / 1000
    }

    /// Milliseconds elapsed since midnight
    pub fn millis_of_day(&self) -> i64 {
        self.time().millis_of_day()
    }

    pub fn with_timezone(mut self, timezone: Option<Timezone>) -> Self {
        self.timezone = timezone;
        self
    }
}

/// Fields of an xs:date, also used for the gregorian fragment types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct XsDate {
    pub year: i16,
    pub month: u8,
    pub day: u8,
    pub timezone: Option<Timezone>,
}

impl XsDate {
    /// Reference leap year used by gMonthDay, gMonth and gDay
    pub const REFERENCE_YEAR: i16 = 1972;

    pub fn new(year: i16, month: u8, day: u8) -> Self {
        Self {
            year,
            month,
            day,
            timezone: None,
        }
    }

    pub fn with_timezone(mut self, timezone: Option<Timezone>) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn is_valid(&self) -> bool {
        calendar::is_valid_date(self.year as i64, self.month, self.day)
    }

    /// The instant at midnight starting this day
    pub fn at_midnight(&self) -> XsDateTime {
        XsDateTime::new(*self, XsTime::MIDNIGHT.with_timezone(self.timezone))
    }
}

/// Fields of an xs:time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct XsTime {
    pub hour: u8,
    pub minute: u8,
    /// Seconds and milliseconds within the minute (`seconds * 1000 + ms`)
    pub millisecond: i32,
    pub timezone: Option<Timezone>,
}

impl XsTime {
    pub const MIDNIGHT: XsTime = XsTime {
        hour: 0,
        minute: 0,
        millisecond: 0,
        timezone: None,
    };

    pub fn new(hour: u8, minute: u8, millisecond: i32) -> Self {
        Self {
            hour,
            minute,
            millisecond,
            timezone: None,
        }
    }

    pub fn with_timezone(mut self, timezone: Option<Timezone>) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn is_valid(&self) -> bool {
        calendar::is_valid_time(self.hour, self.minute, self.millisecond)
    }

    /// Milliseconds elapsed since midnight
    pub fn millis_of_day(&self) -> i64 {
        self.hour as i64 * calendar::MILLIS_PER_HOUR
            + self.minute as i64 * MILLIS_PER_MINUTE
            + self.millisecond as i64
    }

    /// Build a time from milliseconds since midnight, wrapping into one day
    pub fn from_millis_of_day(millis: i64, timezone: Option<Timezone>) -> Self {
        let millis = millis.rem_euclid(calendar::MILLIS_PER_DAY);
        Self {
            hour: (millis / calendar::MILLIS_PER_HOUR) as u8,
            minute: (millis % calendar::MILLIS_PER_HOUR / MILLIS_PER_MINUTE) as u8,
            millisecond: (millis % MILLIS_PER_MINUTE) as i32,
            timezone,
        }
    }
}

/// A full xs:duration: independent year-month and day-time halves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct XsDuration {
    pub months: i32,
    pub millis: i64,
}

impl XsDuration {
    pub const ZERO: XsDuration = XsDuration {
        months: 0,
        millis: 0,
    };

    pub const fn new(months: i32, millis: i64) -> Self {
        Self { months, millis }
    }

    /// Both halves must share one sign
    pub const fn is_valid(&self) -> bool {
        !((self.months > 0 && self.millis < 0) || (self.months < 0 && self.millis > 0))
    }

    pub const fn is_negative(&self) -> bool {
        self.months < 0 || self.millis < 0
    }

    pub const fn is_zero(&self) -> bool {
        self.months == 0 && self.millis == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timezone_bounds() {
        assert!(Timezone::new(14, 0).is_some());
        assert!(Timezone::new(14, 1).is_none());
        assert!(Timezone::new(-5, -30).is_some());
        assert!(Timezone::new(5, -30).is_none());
        assert_eq!(Timezone::new(-5, -30).unwrap().offset_minutes(), -330);
    }

    #[test]
    fn test_timezone_wire() {
        assert_eq!(Timezone::to_wire(None), (TIMEZONE_NULL, TIMEZONE_NULL));
        assert_eq!(Timezone::from_wire(127, 127), Ok(None));
        assert_eq!(Timezone::from_wire(2, 0), Ok(Timezone::new(2, 0)));
        assert_eq!(Timezone::from_wire(20, 0), Err((20, 0)));
    }

    #[test]
    fn test_time_from_millis_wraps() {
        let t = XsTime::from_millis_of_day(-1, None);
        assert_eq!((t.hour, t.minute, t.millisecond), (23, 59, 59_999));
        let t = XsTime::from_millis_of_day(calendar::MILLIS_PER_DAY + 61_500, None);
        assert_eq!((t.hour, t.minute, t.millisecond), (0, 1, 1_500));
    }

    #[test]
    fn test_duration_sign_rules() {
        assert!(XsDuration::new(1, 5).is_valid());
        assert!(!XsDuration::new(-1, 5).is_valid());
        assert!(XsDuration::new(-1, 0).is_negative());
    }
}
