//! Lexical parsers for casts from string and untypedAtomic
//!
//! Every parser trims XML whitespace first and then accepts exactly the
//! lexical space of its type. A form that does not match the grammar is
//! FORG0001; a form that matches but names a field outside its calendar
//! range is FODT0001.

use crate::error::{EvalError, EvalResult};
use regex::Regex;
use std::sync::LazyLock;
use xqvalue_types::calendar::{self, MILLIS_PER_DAY, MILLIS_PER_HOUR, MILLIS_PER_MINUTE, MILLIS_PER_SECOND};
use xqvalue_types::{DECIMAL_PRECISION, Timezone, ValueTag, XsDate, XsDateTime, XsDecimal, XsDuration, XsTime};

// ============================================================================
// Whitespace
// ============================================================================

pub(crate) fn is_xml_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Strip leading and trailing XML whitespace
pub fn trim(text: &str) -> &str {
    text.trim_matches(is_xml_space)
}

/// The `replace` whitespace facet: every whitespace character becomes a space
pub fn replace_whitespace(text: &str) -> String {
    text.chars()
        .map(|c| if is_xml_space(c) { ' ' } else { c })
        .collect()
}

/// The `collapse` whitespace facet
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split(is_xml_space).filter(|w| !w.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

// ============================================================================
// Name patterns
// ============================================================================

type Pattern = LazyLock<Result<Regex, regex::Error>>;

static NCNAME: Pattern =
    LazyLock::new(|| Regex::new(r"^[\p{L}_][\p{L}\p{N}\p{Mn}\p{Mc}_.\-\x{B7}]*$"));
static NAME: Pattern =
    LazyLock::new(|| Regex::new(r"^[\p{L}_:][\p{L}\p{N}\p{Mn}\p{Mc}_:.\-\x{B7}]*$"));
static NMTOKEN: Pattern = LazyLock::new(|| Regex::new(r"^[\p{L}\p{N}\p{Mn}\p{Mc}_:.\-\x{B7}]+$"));
static LANGUAGE: Pattern = LazyLock::new(|| Regex::new(r"^[a-zA-Z]{1,8}(-[a-zA-Z0-9]{1,8})*$"));

fn matches(pattern: &Pattern, text: &str) -> EvalResult<bool> {
    match &**pattern {
        Ok(regex) => Ok(regex.is_match(text)),
        Err(err) => Err(EvalError::internal(format!("name pattern failed to compile: {err}"))),
    }
}

pub fn is_ncname(text: &str) -> EvalResult<bool> {
    matches(&NCNAME, text)
}

pub fn is_name(text: &str) -> EvalResult<bool> {
    matches(&NAME, text)
}

pub fn is_nmtoken(text: &str) -> EvalResult<bool> {
    matches(&NMTOKEN, text)
}

pub fn is_language(text: &str) -> EvalResult<bool> {
    matches(&LANGUAGE, text)
}

// ============================================================================
// Scanner
// ============================================================================

struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn at_end(&self) -> bool {
        self.pos == self.text.len()
    }

    /// Consume a run of ASCII digits
    fn digits(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        &self.text[start..self.pos]
    }

    /// Consume exactly `n` digits
    fn fixed(&mut self, n: usize) -> Option<u32> {
        let digits = self.text.get(self.pos..self.pos + n)?;
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.pos += n;
        Some(digits.bytes().fold(0, |acc, b| acc * 10 + (b - b'0') as u32))
    }
}

// ============================================================================
// Boolean and integers
// ============================================================================

pub fn parse_boolean(text: &str) -> EvalResult<bool> {
    match trim(text) {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(EvalError::invalid_lexical(ValueTag::Boolean.name(), text)),
    }
}

/// Parse an integer lexical form, `[+-]?[0-9]+`
///
/// Digits accumulate with overflow checks; a value beyond the 64-bit range
/// is FOCA0003. The target's narrower range is checked by the caller.
pub fn parse_integer(text: &str, target: ValueTag) -> EvalResult<i64> {
    let trimmed = trim(text);
    let mut scanner = Scanner::new(trimmed);
    let negative = scanner.eat(b'-');
    if !negative {
        scanner.eat(b'+');
    }
    let digits = scanner.digits();
    if digits.is_empty() || !scanner.at_end() {
        return Err(EvalError::invalid_lexical(target.name(), text));
    }
    let mut value: i64 = 0;
    for byte in digits.bytes() {
        let digit = (byte - b'0') as i64;
        value = value
            .checked_mul(10)
            .and_then(|v| if negative { v.checked_sub(digit) } else { v.checked_add(digit) })
            .ok_or_else(|| EvalError::numeric_overflow(target.name(), trimmed))?;
    }
    Ok(value)
}

// ============================================================================
// Decimal
// ============================================================================

/// Parse a decimal lexical form, `[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)`
///
/// Leading integer zeros and trailing fractional zeros are insignificant.
/// More than the supported number of significant digits is FOCA0006.
pub fn parse_decimal(text: &str) -> EvalResult<XsDecimal> {
    let trimmed = trim(text);
    let mut scanner = Scanner::new(trimmed);
    let negative = scanner.eat(b'-');
    if !negative {
        scanner.eat(b'+');
    }
    let integer = scanner.digits();
    let fraction = if scanner.eat(b'.') { scanner.digits() } else { "" };
    if (integer.is_empty() && fraction.is_empty()) || !scanner.at_end() {
        return Err(EvalError::invalid_lexical(ValueTag::Decimal.name(), text));
    }
    let integer = integer.trim_start_matches('0');
    let fraction = fraction.trim_end_matches('0');
    let significant = integer
        .bytes()
        .chain(fraction.bytes())
        .skip_while(|b| *b == b'0')
        .map(|b| (b - b'0') as i64);
    let mut mantissa: i64 = 0;
    let mut count = 0u32;
    for digit in significant {
        count += 1;
        if count > DECIMAL_PRECISION {
            return Err(EvalError::too_many_digits(trimmed));
        }
        mantissa = mantissa * 10 + digit;
    }
    if fraction.len() > DECIMAL_PRECISION as usize {
        return Err(EvalError::too_many_digits(trimmed));
    }
    let mantissa = if negative { -mantissa } else { mantissa };
    XsDecimal::new(mantissa, fraction.len() as i8).ok_or_else(|| EvalError::too_many_digits(trimmed))
}

// ============================================================================
// Float and double
// ============================================================================

const MAX_MANTISSA_DIGITS: u32 = 19;

const F64_POW10: [f64; 23] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16, 1e17,
    1e18, 1e19, 1e20, 1e21, 1e22,
];

const F32_POW10: [f32; 11] = [1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10];

/// A scanned floating-point literal: `mantissa * 10^exponent`
#[derive(Debug, Clone, Copy, PartialEq)]
enum FloatLiteral {
    Finite {
        negative: bool,
        mantissa: u64,
        exponent: i32,
        /// No nonzero digit was dropped from the mantissa
        exact: bool,
    },
    Infinity {
        negative: bool,
    },
    NaN,
}

fn scan_float(text: &str, target: ValueTag) -> EvalResult<FloatLiteral> {
    match text {
        "INF" | "+INF" => return Ok(FloatLiteral::Infinity { negative: false }),
        "-INF" => return Ok(FloatLiteral::Infinity { negative: true }),
        "NaN" => return Ok(FloatLiteral::NaN),
        _ => {}
    }
    let invalid = || EvalError::invalid_lexical(target.name(), text);
    let mut scanner = Scanner::new(text);
    let negative = scanner.eat(b'-');
    if !negative {
        scanner.eat(b'+');
    }
    let integer = scanner.digits();
    let fraction = if scanner.eat(b'.') { scanner.digits() } else { "" };
    if integer.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }

    let mut mantissa: u64 = 0;
    let mut kept = 0u32;
    let mut exponent: i64 = 0;
    let mut exact = true;
    for byte in integer.bytes() {
        let digit = (byte - b'0') as u64;
        if kept < MAX_MANTISSA_DIGITS {
            if mantissa != 0 || digit != 0 {
                mantissa = mantissa * 10 + digit;
                kept += 1;
            }
        } else {
            exponent += 1;
            exact &= digit == 0;
        }
    }
    for byte in fraction.bytes() {
        let digit = (byte - b'0') as u64;
        if kept < MAX_MANTISSA_DIGITS {
            if mantissa != 0 || digit != 0 {
                mantissa = mantissa * 10 + digit;
                kept += 1;
            }
            exponent -= 1;
        } else {
            exact &= digit == 0;
        }
    }

    if scanner.eat(b'e') || scanner.eat(b'E') {
        let exp_negative = scanner.eat(b'-');
        if !exp_negative {
            scanner.eat(b'+');
        }
        let digits = scanner.digits();
        if digits.is_empty() {
            return Err(invalid());
        }
        let magnitude = digits
            .bytes()
            .fold(0i64, |acc, b| (acc * 10 + (b - b'0') as i64).min(1_000_000));
        exponent += if exp_negative { -magnitude } else { magnitude };
    }
    if !scanner.at_end() {
        return Err(invalid());
    }
    Ok(FloatLiteral::Finite {
        negative,
        mantissa,
        exponent: exponent.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
        exact,
    })
}

/// Parse an xs:double lexical form
///
/// Literals whose mantissa and power of ten are both exactly representable
/// are computed with one multiplication or division; the rest go through
/// the correctly rounded standard conversion of the already validated text.
pub fn parse_double(text: &str) -> EvalResult<f64> {
    let trimmed = trim(text);
    match scan_float(trimmed, ValueTag::Double)? {
        FloatLiteral::NaN => Ok(f64::NAN),
        FloatLiteral::Infinity { negative } => Ok(if negative { f64::NEG_INFINITY } else { f64::INFINITY }),
        FloatLiteral::Finite {
            negative,
            mantissa,
            exponent,
            exact,
        } => {
            let magnitude = if mantissa == 0 {
                0.0
            } else if exact && mantissa <= 1 << 53 && exponent.unsigned_abs() < F64_POW10.len() as u32 {
                let m = mantissa as f64;
                let scale = F64_POW10[exponent.unsigned_abs() as usize];
                if exponent >= 0 { m * scale } else { m / scale }
            } else {
                return trimmed
                    .parse::<f64>()
                    .map_err(|_| EvalError::invalid_lexical(ValueTag::Double.name(), text));
            };
            Ok(if negative { -magnitude } else { magnitude })
        }
    }
}

/// Parse an xs:float lexical form
pub fn parse_float(text: &str) -> EvalResult<f32> {
    let trimmed = trim(text);
    match scan_float(trimmed, ValueTag::Float)? {
        FloatLiteral::NaN => Ok(f32::NAN),
        FloatLiteral::Infinity { negative } => Ok(if negative { f32::NEG_INFINITY } else { f32::INFINITY }),
        FloatLiteral::Finite {
            negative,
            mantissa,
            exponent,
            exact,
        } => {
            let magnitude = if mantissa == 0 {
                0.0
            } else if exact && mantissa <= 1 << 24 && exponent.unsigned_abs() < F32_POW10.len() as u32 {
                let m = mantissa as f32;
                let scale = F32_POW10[exponent.unsigned_abs() as usize];
                if exponent >= 0 { m * scale } else { m / scale }
            } else {
                return trimmed
                    .parse::<f32>()
                    .map_err(|_| EvalError::invalid_lexical(ValueTag::Float.name(), text));
            };
            Ok(if negative { -magnitude } else { magnitude })
        }
    }
}

// ============================================================================
// Durations
// ============================================================================

/// A parsed duration and which of its halves the lexical form mentioned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationLexeme {
    pub value: XsDuration,
    pub has_year_month: bool,
    pub has_day_time: bool,
}

/// Designators in the order they may appear; index 3 onward follow `T`
const DESIGNATORS: [u8; 6] = [b'Y', b'M', b'D', b'H', b'M', b'S'];

const DESIGNATOR_MILLIS: [i64; 6] = [0, 0, MILLIS_PER_DAY, MILLIS_PER_HOUR, MILLIS_PER_MINUTE, MILLIS_PER_SECOND];

/// Parse the `-?PnYnMnDTnHnMnS` grammar
pub fn parse_duration_lexeme(text: &str, target: ValueTag) -> EvalResult<DurationLexeme> {
    let trimmed = trim(text);
    let invalid = || EvalError::invalid_lexical(target.name(), text);
    let overflow = || EvalError::duration_overflow(format!("cast of {trimmed:?} to {target}"));

    let mut scanner = Scanner::new(trimmed);
    let negative = scanner.eat(b'-');
    if !scanner.eat(b'P') {
        return Err(invalid());
    }

    let mut months: i128 = 0;
    let mut millis: i128 = 0;
    let mut next = 0usize;
    let mut seen_time = false;
    let mut components = 0;
    let mut time_components = 0;
    let mut has_year_month = false;
    let mut has_day_time = false;

    while !scanner.at_end() {
        if scanner.eat(b'T') {
            if seen_time {
                return Err(invalid());
            }
            seen_time = true;
            next = next.max(3);
            continue;
        }
        let digits = scanner.digits();
        if digits.is_empty() {
            return Err(invalid());
        }
        let fraction = if scanner.eat(b'.') { Some(scanner.digits()) } else { None };
        let designator = scanner.peek().ok_or_else(invalid)?;
        scanner.pos += 1;

        let slot = (next..DESIGNATORS.len())
            .find(|&i| DESIGNATORS[i] == designator && (i >= 3) == seen_time)
            .ok_or_else(invalid)?;
        next = slot + 1;
        if fraction.is_some() && slot != 5 {
            return Err(invalid());
        }

        let amount = digits.bytes().try_fold(0i128, |acc, b| {
            acc.checked_mul(10).and_then(|v| v.checked_add((b - b'0') as i128))
        });
        let amount = amount.ok_or_else(overflow)?;
        components += 1;
        match slot {
            0 => {
                months = amount.checked_mul(12).and_then(|m| months.checked_add(m)).ok_or_else(overflow)?;
                has_year_month = true;
            }
            1 => {
                months = months.checked_add(amount).ok_or_else(overflow)?;
                has_year_month = true;
            }
            _ => {
                let mut part = amount.checked_mul(DESIGNATOR_MILLIS[slot] as i128).ok_or_else(overflow)?;
                if let Some(fraction) = fraction {
                    if fraction.is_empty() {
                        return Err(invalid());
                    }
                    part = part.checked_add(fraction_millis(fraction) as i128).ok_or_else(overflow)?;
                }
                millis = millis.checked_add(part).ok_or_else(overflow)?;
                has_day_time = true;
                if slot >= 3 {
                    time_components += 1;
                }
            }
        }
    }
    if components == 0 || (seen_time && time_components == 0) {
        return Err(invalid());
    }
    // Sign before narrowing; the negative ranges are one wider
    let (months, millis) = if negative { (-months, -millis) } else { (months, millis) };
    let months = i32::try_from(months).map_err(|_| overflow())?;
    let millis = i64::try_from(millis).map_err(|_| overflow())?;
    Ok(DurationLexeme {
        value: XsDuration::new(months, millis),
        has_year_month,
        has_day_time,
    })
}

/// Milliseconds in a fractional-second digit string, truncated
fn fraction_millis(fraction: &str) -> i64 {
    fraction
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(3)
        .fold(0, |acc, b| acc * 10 + (b - b'0') as i64)
}

pub fn parse_duration(text: &str) -> EvalResult<XsDuration> {
    Ok(parse_duration_lexeme(text, ValueTag::Duration)?.value)
}

/// Parse an xs:yearMonthDuration, which admits only years and months
pub fn parse_year_month_duration(text: &str) -> EvalResult<i32> {
    let lexeme = parse_duration_lexeme(text, ValueTag::YearMonthDuration)?;
    if lexeme.has_day_time {
        return Err(EvalError::invalid_lexical(ValueTag::YearMonthDuration.name(), text));
    }
    Ok(lexeme.value.months)
}

/// Parse an xs:dayTimeDuration, which admits only days and time
pub fn parse_day_time_duration(text: &str) -> EvalResult<i64> {
    let lexeme = parse_duration_lexeme(text, ValueTag::DayTimeDuration)?;
    if lexeme.has_year_month {
        return Err(EvalError::invalid_lexical(ValueTag::DayTimeDuration.name(), text));
    }
    Ok(lexeme.value.millis)
}

// ============================================================================
// Dates and times
// ============================================================================

struct DateTimeParser<'a> {
    scanner: Scanner<'a>,
    text: &'a str,
    target: ValueTag,
}

impl<'a> DateTimeParser<'a> {
    fn new(text: &'a str, target: ValueTag) -> Self {
        Self {
            scanner: Scanner::new(trim(text)),
            text,
            target,
        }
    }

    fn invalid(&self) -> EvalError {
        EvalError::invalid_lexical(self.target.name(), self.text)
    }

    fn out_of_calendar(&self, message: impl Into<String>) -> EvalError {
        EvalError::invalid_date_time(self.target.name(), message)
    }

    fn expect(&mut self, byte: u8) -> EvalResult<()> {
        if self.scanner.eat(byte) { Ok(()) } else { Err(self.invalid()) }
    }

    fn two_digits(&mut self) -> EvalResult<u8> {
        self.scanner.fixed(2).map(|v| v as u8).ok_or_else(|| self.invalid())
    }

    /// `-?[0-9]{4,}`, no leading zero beyond four digits
    fn year(&mut self) -> EvalResult<i16> {
        let negative = self.scanner.eat(b'-');
        let digits = self.scanner.digits();
        if digits.len() < 4 || (digits.len() > 4 && digits.starts_with('0')) {
            return Err(self.invalid());
        }
        let sign = if negative { "-" } else { "" };
        let out_of_range = || self.out_of_calendar(format!("year {sign}{digits} is out of range"));
        let year = digits.bytes().try_fold(0i16, |acc, b| {
            let digit = (b - b'0') as i16;
            acc.checked_mul(10)
                .and_then(|v| if negative { v.checked_sub(digit) } else { v.checked_add(digit) })
        });
        year.ok_or_else(out_of_range)
    }

    fn month(&mut self) -> EvalResult<u8> {
        let month = self.two_digits()?;
        if !(1..=12).contains(&month) {
            return Err(self.out_of_calendar(format!("month {month} is out of range")));
        }
        Ok(month)
    }

    fn day_of(&mut self, year: i64, month: u8) -> EvalResult<u8> {
        let day = self.two_digits()?;
        if !calendar::is_valid_date(year, month, day) {
            return Err(self.out_of_calendar(format!("day {day} does not exist in month {month} of year {year}")));
        }
        Ok(day)
    }

    /// `hh:mm:ss(.s+)?`; returns hour, minute and millisecond of minute.
    /// An hour of 24 is allowed only as `24:00:00`.
    fn time(&mut self) -> EvalResult<(u8, u8, i32)> {
        let hour = self.two_digits()?;
        self.expect(b':')?;
        let minute = self.two_digits()?;
        self.expect(b':')?;
        let second = self.two_digits()?;
        let mut millis = second as i32 * 1000;
        if self.scanner.eat(b'.') {
            let fraction = self.scanner.digits();
            if fraction.is_empty() {
                return Err(self.invalid());
            }
            millis += fraction_millis(fraction) as i32;
        }
        let end_of_day = hour == 24 && minute == 0 && millis == 0;
        if (hour > 23 && !end_of_day) || minute > 59 || second > 59 {
            return Err(self.out_of_calendar(format!("time {hour:02}:{minute:02}:{second:02} is out of range")));
        }
        Ok((hour, minute, millis))
    }

    /// Optional trailing `Z` or `[+-]hh:mm`, then end of input
    fn timezone(&mut self) -> EvalResult<Option<Timezone>> {
        let timezone = if self.scanner.at_end() {
            None
        } else if self.scanner.eat(b'Z') {
            Some(Timezone::UTC)
        } else {
            let sign: i8 = if self.scanner.eat(b'+') {
                1
            } else if self.scanner.eat(b'-') {
                -1
            } else {
                return Err(self.invalid());
            };
            let hour = self.two_digits()?;
            self.expect(b':')?;
            let minute = self.two_digits()?;
            if hour > 14 || minute > 59 {
                return Err(self.out_of_calendar(format!("timezone {hour:02}:{minute:02} is out of range")));
            }
            let timezone = Timezone::new(sign * hour as i8, sign * minute as i8)
                .ok_or_else(|| self.out_of_calendar(format!("timezone {hour:02}:{minute:02} is out of range")))?;
            Some(timezone)
        };
        if !self.scanner.at_end() {
            return Err(self.invalid());
        }
        Ok(timezone)
    }
}

/// The day after `year-month-day`
fn next_day(year: i16, month: u8, day: u8) -> Option<(i16, u8, u8)> {
    if day < calendar::days_in_month(year as i64, month) {
        Some((year, month, day + 1))
    } else if month < 12 {
        Some((year, month + 1, 1))
    } else {
        year.checked_add(1).map(|y| (y, 1, 1))
    }
}

pub fn parse_date_time(text: &str) -> EvalResult<XsDateTime> {
    let mut parser = DateTimeParser::new(text, ValueTag::DateTime);
    let year = parser.year()?;
    parser.expect(b'-')?;
    let month = parser.month()?;
    parser.expect(b'-')?;
    let day = parser.day_of(year as i64, month)?;
    parser.expect(b'T')?;
    let (hour, minute, millisecond) = parser.time()?;
    let timezone = parser.timezone()?;
    let (year, month, day, hour) = if hour == 24 {
        let (y, m, d) = next_day(year, month, day)
            .ok_or_else(|| parser.out_of_calendar("24:00:00 rolls past the last representable year"))?;
        (y, m, d, 0)
    } else {
        (year, month, day, hour)
    };
    Ok(XsDateTime {
        year,
        month,
        day,
        hour,
        minute,
        millisecond,
        timezone,
    })
}

pub fn parse_date(text: &str) -> EvalResult<XsDate> {
    let mut parser = DateTimeParser::new(text, ValueTag::Date);
    let year = parser.year()?;
    parser.expect(b'-')?;
    let month = parser.month()?;
    parser.expect(b'-')?;
    let day = parser.day_of(year as i64, month)?;
    let timezone = parser.timezone()?;
    Ok(XsDate::new(year, month, day).with_timezone(timezone))
}

pub fn parse_time(text: &str) -> EvalResult<XsTime> {
    let mut parser = DateTimeParser::new(text, ValueTag::Time);
    let (hour, minute, millisecond) = parser.time()?;
    let timezone = parser.timezone()?;
    Ok(XsTime::new(hour % 24, minute, millisecond).with_timezone(timezone))
}

/// Parse one of the gregorian fragment types into the shared date fields,
/// filling the fields the type omits with its defaults
pub fn parse_gregorian(text: &str, target: ValueTag) -> EvalResult<XsDate> {
    let mut parser = DateTimeParser::new(text, target);
    let reference = XsDate::REFERENCE_YEAR;
    let (year, month, day) = match target {
        ValueTag::GYear => (parser.year()?, 1, 1),
        ValueTag::GYearMonth => {
            let year = parser.year()?;
            parser.expect(b'-')?;
            (year, parser.month()?, 1)
        }
        ValueTag::GMonthDay => {
            parser.expect(b'-')?;
            parser.expect(b'-')?;
            let month = parser.month()?;
            parser.expect(b'-')?;
            (reference, month, parser.day_of(reference as i64, month)?)
        }
        ValueTag::GDay => {
            for _ in 0..3 {
                parser.expect(b'-')?;
            }
            (reference, 12, parser.day_of(reference as i64, 12)?)
        }
        ValueTag::GMonth => {
            parser.expect(b'-')?;
            parser.expect(b'-')?;
            (reference, parser.month()?, 1)
        }
        other => return Err(EvalError::internal(format!("{other} is not a gregorian type"))),
    };
    let timezone = parser.timezone()?;
    Ok(XsDate::new(year, month, day).with_timezone(timezone))
}

// ============================================================================
// Names and binaries
// ============================================================================

/// Split a QName lexical form into prefix and local part
pub fn parse_qname(text: &str) -> EvalResult<(&str, &str)> {
    let trimmed = trim(text);
    let (prefix, local) = trimmed.split_once(':').unwrap_or(("", trimmed));
    let prefix_ok = prefix.is_empty() || is_ncname(prefix)?;
    if !prefix_ok || !is_ncname(local)? {
        return Err(EvalError::invalid_lexical(ValueTag::QName.name(), text));
    }
    Ok((prefix, local))
}

/// Decode an xs:hexBinary lexical form (case-insensitive digit pairs)
pub fn parse_hex_binary(text: &str) -> EvalResult<Vec<u8>> {
    let trimmed = trim(text);
    let invalid = || EvalError::invalid_lexical(ValueTag::HexBinary.name(), text);
    if trimmed.len() % 2 != 0 {
        return Err(invalid());
    }
    trimmed
        .as_bytes()
        .chunks(2)
        .map(|pair| {
            let high = (pair[0] as char).to_digit(16);
            let low = (pair[1] as char).to_digit(16);
            match (high, low) {
                (Some(h), Some(l)) => Ok((h * 16 + l) as u8),
                _ => Err(invalid()),
            }
        })
        .collect()
}

/// Decode an xs:base64Binary lexical form; embedded spaces are ignored
pub fn parse_base64_binary(text: &str) -> EvalResult<Vec<u8>> {
    use base64::Engine as _;
    let compact: String = text.chars().filter(|c| !is_xml_space(*c)).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|_| EvalError::invalid_lexical(ValueTag::Base64Binary.name(), text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse() {
        assert_eq!(collapse_whitespace("  a \t\n b  "), "a b");
        assert_eq!(replace_whitespace("a\tb\n"), "a b ");
    }

    #[test]
    fn test_integer_extremes() {
        assert_eq!(parse_integer("-9223372036854775808", ValueTag::Integer).unwrap(), i64::MIN);
        assert_eq!(
            parse_integer("9223372036854775808", ValueTag::Integer).unwrap_err(),
            EvalError::numeric_overflow("xs:integer", "9223372036854775808")
        );
        assert!(parse_integer("1_000", ValueTag::Integer).is_err());
        assert!(parse_integer("", ValueTag::Integer).is_err());
    }

    #[test]
    fn test_float_scan_drops_excess_digits() {
        let literal = scan_float("12345678901234567890123", ValueTag::Double).unwrap();
        match literal {
            FloatLiteral::Finite { exponent, exact, .. } => {
                assert_eq!(exponent, 4);
                assert!(!exact);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_fraction_millis_truncates() {
        assert_eq!(fraction_millis("5"), 500);
        assert_eq!(fraction_millis("0125"), 12);
    }

    #[test]
    fn test_next_day_rolls_year() {
        assert_eq!(next_day(1999, 12, 31), Some((2000, 1, 1)));
        assert_eq!(next_day(2024, 2, 28), Some((2024, 2, 29)));
        assert_eq!(next_day(i16::MAX, 12, 31), None);
    }
}
