// Raw cell → calendar date.
//
// Text is tried against an ordered chain of separator rules (dotted, dashed, slashed);
// the first rule that produces a valid date wins and a failing rule falls through to the
// next one. Numbers are spreadsheet serials in the 1900 date system. Nothing here fails:
// an unusable value resolves to the parser's "today", and the reason is kept on the
// result and logged.

use chrono::{Days, Local, NaiveDate};
use shared::models::CellValue;
use shared::utils::lenient;

use crate::error::DateParseError;

const MIN_YEAR: i64 = 1900;
const MAX_YEAR: i64 = 2100;

/// Which textual layout produced a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRule {
    DayMonthYearDotted,
    YearMonthDayDashed,
    DayMonthYearDashed,
    DayMonthYearSlashed,
    YearMonthDaySlashed,
}

/// Where the date of a `ParsedDate` came from.
#[derive(Debug, Clone, PartialEq)]
pub enum DateOrigin {
    Text(TextRule),
    Serial,
    Passthrough,
    Fallback(DateParseError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDate {
    pub date: NaiveDate,
    pub origin: DateOrigin,
}

impl ParsedDate {
    pub fn is_fallback(&self) -> bool {
        matches!(self.origin, DateOrigin::Fallback(_))
    }
}

type TextParser = fn(&str) -> Result<(TextRule, NaiveDate), DateParseError>;

// Order matters: a value containing both '.' and '-' is read as dotted first.
const TEXT_RULES: [(char, TextParser); 3] = [
    ('.', parse_dotted),
    ('-', parse_dashed),
    ('/', parse_slashed),
];

/// Date parser bound to one evaluation's notion of "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParser {
    today: NaiveDate,
}

impl DateParser {
    /// Captures the current local day as the fallback date.
    pub fn new() -> Self {
        Self::with_today(Local::now().date_naive())
    }

    pub fn with_today(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn parse(&self, value: &CellValue) -> NaiveDate {
        self.resolve(value).date
    }

    pub fn resolve(&self, value: &CellValue) -> ParsedDate {
        let attempt = match value {
            CellValue::Text(text) => parse_text(text).map(|(rule, date)| (DateOrigin::Text(rule), date)),
            CellValue::Number(serial) => from_serial(*serial).map(|date| (DateOrigin::Serial, date)),
            CellValue::Date(date) => Ok((DateOrigin::Passthrough, *date)),
            CellValue::Null => Err(DateParseError::Empty),
            CellValue::Bool(false) => Err(DateParseError::Empty),
            CellValue::Bool(true) => Err(DateParseError::UnsupportedType(value.kind())),
        };

        match attempt {
            Ok((origin, date)) => {
                tracing::trace!(raw = ?value, %date, ?origin, "Parsed date");
                ParsedDate { date, origin }
            }
            Err(reason) => {
                tracing::warn!(raw = ?value, %reason, fallback = %self.today, "Unparsable date, using today");
                ParsedDate {
                    date: self.today,
                    origin: DateOrigin::Fallback(reason),
                }
            }
        }
    }
}

impl Default for DateParser {
    fn default() -> Self {
        Self::new()
    }
}

/// One-off parse with today's date as the fallback.
pub fn parse_date(value: &CellValue) -> NaiveDate {
    DateParser::new().parse(value)
}

fn parse_text(text: &str) -> Result<(TextRule, NaiveDate), DateParseError> {
    if text.trim().is_empty() {
        return Err(DateParseError::Empty);
    }

    let mut last_error = None;
    for (separator, rule) in TEXT_RULES {
        if !text.contains(separator) {
            continue;
        }
        match rule(text) {
            Ok(parsed) => return Ok(parsed),
            Err(e) => {
                tracing::debug!(raw = text, %separator, reason = %e, "Date rule rejected value");
                last_error = Some(e);
            }
        }
    }
    Err(last_error.unwrap_or_else(|| DateParseError::NoSeparator(text.to_string())))
}

fn parse_dotted(text: &str) -> Result<(TextRule, NaiveDate), DateParseError> {
    let [day, month, year] = split_three(text, '.')?;
    Ok((TextRule::DayMonthYearDotted, date_from_parts(day, month, year)?))
}

fn parse_dashed(text: &str) -> Result<(TextRule, NaiveDate), DateParseError> {
    let [first, second, third] = split_three(text, '-')?;
    if char_len(first) == 4 {
        Ok((TextRule::YearMonthDayDashed, date_from_parts(third, second, first)?))
    } else if char_len(third) == 4 {
        Ok((TextRule::DayMonthYearDashed, date_from_parts(first, second, third)?))
    } else {
        Err(DateParseError::UnknownLayout(text.to_string()))
    }
}

// Slashed dates check the day-first layout before the year-first one.
fn parse_slashed(text: &str) -> Result<(TextRule, NaiveDate), DateParseError> {
    let [first, second, third] = split_three(text, '/')?;
    if char_len(third) == 4 {
        Ok((TextRule::DayMonthYearSlashed, date_from_parts(first, second, third)?))
    } else if char_len(first) == 4 {
        Ok((TextRule::YearMonthDaySlashed, date_from_parts(third, second, first)?))
    } else {
        Err(DateParseError::UnknownLayout(text.to_string()))
    }
}

fn split_three(text: &str, separator: char) -> Result<[&str; 3], DateParseError> {
    let parts: Vec<&str> = text.split(separator).collect();
    match parts.as_slice() {
        [a, b, c] => Ok([*a, *b, *c]),
        _ => Err(DateParseError::PartCount {
            separator,
            found: parts.len(),
        }),
    }
}

fn char_len(part: &str) -> usize {
    part.chars().count()
}

fn component(part: &str, name: &'static str) -> Result<i64, DateParseError> {
    lenient::leading_int(part).ok_or_else(|| DateParseError::NotNumeric {
        component: name,
        part: part.to_string(),
    })
}

fn date_from_parts(day: &str, month: &str, year: &str) -> Result<NaiveDate, DateParseError> {
    let day = component(day, "day")?;
    let month = component(month, "month")?;
    let year = component(year, "year")?;
    calendar_date(year, month, day)
}

/// Validates the component ranges, then builds the date. A day past the end of its
/// month (31.02) carries over into the following month.
fn calendar_date(year: i64, month: i64, day: i64) -> Result<NaiveDate, DateParseError> {
    let out_of_range = || DateParseError::OutOfRange { day, month, year };
    if !(1..=31).contains(&day) || !(1..=12).contains(&month) || !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(out_of_range());
    }
    NaiveDate::from_ymd_opt(year as i32, month as u32, 1)
        .and_then(|first| first.checked_add_days(Days::new(day as u64 - 1)))
        .ok_or_else(out_of_range)
}

/// 1900 date system: serial 1 is 1900-01-01 and serial 60 is the 29 February 1900 that
/// never existed, which we read as the 28th. From 61 on every serial is one day ahead,
/// so two days come off. Fractions are a time of day and are dropped.
fn from_serial(serial: f64) -> Result<NaiveDate, DateParseError> {
    if !serial.is_finite() {
        return Err(DateParseError::SerialOutOfRange(serial));
    }
    let whole = serial.trunc();
    if whole < 1.0 {
        return Err(DateParseError::SerialOutOfRange(serial));
    }

    if whole == 60.0 {
        return NaiveDate::from_ymd_opt(1900, 2, 28).ok_or(DateParseError::SerialOutOfRange(serial));
    }
    let offset = if whole >= 61.0 { whole - 2.0 } else { whole - 1.0 };

    NaiveDate::from_ymd_opt(1900, 1, 1)
        .and_then(|epoch| epoch.checked_add_days(Days::new(offset as u64)))
        .ok_or(DateParseError::SerialOutOfRange(serial))
}
