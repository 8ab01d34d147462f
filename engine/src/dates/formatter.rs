// Calendar date → display string.
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use shared::models::CellValue;

lazy_static::lazy_static! {
    // Year-first raw values ("2024-03-15", "2024/3/5") are echoed back year-first.
    // ASCII digits only, and nothing may follow the day.
    static ref YEAR_FIRST_RE: Regex = Regex::new(r"^[0-9]{4}[-/][0-9]{1,2}[-/][0-9]{1,2}$").unwrap();
}

/// Formats `date` as `YYYY-MM-DD` when `original` is a year-first text value, and as
/// `DD.MM.YYYY` otherwise. Only the family is mirrored, not the exact separator.
pub fn format_date(date: NaiveDate, original: Option<&CellValue>) -> String {
    let year_first = matches!(
        original,
        Some(CellValue::Text(raw)) if YEAR_FIRST_RE.is_match(raw.trim())
    );

    if year_first {
        format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
    } else {
        format!("{:02}.{:02}.{:04}", date.day(), date.month(), date.year())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parser::DateParser;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_is_day_first() {
        assert_eq!(format_date(day(2024, 3, 5), None), "05.03.2024");
        assert_eq!(format_date(day(2024, 3, 5), Some(&CellValue::Number(45356.0))), "05.03.2024");
        assert_eq!(format_date(day(2024, 3, 5), Some(&CellValue::text("05/03/2024"))), "05.03.2024");
    }

    #[test]
    fn test_year_first_hint() {
        assert_eq!(format_date(day(2024, 3, 5), Some(&CellValue::text("2024-03-05"))), "2024-03-05");
        assert_eq!(format_date(day(2024, 3, 5), Some(&CellValue::text("2024/3/5"))), "2024-03-05");
        assert_eq!(format_date(day(2024, 3, 5), Some(&CellValue::text(" 2024-3-05 "))), "2024-03-05");
    }

    #[test]
    fn test_hint_with_trailing_text_is_day_first() {
        assert_eq!(format_date(day(2024, 3, 5), Some(&CellValue::text(" 2024-3-05 08:00"))), "05.03.2024");
        assert_eq!(format_date(day(2024, 3, 15), Some(&CellValue::text("2024-03-15 10:00"))), "15.03.2024");
    }

    #[test]
    fn test_hint_needs_ascii_digits() {
        assert_eq!(format_date(day(2024, 3, 15), Some(&CellValue::text("٢٠٢٤-03-15"))), "15.03.2024");
    }

    #[test]
    fn test_hint_must_be_year_first_at_the_start() {
        assert_eq!(format_date(day(2024, 3, 5), Some(&CellValue::text("on 2024-03-05"))), "05.03.2024");
        assert_eq!(format_date(day(2024, 3, 5), Some(&CellValue::text("2024.03.05"))), "05.03.2024");
    }

    #[test]
    fn test_round_trip_keeps_the_input_family() {
        let parser = DateParser::with_today(day(2030, 1, 1));
        for raw in ["2024-03-15", "15.03.2024"] {
            let value = CellValue::text(raw);
            assert_eq!(format_date(parser.parse(&value), Some(&value)), raw);
        }
    }
}
