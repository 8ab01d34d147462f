// Values derived from a record set: client list, total price, text summary and the
// display copies with formatted dates.
use shared::models::{CellValue, Record, RecordCollection};
use shared::utils::lenient;
use std::collections::BTreeSet;

use crate::config::FieldMap;
use crate::dates::{format_date, DateParser};

/// The record's client, if it has a non-empty one.
pub fn client_name(record: &Record, fields: &FieldMap) -> Option<String> {
    record.field(&fields.client).truthy().map(CellValue::display_text)
}

/// Every client of the collection, deduplicated and sorted. Always computed over the
/// full collection so the client picker does not shrink while filters are active.
pub fn distinct_clients(records: &RecordCollection, fields: &FieldMap) -> Vec<String> {
    let clients: BTreeSet<String> = records
        .records()
        .filter_map(|record| client_name(record, fields))
        .collect();
    clients.into_iter().collect()
}

/// Coerces a price cell to a number: text is read up to its first non-numeric
/// character, anything unusable counts as 0.
pub fn price_value(value: Option<&CellValue>) -> f64 {
    let price = match value {
        Some(CellValue::Number(n)) => *n,
        Some(CellValue::Text(s)) => lenient::leading_float(s).unwrap_or(0.0),
        _ => 0.0,
    };
    if price.is_nan() {
        0.0
    } else {
        price
    }
}

pub fn total_price(records: &[Record], fields: &FieldMap) -> f64 {
    records
        .iter()
        .map(|record| price_value(record.field(&fields.price).value()))
        .sum()
}

/// Two-decimal price label. Values exactly halfway between two cents (0.125) round away
/// from zero.
pub fn price_label(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    // Only an odd number of eighths sits exactly on a half cent.
    let eighths = value * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 != 0.0 && eighths.abs() < MAX_EXACT_EIGHTHS {
        let eighths = eighths as i64;
        let cents = (25 * eighths + eighths.signum()) / 2;
        let sign = if cents < 0 { "-" } else { "" };
        let cents = cents.unsigned_abs();
        return format!("{}{}.{:02}", sign, cents / 100, cents % 100);
    }
    format!("{:.2}", value)
}

const MAX_EXACT_EIGHTHS: f64 = 9_007_199_254_740_992.0;

/// One line per record: tracking number, destination, weight with its unit, price.
/// Missing values leave their slot empty; the unit is always written.
pub fn text_summary(records: &[Record], fields: &FieldMap, weight_unit: &str) -> String {
    records
        .iter()
        .map(|record| {
            format!(
                "{} {} {}{} {}",
                text_or_blank(record, &fields.tracking),
                text_or_blank(record, &fields.destination),
                text_or_blank(record, &fields.weight),
                weight_unit,
                text_or_blank(record, &fields.price),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn text_or_blank(record: &Record, name: &str) -> String {
    record
        .field(name)
        .truthy()
        .map(CellValue::display_text)
        .unwrap_or_default()
}

/// Copies of `records` with the date field replaced by its display string.
///
/// The display format is chosen from the raw value of `fields.date_hint`, not from the
/// date field itself. With the default labels that is the `DATE` column while the value
/// written is `日期`.
// TODO: decide with the sheet owners whether the hint should come from `fields.date`;
// the two columns only agree on sheets that carry both.
pub fn display_records<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    parser: &DateParser,
    fields: &FieldMap,
) -> Vec<Record> {
    records
        .into_iter()
        .map(|record| {
            let raw = record.field(&fields.date).value().unwrap_or(&CellValue::Null);
            let date = parser.parse(raw);
            let hint = record.field(&fields.date_hint).value();
            record.with_field(&fields.date, CellValue::Text(format_date(date, hint)))
        })
        .collect()
}

/// Pretty JSON (2-space indentation) of display records.
pub fn to_display_json(records: &[Record]) -> String {
    serde_json::to_string_pretty(records).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to render display JSON");
        "[]".to_string()
    })
}
