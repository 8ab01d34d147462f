// Record filtering by date window and client selection.
pub mod aggregates;

use shared::models::{CellValue, ClientSelection, DateWindow, Record, RecordCollection};

use crate::config::FieldMap;
use crate::dates::DateParser;

/// Selects the records of `records` that fall inside `window` and belong to a selected
/// client. Null slots never pass. Each predicate only applies when its input is set:
/// an unbounded window or an empty selection lets every record through.
pub fn filter_records(
    records: &RecordCollection,
    window: &DateWindow,
    selection: &ClientSelection,
    parser: &DateParser,
    fields: &FieldMap,
) -> Vec<Record> {
    tracing::debug!(
        total = records.len(),
        start = ?window.start,
        end = ?window.end,
        clients = selection.len(),
        "Filtering records"
    );

    let filtered: Vec<Record> = records
        .slots()
        .iter()
        .filter_map(|slot| match slot {
            Some(record) => Some(record),
            None => {
                tracing::warn!("Skipping null record");
                None
            }
        })
        .filter(|record| passes_date(record, window, parser, fields) && passes_client(record, selection, fields))
        .cloned()
        .collect();

    tracing::debug!(count = filtered.len(), "Filtering done");
    filtered
}

fn passes_date(record: &Record, window: &DateWindow, parser: &DateParser, fields: &FieldMap) -> bool {
    if !window.is_active() {
        return true;
    }

    let raw = match record.field(&fields.date).value() {
        Some(value) if has_date_value(value) => value,
        _ => {
            tracing::warn!(field = %fields.date, "Record has no date, excluding it");
            return false;
        }
    };

    let parsed = parser.parse(raw);
    match parsed.and_hms_opt(0, 0, 0) {
        Some(instant) => window.contains(instant),
        None => false,
    }
}

// Serial 0 still counts as a value; the parser decides what it means.
fn has_date_value(value: &CellValue) -> bool {
    !value.is_falsy() || *value == CellValue::Number(0.0)
}

fn passes_client(record: &Record, selection: &ClientSelection, fields: &FieldMap) -> bool {
    if selection.is_empty() {
        return true;
    }
    aggregates::client_name(record, fields).map_or(false, |name| selection.contains(&name))
}
