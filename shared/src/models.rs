use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::collections::BTreeSet;

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A single cell as it arrives from the spreadsheet decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    Null,
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// Converts a JSON scalar. Arrays and objects have no cell meaning and become `Null`.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => CellValue::Text(s.clone()),
            Value::Number(n) => n.as_f64().map_or(CellValue::Null, CellValue::Number),
            Value::Bool(b) => CellValue::Bool(*b),
            Value::Null | Value::Array(_) | Value::Object(_) => CellValue::Null,
        }
    }

    /// Null, empty text, zero, NaN and `false` all count as "no value" for the filters
    /// and the text summary.
    pub fn is_falsy(&self) -> bool {
        match self {
            CellValue::Text(s) => s.is_empty(),
            CellValue::Number(n) => *n == 0.0 || n.is_nan(),
            CellValue::Bool(b) => !b,
            CellValue::Date(_) => false,
            CellValue::Null => true,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CellValue::Text(_) => "text",
            CellValue::Number(_) => "number",
            CellValue::Bool(_) => "bool",
            CellValue::Date(_) => "date",
            CellValue::Null => "null",
        }
    }

    /// Plain string form used when cells are written into text lines.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::Null => String::new(),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Text(s) => serializer.serialize_str(s),
            // Whole numbers print without a fraction, as the sheet shows them.
            // serde_json writes non-finite numbers as null.
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER => {
                serializer.serialize_i64(*n as i64)
            }
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Date(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
            CellValue::Null => serializer.serialize_unit(),
        }
    }
}

/// Result of looking a field up on a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'a> {
    Absent,
    Present(&'a CellValue),
}

impl<'a> Field<'a> {
    pub fn value(self) -> Option<&'a CellValue> {
        match self {
            Field::Present(value) => Some(value),
            Field::Absent => None,
        }
    }

    /// The value, if present and not falsy.
    pub fn truthy(self) -> Option<&'a CellValue> {
        self.value().filter(|value| !value.is_falsy())
    }

    pub fn is_absent(self) -> bool {
        matches!(self, Field::Absent)
    }
}

/// One sheet row: field name to cell, in column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from a JSON object. Anything else is not a record.
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(
            object
                .iter()
                .map(|(name, cell)| (name.clone(), CellValue::from_json(cell)))
                .collect(),
        )
    }

    pub fn field(&self, name: &str) -> Field<'_> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map_or(Field::Absent, |(_, value)| Field::Present(value))
    }

    /// Returns a copy with `name` set to `value`. An existing field keeps its position,
    /// a new one is appended.
    pub fn with_field(&self, name: &str, value: CellValue) -> Record {
        let mut copy = self.clone();
        copy.set(name.to_string(), value);
        copy
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn set(&mut self, name: String, value: CellValue) {
        match self.fields.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }
}

impl FromIterator<(String, CellValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, CellValue)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (name, value) in iter {
            record.set(name, value);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// The rows of one loaded file. `None` slots stand for null entries in the decoded
/// array; they are kept so that every stage can skip them explicitly.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordCollection {
    slots: Vec<Option<Record>>,
}

impl RecordCollection {
    pub fn new(slots: Vec<Option<Record>>) -> Self {
        Self { slots }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Anything other than a JSON array (including `null`) is an empty collection.
    /// Array entries that are not objects become `None` slots.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Array(items) => Self::new(items.iter().map(Record::from_json).collect()),
            other => {
                tracing::warn!(kind = json_kind(other), "Record input is not an array, treating it as empty");
                Self::empty()
            }
        }
    }

    pub fn from_json_str(input: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(input)?;
        Ok(Self::from_json(&value))
    }

    pub fn slots(&self) -> &[Option<Record>] {
        &self.slots
    }

    /// Non-null records, in order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl From<Vec<Record>> for RecordCollection {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records.into_iter().map(Some).collect())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Inclusive date range. Either side may be open. `start > end` is allowed and simply
/// matches nothing.
///
/// A window is active as soon as a bound was entered, even one that did not parse: the
/// date filter then still drops records without a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    entered: bool,
}

impl DateWindow {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self {
            start,
            end,
            entered: start.is_some() || end.is_some(),
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Builds a window from the two date inputs of the filter form (`YYYY-MM-DD`).
    /// An empty input is an open side; an unparsable one is logged and also left open,
    /// but still makes the window active.
    pub fn from_inputs(start: &str, end: &str) -> Self {
        Self {
            start: parse_bound(start, "start"),
            end: parse_bound(end, "end"),
            entered: !start.is_empty() || !end.is_empty(),
        }
    }

    /// No usable bound on either side.
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether the date filter applies at all.
    pub fn is_active(&self) -> bool {
        self.entered || !self.is_unbounded()
    }

    /// First instant of the start day.
    pub fn start_instant(&self) -> Option<NaiveDateTime> {
        self.start.and_then(|day| day.and_hms_milli_opt(0, 0, 0, 0))
    }

    /// Last millisecond of the end day.
    pub fn end_instant(&self) -> Option<NaiveDateTime> {
        let last_ms = NaiveTime::from_hms_milli_opt(23, 59, 59, 999)?;
        self.end.map(|day| day.and_time(last_ms))
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start_instant().map_or(true, |start| instant >= start)
            && self.end_instant().map_or(true, |end| instant <= end)
    }
}

fn parse_bound(input: &str, side: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        Ok(day) => Some(day),
        Err(e) => {
            tracing::warn!(side, input, error = %e, "Invalid window bound, ignoring it");
            None
        }
    }
}

/// Client names chosen in the filter. Empty means every client passes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientSelection {
    names: BTreeSet<String>,
}

impl ClientSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Adds `name` if it is not selected yet, removes it otherwise.
    pub fn toggle(&mut self, name: &str) {
        if !self.names.remove(name) {
            self.names.insert(name.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ClientSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}
