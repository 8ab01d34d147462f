use thiserror::Error;

/// Failures of the loaders and the settings file. The filtering pipeline itself never
/// fails; see `DateParseError` for the diagnostics it records instead.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV data format error: {0}")]
    CsvDataFormatError(String),

    #[error("Workbook read error: {source}")]
    WorkbookError {
        #[from]
        source: calamine::Error,
    },

    #[error("Workbook data format error: {0}")]
    WorkbookFormatError(String),

    #[error("JSON error: {source}")]
    JsonError {
        #[from]
        source: serde_json::Error,
    },
}

/// Why a raw value could not be turned into a calendar date. The parser recovers from
/// every one of these by falling back to today; they only travel along for logging.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DateParseError {
    #[error("empty date value")]
    Empty,

    #[error("unsupported date value of type {0}")]
    UnsupportedType(&'static str),

    #[error("no known separator in '{0}'")]
    NoSeparator(String),

    #[error("expected 3 parts separated by '{separator}', found {found}")]
    PartCount { separator: char, found: usize },

    #[error("no 4-digit year at either end of '{0}'")]
    UnknownLayout(String),

    #[error("{component} component '{part}' is not a number")]
    NotNumeric { component: &'static str, part: String },

    #[error("out of range: day {day}, month {month}, year {year}")]
    OutOfRange { day: i64, month: i64, year: i64 },

    #[error("date serial {0} is outside the 1900 date system")]
    SerialOutOfRange(f64),
}
