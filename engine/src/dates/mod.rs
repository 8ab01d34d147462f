// Date normalization: raw cells to calendar dates and back to display strings.

pub mod formatter;
pub mod parser;

pub use formatter::format_date;
pub use parser::{parse_date, DateOrigin, DateParser, ParsedDate, TextRule};
