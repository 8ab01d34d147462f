// Engine library root
// Loading shipment sheets, normalizing their dates, filtering by date window and client,
// and deriving the report values shown to the user.

pub mod config;
pub mod data;
pub mod dates;
pub mod error;
pub mod filter;
pub mod report;

pub use error::{DateParseError, EngineError};
pub use report::{derive_report, ReportSession, ShipmentReport};
