// Plain data model shared by the engine and any presentation layer:
// cells, records, record collections, the date window and the client selection,
// plus the lenient number coercions they are read with.

pub mod models;
pub mod utils;

pub use models::{CellValue, ClientSelection, DateWindow, Field, Record, RecordCollection};
