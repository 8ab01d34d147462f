// Engine configuration: sheet field labels and loader options.
pub mod settings;

pub use settings::{FieldMap, ReportSettings};
