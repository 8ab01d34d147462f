pub mod csv_loader;
pub mod headers;
pub mod workbook_loader;

use shared::models::RecordCollection;
use std::path::Path;

use crate::config::ReportSettings;
use crate::error::EngineError;
use csv_loader::ShipmentCsvLoader;
use workbook_loader::WorkbookLoader;

/// Loads a shipment sheet, picking the reader from the file extension. Delimited text
/// (`csv`, `txt`, `tsv`) goes through the CSV reader, everything else is opened as a
/// workbook.
pub fn load_records(path: &Path, settings: &ReportSettings) -> Result<RecordCollection, EngineError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    tracing::info!(path = %path.display(), extension = %extension, "Loading shipment records");
    match extension.as_str() {
        "csv" | "txt" => ShipmentCsvLoader::load_records_from_csv(path, settings.csv_delimiter_byte()?),
        "tsv" => ShipmentCsvLoader::load_records_from_csv(path, b'\t'),
        _ => WorkbookLoader::load_records_from_workbook(path),
    }
}
