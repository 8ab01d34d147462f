use csv::ReaderBuilder;
use shared::models::{CellValue, RecordCollection};
use shared::utils::lenient;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::headers::SheetHeader;
use crate::error::EngineError;

pub struct ShipmentCsvLoader;

impl ShipmentCsvLoader {
    // Header: NUMÉRO DE SUIVI,日期,CLIENT,DESTINATION,VOLUME POIDS,PRIX
    // Example row: TRK001,24.12.2024,Acme,Lyon,2.5,100
    pub fn load_records_from_csv(file_path: &Path, delimiter: u8) -> Result<RecordCollection, EngineError> {
        let file = File::open(file_path)?;
        let records = Self::read_records(BufReader::new(file), delimiter)?;
        tracing::info!(path = %file_path.display(), rows = records.len(), "Loaded CSV records");
        Ok(records)
    }

    pub fn read_records<R: Read>(reader: R, delimiter: u8) -> Result<RecordCollection, EngineError> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true) // short rows just leave their trailing fields blank
            .from_reader(reader);

        let header = SheetHeader::from_cells(rdr.headers()?.iter());

        let mut records = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let row = result
                .map_err(|e| EngineError::CsvDataFormatError(format!("Error reading CSV record at line {}: {}", idx + 2, e)))?;

            match header.record_from_row(row.iter().map(typed_cell)) {
                Some(record) => records.push(record),
                None => tracing::trace!(line = idx + 2, "Skipping blank CSV row"),
            }
        }
        Ok(RecordCollection::from(records))
    }
}

// Cells that read fully as a number become numbers, as a spreadsheet would type them;
// everything else stays text. Empty cells are blank.
fn typed_cell(raw: &str) -> Option<CellValue> {
    if raw.is_empty() {
        return None;
    }
    Some(match lenient::exact_number(raw) {
        Some(number) => CellValue::Number(number),
        None => CellValue::text(raw),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_load_records_from_csv_valid_data() {
        let csv_content = "\
NUMÉRO DE SUIVI,日期,CLIENT,DESTINATION,VOLUME POIDS,PRIX
TRK001,24.12.2024,Acme,Lyon,2.5,100
TRK002,2025-01-05,Beta,Paris,1,50.75";
        let tmp_file = create_test_csv(csv_content);
        let records = ShipmentCsvLoader::load_records_from_csv(tmp_file.path(), b',').unwrap();

        assert_eq!(records.len(), 2);
        let first = records.slots()[0].as_ref().unwrap();
        assert_eq!(first.field("NUMÉRO DE SUIVI").value(), Some(&CellValue::text("TRK001")));
        assert_eq!(first.field("日期").value(), Some(&CellValue::text("24.12.2024")));
        assert_eq!(first.field("VOLUME POIDS").value(), Some(&CellValue::Number(2.5)));
        assert_eq!(first.field("PRIX").value(), Some(&CellValue::Number(100.0)));

        let second = records.slots()[1].as_ref().unwrap();
        assert_eq!(second.field("CLIENT").value(), Some(&CellValue::text("Beta")));
        assert_eq!(second.field("PRIX").value(), Some(&CellValue::Number(50.75)));
    }

    #[test]
    fn test_load_records_from_csv_semicolon_and_serials() {
        let csv_content = "\
日期;CLIENT;PRIX
45650;Acme;12abc";
        let tmp_file = create_test_csv(csv_content);
        let records = ShipmentCsvLoader::load_records_from_csv(tmp_file.path(), b';').unwrap();

        let first = records.slots()[0].as_ref().unwrap();
        assert_eq!(first.field("日期").value(), Some(&CellValue::Number(45650.0)));
        assert_eq!(first.field("PRIX").value(), Some(&CellValue::text("12abc")));
    }

    #[test]
    fn test_load_records_from_csv_blank_cells_and_rows() {
        let csv_content = "\
CLIENT,PRIX,
Acme,,x
,,
Beta";
        let tmp_file = create_test_csv(csv_content);
        let records = ShipmentCsvLoader::load_records_from_csv(tmp_file.path(), b',').unwrap();

        assert_eq!(records.len(), 2);
        let first = records.slots()[0].as_ref().unwrap();
        assert!(first.field("PRIX").is_absent());
        assert_eq!(first.field("__EMPTY").value(), Some(&CellValue::text("x")));

        let second = records.slots()[1].as_ref().unwrap();
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_load_records_from_csv_empty_file() {
        let tmp_file = create_test_csv("日期,CLIENT,PRIX"); // Only header
        let records = ShipmentCsvLoader::load_records_from_csv(tmp_file.path(), b',').unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_load_records_from_csv_missing_file() {
        let result = ShipmentCsvLoader::load_records_from_csv(Path::new("/nonexistent/shipments.csv"), b',');
        assert!(matches!(result, Err(EngineError::IoError { .. })));
    }

    #[test]
    fn test_load_records_from_csv_invalid_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"CLIENT\n\xff\xfe\n").unwrap();
        let result = ShipmentCsvLoader::load_records_from_csv(file.path(), b',');
        assert!(result.unwrap_err().to_string().contains("line 2"));
    }
}
