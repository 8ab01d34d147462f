use calamine::{open_workbook_auto, Data, Reader};
use shared::models::{CellValue, RecordCollection};
use std::path::Path;

use super::headers::SheetHeader;
use crate::error::EngineError;

/// Reads the first worksheet of an xlsx/xlsm/xlsb/xls/ods file. The first row names the
/// fields, every later non-blank row becomes a record.
pub struct WorkbookLoader;

impl WorkbookLoader {
    pub fn load_records_from_workbook(file_path: &Path) -> Result<RecordCollection, EngineError> {
        let mut workbook = open_workbook_auto(file_path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| EngineError::WorkbookFormatError(format!("{} has no worksheet", file_path.display())))??;

        let mut rows = range.rows();
        let header = match rows.next() {
            Some(cells) => SheetHeader::from_cells(cells.iter().map(header_text)),
            None => {
                tracing::warn!(path = %file_path.display(), "First worksheet is empty");
                return Ok(RecordCollection::empty());
            }
        };

        let records: Vec<_> = rows
            .filter_map(|cells| header.record_from_row(cells.iter().map(sheet_cell)))
            .collect();

        tracing::info!(path = %file_path.display(), rows = records.len(), "Loaded workbook records");
        Ok(RecordCollection::from(records))
    }
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

// Date cells keep their serial number; the date parser turns serials into dates later.
fn sheet_cell(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(CellValue::text(s.as_str())),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::DateTime(dt) => Some(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellValue::text(s.as_str())),
        Data::Error(e) => {
            tracing::debug!(error = %e, "Skipping error cell");
            None
        }
        Data::Empty => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{Format, Workbook};
    use tempfile::tempdir;

    #[test]
    fn test_load_records_from_workbook_first_sheet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sheet.xlsx");

        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("dd/mm/yyyy");
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "日期").unwrap();
        sheet.write_string(0, 1, "CLIENT").unwrap();
        sheet.write_string(0, 2, "PRIX").unwrap();
        sheet.write_number_with_format(1, 0, 45650.0, &date_format).unwrap();
        sheet.write_string(1, 1, "Acme").unwrap();
        sheet.write_number(1, 2, 100.0).unwrap();
        // row 2 left blank
        sheet.write_string(3, 0, "05.01.2025").unwrap();
        sheet.write_string(3, 1, "Beta").unwrap();
        sheet.write_string(3, 2, "50").unwrap();
        workbook.save(&path).unwrap();

        let records = WorkbookLoader::load_records_from_workbook(&path).unwrap();
        assert_eq!(records.len(), 2);

        let first = records.slots()[0].as_ref().unwrap();
        assert_eq!(first.field("日期").value(), Some(&CellValue::Number(45650.0)));
        assert_eq!(first.field("CLIENT").value(), Some(&CellValue::text("Acme")));
        assert_eq!(first.field("PRIX").value(), Some(&CellValue::Number(100.0)));

        let second = records.slots()[1].as_ref().unwrap();
        assert_eq!(second.field("日期").value(), Some(&CellValue::text("05.01.2025")));
        assert_eq!(second.field("PRIX").value(), Some(&CellValue::text("50")));
    }

    #[test]
    fn test_load_records_from_workbook_missing_cells_are_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sheet.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "CLIENT").unwrap();
        sheet.write_string(0, 1, "DESTINATION").unwrap();
        sheet.write_string(1, 0, "Acme").unwrap();
        sheet.write_string(2, 1, "Lyon").unwrap();
        workbook.save(&path).unwrap();

        let records = WorkbookLoader::load_records_from_workbook(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.slots()[0].as_ref().unwrap().field("DESTINATION").is_absent());
        assert!(records.slots()[1].as_ref().unwrap().field("CLIENT").is_absent());
    }

    #[test]
    fn test_load_records_from_workbook_missing_file() {
        let dir = tempdir().unwrap();
        let result = WorkbookLoader::load_records_from_workbook(&dir.path().join("missing.xlsx"));
        assert!(result.is_err());
    }
}
