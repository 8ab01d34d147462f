// Turning a header row plus data rows into records, the same way for every file type.
use shared::models::{CellValue, Record};
use std::collections::HashSet;

const EMPTY_HEADER: &str = "__EMPTY";

/// Field names of a sheet, taken from its first row.
///
/// A blank header cell is named `__EMPTY`, the next one `__EMPTY_1`, and so on; a repeated
/// name gets `_1`, `_2`, ... appended so that every column keeps its own field.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetHeader {
    names: Vec<String>,
}

impl SheetHeader {
    pub fn from_cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut taken = HashSet::new();
        let names = cells
            .into_iter()
            .map(|cell| {
                let base = match cell.as_ref() {
                    "" => EMPTY_HEADER,
                    name => name,
                };
                let mut name = base.to_string();
                let mut suffix = 0;
                while taken.contains(&name) {
                    suffix += 1;
                    name = format!("{}_{}", base, suffix);
                }
                taken.insert(name.clone());
                name
            })
            .collect();
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Pairs row cells with the header. Blank cells (`None`) are left out of the record;
    /// a row with no cells at all is not a record. Cells beyond the header are dropped.
    pub fn record_from_row<I>(&self, cells: I) -> Option<Record>
    where
        I: IntoIterator<Item = Option<CellValue>>,
    {
        let record: Record = self
            .names
            .iter()
            .zip(cells)
            .filter_map(|(name, cell)| cell.map(|value| (name.clone(), value)))
            .collect();
        if record.is_empty() {
            None
        } else {
            Some(record)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_duplicate_headers_get_unique_names() {
        let header = SheetHeader::from_cells(["CLIENT", "", "PRIX", "", "CLIENT", "CLIENT_1"]);
        assert_eq!(
            header.names(),
            &["CLIENT", "__EMPTY", "PRIX", "__EMPTY_1", "CLIENT_1", "CLIENT_1_1"]
        );
    }

    #[test]
    fn test_record_skips_blank_cells() {
        let header = SheetHeader::from_cells(["A", "B", "C"]);
        let record = header
            .record_from_row(vec![Some(CellValue::text("x")), None, Some(CellValue::Number(3.0))])
            .unwrap();
        assert_eq!(record.len(), 2);
        assert!(record.field("B").is_absent());
    }

    #[test]
    fn test_blank_row_is_not_a_record() {
        let header = SheetHeader::from_cells(["A", "B"]);
        assert_eq!(header.record_from_row(vec![None, None]), None);
        assert_eq!(header.record_from_row(Vec::new()), None);
    }

    #[test]
    fn test_cells_beyond_header_are_dropped() {
        let header = SheetHeader::from_cells(["A"]);
        let record = header
            .record_from_row(vec![Some(CellValue::text("x")), Some(CellValue::text("extra"))])
            .unwrap();
        assert_eq!(record.len(), 1);
    }
}
