//! Spreadsheet reader (calamine) and XLSX writer (rust_xlsxwriter)

use super::{Table, Value};
use crate::error::{Error, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use rust_xlsxwriter::Workbook;
use std::path::Path;

/// Name of the worksheet written to new workbooks
pub const SHEET_NAME: &str = "Sheet1";

/// Read the first worksheet of an xls, xlsx, xlsb or ods workbook.
///
/// The first row is the header.
pub fn read_spreadsheet<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::Spreadsheet {
            reason: format!("workbook has no worksheets: {}", path.display()),
        })??;

    let table = range_to_table(&range);
    tracing::debug!(
        path = %path.display(),
        columns = table.width(),
        rows = table.height(),
        "parsed spreadsheet"
    );
    Ok(table)
}

fn range_to_table(range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let header: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(header_name).collect(),
        None => return Table::default(),
    };

    let mut table = Table::new(header);
    for row in rows {
        table.push_row(row.iter().map(cell_to_value).collect());
    }
    table
}

fn header_name(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => cell_to_value(other).to_string(),
    }
}

fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => Value::Text(s.clone()),
        Data::Int(i) => Value::Int(*i),
        Data::Float(f) => number_value(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) if naive.time() == chrono::NaiveTime::MIN => {
                Value::Text(naive.format("%Y-%m-%d").to_string())
            }
            Some(naive) => Value::Text(naive.format("%Y-%m-%dT%H:%M:%S").to_string()),
            None => Value::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Text(s.clone()),
        Data::Error(e) => Value::Text(e.to_string()),
    }
}
/// Workbooks store every number as a double; whole numbers read back as
/// integers.
fn number_value(f: f64) -> Value {
    // 2^63 as f64; anything at or above it does not fit an i64
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
    if f.is_finite() && f.fract() == 0.0 && f >= -I64_BOUND && f < I64_BOUND {
        Value::Int(f as i64)
    } else {
        Value::Float(f)
    }
}

/// Write a table to an XLSX workbook with one sheet and no index column
pub fn write_xlsx<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, name) in table.columns().iter().enumerate() {
        sheet.write_string(0, column_number(col)?, name)?;
    }

    for (r, row) in table.rows().iter().enumerate() {
        let excel_row = u32::try_from(r + 1).map_err(|_| Error::InvalidTable {
            reason: "too many rows for a worksheet".to_string(),
        })?;
        for (c, value) in row.iter().enumerate() {
            let excel_col = column_number(c)?;
            match value {
                Value::Null => {}
                Value::Bool(b) => {
                    sheet.write_boolean(excel_row, excel_col, *b)?;
                }
                Value::Int(i) => {
                    sheet.write_number(excel_row, excel_col, *i as f64)?;
                }
                Value::Float(f) if f.is_finite() => {
                    sheet.write_number(excel_row, excel_col, *f)?;
                }
                Value::Float(_) => {}
                Value::Text(s) => {
                    sheet.write_string(excel_row, excel_col, s)?;
                }
            }
        }
    }

    workbook.save(path.as_ref())?;
    Ok(())
}

fn column_number(index: usize) -> Result<u16> {
    u16::try_from(index).map_err(|_| Error::InvalidTable {
        reason: "too many columns for a worksheet".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cell_conversion() {
        assert_eq!(cell_to_value(&Data::Empty), Value::Null);
        assert_eq!(cell_to_value(&Data::Int(3)), Value::Int(3));
        assert_eq!(cell_to_value(&Data::Float(0.5)), Value::Float(0.5));
        assert_eq!(cell_to_value(&Data::Float(36.0)), Value::Int(36));
        assert_eq!(cell_to_value(&Data::Float(-2.0)), Value::Int(-2));
        assert_eq!(cell_to_value(&Data::Float(1e300)), Value::Float(1e300));
        assert_eq!(
            cell_to_value(&Data::Float(f64::INFINITY)),
            Value::Float(f64::INFINITY)
        );
        assert_eq!(cell_to_value(&Data::Bool(true)), Value::Bool(true));
        assert_eq!(
            cell_to_value(&Data::String("x".to_string())),
            Value::from("x")
        );
        assert_eq!(
            cell_to_value(&Data::DateTimeIso("2024-01-02".to_string())),
            Value::from("2024-01-02")
        );
    }

    #[test]
    fn test_numeric_header_is_stringified() {
        assert_eq!(header_name(&Data::Float(2024.0)), "2024");
        assert_eq!(header_name(&Data::Float(2.5)), "2.5");
        assert_eq!(header_name(&Data::Empty), "");
    }

    #[test]
    fn test_xlsx_round_trip_preserves_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");

        let mut table = Table::new(["name", "qty", "ok"]);
        table.push_row(vec![Value::from("bolt"), Value::Int(4), Value::Bool(true)]);
        table.push_row(vec![Value::from("nut"), Value::Null, Value::Bool(false)]);
        write_xlsx(&table, &path).unwrap();

        let read = read_spreadsheet(&path).unwrap();
        assert_eq!(read.columns(), table.columns());
        assert_eq!(read.get(0, "name"), Some(&Value::from("bolt")));
        assert_eq!(read.get(0, "qty"), Some(&Value::Int(4)));
        assert_eq!(read.get(1, "qty"), Some(&Value::Null));
        assert_eq!(read.get(1, "ok"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_read_garbage_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a workbook").unwrap();
        assert!(matches!(
            read_spreadsheet(&path),
            Err(Error::Spreadsheet { .. })
        ));
    }
}
