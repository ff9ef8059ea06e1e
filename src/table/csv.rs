//! Delimited text reader and writer

use super::{Table, Value};
use crate::error::{Error, Result};
use std::io::{Read, Write};
use std::path::Path;

/// Read a CSV file whose first record is the header
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
    let file = std::fs::File::open(path.as_ref())?;
    read_csv_from(file)
}

/// Read CSV from any reader
pub fn read_csv_from<R: Read>(reader: R) -> Result<Table> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(Error::InvalidTable {
            reason: "No columns to parse from file".to_string(),
        });
    }

    let mut table = Table::new(headers.iter());
    for record in reader.records() {
        let record = record?;
        table.push_row(record.iter().map(Value::infer).collect());
    }

    tracing::debug!(
        columns = table.width(),
        rows = table.height(),
        "parsed CSV"
    );
    Ok(table)
}

/// Write a table as CSV with a header row and no index column
pub fn write_csv<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let file = std::fs::File::create(path.as_ref())?;
    write_csv_to(table, file)
}

/// Write CSV to any writer
pub fn write_csv_to<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut writer = ::csv::Writer::from_writer(writer);
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_infers_types() {
        let data = "name,age,score,active\nalice,30,1.5,True\nbob,,2.0,False\n";
        let table = read_csv_from(data.as_bytes()).unwrap();

        assert_eq!(table.columns(), &["name", "age", "score", "active"]);
        assert_eq!(
            table.rows(),
            &[
                vec![
                    Value::from("alice"),
                    Value::Int(30),
                    Value::Float(1.5),
                    Value::Bool(true)
                ],
                vec![
                    Value::from("bob"),
                    Value::Null,
                    Value::Float(2.0),
                    Value::Bool(false)
                ],
            ]
        );
    }

    #[test]
    fn test_read_ragged_rows() {
        let data = "a,b\n1\n2,3,4\n";
        let table = read_csv_from(data.as_bytes()).unwrap();
        assert_eq!(table.columns(), &["a", "b", "Unnamed: 2"]);
        assert_eq!(table.rows()[0], vec![Value::Int(1), Value::Null, Value::Null]);
    }

    #[test]
    fn test_read_empty_input_fails() {
        let result = read_csv_from("".as_bytes());
        assert!(matches!(result, Err(Error::InvalidTable { .. })));
    }

    #[test]
    fn test_write_quotes_and_nulls() {
        let mut table = Table::new(["text", "n"]);
        table.push_row(vec![Value::from("a,b"), Value::Null]);
        table.push_row(vec![Value::from("plain"), Value::Float(3.0)]);

        let mut out = Vec::new();
        write_csv_to(&table, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "text,n\n\"a,b\",\nplain,3.0\n"
        );
    }
}
