//! JSON record reader and writer

use super::{Table, Value};
use crate::error::{Error, Result};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Read a JSON file into a table.
///
/// Accepted shapes:
/// - `[{"a": 1}, ...]` records
/// - `[[1, 2], ...]` bare rows, columns named `0..n`
/// - `{"a": {"0": 1, ...}, ...}` columns keyed by row label
/// - `{"a": [1, ...], ...}` columns of values
pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Table> {
    let file = std::fs::File::open(path.as_ref())?;
    let document: JsonValue = serde_json::from_reader(BufReader::new(file))?;
    json_to_table(document)
}

/// Convert an already-parsed JSON document into a table
pub fn json_to_table(document: JsonValue) -> Result<Table> {
    match document {
        JsonValue::Array(items) => array_to_table(items),
        JsonValue::Object(map) => object_to_table(map),
        other => Err(Error::InvalidTable {
            reason: format!("expected a JSON array or object, found {}", kind(&other)),
        }),
    }
}

fn array_to_table(items: Vec<JsonValue>) -> Result<Table> {
    if items.iter().all(JsonValue::is_object) {
        let records = items.into_iter().map(|item| match item {
            JsonValue::Object(map) => map
                .into_iter()
                .map(|(k, v)| (k, json_to_value(v)))
                .collect::<Vec<_>>(),
            _ => Vec::new(),
        });
        return Ok(Table::from_records(records));
    }

    if items.iter().all(JsonValue::is_array) {
        let mut table = Table::default();
        for item in items {
            if let JsonValue::Array(cells) = item {
                table.push_row(cells.into_iter().map(json_to_value).collect());
            }
        }
        // push_row named the columns "Unnamed: i"; bare rows use plain indices
        let width = table.width();
        let mut renamed = Table::new((0..width).map(|i| i.to_string()));
        for row in table.rows() {
            renamed.push_row(row.clone());
        }
        return Ok(renamed);
    }

    Err(Error::InvalidTable {
        reason: "JSON array must contain only objects or only arrays".to_string(),
    })
}

fn object_to_table(map: Map<String, JsonValue>) -> Result<Table> {
    let width = map.len();
    let mut table = Table::new(map.keys().cloned());

    // Row labels in first-seen order across all columns
    let mut row_of: HashMap<String, usize> = HashMap::new();
    let mut rows: Vec<Vec<Value>> = Vec::new();

    for (col, (_, column)) in map.into_iter().enumerate() {
        let cells: Vec<(String, JsonValue)> = match column {
            JsonValue::Object(inner) => inner.into_iter().collect(),
            JsonValue::Array(values) => values
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
            scalar => vec![("0".to_string(), scalar)],
        };
        for (label, value) in cells {
            let index = *row_of.entry(label).or_insert_with(|| {
                rows.push(vec![Value::Null; width]);
                rows.len() - 1
            });
            rows[index][col] = json_to_value(value);
        }
    }

    for row in rows {
        table.push_row(row);
    }
    Ok(table)
}

fn json_to_value(value: JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        },
        JsonValue::String(s) => Value::Text(s),
        // Nested structures stay in the cell as compact JSON
        nested => Value::Text(nested.to_string()),
    }
}

fn kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// Build the record-oriented JSON document for a table
pub fn table_to_records(table: &Table) -> JsonValue {
    let records = table
        .records()
        .map(|record| {
            let map: Map<String, JsonValue> = record
                .into_iter()
                .map(|(name, value)| {
                    let json = serde_json::to_value(value).unwrap_or(JsonValue::Null);
                    (name.to_string(), json)
                })
                .collect();
            JsonValue::Object(map)
        })
        .collect();
    JsonValue::Array(records)
}

/// Write a table as an indented array of records
pub fn write_json<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let file = std::fs::File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &table_to_records(table))?;
    writer.flush()?;
    Ok(())
}
