//! Tabular payload and the per-format readers and writers
//!
//! Every reader produces a [`Table`] and every writer consumes one. The
//! table is deliberately flat: ordered column names and rows of scalar
//! [`Value`]s.

pub mod csv;
pub mod excel;
pub mod json;
pub mod pdf;
pub mod xml;

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// A single cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Infer a typed value from raw text, the way dataframe readers do
    /// for delimited input.
    pub fn infer(raw: &str) -> Self {
        let s = raw.trim();
        if s.is_empty() {
            return Value::Null;
        }
        match s {
            "True" | "true" | "TRUE" => return Value::Bool(true),
            "False" | "false" | "FALSE" => return Value::Bool(false),
            _ => {}
        }
        if let Ok(i) = s.parse::<i64>() {
            return Value::Int(i);
        }
        // f64 parsing also accepts "inf" and "NaN"; only numeric spellings count
        let numeric = s
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
        if numeric && s.bytes().any(|b| b.is_ascii_digit()) {
            if let Ok(f) = s.parse::<f64>() {
                return Value::Float(f);
            }
        }
        Value::Text(raw.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write_float(f, *x),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Dataframe-style float text: positional for decimal exponents in
/// `-4..16` with a trailing `.0` on whole numbers, `1.5e-07` / `1e+300`
/// outside that range.
fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if !x.is_finite() {
        return write!(f, "{}", x);
    }
    let scientific = format!("{:e}", x);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };
    if x != 0.0 && !(-4..16).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        write!(f, "{}e{}{:02}", mantissa, sign, exponent.abs())
    } else if x.fract() == 0.0 {
        write!(f, "{:.1}", x)
    } else {
        write!(f, "{}", x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// In-memory row/column table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given header.
    ///
    /// Blank names become `Unnamed: <index>` and repeated names get a
    /// `.1`, `.2`, ... suffix.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = columns.into_iter().map(Into::into).collect();
        Self {
            columns: normalize_columns(columns),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell value by row index and column name
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Append a row. Short rows are padded with nulls; long rows add
    /// `Unnamed` columns (earlier rows are padded to match).
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        if row.len() > self.columns.len() {
            for index in self.columns.len()..row.len() {
                self.columns.push(format!("Unnamed: {}", index));
            }
            let width = self.columns.len();
            for existing in &mut self.rows {
                existing.resize(width, Value::Null);
            }
        }
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    /// Append a column filled with nulls, returning its index
    fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(index) = self.column_index(name) {
            return index;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(Value::Null);
        }
        self.columns.len() - 1
    }

    /// Build a table from records whose keys may differ. Columns appear in
    /// first-seen order.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Vec<(String, Value)>>,
    {
        let mut table = Table::default();
        for record in records {
            let mut row = vec![Value::Null; table.width()];
            for (key, value) in record {
                let index = table.ensure_column(&key);
                if index >= row.len() {
                    row.resize(index + 1, Value::Null);
                }
                row[index] = value;
            }
            table.push_row(row);
        }
        table
    }

    /// Iterate rows as (column, value) pairs
    pub fn records(&self) -> impl Iterator<Item = Vec<(&str, &Value)>> + '_ {
        self.rows.iter().map(move |row| {
            self.columns
                .iter()
                .map(String::as_str)
                .zip(row.iter())
                .collect()
        })
    }

    /// Concatenate tables row-wise, aligning cells by column name.
    ///
    /// The result holds the union of all columns in first-seen order;
    /// cells a table does not have are null.
    pub fn concat(tables: Vec<Table>) -> Table {
        let mut result = Table::default();
        for table in tables {
            let mapping: Vec<usize> = table
                .columns
                .iter()
                .map(|name| result.ensure_column(name))
                .collect();
            for row in table.rows {
                let mut out = vec![Value::Null; result.width()];
                for (value, &target) in row.into_iter().zip(&mapping) {
                    out[target] = value;
                }
                result.rows.push(out);
            }
        }
        result
    }
}

fn normalize_columns(columns: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    columns
        .into_iter()
        .enumerate()
        .map(|(index, name)| {
            let name = if name.trim().is_empty() {
                format!("Unnamed: {}", index)
            } else {
                name
            };
            match seen.get_mut(&name) {
                Some(count) => {
                    *count += 1;
                    format!("{}.{}", name, count)
                }
                None => {
                    seen.insert(name.clone(), 0);
                    name
                }
            }
        })
        .collect()
}
