//! XML reader and writer
//!
//! Reading builds a small element tree, then flattens it into records.
//! Attributes become `@name` columns and mixed text becomes `#text`; nested
//! elements flatten into dotted column names.

use super::{Table, Value};
use crate::error::{Error, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Element wrapping all records in written documents
pub const ROOT_ELEMENT: &str = "root";
/// Element wrapping one record in written documents
pub const ROW_ELEMENT: &str = "row";

#[derive(Debug, Default)]
struct Node {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
    text: String,
}

impl Node {
    fn is_leaf(&self) -> bool {
        self.children.is_empty() && self.attributes.is_empty()
    }
}

/// Read an XML file into a table
pub fn read_xml<P: AsRef<Path>>(path: P) -> Result<Table> {
    let file = std::fs::File::open(path.as_ref())?;
    let root = parse_tree(BufReader::new(file))?;
    Ok(flatten_document(root))
}

/// Read XML from a string
pub fn read_xml_str(xml: &str) -> Result<Table> {
    let root = parse_tree(xml.as_bytes())?;
    Ok(flatten_document(root))
}

fn parse_tree<R: BufRead>(source: R) -> Result<Node> {
    let mut reader = Reader::from_reader(source);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => stack.push(start_node(e)?),
            Event::Empty(ref e) => {
                let node = start_node(e)?;
                attach(&mut stack, &mut root, node);
            }
            Event::End(_) => {
                let node = stack.pop().ok_or_else(|| Error::Xml {
                    reason: "unbalanced closing tag".to_string(),
                })?;
                attach(&mut stack, &mut root, node);
            }
            Event::Text(t) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(Error::Xml {
            reason: "unexpected end of document".to_string(),
        });
    }
    root.ok_or_else(|| Error::Xml {
        reason: "document has no root element".to_string(),
    })
}

fn start_node(e: &BytesStart) -> Result<Node> {
    let mut node = Node {
        name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
        ..Node::default()
    };
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::Xml {
            reason: err.to_string(),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        node.attributes.push((key, value));
    }
    Ok(node)
}

fn attach(stack: &mut [Node], root: &mut Option<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => *root = Some(node),
    }
}

/// Turn a document tree into a table.
///
/// When the root's children are a repeated element, each child is a row.
/// Otherwise the whole document is a single row keyed by the root name.
fn flatten_document(root: Node) -> Table {
    if root.is_leaf() && root.text.is_empty() {
        return Table::default();
    }

    let repeated = match root.children.first() {
        Some(first) => {
            root.children.iter().all(|c| c.name == first.name)
                && (root.children.len() > 1 || !first.is_leaf())
        }
        None => false,
    };

    if repeated {
        Table::from_records(root.children.iter().map(|child| {
            let mut pairs = Vec::new();
            flatten_node(child, None, &mut pairs);
            merge_repeated(pairs)
        }))
    } else {
        let mut pairs = Vec::new();
        flatten_node(&root, Some(&root.name), &mut pairs);
        Table::from_records(std::iter::once(merge_repeated(pairs)))
    }
}

fn flatten_node(node: &Node, prefix: Option<&str>, out: &mut Vec<(String, Value)>) {
    let key = |suffix: &str| match prefix {
        Some(p) => format!("{}.{}", p, suffix),
        None => suffix.to_string(),
    };

    if node.is_leaf() {
        if let Some(p) = prefix {
            out.push((p.to_string(), text_value(&node.text)));
        }
        return;
    }

    for (name, value) in &node.attributes {
        out.push((key(&format!("@{}", name)), Value::Text(value.clone())));
    }
    if !node.text.is_empty() {
        out.push((key("#text"), Value::Text(node.text.clone())));
    }
    for child in &node.children {
        let child_key = key(&child.name);
        flatten_node(child, Some(&child_key), out);
    }
}

fn text_value(text: &str) -> Value {
    if text.is_empty() {
        Value::Null
    } else {
        Value::Text(text.to_string())
    }
}

/// Repeated keys inside one record collapse into a JSON list
fn merge_repeated(pairs: Vec<(String, Value)>) -> Vec<(String, Value)> {
    let mut merged: Vec<(String, Vec<Value>)> = Vec::new();
    for (key, value) in pairs {
        match merged.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => merged.push((key, vec![value])),
        }
    }
    merged
        .into_iter()
        .map(|(key, mut values)| {
            if values.len() == 1 {
                (key, values.remove(0))
            } else {
                let list = serde_json::to_string(&values).unwrap_or_default();
                (key, Value::Text(list))
            }
        })
        .collect()
}

/// Write a table as `<root><row>...</row></root>` with tab indentation
pub fn write_xml<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let file = std::fs::File::create(path.as_ref())?;
    let mut out = BufWriter::new(file);
    write_xml_to(table, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Write XML to any writer
pub fn write_xml_to<W: Write>(table: &Table, out: W) -> Result<()> {
    let mut writer = Writer::new_with_indent(out, b'\t', 1);
    let names: Vec<String> = table.columns().iter().map(|c| element_name(c)).collect();

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new(ROOT_ELEMENT)))?;
    for row in table.rows() {
        writer.write_event(Event::Start(BytesStart::new(ROW_ELEMENT)))?;
        for (name, value) in names.iter().zip(row) {
            if value.is_null() {
                writer.write_event(Event::Empty(BytesStart::new(name.as_str())))?;
                continue;
            }
            let text = value.to_string();
            writer.write_event(Event::Start(BytesStart::new(name.as_str())))?;
            writer.write_event(Event::Text(BytesText::new(&text)))?;
            writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
        }
        writer.write_event(Event::End(BytesEnd::new(ROW_ELEMENT)))?;
    }
    writer.write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))?;
    Ok(())
}

/// Make a column name usable as an element name
fn element_name(column: &str) -> String {
    let mut name: String = column
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let starts_ok = name
        .chars()
        .next()
        .map(|c| c.is_alphabetic() || c == '_')
        .unwrap_or(false);
    if !starts_ok {
        name.insert(0, '_');
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_repeated_children_become_rows() {
        let xml = r#"<?xml version="1.0"?>
            <people>
                <person id="1"><name>Ann</name><address><city>Oslo</city></address></person>
                <person id="2"><name>Bo</name></person>
            </people>"#;
        let table = read_xml_str(xml).unwrap();

        assert_eq!(table.columns(), &["@id", "name", "address.city"]);
        assert_eq!(table.get(0, "address.city"), Some(&Value::from("Oslo")));
        assert_eq!(table.get(1, "@id"), Some(&Value::from("2")));
        assert_eq!(table.get(1, "address.city"), Some(&Value::Null));
    }

    #[test]
    fn test_single_record_document() {
        let xml = "<config><host>db</host><port>5432</port></config>";
        let table = read_xml_str(xml).unwrap();
        assert_eq!(table.columns(), &["config.host", "config.port"]);
        assert_eq!(table.height(), 1);
    }

    #[test]
    fn test_repeated_leaves_collapse_to_list() {
        let xml = "<r><item><tag>a</tag><tag>b</tag></item><item><tag>c</tag></item></r>";
        let table = read_xml_str(xml).unwrap();
        assert_eq!(table.get(0, "tag"), Some(&Value::from(r#"["a","b"]"#)));
        assert_eq!(table.get(1, "tag"), Some(&Value::from("c")));
    }

    #[test]
    fn test_malformed_document_fails() {
        assert!(read_xml_str("<a><b></a>").is_err());
        assert!(read_xml_str("").is_err());
    }

    #[test]
    fn test_write_layout() {
        let mut table = Table::new(["name", "2nd col"]);
        table.push_row(vec![Value::from("a&b"), Value::Null]);

        let mut out = Vec::new();
        write_xml_to(&table, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(text.contains("\n<root>"));
        assert!(text.contains("\n\t<row>"));
        assert!(text.contains("\n\t\t<name>a&amp;b</name>"));
        assert!(text.contains("<_2nd_col/>"));
        assert!(text.trim_end().ends_with("</root>"));
    }

    #[test]
    fn test_written_document_reads_back() {
        let mut table = Table::new(["id", "label"]);
        table.push_row(vec![Value::Int(1), Value::from("one")]);
        table.push_row(vec![Value::Int(2), Value::Null]);

        let mut out = Vec::new();
        write_xml_to(&table, &mut out).unwrap();
        let read = read_xml_str(&String::from_utf8(out).unwrap()).unwrap();

        assert_eq!(read.columns(), &["id", "label"]);
        assert_eq!(read.get(0, "id"), Some(&Value::from("1")));
        assert_eq!(read.get(1, "label"), Some(&Value::Null));
    }
}
