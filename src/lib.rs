//! docshift library
//!
//! Document and table conversion behind two command-line tools:
//! - `pdf-to-docx`: Rebuild a PDF as an editable DOCX with an external engine
//! - `table-convert`: Convert tables among CSV, XLSX, XLS, JSON, XML, PDF,
//!   XLSB and ODS
//!
//! Formats with a Rust reader or writer are handled in-process; the rest
//! go through a headless office suite.

pub mod cli;
pub mod convert;
pub mod document;
pub mod error;
pub mod format;
pub mod office;
pub mod process;
pub mod source;
pub mod table;

pub use convert::{verify_output, Request, TableConfig, TableConverter};
pub use document::{DocumentConfig, DocumentConverter, Engine};
pub use error::{Error, Result};
pub use format::Format;
pub use office::OfficeSuite;
pub use table::{Table, Value};
