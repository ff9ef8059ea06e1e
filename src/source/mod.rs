//! Source resolution

pub mod resolver;

pub use resolver::{check_pdf, ensure_file, resolve_pdf, ResolvedPdf};
