//! Error types for docshift

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for docshift
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for docshift
#[derive(Error, Debug)]
pub enum Error {
    /// Source or destination extension outside the supported set
    #[error("Formats not supported: {source_ext} -> {dest_ext}")]
    UnsupportedFormats { source_ext: String, dest_ext: String },

    /// Format is supported but has no writer
    #[error("Unsupported write format: {format}")]
    UnsupportedWriteFormat { format: String },

    /// Input file not found
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// PDF file not found
    #[error("PDF not found: {path}")]
    PdfNotFound { path: String },

    /// Invalid PDF file
    #[error("Invalid PDF file: {reason}")]
    InvalidPdf { reason: String },

    /// PDF is password protected
    #[error("PDF is password protected")]
    PasswordRequired,

    /// Table extraction found nothing
    #[error("No tables found in PDF: {path}")]
    NoTablesFound { path: String },

    /// Source parsed but cannot be represented as a table
    #[error("Invalid table data: {reason}")]
    InvalidTable { reason: String },

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet read error
    #[error("Spreadsheet error: {reason}")]
    Spreadsheet { reason: String },

    /// Spreadsheet write error
    #[error("XLSX write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML error
    #[error("XML error: {reason}")]
    Xml { reason: String },

    /// PDFium error
    #[error("PDFium error: {reason}")]
    Pdfium { reason: String },

    /// External program could not be started
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// External program exited with a failure status
    #[error("{program} exited with {status}{}", format_stderr(.stderr))]
    Subprocess {
        program: String,
        status: String,
        stderr: String,
    },

    /// Native parser and office-suite fallback both failed
    #[error("native parser failed ({primary}); office fallback failed: {fallback}")]
    FallbackFailed {
        primary: String,
        #[source]
        fallback: Box<Error>,
    },

    /// Every document engine failed
    #[error("No conversion path succeeded for PDF -> DOCX: {}", .attempts.join("; "))]
    EnginesExhausted { attempts: Vec<String> },

    /// Write step finished but the destination is missing or empty
    #[error("Failed to create output file: {}", .path.display())]
    OutputNotCreated { path: PathBuf },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_stderr(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}

impl Error {
    /// Whether this error comes from the post-write verification step
    /// rather than from a reader, writer or subprocess.
    pub fn is_verification_failure(&self) -> bool {
        matches!(self, Error::OutputNotCreated { .. })
    }
}

impl From<calamine::Error> for Error {
    fn from(err: calamine::Error) -> Self {
        Error::Spreadsheet {
            reason: err.to_string(),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_formats_message() {
        let err = Error::UnsupportedFormats {
            source_ext: "txt".to_string(),
            dest_ext: "csv".to_string(),
        };
        assert_eq!(err.to_string(), "Formats not supported: txt -> csv");
    }

    #[test]
    fn test_subprocess_message_with_and_without_stderr() {
        let err = Error::Subprocess {
            program: "soffice".to_string(),
            status: "exit status: 1".to_string(),
            stderr: String::new(),
        };
        assert_eq!(err.to_string(), "soffice exited with exit status: 1");

        let err = Error::Subprocess {
            program: "soffice".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "source file could not be loaded".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "soffice exited with exit status: 1: source file could not be loaded"
        );
    }

    #[test]
    fn test_verification_failure_is_distinct() {
        let err = Error::OutputNotCreated {
            path: PathBuf::from("out.csv"),
        };
        assert!(err.is_verification_failure());
        assert_eq!(err.to_string(), "Failed to create output file: out.csv");

        let err = Error::NoTablesFound {
            path: "a.pdf".to_string(),
        };
        assert!(!err.is_verification_failure());
    }

    #[test]
    fn test_engines_exhausted_lists_attempts() {
        let err = Error::EnginesExhausted {
            attempts: vec!["pdf2docx: missing".to_string(), "pandoc: missing".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "No conversion path succeeded for PDF -> DOCX: pdf2docx: missing; pandoc: missing"
        );
    }
}
