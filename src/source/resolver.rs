//! Input resolution and validation

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Resolved PDF data
pub struct ResolvedPdf {
    pub data: Vec<u8>,
    pub source_name: String,
}

/// Resolve a file path to PDF data, checking the `%PDF` signature
pub fn resolve_pdf<P: AsRef<Path>>(path: P) -> Result<ResolvedPdf> {
    let path = path.as_ref();

    if !path.is_file() {
        return Err(Error::PdfNotFound {
            path: path.display().to_string(),
        });
    }

    let data = std::fs::read(path).map_err(Error::Io)?;

    // Validate PDF header
    if !has_pdf_signature(&data) {
        return Err(Error::InvalidPdf {
            reason: format!("{} is not a valid PDF file", path.display()),
        });
    }

    Ok(ResolvedPdf {
        data,
        source_name: path.display().to_string(),
    })
}

/// Check that a PDF file exists and carries the `%PDF` signature, reading
/// only the first bytes
pub fn check_pdf<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    use std::io::Read;

    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::PdfNotFound {
            path: path.display().to_string(),
        });
    }

    let mut header = Vec::with_capacity(4);
    std::fs::File::open(path)?.take(4).read_to_end(&mut header)?;
    if !has_pdf_signature(&header) {
        return Err(Error::InvalidPdf {
            reason: format!("{} is not a valid PDF file", path.display()),
        });
    }
    Ok(path.to_path_buf())
}

/// Make sure an input file exists before a reader opens it
pub fn ensure_file<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::FileNotFound {
            path: path.display().to_string(),
        })
    }
}

fn has_pdf_signature(data: &[u8]) -> bool {
    data.len() >= 4 && &data[0..4] == b"%PDF"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_pdf_not_found() {
        let result = resolve_pdf("/nonexistent/path/file.pdf");
        assert!(matches!(result, Err(Error::PdfNotFound { .. })));
    }

    #[test]
    fn test_resolve_pdf_rejects_other_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"Hello World").unwrap();

        assert!(matches!(resolve_pdf(&path), Err(Error::InvalidPdf { .. })));
        assert!(matches!(check_pdf(&path), Err(Error::InvalidPdf { .. })));
    }

    #[test]
    fn test_check_pdf_accepts_signature() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.pdf");
        std::fs::write(&path, b"%PDF-1.7\n%%EOF\n").unwrap();

        assert_eq!(check_pdf(&path).unwrap(), path);
        let resolved = resolve_pdf(&path).unwrap();
        assert_eq!(resolved.source_name, path.display().to_string());
    }

    #[test]
    fn test_ensure_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ensure_file(dir.path().join("missing.csv")),
            Err(Error::FileNotFound { .. })
        ));
        // A directory is not a readable input
        assert!(ensure_file(dir.path()).is_err());
    }
}
