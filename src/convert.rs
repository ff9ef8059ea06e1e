//! Table conversion pipeline: validate, read, write, verify

use crate::error::{Error, Result};
use crate::format::{extension_of, Format};
use crate::office::{OfficeSuite, DEFAULT_SOFFICE};
use crate::source::ensure_file;
use crate::table::{csv, excel, json, pdf, xml, Table};
use std::path::{Path, PathBuf};

/// Table converter configuration
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Office-suite executable used for xls/xlsb/ods writes and read fallbacks
    pub soffice: PathBuf,
    /// Directory holding the PDFium shared library (default: search)
    pub pdfium_dir: Option<PathBuf>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            soffice: PathBuf::from(DEFAULT_SOFFICE),
            pdfium_dir: None,
        }
    }
}

/// Validated conversion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub source: PathBuf,
    pub source_format: Format,
    pub dest: PathBuf,
    pub dest_format: Format,
}

/// Converts tabular files between formats
#[derive(Debug, Clone)]
pub struct TableConverter {
    config: TableConfig,
    office: OfficeSuite,
}

impl TableConverter {
    pub fn new(config: TableConfig) -> Self {
        let office = OfficeSuite::locate(&config.soffice);
        Self { config, office }
    }

    /// Check both extensions against the supported set. Performs no I/O.
    pub fn validate<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Result<Request> {
        let (src, dst) = (src.as_ref(), dst.as_ref());
        match (Format::from_path(src), Format::from_path(dst)) {
            (Some(source_format), Some(dest_format)) => Ok(Request {
                source: src.to_path_buf(),
                source_format,
                dest: dst.to_path_buf(),
                dest_format,
            }),
            _ => Err(Error::UnsupportedFormats {
                source_ext: extension_of(src),
                dest_ext: extension_of(dst),
            }),
        }
    }

    /// Convert `src` into `dst` and return the size of the written file
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(&self, src: P, dst: Q) -> Result<u64> {
        let request = Self::validate(src, dst)?;
        tracing::debug!(
            source = %request.source.display(),
            from = %request.source_format,
            dest = %request.dest.display(),
            to = %request.dest_format,
            "converting table"
        );

        let table = self.read(&request.source, request.source_format)?;
        tracing::info!(
            rows = table.height(),
            columns = table.width(),
            "read source table"
        );
        if table.is_empty() {
            tracing::warn!(source = %request.source.display(), "source table has no data rows");
        }

        self.write(&table, &request.dest, request.dest_format)?;
        let size = verify_output(&request.dest)?;
        tracing::info!(dest = %request.dest.display(), bytes = size, "conversion complete");
        Ok(size)
    }

    /// Read a file of the given format into a table
    pub fn read(&self, path: &Path, format: Format) -> Result<Table> {
        ensure_file(path)?;
        if format.has_office_fallback() {
            return self.read_with_fallback(path);
        }
        match format {
            Format::Csv => csv::read_csv(path),
            Format::Xls | Format::Xlsx | Format::Xlsb | Format::Ods => {
                excel::read_spreadsheet(path)
            }
            Format::Json => json::read_json(path),
            Format::Xml => xml::read_xml(path),
            Format::Pdf => pdf::read_pdf_tables(path, self.config.pdfium_dir.as_deref()),
        }
    }

    /// Native spreadsheet parse, falling back to an office-suite CSV export
    fn read_with_fallback(&self, path: &Path) -> Result<Table> {
        let primary = match excel::read_spreadsheet(path) {
            Ok(table) => return Ok(table),
            Err(e) => e,
        };
        tracing::warn!(
            path = %path.display(),
            error = %primary,
            "native spreadsheet parse failed, falling back to office suite"
        );

        self.read_via_office_csv(path)
            .map_err(|fallback| Error::FallbackFailed {
                primary: primary.to_string(),
                fallback: Box::new(fallback),
            })
    }

    fn read_via_office_csv(&self, path: &Path) -> Result<Table> {
        let scratch = tempfile::tempdir()?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "converted".to_string());
        let csv_path = scratch.path().join(format!("{}.csv", stem));

        let produced = self.office.convert_with(path, &csv_path, "csv", None)?;
        ensure_file(&produced)?;
        csv::read_csv(&produced)
    }

    /// Write a table to a file of the given format
    pub fn write(&self, table: &Table, path: &Path, format: Format) -> Result<()> {
        if format.needs_office_writer() {
            return self.write_via_office(table, path, format);
        }
        match format {
            Format::Csv => csv::write_csv(table, path),
            Format::Xlsx => excel::write_xlsx(table, path),
            Format::Json => json::write_json(table, path),
            Format::Xml => xml::write_xml(table, path),
            Format::Xls | Format::Xlsb | Format::Ods | Format::Pdf => {
                Err(Error::UnsupportedWriteFormat {
                    format: format.to_string(),
                })
            }
        }
    }

    /// Write an intermediate xlsx and let the office suite produce `path`
    fn write_via_office(&self, table: &Table, path: &Path, format: Format) -> Result<()> {
        let scratch = tempfile::tempdir()?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        let intermediate = scratch.path().join(format!("{}.xlsx", stem));

        excel::write_xlsx(table, &intermediate)?;
        tracing::debug!(
            intermediate = %intermediate.display(),
            target = format.office_target(),
            "handing intermediate workbook to office suite"
        );
        self.office
            .convert_with(&intermediate, path, format.office_target(), None)?;
        Ok(())
    }
}

impl Default for TableConverter {
    fn default() -> Self {
        Self::new(TableConfig::default())
    }
}

/// Destination must exist and be non-empty
pub fn verify_output<P: AsRef<Path>>(path: P) -> Result<u64> {
    let path = path.as_ref();
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(meta.len()),
        _ => Err(Error::OutputNotCreated {
            path: path.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("in.txt", "out.csv", "txt", "csv")]
    #[case("in.csv", "out.docx", "csv", "docx")]
    #[case("in", "out.csv", "", "csv")]
    fn test_validate_rejects_unknown_extensions(
        #[case] src: &str,
        #[case] dst: &str,
        #[case] source_ext: &str,
        #[case] dest_ext: &str,
    ) {
        match TableConverter::validate(src, dst) {
            Err(Error::UnsupportedFormats {
                source_ext: s,
                dest_ext: d,
            }) => {
                assert_eq!(s, source_ext);
                assert_eq!(d, dest_ext);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_validate_accepts_mixed_case() {
        let request = TableConverter::validate("Data.CSV", "out.Ods").unwrap();
        assert_eq!(request.source_format, Format::Csv);
        assert_eq!(request.dest_format, Format::Ods);
    }

    #[test]
    fn test_pdf_is_not_writable() {
        let dir = tempfile::tempdir().unwrap();
        let converter = TableConverter::new(TableConfig::default());
        let table = Table::new(["a"]);
        let dst = dir.path().join("out.pdf");
        assert!(matches!(
            converter.write(&table, &dst, Format::Pdf),
            Err(Error::UnsupportedWriteFormat { .. })
        ));
        assert!(!dst.exists());
    }

    #[test]
    fn test_missing_source_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let converter = TableConverter::default();
        let result = converter.run(dir.path().join("absent.csv"), dir.path().join("out.json"));
        assert!(matches!(result, Err(Error::FileNotFound { .. })));
    }

    #[test]
    fn test_csv_to_json_run() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("people.csv");
        std::fs::write(&src, "name,age\nAda,36\nGrace,45\n").unwrap();
        let dst = dir.path().join("people.json");

        let size = TableConverter::default().run(&src, &dst).unwrap();
        assert!(size > 0);

        let table = json::read_json(&dst).unwrap();
        assert_eq!(table.columns(), ["name", "age"]);
        assert_eq!(table.get(1, "age"), Some(&Value::Int(45)));
    }

    #[test]
    fn test_verify_output() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.csv");
        std::fs::write(&empty, b"").unwrap();
        assert!(verify_output(&empty).unwrap_err().is_verification_failure());
        assert!(verify_output(dir.path().join("missing.csv")).is_err());

        let full = dir.path().join("full.csv");
        std::fs::write(&full, b"a\n1\n").unwrap();
        assert_eq!(verify_output(&full).unwrap(), 4);
    }

    #[test]
    fn test_office_write_without_suite_fails() {
        let dir = tempfile::tempdir().unwrap();
        let converter = TableConverter::new(TableConfig {
            soffice: dir.path().join("no-such-soffice"),
            pdfium_dir: None,
        });
        let mut table = Table::new(["a"]);
        table.push_row(vec![Value::Int(1)]);

        let result = converter.write(&table, &dir.path().join("out.ods"), Format::Ods);
        assert!(matches!(result, Err(Error::Spawn { .. })));
    }

    #[test]
    fn test_fallback_failure_keeps_both_causes() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("broken.ods");
        std::fs::write(&src, b"not a spreadsheet").unwrap();
        let converter = TableConverter::new(TableConfig {
            soffice: dir.path().join("no-such-soffice"),
            pdfium_dir: None,
        });

        match converter.read(&src, Format::Ods) {
            Err(Error::FallbackFailed { primary, fallback }) => {
                assert!(!primary.is_empty());
                assert!(matches!(*fallback, Error::Spawn { .. }));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
