//! Supported file formats, keyed by extension

use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A file format the table converter knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Csv,
    Xlsx,
    Xls,
    Json,
    Xml,
    Pdf,
    Xlsb,
    Ods,
}

impl Format {
    /// Every supported format, in the order they are listed to users
    pub const ALL: [Format; 8] = [
        Format::Csv,
        Format::Xlsx,
        Format::Xls,
        Format::Json,
        Format::Xml,
        Format::Pdf,
        Format::Xlsb,
        Format::Ods,
    ];

    /// Canonical lowercase extension (without the dot)
    pub fn extension(self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Xlsx => "xlsx",
            Format::Xls => "xls",
            Format::Json => "json",
            Format::Xml => "xml",
            Format::Pdf => "pdf",
            Format::Xlsb => "xlsb",
            Format::Ods => "ods",
        }
    }

    /// Detect the format of a path from its extension, case-insensitively
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        extension_of(path).parse().ok()
    }

    /// Whether the format can only be written through the office suite
    pub fn needs_office_writer(self) -> bool {
        matches!(self, Format::Xls | Format::Xlsb | Format::Ods)
    }

    /// Whether reading falls back to the office suite on parse failure
    pub fn has_office_fallback(self) -> bool {
        matches!(self, Format::Xlsb | Format::Ods)
    }

    /// `--convert-to` target for the office suite when producing this format
    pub fn office_target(self) -> &'static str {
        match self {
            Format::Xls => "xls:MS Excel 97",
            Format::Xlsb => "xlsb:Calc MS Excel 2007 Binary",
            Format::Xlsx => "xlsx:Calc MS Excel 2007 XML",
            other => other.extension(),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim_start_matches('.').to_ascii_lowercase();
        Format::ALL
            .into_iter()
            .find(|f| f.extension() == lower)
            .ok_or_else(|| format!("unsupported format: {}", s))
    }
}

/// Lowercased extension of a path, or an empty string when it has none
pub fn extension_of<P: AsRef<Path>>(path: P) -> String {
    path.as_ref()
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("data.csv", Some(Format::Csv))]
    #[case("DATA.XLSX", Some(Format::Xlsx))]
    #[case("/tmp/report.Json", Some(Format::Json))]
    #[case("sheet.ods", Some(Format::Ods))]
    #[case("book.xlsb", Some(Format::Xlsb))]
    #[case("notes.txt", None)]
    #[case("no_extension", None)]
    #[case("archive.tar.gz", None)]
    fn test_from_path(#[case] path: &str, #[case] expected: Option<Format>) {
        assert_eq!(Format::from_path(path), expected);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("a/b/C.XML"), "xml");
        assert_eq!(extension_of("README"), "");
    }

    #[test]
    fn test_office_targets() {
        assert_eq!(Format::Ods.office_target(), "ods");
        assert_eq!(Format::Csv.office_target(), "csv");
        assert!(Format::Xls.office_target().starts_with("xls:"));
        assert!(Format::Xls.needs_office_writer());
        assert!(!Format::Xls.has_office_fallback());
        assert!(Format::Ods.has_office_fallback());
    }

    #[test]
    fn test_round_trip_display() {
        for format in Format::ALL {
            assert_eq!(format.to_string().parse::<Format>(), Ok(format));
        }
    }
}
