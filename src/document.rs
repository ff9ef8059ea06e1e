//! PDF to DOCX conversion through external layout-reconstruction engines

use crate::convert::verify_output;
use crate::error::{Error, Result};
use crate::office::{OfficeSuite, DEFAULT_SOFFICE};
use crate::process::run_tool;
use crate::source::check_pdf;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Reconstruction engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Engine {
    #[default]
    Pdf2docx,
    LibreOffice,
    Pandoc,
    /// Try every engine in order until one produces output
    Auto,
}

impl Engine {
    /// Order tried by [`Engine::Auto`]
    pub const CHAIN: [Engine; 3] = [Engine::Pdf2docx, Engine::LibreOffice, Engine::Pandoc];

    pub fn name(self) -> &'static str {
        match self {
            Engine::Pdf2docx => "pdf2docx",
            Engine::LibreOffice => "libreoffice",
            Engine::Pandoc => "pandoc",
            Engine::Auto => "auto",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Engine {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf2docx" => Ok(Engine::Pdf2docx),
            "libreoffice" | "soffice" => Ok(Engine::LibreOffice),
            "pandoc" => Ok(Engine::Pandoc),
            "auto" => Ok(Engine::Auto),
            other => Err(format!(
                "unknown engine '{}' (expected pdf2docx, libreoffice, pandoc or auto)",
                other
            )),
        }
    }
}

/// Document converter configuration
#[derive(Debug, Clone)]
pub struct DocumentConfig {
    pub engine: Engine,
    /// pdf2docx command-line executable
    pub pdf2docx: PathBuf,
    /// Office-suite executable
    pub soffice: PathBuf,
    /// poppler `pdftohtml` executable
    pub pdftohtml: PathBuf,
    /// pandoc executable
    pub pandoc: PathBuf,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            engine: Engine::default(),
            pdf2docx: PathBuf::from("pdf2docx"),
            soffice: PathBuf::from(DEFAULT_SOFFICE),
            pdftohtml: PathBuf::from("pdftohtml"),
            pandoc: PathBuf::from("pandoc"),
        }
    }
}

/// Converts PDF documents into editable DOCX files
#[derive(Debug, Clone)]
pub struct DocumentConverter {
    config: DocumentConfig,
}

impl DocumentConverter {
    pub fn new(config: DocumentConfig) -> Self {
        Self { config }
    }

    /// Convert every page of `pdf` into `out`
    pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(&self, pdf: P, out: Q) -> Result<()> {
        let pdf = check_pdf(pdf)?;
        let out = out.as_ref();

        match self.config.engine {
            Engine::Auto => self.convert_auto(&pdf, out),
            engine => self.attempt(engine, &pdf, out),
        }
    }

    fn convert_auto(&self, pdf: &Path, out: &Path) -> Result<()> {
        let mut attempts = Vec::new();
        for engine in Engine::CHAIN {
            match self.attempt(engine, pdf, out) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(engine = %engine, error = %e, "engine failed, trying next");
                    attempts.push(format!("{}: {}", engine, e));
                }
            }
        }
        Err(Error::EnginesExhausted { attempts })
    }

    /// Run one engine; it counts as successful only when it leaves a
    /// non-empty destination.
    fn attempt(&self, engine: Engine, pdf: &Path, out: &Path) -> Result<()> {
        tracing::debug!(engine = %engine, pdf = %pdf.display(), out = %out.display(), "running engine");
        match engine {
            Engine::Pdf2docx => self.run_pdf2docx(pdf, out)?,
            Engine::LibreOffice => self.run_libreoffice(pdf, out)?,
            Engine::Pandoc => self.run_pandoc(pdf, out)?,
            Engine::Auto => return self.convert_auto(pdf, out),
        }
        let size = verify_output(out)?;
        tracing::info!(engine = %engine, bytes = size, "document written");
        Ok(())
    }

    fn run_pdf2docx(&self, pdf: &Path, out: &Path) -> Result<()> {
        run_tool(
            &self.config.pdf2docx,
            [
                OsStr::new("convert"),
                pdf.as_os_str(),
                out.as_os_str(),
            ],
        )?;
        Ok(())
    }

    fn run_libreoffice(&self, pdf: &Path, out: &Path) -> Result<()> {
        OfficeSuite::locate(&self.config.soffice).convert_with(
            pdf,
            out,
            "docx:MS Word 2007 XML",
            Some("writer_pdf_import"),
        )?;
        Ok(())
    }

    fn run_pandoc(&self, pdf: &Path, out: &Path) -> Result<()> {
        let scratch = tempfile::tempdir()?;
        let html = scratch.path().join("document.html");

        run_tool(
            &self.config.pdftohtml,
            [
                OsStr::new("-c"),
                OsStr::new("-s"),
                OsStr::new("-noframes"),
                pdf.as_os_str(),
                html.as_os_str(),
            ],
        )?;
        run_tool(
            &self.config.pandoc,
            [
                html.as_os_str(),
                OsStr::new("-o"),
                out.as_os_str(),
                OsStr::new("-t"),
                OsStr::new("docx"),
            ],
        )?;
        Ok(())
    }
}

impl Default for DocumentConverter {
    fn default() -> Self {
        Self::new(DocumentConfig::default())
    }
}
