//! pdf-to-docx - Rebuild a PDF as an editable DOCX document

use clap::Parser;
use docshift::cli::{ascii_sanitize, init_tracing, Status};
use docshift::{DocumentConfig, DocumentConverter, Engine};
use std::path::PathBuf;
use std::process::ExitCode;

/// Convert every page of a PDF into a DOCX document
#[derive(Parser, Debug)]
#[command(name = "pdf-to-docx", version, about)]
struct Args {
    /// Source PDF
    input: PathBuf,

    /// Destination DOCX
    output: PathBuf,

    /// Reconstruction engine: pdf2docx, libreoffice, pandoc or auto
    #[arg(long, default_value_t = Engine::Pdf2docx)]
    engine: Engine,

    /// pdf2docx executable
    #[arg(long = "pdf2docx-bin", value_name = "PATH", default_value = "pdf2docx")]
    pdf2docx: PathBuf,

    /// Office-suite executable
    #[arg(long, value_name = "PATH", default_value = "soffice")]
    soffice: PathBuf,

    /// poppler pdftohtml executable
    #[arg(long, value_name = "PATH", default_value = "pdftohtml")]
    pdftohtml: PathBuf,

    /// pandoc executable
    #[arg(long, value_name = "PATH", default_value = "pandoc")]
    pandoc: PathBuf,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

impl From<&Args> for DocumentConfig {
    fn from(args: &Args) -> Self {
        Self {
            engine: args.engine,
            pdf2docx: args.pdf2docx.clone(),
            soffice: args.soffice.clone(),
            pdftohtml: args.pdftohtml.clone(),
            pandoc: args.pandoc.clone(),
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let status = if e.use_stderr() {
                Status::Usage
            } else {
                Status::Success
            };
            e.print()?;
            return Ok(status.into());
        }
    };

    init_tracing(args.verbose)?;

    let converter = DocumentConverter::new(DocumentConfig::from(&args));
    match converter.convert(&args.input, &args.output) {
        Ok(()) => {
            println!(
                "[pdf2docx] Conversion succeeded: {} -> {}",
                args.input.display(),
                args.output.display()
            );
            Ok(Status::Success.into())
        }
        Err(e) => {
            tracing::error!(error = %e, "document conversion failed");
            eprintln!(
                "[pdf2docx] Error during conversion: {}",
                ascii_sanitize(&e.to_string())
            );
            Ok(Status::Failed.into())
        }
    }
}
