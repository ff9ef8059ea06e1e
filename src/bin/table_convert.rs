//! table-convert - Convert tabular files between formats
//!
//! Exit codes: 0 success, 1 usage, 2 conversion error, 3 output missing.

use clap::Parser;
use docshift::cli::{init_tracing, Status};
use docshift::{Error, TableConfig, TableConverter};
use std::path::PathBuf;
use std::process::ExitCode;

/// Convert tables among csv, xlsx, xls, json, xml, pdf (read only), xlsb and ods
#[derive(Parser, Debug)]
#[command(name = "table-convert", version, about)]
struct Args {
    /// Source file; its extension selects the reader
    input_file: PathBuf,

    /// Destination file; its extension selects the writer
    output_file: PathBuf,

    /// Office-suite executable for xls/xlsb/ods output and read fallbacks
    #[arg(long, value_name = "PATH", default_value = "soffice")]
    soffice: PathBuf,

    /// Directory containing the PDFium shared library
    #[arg(long, value_name = "DIR")]
    pdfium_dir: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
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

    let converter = TableConverter::new(TableConfig {
        soffice: args.soffice,
        pdfium_dir: args.pdfium_dir,
    });

    let status = match converter.run(&args.input_file, &args.output_file) {
        Ok(_) => Status::Success,
        Err(e @ Error::OutputNotCreated { .. }) => {
            tracing::error!(error = %e, "verification failed");
            eprintln!("{}", e);
            Status::VerificationFailed
        }
        Err(e) => {
            tracing::error!(error = %e, "conversion failed");
            eprintln!("Conversion error: {}", e);
            Status::ConversionFailed
        }
    };

    Ok(status.into())
}
