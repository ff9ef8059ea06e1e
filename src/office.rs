//! Headless office-suite conversions
//!
//! The office suite writes `<source stem>.<extension>` into `--outdir`. When
//! the caller asked for a different file name the produced file is renamed;
//! when nothing was produced the requested path is returned anyway and the
//! caller's output verification reports the failure.

use crate::error::Result;
use crate::process::run_tool;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Default office-suite executable
pub const DEFAULT_SOFFICE: &str = "soffice";

/// Handle to a local office-suite executable
#[derive(Debug, Clone)]
pub struct OfficeSuite {
    program: PathBuf,
}

impl OfficeSuite {
    /// Use the given executable as is
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolve the executable: explicit paths are kept, bare names are
    /// looked up on `PATH`. Only the default `soffice` falls back to
    /// `libreoffice`; any other name is kept as given when not found.
    pub fn locate<P: AsRef<Path>>(program: P) -> Self {
        let program = program.as_ref();
        if program.components().count() > 1 {
            return Self::new(program);
        }
        let found = which::which(program)
            .or_else(|e| {
                if program == Path::new(DEFAULT_SOFFICE) {
                    which::which("libreoffice")
                } else {
                    Err(e)
                }
            })
            .unwrap_or_else(|_| program.to_path_buf());
        tracing::debug!(program = %found.display(), "resolved office suite");
        Self::new(found)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Convert `src` into `dst`, using the destination's extension as the
    /// conversion target.
    pub fn convert(&self, src: &Path, dst: &Path) -> Result<PathBuf> {
        let ext = crate::format::extension_of(dst);
        self.convert_with(src, dst, &ext, None)
    }

    /// Convert `src` into `dst` with an explicit `--convert-to` target
    /// (`ext[:filter]`) and an optional input filter.
    pub fn convert_with(
        &self,
        src: &Path,
        dst: &Path,
        target: &str,
        infilter: Option<&str>,
    ) -> Result<PathBuf> {
        let outdir = output_dir(dst);

        let mut args: Vec<OsString> = vec!["--headless".into()];
        if let Some(filter) = infilter {
            args.push(format!("--infilter={}", filter).into());
        }
        args.push("--convert-to".into());
        args.push(target.into());
        args.push("--outdir".into());
        args.push(outdir.clone().into_os_string());
        args.push(src.as_os_str().to_owned());

        run_tool(&self.program, &args)?;

        let extension = target.split(':').next().unwrap_or(target);
        let produced = produced_path(src, &outdir, extension);
        if produced != dst && produced.exists() {
            tracing::debug!(
                from = %produced.display(),
                to = %dst.display(),
                "renaming office output"
            );
            std::fs::rename(&produced, dst)?;
        } else if !dst.exists() {
            tracing::warn!(
                expected = %produced.display(),
                "office suite reported success but produced no file"
            );
        }

        tracing::info!(src = %src.display(), dst = %dst.display(), "office conversion finished");
        Ok(dst.to_path_buf())
    }
}

impl Default for OfficeSuite {
    fn default() -> Self {
        Self::new(DEFAULT_SOFFICE)
    }
}

/// Directory the office suite should write into for `dst`
fn output_dir(dst: &Path) -> PathBuf {
    match dst.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// File the office suite names its output
pub fn produced_path(src: &Path, outdir: &Path, extension: &str) -> PathBuf {
    let stem = src
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    outdir.join(format!("{}.{}", stem, extension))
}
