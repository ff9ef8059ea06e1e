//! Blocking invocation of external programs

use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

/// Run a program to completion and fail on a non-zero exit.
///
/// Returns captured stdout. There is no timeout: a hung child blocks the
/// caller.
pub fn run_tool<I, S>(program: &Path, args: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let name = program.display().to_string();
    let mut command = Command::new(program);
    command.args(args);
    tracing::debug!(command = ?command, "running external tool");

    let output = command.output().map_err(|source| Error::Spawn {
        program: name.clone(),
        source,
    })?;

    if !output.status.success() {
        return Err(Error::Subprocess {
            program: name,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_captures_stdout() {
        let out = run_tool(Path::new("sh"), ["-c", "printf hello"]).unwrap();
        assert_eq!(out, "hello");
    }

    #[test]
    fn test_non_zero_exit_is_subprocess_error() {
        let err = run_tool(Path::new("sh"), ["-c", "echo broken >&2; exit 3"]).unwrap_err();
        match err {
            Error::Subprocess { program, stderr, .. } => {
                assert_eq!(program, "sh");
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let err = run_tool(Path::new("/nonexistent/bin/tool"), ["--version"]).unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
    }
}
