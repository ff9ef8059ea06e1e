//! Shared plumbing for the command-line binaries

use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise only warnings are shown, or debug
/// output with `verbose`.
pub fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let default = if verbose {
        "docshift=debug"
    } else {
        "docshift=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}

/// Replace every non-ASCII character with `?`
pub fn ascii_sanitize(message: &str) -> String {
    message
        .chars()
        .map(|c| if c.is_ascii() { c } else { '?' })
        .collect()
}

/// Process exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    /// Bad arguments
    Usage,
    /// Any failure of a tool that does not distinguish failure kinds
    Failed,
    ConversionFailed,
    /// Write finished but left no output
    VerificationFailed,
}

impl Status {
    pub fn code(self) -> u8 {
        match self {
            Status::Success => 0,
            Status::Usage | Status::Failed => 1,
            Status::ConversionFailed => 2,
            Status::VerificationFailed => 3,
        }
    }
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        ExitCode::from(status.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("plain message", "plain message")]
    #[case("caf\u{e9} au lait", "caf? au lait")]
    #[case("\u{201c}quoted\u{201d}", "?quoted?")]
    #[case("", "")]
    fn test_ascii_sanitize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(ascii_sanitize(input), expected);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Status::Success.code(), 0);
        assert_eq!(Status::Usage.code(), 1);
        assert_eq!(Status::Failed.code(), 1);
        assert_eq!(Status::ConversionFailed.code(), 2);
        assert_eq!(Status::VerificationFailed.code(), 3);
    }
}
