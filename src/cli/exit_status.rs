use std::process::ExitCode;

/// Exit status for CLI commands, following common conventions for linter tools.
///
/// - `Success` (0): Command completed, nothing left for review
/// - `Failure` (1): Command completed but recorded issues
/// - `Error` (2): Command failed (configuration, unreadable reference language, bad input)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    /// Command completed, nothing left for review.
    Success,
    /// Command completed but recorded issues.
    Failure,
    /// Command failed due to an internal error.
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}
