use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProbeError>;

/// Failures that stop a probe before any output exists.
///
/// Everything that can go wrong *after* the child is running (unreachable host,
/// DNS failure, garbled output, timeout) is reported through sentinel values in
/// [`crate::probe::outcome::ProbeOutcome`] instead.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid probe parameters: {0}")]
    InvalidParameters(String),

    #[error("no probe target could be extracted from '{0}'")]
    HostResolutionFailed(String),

    #[error("failed to launch '{program}'")]
    LaunchFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
