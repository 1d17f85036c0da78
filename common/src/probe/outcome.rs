//! # Probe Outcome
//!
//! The typed record produced once per probe run. A failed ping is not an
//! error: it is an outcome whose fields carry sentinels.

use std::collections::BTreeMap;

/// RTT sentinel meaning "no round-trip time available".
pub const RTT_UNAVAILABLE: i64 = -1;

/// How the run's output relates to the probed host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchStatus {
    /// No direct echo reply could be read.
    #[default]
    NoMatch,
    /// An echo reply carried a `time=` field.
    DirectMatch,
    /// The tool reported the host as unknown on stderr.
    UnknownHost,
}

impl MatchStatus {
    /// String code used in the report map.
    pub fn code(&self) -> &'static str {
        match self {
            MatchStatus::NoMatch => "0",
            MatchStatus::DirectMatch => "1",
            MatchStatus::UnknownHost => "2",
        }
    }
}

/// Immutable once assembled; read through the accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    raw_stdout: String,
    raw_stderr: String,
    elapsed_ms: u64,
    rtt_ms: i64,
    raw_rtt: String,
    source_address: String,
    resolved_address: String,
    match_status: MatchStatus,
    statistics_line: String,
}

impl ProbeOutcome {
    /// An outcome with no RTT and `NoMatch`, to be filled in with the `with_*` methods.
    pub fn new(raw_stdout: impl Into<String>, raw_stderr: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            raw_stdout: raw_stdout.into(),
            raw_stderr: raw_stderr.into(),
            elapsed_ms,
            rtt_ms: RTT_UNAVAILABLE,
            raw_rtt: String::new(),
            source_address: String::new(),
            resolved_address: String::new(),
            match_status: MatchStatus::NoMatch,
            statistics_line: String::new(),
        }
    }

    pub fn with_rtt(mut self, rtt_ms: i64, raw_rtt: impl Into<String>) -> Self {
        self.rtt_ms = rtt_ms;
        self.raw_rtt = raw_rtt.into();
        self
    }

    pub fn with_match_status(mut self, match_status: MatchStatus) -> Self {
        self.match_status = match_status;
        self
    }

    pub fn with_addresses(mut self, source: impl Into<String>, resolved: impl Into<String>) -> Self {
        self.source_address = source.into();
        self.resolved_address = resolved.into();
        self
    }

    pub fn with_statistics_line(mut self, line: impl Into<String>) -> Self {
        self.statistics_line = line.into();
        self
    }

    pub fn raw_stdout(&self) -> &str {
        &self.raw_stdout
    }

    pub fn raw_stderr(&self) -> &str {
        &self.raw_stderr
    }

    /// Wall-clock duration of the run, measured around the child process.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Round-trip time in milliseconds, or [`RTT_UNAVAILABLE`].
    pub fn rtt_ms(&self) -> i64 {
        self.rtt_ms
    }

    /// The `time=` text as it appeared in stdout, before any substitution.
    pub fn raw_rtt(&self) -> &str {
        &self.raw_rtt
    }

    /// Address following `From`, set when a router answers instead of the target.
    pub fn source_address(&self) -> &str {
        &self.source_address
    }

    /// Address the tool resolved the target to (header parentheses).
    pub fn resolved_address(&self) -> &str {
        &self.resolved_address
    }

    pub fn match_status(&self) -> MatchStatus {
        self.match_status
    }

    /// The `min/avg/max/mdev = ...` fragment, empty when absent.
    pub fn statistics_line(&self) -> &str {
        &self.statistics_line
    }

    pub fn has_rtt(&self) -> bool {
        self.rtt_ms != RTT_UNAVAILABLE
    }

    /// Flattens the outcome into the string map handed to callers.
    pub fn report(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("respPing", self.raw_stdout.clone()),
            ("respErr", self.raw_stderr.clone()),
            ("rtt", self.rtt_ms.to_string()),
            ("fromAddr", self.source_address.clone()),
            ("calTime", self.elapsed_ms.to_string()),
            ("matchesAddress", self.match_status.code().to_string()),
            ("orgTtl", self.raw_rtt.clone()),
            ("ipAddr", self.resolved_address.clone()),
        ])
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
