use std::time::Duration;

use crate::error::{ProbeError, Result};

pub const DEFAULT_COUNT: u32 = 1;
pub const DEFAULT_TIMEOUT_MS: u64 = 100;
/// TTL used by the report query when the caller does not pick one.
pub const DEFAULT_REPORT_TTL: u8 = 25;

/// How the timeout is handed to the probe tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeoutFlag {
    /// Bounds the whole run (`-w`).
    #[default]
    Deadline,
    /// Bounds the wait for each individual reply (`-W`).
    PerReply,
}

/// Repeat count, timeout and optional TTL of one probe.
///
/// Validated on construction and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeParameters {
    count: u32,
    timeout_ms: u64,
    ttl: Option<u8>,
    flag: TimeoutFlag,
}

impl ProbeParameters {
    pub fn new(count: u32, timeout_ms: u64, ttl: Option<u8>) -> Result<Self> {
        if count == 0 {
            return Err(ProbeError::InvalidParameters(
                "count must be positive".to_string(),
            ));
        }
        if timeout_ms == 0 {
            return Err(ProbeError::InvalidParameters(
                "timeout must be positive".to_string(),
            ));
        }
        if ttl == Some(0) {
            return Err(ProbeError::InvalidParameters(
                "ttl must be positive".to_string(),
            ));
        }

        Ok(Self {
            count,
            timeout_ms,
            ttl,
            flag: TimeoutFlag::Deadline,
        })
    }

    /// Parameters for the diagnostic report: per-reply timeout and a TTL.
    pub fn report(count: u32, timeout_ms: u64, ttl: u8) -> Result<Self> {
        let params = Self::new(count, timeout_ms, Some(ttl))?;
        Ok(Self {
            flag: TimeoutFlag::PerReply,
            ..params
        })
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn ttl(&self) -> Option<u8> {
        self.ttl
    }

    pub fn flag(&self) -> TimeoutFlag {
        self.flag
    }

    /// The timeout in whole seconds, rounded up and never below one.
    ///
    /// Probe tools only take integral seconds for `-w`/`-W`.
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_ms.div_ceil(1000).max(1)
    }

    /// How long a well-behaved child should take at most.
    ///
    /// With a per-reply timeout the tool still spaces requests one second apart.
    pub fn expected_duration(&self) -> Duration {
        let secs: u64 = match self.flag {
            TimeoutFlag::Deadline => self.timeout_secs(),
            TimeoutFlag::PerReply => self.timeout_secs() + u64::from(self.count - 1),
        };
        Duration::from_secs(secs)
    }
}

impl Default for ProbeParameters {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            ttl: None,
            flag: TimeoutFlag::Deadline,
        }
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
