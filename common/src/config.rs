use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

pub const ENV_PROGRAM: &str = "ECHOPROBE_PING";
pub const ENV_POLICY: &str = "ECHOPROBE_POLICY";
pub const ENV_POLL_INTERVAL_MS: &str = "ECHOPROBE_POLL_INTERVAL_MS";
pub const ENV_GRACE_MS: &str = "ECHOPROBE_GRACE_MS";

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);
const DEFAULT_GRACE: Duration = Duration::from_millis(500);
const DEFAULT_DRAIN_GRACE: Duration = Duration::from_millis(250);

/// How the runner decides it has waited long enough for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeoutPolicy {
    /// Read stdout until end-of-stream, trusting the child's own timeout flag.
    ///
    /// The hard timeout still applies as a backstop.
    #[default]
    RunToCompletion,
    /// Check for output every `interval` until some arrives or the hard timeout elapses.
    Polling { interval: Duration },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// The ping executable. A bare name is looked up on `PATH`.
    pub program: PathBuf,
    pub policy: TimeoutPolicy,
    /// Added to the child's expected duration to form the hard timeout.
    pub grace: Duration,
    /// How long to keep collecting buffered output once the child is gone.
    pub drain_grace: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            program: default_program(),
            policy: TimeoutPolicy::default(),
            grace: DEFAULT_GRACE,
            drain_grace: DEFAULT_DRAIN_GRACE,
        }
    }
}

impl Config {
    /// Defaults overlaid with the `ECHOPROBE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(program) = lookup(ENV_PROGRAM).filter(|p| !p.trim().is_empty()) {
            cfg.program = PathBuf::from(program.trim());
        }

        let interval: Duration = lookup(ENV_POLL_INTERVAL_MS)
            .and_then(|raw| parse_millis(ENV_POLL_INTERVAL_MS, &raw))
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        if let Some(policy) = lookup(ENV_POLICY) {
            match policy.trim().to_ascii_lowercase().as_str() {
                "complete" => cfg.policy = TimeoutPolicy::RunToCompletion,
                "poll" => cfg.policy = TimeoutPolicy::Polling { interval },
                other => warn!("Ignoring unknown {ENV_POLICY} value '{other}'"),
            }
        }

        if let Some(grace) = lookup(ENV_GRACE_MS).and_then(|raw| parse_millis(ENV_GRACE_MS, &raw)) {
            cfg.grace = grace;
        }

        cfg
    }

    /// Switches to the polling policy with the default interval.
    pub fn polling(mut self) -> Self {
        self.policy = TimeoutPolicy::Polling {
            interval: DEFAULT_POLL_INTERVAL,
        };
        self
    }
}

fn parse_millis(key: &str, raw: &str) -> Option<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(e) => {
            warn!("Ignoring {key}='{raw}': {e}");
            None
        }
    }
}

fn default_program() -> PathBuf {
    if cfg!(target_os = "android") {
        PathBuf::from("/system/bin/ping")
    } else {
        PathBuf::from("ping")
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
