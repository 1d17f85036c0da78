//! Turns captured output into a [`ProbeOutcome`].
//!
//! Precedence, highest first:
//! 1. Anything meaningful on stderr: no RTT, `UnknownHost` if the resolver said so.
//! 2. No `time=` on stdout: a router's "Time to live exceeded" counts the
//!    wall-clock time of the run as the RTT, otherwise no RTT.
//! 3. A `time=` value: that RTT, `DirectMatch`.

use tracing::debug;

use echoprobe_common::probe::outcome::RTT_UNAVAILABLE;
use echoprobe_common::probe::{MatchStatus, ProbeOutcome};
use echoprobe_protocols::{reply, statistics};

use crate::runner::Capture;

/// Stderr of at most this many characters (after trimming) is treated as noise.
const STDERR_NOISE_LEN: usize = 2;

pub fn assemble(stdout: &str, stderr: &str, elapsed_ms: u64) -> ProbeOutcome {
    let raw_rtt: &str = reply::rtt(stdout).unwrap_or_default();
    let parsed_rtt: Option<i64> = reply::rtt_millis(stdout);
    let ttl_exceeded: bool = reply::ttl_exceeded(stdout);
    let unknown_host: bool = reply::unknown_host(stderr);

    let (rtt_ms, match_status) = if stderr.trim().chars().count() > STDERR_NOISE_LEN {
        let status = if unknown_host {
            MatchStatus::UnknownHost
        } else {
            MatchStatus::NoMatch
        };
        (RTT_UNAVAILABLE, status)
    } else {
        match parsed_rtt {
            Some(rtt) => (rtt, MatchStatus::DirectMatch),
            None if ttl_exceeded => (
                i64::try_from(elapsed_ms).unwrap_or(i64::MAX),
                MatchStatus::NoMatch,
            ),
            None => (RTT_UNAVAILABLE, MatchStatus::NoMatch),
        }
    };

    debug!(rtt_ms, ?match_status, ttl_exceeded, "Assembled probe outcome");

    ProbeOutcome::new(stdout, stderr, elapsed_ms)
        .with_rtt(rtt_ms, raw_rtt)
        .with_match_status(match_status)
        .with_addresses(
            reply::from_address(stdout).unwrap_or_default(),
            reply::resolved_address(stdout).unwrap_or_default(),
        )
        .with_statistics_line(statistics::summary_line(stdout).unwrap_or_default())
}

pub fn assemble_capture(capture: &Capture) -> ProbeOutcome {
    assemble(&capture.stdout, &capture.stderr, capture.elapsed_ms())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
