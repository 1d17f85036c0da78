//! # Reply Lines
//!
//! Extractors for the per-packet part of the output: echo replies, router
//! errors and the resolver complaints printed on stderr.
//!
//! ```text
//! PING example.com (93.184.216.34) 56(84) bytes of data.
//! 64 bytes from 93.184.216.34: icmp_seq=1 ttl=56 time=11.6 ms
//! From 10.0.0.1 icmp_seq=1 Time to live exceeded
//! ```

use std::sync::OnceLock;

use regex::Regex;

use crate::cached;

const TTL_EXCEEDED_MARKER: &str = "Time to live exceeded";
const UNKNOWN_HOST_MARKER: &str = "unknown host";

static RTT_RE: OnceLock<Regex> = OnceLock::new();
static FROM_RE: OnceLock<Regex> = OnceLock::new();
static RESOLVED_RE: OnceLock<Regex> = OnceLock::new();
static ECHO_SOURCE_RE: OnceLock<Regex> = OnceLock::new();

/// The first `time=` value in `stdout`, as printed (e.g. `"11.6"`).
pub fn rtt(stdout: &str) -> Option<&str> {
    let re = cached(&RTT_RE, r"time=(\d+(?:\.\d+)?)");
    re.captures(stdout)?.get(1).map(|m| m.as_str())
}

/// The first `time=` value, rounded to whole milliseconds.
pub fn rtt_millis(stdout: &str) -> Option<i64> {
    rtt(stdout)
        .and_then(|raw| raw.parse::<f64>().ok())
        .map(|ms| ms.round() as i64)
}

/// The IPv4 address following `From`, printed when a router answers instead
/// of the target.
pub fn from_address(stdout: &str) -> Option<&str> {
    let re = cached(&FROM_RE, r"From (\d{1,3}(?:\.\d{1,3}){3})");
    re.captures(stdout)?.get(1).map(|m| m.as_str())
}

/// The first parenthesised IPv4 address, i.e. what the tool resolved the target to.
pub fn resolved_address(stdout: &str) -> Option<&str> {
    let re = cached(&RESOLVED_RE, r"\((\d{1,3}(?:\.\d{1,3}){3})\)");
    re.captures(stdout)?.get(1).map(|m| m.as_str())
}

/// The address that sent the first echo reply.
///
/// Prefers the parenthesised IP when the tool printed a reverse-resolved name
/// (`64 bytes from host.example (1.2.3.4): ...`).
pub fn echo_source(stdout: &str) -> Option<&str> {
    let re = cached(
        &ECHO_SOURCE_RE,
        r"bytes from ([^\s:()]+)(?: \((\d{1,3}(?:\.\d{1,3}){3})\))?:",
    );
    let caps = re.captures(stdout)?;
    caps.get(2).or_else(|| caps.get(1)).map(|m| m.as_str())
}

pub fn ttl_exceeded(stdout: &str) -> bool {
    stdout.contains(TTL_EXCEEDED_MARKER)
}

pub fn unknown_host(stderr: &str) -> bool {
    stderr.contains(UNKNOWN_HOST_MARKER)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
