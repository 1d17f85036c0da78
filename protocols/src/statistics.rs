//! # Statistics Block
//!
//! Extractors for the summary printed when the tool finishes:
//!
//! ```text
//! --- example.com ping statistics ---
//! 5 packets transmitted, 5 received, 0% packet loss, time 4006ms
//! rtt min/avg/max/mdev = 10.0/12.5/15.0/1.2 ms
//! ```

use std::sync::OnceLock;

use regex::Regex;

use crate::cached;

static SUMMARY_RE: OnceLock<Regex> = OnceLock::new();
static LOSS_RE: OnceLock<Regex> = OnceLock::new();

/// Position of a value inside the `min/avg/max/mdev` summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RttField {
    Min = 0,
    Avg = 1,
    Max = 2,
    Mdev = 3,
}

/// The `min/avg/max/mdev = a/b/c/d ms` fragment of `stdout`.
///
/// BSD-style tools print `stddev` in place of `mdev`; both are accepted.
pub fn summary_line(stdout: &str) -> Option<&str> {
    let re = cached(&SUMMARY_RE, r"min/avg/max/(?:mdev|stddev) = [^\r\n]*");
    re.find(stdout).map(|m| m.as_str())
}

/// One value of a summary line, in milliseconds.
pub fn summary_field(line: &str, field: RttField) -> Option<f64> {
    let (_, values) = line.split_once('=')?;
    let raw: &str = values.split('/').nth(field as usize)?;
    raw.trim().trim_end_matches("ms").trim().parse::<f64>().ok()
}

/// [`summary_field`] rounded to whole milliseconds.
pub fn summary_field_millis(line: &str, field: RttField) -> Option<i64> {
    summary_field(line, field).map(|ms| ms.round() as i64)
}

/// The loss percentage from the `received,` clause, e.g. `"0%"`.
pub fn packet_loss(stdout: &str) -> Option<&str> {
    let re = cached(&LOSS_RE, r"received,[^\r\n]*?(\d+(?:\.\d+)?%)\s*packet");
    re.captures(stdout)?.get(1).map(|m| m.as_str())
}

/// Numeric value of a percentage such as `"12.5%"`.
pub fn loss_percent(loss: &str) -> Option<f32> {
    loss.trim().trim_end_matches('%').trim().parse::<f32>().ok()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
