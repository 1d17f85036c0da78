//! # Probe Target Model
//!
//! A [`ProbeTarget`] is the host handed to the probe tool as its final argument.
//!
//! It can be derived from:
//! * A full URL (e.g., `https://example.com/status`), by taking its host component.
//! * A bare hostname (e.g., `example.com`).
//! * A literal IP address (e.g., `192.168.0.1` or `::1`).
//!
//! Whatever the source, the host is validated once here so that nothing reaching
//! the command line can be mistaken for a flag.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use url::{Host, Url};

use crate::error::{ProbeError, Result};

/// A resolved hostname or literal IP address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProbeTarget {
    host: String,
}

impl ProbeTarget {
    /// Wraps a host string after validating it.
    ///
    /// Rejects empty hosts, hosts starting with `-` and hosts containing
    /// whitespace or control characters.
    pub fn new(host: impl Into<String>) -> Result<Self> {
        let host: String = host.into();

        if host.is_empty()
            || host.starts_with('-')
            || host.chars().any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(ProbeError::HostResolutionFailed(host));
        }

        Ok(Self { host })
    }

    /// Extracts the host component of `url`.
    ///
    /// Inputs without a scheme are accepted as bare hosts, provided they carry
    /// no path or port.
    pub fn from_url(url: &str) -> Result<Self> {
        let trimmed: &str = url.trim();

        if let Ok(parsed) = Url::parse(trimmed) {
            match parsed.host() {
                Some(Host::Domain(domain)) => return Self::new(domain),
                Some(Host::Ipv4(ip)) => return Self::new(ip.to_string()),
                Some(Host::Ipv6(ip)) => return Self::new(ip.to_string()),
                None => {}
            }
        }

        parse_bare_host(trimmed)
            .ok_or_else(|| ProbeError::HostResolutionFailed(url.to_string()))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// True when the host is already a dotted-quad IPv4 address.
    pub fn is_ipv4_literal(&self) -> bool {
        self.host.parse::<Ipv4Addr>().is_ok()
    }
}

impl FromStr for ProbeTarget {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_url(s)
    }
}

impl fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.host)
    }
}

/// Accepts `example.com`, `10.0.0.1` or `fe80::1`, nothing with a path or port.
fn parse_bare_host(s: &str) -> Option<ProbeTarget> {
    if s.parse::<IpAddr>().is_ok() {
        return ProbeTarget::new(s).ok();
    }

    if s.contains(['/', ':', '@', '?', '#']) {
        return None;
    }

    ProbeTarget::new(s).ok()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
