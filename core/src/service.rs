//! # Ping Query Service
//!
//! The caller-facing operations. Each one resolves a target, builds the
//! command, runs it and projects one field out of the assembled outcome.
//!
//! Only bad input and launch failures are errors. An offline host, a missing
//! statistics block or a timed-out probe all come back as `Ok` with a sentinel
//! (`-1`, `-1.0`, `None`).

use echoprobe_common::config::Config;
use echoprobe_common::probe::outcome::RTT_UNAVAILABLE;
use echoprobe_common::probe::params::{DEFAULT_COUNT, DEFAULT_REPORT_TTL, DEFAULT_TIMEOUT_MS};
use echoprobe_common::probe::{ProbeOutcome, ProbeParameters, ProbeTarget};
use echoprobe_common::Result;
use echoprobe_protocols::statistics::{self, RttField};
use echoprobe_protocols::reply;
use tracing::debug;

use crate::assembler;
use crate::command;
use crate::runner::{ProbeExecutor, ProcessRunner, RunOptions};

/// Packet-loss sentinel for the numeric projection.
pub const LOSS_UNAVAILABLE: f32 = -1.0;

/// Stateless entry point for all probe queries.
///
/// Holds configuration and the executor only; concurrent calls share nothing
/// mutable and each owns its own child process.
pub struct PingService {
    config: Config,
    executor: Box<dyn ProbeExecutor>,
}

impl PingService {
    pub fn new(config: Config) -> Self {
        Self::with_executor(config, Box::new(ProcessRunner))
    }

    pub fn with_executor(config: Config, executor: Box<dyn ProbeExecutor>) -> Self {
        Self { config, executor }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs one probe and returns the full outcome.
    pub async fn probe(&self, target: &ProbeTarget, params: &ProbeParameters) -> Result<ProbeOutcome> {
        let cmd = command::build(&self.config.program, target, params);
        let options = RunOptions::for_command(&self.config, &cmd);

        let capture = self.executor.execute(&cmd, &options).await?;
        if capture.timed_out {
            debug!(host = %target, "Probe output is partial, child was terminated");
        }

        Ok(assembler::assemble_capture(&capture))
    }

    /// The IP address behind `url`.
    ///
    /// A literal IPv4 host is returned as is, without spawning anything.
    /// `None` when the probe produced no echo reply.
    pub async fn resolve_direct_ip(&self, url: &str) -> Result<Option<String>> {
        self.resolve_direct_ip_with(url, DEFAULT_COUNT, DEFAULT_TIMEOUT_MS)
            .await
    }

    pub async fn resolve_direct_ip_with(
        &self,
        url: &str,
        count: u32,
        timeout_ms: u64,
    ) -> Result<Option<String>> {
        let params = ProbeParameters::new(count, timeout_ms, None)?;
        let target = ProbeTarget::from_url(url)?;
        if target.is_ipv4_literal() {
            return Ok(Some(target.host().to_string()));
        }

        let outcome = self.probe(&target, &params).await?;
        Ok(reply::echo_source(outcome.raw_stdout()).map(str::to_string))
    }

    pub async fn min_rtt(&self, url: &str) -> Result<i64> {
        self.min_rtt_with(url, DEFAULT_COUNT, DEFAULT_TIMEOUT_MS).await
    }

    pub async fn min_rtt_with(&self, url: &str, count: u32, timeout_ms: u64) -> Result<i64> {
        self.summary_rtt(url, count, timeout_ms, RttField::Min).await
    }

    pub async fn max_rtt(&self, url: &str) -> Result<i64> {
        self.max_rtt_with(url, DEFAULT_COUNT, DEFAULT_TIMEOUT_MS).await
    }

    pub async fn max_rtt_with(&self, url: &str, count: u32, timeout_ms: u64) -> Result<i64> {
        self.summary_rtt(url, count, timeout_ms, RttField::Max).await
    }

    /// Mean deviation of the RTT.
    pub async fn mdev_rtt(&self, url: &str) -> Result<i64> {
        self.mdev_rtt_with(url, DEFAULT_COUNT, DEFAULT_TIMEOUT_MS).await
    }

    pub async fn mdev_rtt_with(&self, url: &str, count: u32, timeout_ms: u64) -> Result<i64> {
        self.summary_rtt(url, count, timeout_ms, RttField::Mdev).await
    }

    /// Full diagnostic outcome using a per-reply timeout and TTL.
    pub async fn avg_report(&self, url: &str) -> Result<ProbeOutcome> {
        self.avg_report_with(url, DEFAULT_COUNT, DEFAULT_TIMEOUT_MS, DEFAULT_REPORT_TTL)
            .await
    }

    pub async fn avg_report_with(
        &self,
        url: &str,
        count: u32,
        timeout_ms: u64,
        ttl: u8,
    ) -> Result<ProbeOutcome> {
        let params = ProbeParameters::report(count, timeout_ms, ttl)?;
        let target = ProbeTarget::from_url(url)?;
        self.probe(&target, &params).await
    }

    /// Loss as printed by the tool, e.g. `"0%"`.
    pub async fn packet_loss(&self, url: &str) -> Result<Option<String>> {
        self.packet_loss_with(url, DEFAULT_COUNT, DEFAULT_TIMEOUT_MS).await
    }

    pub async fn packet_loss_with(
        &self,
        url: &str,
        count: u32,
        timeout_ms: u64,
    ) -> Result<Option<String>> {
        let outcome = self.probe_url(url, count, timeout_ms).await?;
        Ok(statistics::packet_loss(outcome.raw_stdout()).map(str::to_string))
    }

    /// Loss as a number (`0.0` for `"0%"`), or [`LOSS_UNAVAILABLE`].
    pub async fn packet_loss_percent(&self, url: &str) -> Result<f32> {
        self.packet_loss_percent_with(url, DEFAULT_COUNT, DEFAULT_TIMEOUT_MS)
            .await
    }

    pub async fn packet_loss_percent_with(
        &self,
        url: &str,
        count: u32,
        timeout_ms: u64,
    ) -> Result<f32> {
        let loss = self.packet_loss_with(url, count, timeout_ms).await?;
        Ok(loss
            .as_deref()
            .and_then(statistics::loss_percent)
            .unwrap_or(LOSS_UNAVAILABLE))
    }

    async fn summary_rtt(&self, url: &str, count: u32, timeout_ms: u64, field: RttField) -> Result<i64> {
        let outcome = self.probe_url(url, count, timeout_ms).await?;
        Ok(statistics::summary_field_millis(outcome.statistics_line(), field).unwrap_or(RTT_UNAVAILABLE))
    }

    /// Validates parameters before the URL so that nothing is resolved for a doomed call.
    async fn probe_url(&self, url: &str, count: u32, timeout_ms: u64) -> Result<ProbeOutcome> {
        let params = ProbeParameters::new(count, timeout_ms, None)?;
        let target = ProbeTarget::from_url(url)?;
        self.probe(&target, &params).await
    }
}

impl Default for PingService {
    fn default() -> Self {
        Self::new(Config::default())
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
