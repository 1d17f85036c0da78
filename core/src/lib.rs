//! # echoprobe
//!
//! Reachability and latency checks built on the platform `ping` tool.
//!
//! The pipeline, leaf first:
//! * [`command`]: builds the argument vector, target as one opaque argument.
//! * [`runner`]: spawns the child, drains both pipes concurrently, enforces the hard timeout.
//! * [`assembler`]: turns captured text into a [`ProbeOutcome`](echoprobe_common::probe::ProbeOutcome).
//! * [`service`]: the caller-facing queries (min/max/mdev RTT, report, packet loss, IP).

pub mod assembler;
pub mod command;
pub mod runner;
pub mod service;

pub use service::PingService;
