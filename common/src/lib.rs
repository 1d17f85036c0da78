//! Shared model for `echoprobe`.
//!
//! * [`probe`]: targets, parameters and the outcome record of one probe run.
//! * [`config`]: runtime knobs for the process runner.
//! * [`error`]: the error taxonomy surfaced to callers.

pub mod config;
pub mod error;
pub mod probe;

pub use error::{ProbeError, Result};
