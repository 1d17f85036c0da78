//! Text extraction over the output of the platform `ping` tool.
//!
//! Every extractor is independent, takes raw text and degrades to `None`/`false`
//! on anything it does not recognise. Callers decide what a missing field means.

pub mod reply;
pub mod statistics;

use std::sync::OnceLock;

use regex::Regex;

/// Compiles `pattern` once into `cell`.
///
/// Only ever called with literal patterns covered by the unit tests.
pub(crate) fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("literal pattern must compile"))
}
