pub mod outcome;
pub mod params;
pub mod target;

pub use outcome::{MatchStatus, ProbeOutcome};
pub use params::{ProbeParameters, TimeoutFlag};
pub use target::ProbeTarget;
