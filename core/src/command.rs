//! Builds the argument vector for the platform probe tool.
//!
//! The target always travels as a single argv element. Nothing here goes
//! through a shell, so metacharacters in a hostname stay inert.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use echoprobe_common::probe::{ProbeParameters, ProbeTarget, TimeoutFlag};

/// A fully built probe invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: PathBuf,
    args: Vec<String>,
    expected: Duration,
}

impl CommandLine {
    /// An arbitrary invocation. `expected` is how long the child should
    /// take if it honours its own timeout.
    pub fn new<I, S>(program: impl Into<PathBuf>, args: I, expected: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            expected,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn expected(&self) -> Duration {
        self.expected
    }

    pub fn as_os_args(&self) -> impl Iterator<Item = &OsStr> {
        self.args.iter().map(OsStr::new)
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// `<program> -c <count> (-w|-W) <secs> [-t <ttl>] <target>`
pub fn build(program: &Path, target: &ProbeTarget, params: &ProbeParameters) -> CommandLine {
    let mut args: Vec<String> = Vec::with_capacity(7);

    args.push("-c".to_string());
    args.push(params.count().to_string());

    let timeout_flag: &str = match params.flag() {
        TimeoutFlag::Deadline => "-w",
        TimeoutFlag::PerReply => "-W",
    };
    args.push(timeout_flag.to_string());
    args.push(params.timeout_secs().to_string());

    if let Some(ttl) = params.ttl() {
        args.push("-t".to_string());
        args.push(ttl.to_string());
    }

    args.push(target.host().to_string());

    CommandLine {
        program: program.to_path_buf(),
        args,
        expected: params.expected_duration(),
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
