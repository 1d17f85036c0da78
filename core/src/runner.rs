//! # Process Runner
//!
//! Spawns a [`CommandLine`] and captures its output under a hard wall-clock bound.
//!
//! Each pipe gets its own reader task that forwards lines over an unbounded
//! channel, so a child flooding stderr can never stall while we wait on stdout.
//! The run loop only consumes those channels; it never blocks on a pipe itself.
//!
//! Running out of time is not an error. The child is killed and reaped, whatever
//! arrived so far is returned, and [`Capture::timed_out`] is set.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, error, warn};

use echoprobe_common::config::{Config, TimeoutPolicy};
use echoprobe_common::{ProbeError, Result};

use crate::command::CommandLine;

/// Bounds applied to one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub policy: TimeoutPolicy,
    /// Wall-clock budget after which the child is killed.
    pub hard_timeout: Duration,
    /// How long buffered output is still collected once the child is gone.
    pub drain_grace: Duration,
}

impl RunOptions {
    /// The child's own expected duration plus the configured slack.
    pub fn for_command(cfg: &Config, command: &CommandLine) -> Self {
        Self {
            policy: cfg.policy,
            hard_timeout: command.expected() + cfg.grace,
            drain_grace: cfg.drain_grace,
        }
    }
}

/// Raw result of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capture {
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
    /// The hard timeout fired and the child was killed.
    pub timed_out: bool,
}

impl Capture {
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Executes a probe command line.
#[async_trait]
pub trait ProbeExecutor: Send + Sync {
    async fn execute(&self, command: &CommandLine, options: &RunOptions) -> Result<Capture>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl ProbeExecutor for ProcessRunner {
    async fn execute(&self, command: &CommandLine, options: &RunOptions) -> Result<Capture> {
        run(command, options).await
    }
}

pub async fn run(command: &CommandLine, options: &RunOptions) -> Result<Capture> {
    let started = Instant::now();
    let deadline: Instant = started + options.hard_timeout;

    let mut child: Child = Command::new(command.program())
        .args(command.as_os_args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ProbeError::LaunchFailed {
            program: command.program().display().to_string(),
            source,
        })?;

    let pid: Option<u32> = child.id();
    debug!(pid = ?pid, %command, "Probe spawned");

    let mut stdout = LineStream::spawn(child.stdout.take(), "stdout");
    let mut stderr = LineStream::spawn(child.stderr.take(), "stderr");

    let stdout_closed: bool = match options.policy {
        TimeoutPolicy::RunToCompletion => stdout.read_until_closed(deadline).await,
        TimeoutPolicy::Polling { interval } => stdout.poll_until_output(deadline, interval).await,
    };

    let exited: bool = stdout_closed && wait_for_exit(&mut child, deadline).await;
    if !exited {
        warn!(
            pid = ?pid,
            timeout_ms = options.hard_timeout.as_millis() as u64,
            "Probe exceeded hard timeout, terminating"
        );
        terminate(&mut child, options.drain_grace).await;
    }

    let drain_deadline: Instant = Instant::now() + options.drain_grace;
    stdout.read_until_closed(drain_deadline).await;
    stderr.read_until_closed(drain_deadline).await;

    let capture = Capture {
        stdout: stdout.take_text(),
        stderr: stderr.take_text(),
        elapsed: started.elapsed(),
        timed_out: !exited,
    };
    debug!(
        pid = ?pid,
        elapsed_ms = capture.elapsed_ms(),
        stdout_len = capture.stdout.len(),
        stderr_len = capture.stderr.len(),
        "Probe finished"
    );

    Ok(capture)
}

async fn wait_for_exit(child: &mut Child, deadline: Instant) -> bool {
    match time::timeout_at(deadline, child.wait()).await {
        Ok(Ok(status)) => {
            debug!(%status, "Probe exited");
            true
        }
        Ok(Err(e)) => {
            warn!("Waiting for probe failed: {e}");
            false
        }
        Err(_elapsed) => false,
    }
}

/// Kills the child and reaps it so no zombie outlives the run.
async fn terminate(child: &mut Child, grace: Duration) {
    if let Err(e) = child.start_kill() {
        // Already reaped or gone.
        debug!("Kill signal not delivered: {e}");
    }

    match time::timeout(grace, child.wait()).await {
        Ok(Ok(status)) => debug!(%status, "Probe terminated"),
        Ok(Err(e)) => error!("Failed to reap terminated probe: {e}"),
        Err(_elapsed) => error!("Terminated probe did not exit within {grace:?}"),
    }
}

/// One pipe, drained by a background task into a channel of lines.
struct LineStream {
    rx: UnboundedReceiver<String>,
    text: String,
    reader: Option<JoinHandle<()>>,
}

impl LineStream {
    fn spawn<R>(pipe: Option<R>, name: &'static str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        // A missing pipe drops `tx` here, which reads as an immediately closed stream.
        let reader = pipe.map(|pipe| tokio::spawn(forward_lines(pipe, tx, name)));

        Self {
            rx,
            text: String::new(),
            reader,
        }
    }

    fn push(&mut self, line: String) {
        self.text.push_str(&line);
        self.text.push('\n');
    }

    /// Collects lines until the pipe closes (`true`) or `deadline` passes (`false`).
    async fn read_until_closed(&mut self, deadline: Instant) -> bool {
        loop {
            if Instant::now() >= deadline {
                return self.collect_buffered();
            }

            match time::timeout_at(deadline, self.rx.recv()).await {
                Ok(Some(line)) => self.push(line),
                Ok(None) => return true,
                Err(_elapsed) => return false,
            }
        }
    }

    /// Checks for output every `interval` without blocking on the pipe.
    ///
    /// Once the first line shows up the rest is read until the pipe closes,
    /// still bounded by `deadline`.
    async fn poll_until_output(&mut self, deadline: Instant, interval: Duration) -> bool {
        loop {
            match self.rx.try_recv() {
                Ok(line) => {
                    self.push(line);
                    return self.read_until_closed(deadline).await;
                }
                Err(TryRecvError::Disconnected) => return true,
                Err(TryRecvError::Empty) => {}
            }

            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            time::sleep_until(deadline.min(now + interval)).await;
        }
    }

    /// Takes whatever is already queued, without waiting.
    fn collect_buffered(&mut self) -> bool {
        loop {
            match self.rx.try_recv() {
                Ok(line) => self.push(line),
                Err(TryRecvError::Empty) => return false,
                Err(TryRecvError::Disconnected) => return true,
            }
        }
    }

    fn take_text(&mut self) -> String {
        std::mem::take(&mut self.text)
    }
}

impl Drop for LineStream {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

async fn forward_lines<R>(pipe: R, tx: UnboundedSender<String>, name: &'static str)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(pipe);
    let mut buf: Vec<u8> = Vec::with_capacity(256);

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line: String = String::from_utf8_lossy(&buf)
                    .trim_end_matches(['\n', '\r'])
                    .to_string();
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!(stream = name, "Reading probe output failed: {e}");
                break;
            }
        }
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
