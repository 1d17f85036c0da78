use std::time::{Duration, Instant};

use echoprobe_common::config::TimeoutPolicy;
use echoprobe_common::ProbeError;
use echoprobe_core::command::CommandLine;
use echoprobe_core::runner::{self, Capture};

use crate::support::{init_tracing, options, polling, shell};

const GENEROUS: Duration = Duration::from_secs(10);

#[tokio::test]
async fn captures_both_streams() -> anyhow::Result<()> {
    init_tracing();
    let cmd = shell("echo hello; echo oops >&2; echo world");

    let capture: Capture = runner::run(&cmd, &options(TimeoutPolicy::RunToCompletion, GENEROUS)).await?;

    assert_eq!(capture.stdout, "hello\nworld\n");
    assert_eq!(capture.stderr, "oops\n");
    assert!(!capture.timed_out);
    Ok(())
}

#[tokio::test]
async fn unterminated_last_line_is_kept() -> anyhow::Result<()> {
    init_tracing();
    let cmd = shell("printf 'partial'");

    let capture = runner::run(&cmd, &options(TimeoutPolicy::RunToCompletion, GENEROUS)).await?;

    assert_eq!(capture.stdout, "partial\n");
    Ok(())
}

/// Far more stderr than a pipe buffer holds, with stdout only written at the end.
#[tokio::test]
async fn heavy_stderr_does_not_deadlock() -> anyhow::Result<()> {
    init_tracing();
    let line = "e".repeat(100);
    let script = format!(
        "i=0; while [ $i -lt 4000 ]; do echo {line} >&2; i=$((i+1)); done; echo done"
    );

    let capture = runner::run(&shell(&script), &options(TimeoutPolicy::RunToCompletion, GENEROUS)).await?;

    assert!(!capture.timed_out, "runner stalled on a full stderr pipe");
    assert_eq!(capture.stdout, "done\n");
    assert_eq!(capture.stderr.lines().count(), 4000);
    Ok(())
}

#[tokio::test]
async fn hanging_child_is_terminated() -> anyhow::Result<()> {
    init_tracing();
    let cmd = shell("echo $$; exec sleep 30");
    let hard_timeout = Duration::from_millis(300);

    let started = Instant::now();
    let capture = runner::run(&cmd, &options(TimeoutPolicy::RunToCompletion, hard_timeout)).await?;

    assert!(capture.timed_out);
    assert!(capture.elapsed >= hard_timeout);
    assert!(started.elapsed() < Duration::from_secs(5));

    let pid: u32 = capture.stdout.trim().parse()?;
    assert!(pid > 0);
    #[cfg(target_os = "linux")]
    assert!(
        !std::path::Path::new(&format!("/proc/{pid}")).exists(),
        "child {pid} still present after termination"
    );
    Ok(())
}

#[tokio::test]
async fn polling_reads_output_once_it_arrives() -> anyhow::Result<()> {
    init_tracing();
    let cmd = shell("sleep 0.2; echo late; echo later");

    let capture = runner::run(&cmd, &options(polling(), GENEROUS)).await?;

    assert!(!capture.timed_out);
    assert_eq!(capture.stdout, "late\nlater\n");
    Ok(())
}

#[tokio::test]
async fn polling_gives_up_on_silent_child() -> anyhow::Result<()> {
    init_tracing();
    let hard_timeout = Duration::from_millis(200);

    let started = Instant::now();
    let capture = runner::run(&shell("exec sleep 30"), &options(polling(), hard_timeout)).await?;

    assert!(capture.timed_out);
    assert!(capture.stdout.is_empty());
    assert!(started.elapsed() < Duration::from_secs(5));
    Ok(())
}

#[tokio::test]
async fn launch_failure_returns_no_output() {
    init_tracing();
    let cmd = CommandLine::new("/nonexistent/echoprobe/ping", ["-c", "1"], Duration::from_secs(1));

    let result = runner::run(&cmd, &options(TimeoutPolicy::RunToCompletion, GENEROUS)).await;

    match result {
        Err(ProbeError::LaunchFailed { program, .. }) => {
            assert_eq!(program, "/nonexistent/echoprobe/ping")
        }
        other => panic!("expected LaunchFailed, received: {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_runs_keep_their_own_output() -> anyhow::Result<()> {
    init_tracing();
    let slow = shell("sleep 0.3; echo slow");
    let fast = shell("echo fast; echo fast-err >&2");
    let opts = options(TimeoutPolicy::RunToCompletion, GENEROUS);

    let started = Instant::now();
    let (slow, fast) = tokio::join!(runner::run(&slow, &opts), runner::run(&fast, &opts));
    let (slow, fast) = (slow?, fast?);

    assert_eq!(slow.stdout, "slow\n");
    assert!(slow.stderr.is_empty());
    assert_eq!(fast.stdout, "fast\n");
    assert_eq!(fast.stderr, "fast-err\n");
    assert!(fast.elapsed < slow.elapsed);
    assert!(started.elapsed() < Duration::from_secs(5));
    Ok(())
}
