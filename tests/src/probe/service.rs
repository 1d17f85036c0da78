use std::time::{Duration, Instant};

use echoprobe_common::config::{Config, TimeoutPolicy};
use echoprobe_common::probe::outcome::RTT_UNAVAILABLE;
use echoprobe_common::probe::{MatchStatus, ProbeParameters, ProbeTarget};
use echoprobe_core::PingService;

use crate::support::{fake_ping, init_tracing};

fn service_for(script: &str) -> PingService {
    let cfg = Config {
        program: fake_ping(script),
        grace: Duration::from_millis(100),
        ..Config::default()
    };
    PingService::new(cfg)
}

#[tokio::test]
async fn summary_queries_through_a_real_child() -> anyhow::Result<()> {
    init_tracing();
    let svc = service_for("healthy");

    assert_eq!(svc.min_rtt_with("https://example.com", 5, 1000).await?, 10);
    assert_eq!(svc.max_rtt_with("https://example.com", 5, 1000).await?, 15);
    assert_eq!(svc.mdev_rtt_with("https://example.com", 5, 1000).await?, 1);
    assert_eq!(svc.packet_loss("https://example.com").await?.as_deref(), Some("0%"));
    assert_eq!(svc.packet_loss_percent("https://example.com").await?, 0.0);
    assert_eq!(
        svc.resolve_direct_ip("https://example.com").await?.as_deref(),
        Some("93.184.216.34")
    );
    Ok(())
}

#[tokio::test]
async fn target_reaches_the_child_as_one_argument() -> anyhow::Result<()> {
    init_tracing();
    let svc = service_for("argv");

    let outcome = svc.avg_report("$(touch${IFS}pwned)").await?;
    let argv: Vec<&str> = outcome.raw_stdout().lines().collect();

    assert_eq!(argv, ["-c", "1", "-W", "1", "-t", "25", "$(touch${IFS}pwned)"]);
    Ok(())
}

#[tokio::test]
async fn unknown_host_outcome() -> anyhow::Result<()> {
    init_tracing();
    let svc = service_for("unknown");

    let outcome = svc.avg_report("https://nowhere.invalid").await?;

    assert_eq!(outcome.match_status(), MatchStatus::UnknownHost);
    assert_eq!(outcome.rtt_ms(), RTT_UNAVAILABLE);
    assert_eq!(outcome.raw_stderr(), "ping: unknown host nowhere.invalid\n");
    assert_eq!(outcome.report()["matchesAddress"], "2");

    assert_eq!(svc.min_rtt("https://nowhere.invalid").await?, RTT_UNAVAILABLE);
    Ok(())
}

/// The child ignores its own deadline; the runner's hard timeout still ends the probe.
#[tokio::test]
async fn hung_probe_yields_sentinels() -> anyhow::Result<()> {
    init_tracing();
    let svc = service_for("hang");
    let target = ProbeTarget::from_url("https://example.com")?;

    let started = Instant::now();
    let outcome = svc.probe(&target, &ProbeParameters::default()).await?;

    assert_eq!(outcome.rtt_ms(), RTT_UNAVAILABLE);
    assert_eq!(outcome.match_status(), MatchStatus::NoMatch);
    assert!(outcome.elapsed_ms() >= 1100);
    assert!(started.elapsed() < Duration::from_secs(5));

    assert_eq!(svc.max_rtt("https://example.com").await?, RTT_UNAVAILABLE);
    assert_eq!(svc.packet_loss_percent("https://example.com").await?, -1.0);
    Ok(())
}

#[tokio::test]
async fn polling_service_returns_partial_output_of_stalled_probe() -> anyhow::Result<()> {
    init_tracing();
    let cfg = Config {
        program: fake_ping("stall"),
        grace: Duration::from_millis(100),
        ..Config::default()
    }
    .polling();
    let svc = PingService::new(cfg);
    assert!(matches!(svc.config().policy, TimeoutPolicy::Polling { .. }));

    let started = Instant::now();
    let outcome = svc.avg_report("https://example.com").await?;

    assert_eq!(outcome.rtt_ms(), RTT_UNAVAILABLE);
    assert_eq!(outcome.match_status(), MatchStatus::NoMatch);
    assert_eq!(outcome.resolved_address(), "93.184.216.34");
    assert!(outcome.elapsed_ms() >= 1100);
    assert!(started.elapsed() < Duration::from_secs(5));

    assert_eq!(svc.min_rtt("https://example.com").await?, RTT_UNAVAILABLE);
    assert_eq!(svc.packet_loss("https://example.com").await?, None);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_queries_do_not_interfere() -> anyhow::Result<()> {
    init_tracing();
    let healthy = service_for("healthy");
    let unknown = service_for("unknown");

    let (ok, missing) = tokio::join!(
        healthy.avg_report("https://example.com"),
        unknown.avg_report("https://nowhere.invalid"),
    );
    let (ok, missing) = (ok?, missing?);

    assert_eq!(ok.match_status(), MatchStatus::DirectMatch);
    assert_eq!(ok.rtt_ms(), 10);
    assert!(ok.raw_stderr().is_empty());
    assert_eq!(missing.match_status(), MatchStatus::UnknownHost);
    assert!(missing.raw_stdout().is_empty());
    Ok(())
}

#[tokio::test]
async fn literal_ip_skips_the_probe_tool() -> anyhow::Result<()> {
    init_tracing();
    // A probe through this script would hang for the full hard timeout.
    let svc = service_for("hang");

    let started = Instant::now();
    let ip = svc.resolve_direct_ip("192.168.0.1").await?;

    assert_eq!(ip.as_deref(), Some("192.168.0.1"));
    assert!(started.elapsed() < Duration::from_millis(500));
    Ok(())
}

#[tokio::test]
#[ignore]
async fn real_ping_against_loopback() -> anyhow::Result<()> {
    init_tracing();
    let svc = PingService::new(Config::from_env());

    let outcome = svc.avg_report_with("127.0.0.1", 2, 1000, 64).await?;
    assert_eq!(outcome.match_status(), MatchStatus::DirectMatch);
    assert!(outcome.rtt_ms() >= 0);
    assert_eq!(svc.packet_loss_percent_with("127.0.0.1", 2, 1000).await?, 0.0);
    Ok(())
}
