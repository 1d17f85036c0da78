use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use echoprobe_common::config::TimeoutPolicy;
use echoprobe_core::command::CommandLine;
use echoprobe_core::runner::RunOptions;
use tracing_subscriber::EnvFilter;

static TRACING: OnceLock<()> = OnceLock::new();
static SCRIPTS: OnceLock<PathBuf> = OnceLock::new();

pub const HEALTHY_OUTPUT: &str = "\
PING example.com (93.184.216.34) 56(84) bytes of data.
64 bytes from 93.184.216.34: icmp_seq=1 ttl=56 time=10.0 ms
64 bytes from 93.184.216.34: icmp_seq=2 ttl=56 time=15.0 ms

--- example.com ping statistics ---
5 packets transmitted, 5 received, 0% packet loss, time 4006ms
round-trip min/avg/max/mdev = 10.0/12.5/15.0/1.2 ms";

/// Installs a fmt subscriber honouring `RUST_LOG`, once per test binary.
pub fn init_tracing() {
    TRACING.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// `sh -c <script>` with the given expected duration.
pub fn shell(script: &str) -> CommandLine {
    CommandLine::new("/bin/sh", ["-c", script], Duration::from_secs(1))
}

pub fn options(policy: TimeoutPolicy, hard_timeout: Duration) -> RunOptions {
    RunOptions {
        policy,
        hard_timeout,
        drain_grace: Duration::from_millis(250),
    }
}

pub fn polling() -> TimeoutPolicy {
    TimeoutPolicy::Polling {
        interval: Duration::from_millis(10),
    }
}

/// Stand-in `ping` executables, written once per test binary.
///
/// * `healthy`: prints [`HEALTHY_OUTPUT`].
/// * `hang`: never exits.
/// * `stall`: prints the header line, then never exits.
/// * `argv`: prints each argument on its own line.
/// * `unknown`: complains about an unknown host on stderr.
pub fn fake_ping(name: &str) -> PathBuf {
    let dir = SCRIPTS.get_or_init(|| {
        let dir = std::env::temp_dir().join(format!("echoprobe-tests-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("create script dir");

        write_script(&dir, "healthy", &format!("cat <<'EOF'\n{HEALTHY_OUTPUT}\nEOF\n"));
        write_script(&dir, "hang", "exec sleep 30\n");
        write_script(
            &dir,
            "stall",
            "echo 'PING example.com (93.184.216.34) 56(84) bytes of data.'\nexec sleep 30\n",
        );
        write_script(&dir, "argv", "printf '%s\\n' \"$@\"\n");
        write_script(
            &dir,
            "unknown",
            "for last; do :; done\necho \"ping: unknown host $last\" >&2\nexit 2\n",
        );

        dir
    });
    dir.join(name)
}

fn write_script(dir: &Path, name: &str, body: &str) {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}")).expect("write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod script");
}
