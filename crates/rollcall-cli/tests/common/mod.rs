//! Shared E2E test helpers for `rollcall` binary tests.

use assert_cmd::cargo::cargo_bin_cmd;
use std::path::Path;
use std::time::Duration;

/// Default timeout for CLI tests.
pub const TIMEOUT_BASIC: Duration = Duration::from_secs(10);

/// Environment variables that would leak host configuration into a test.
const CONFIG_VARS: &[&str] = &[
    "ROLLCALL_DEBUG",
    "ROLLCALL_HANDLER_TIMEOUT_MS",
    "ROLLCALL_SESSION_TTL_SECS",
    "RUST_LOG",
];

/// Seeded sessions used by the serve tests.
pub const SEED_CONFIG: &str = r#"
[[sessions.seed]]
token = "admin-token"
user = "alice"
roles = ["ADMIN"]

[[sessions.seed]]
token = "reader-token"
user = "bob"
roles = ["READER"]
"#;

/// Build a Command for the `rollcall` binary isolated in `dir`.
///
/// The project root is `dir` and the global config is `dir/global.toml`,
/// so nothing from the host's `~/.rollcall` is read.
pub fn rollcall_cmd(dir: &Path) -> assert_cmd::Command {
    let mut cmd: assert_cmd::Command = cargo_bin_cmd!("rollcall");
    cmd.timeout(TIMEOUT_BASIC);
    for var in CONFIG_VARS {
        cmd.env_remove(var);
    }
    cmd.arg("-C")
        .arg(dir)
        .arg("--config")
        .arg(dir.join("global.toml"));
    cmd
}

/// Writes `content` as the project config under `dir`.
pub fn write_project_config(dir: &Path, content: &str) {
    let config_dir = dir.join(".rollcall");
    std::fs::create_dir_all(&config_dir).expect("create project config dir");
    std::fs::write(config_dir.join("config.toml"), content).expect("write project config");
}

/// Parses every stdout line as JSON.
pub fn json_lines(stdout: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout line is JSON"))
        .collect()
}
