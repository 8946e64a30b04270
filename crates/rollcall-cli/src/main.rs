//! Rollcall CLI - role-gated procedures for the volunteer dashboard.
//!
//! # Commands
//!
//! - `rollcall policy [--json]`: print which roles may call each procedure
//! - `rollcall serve`: JSON-lines RPC over stdin/stdout
//!
//! # Configuration
//!
//! Configuration is loaded from multiple sources with priority:
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`ROLLCALL_*`)
//! 3. Project config (`.rollcall/config.toml` in the project root)
//! 4. Global config (`~/.rollcall/config.toml`)
//! 5. Default values (lowest priority)
//!
//! # Environment Variables
//!
//! - `ROLLCALL_DEBUG`: Enable debug mode (`true`/`false`)
//! - `ROLLCALL_HANDLER_TIMEOUT_MS`: Handler timeout in milliseconds
//! - `ROLLCALL_SESSION_TTL_SECS`: Lifetime of seeded sessions
//!
//! Logs go to stderr; stdout carries only command output.

mod policy;
mod serve;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rollcall_runtime::auth::MemorySessionStore;
use rollcall_runtime::config::{ConfigError, ConfigLoader, RollcallConfig};
use rollcall_runtime::{procedures, Dispatcher};
use rollcall_store::Database;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Rollcall CLI - role-gated procedures for the volunteer dashboard
#[derive(Parser, Debug)]
#[command(name = "rollcall")]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project root directory (defaults to current directory)
    #[arg(short = 'C', long, global = true)]
    project: Option<PathBuf>,

    /// Global config file (defaults to ~/.rollcall/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Handler timeout in milliseconds (also: ROLLCALL_HANDLER_TIMEOUT_MS)
    #[arg(long, global = true, value_name = "MS")]
    handler_timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the access policy of every procedure
    Policy {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Serve JSON-lines RPC on stdin/stdout until stdin closes
    Serve,
}

/// CLI-based configuration resolver.
///
/// Merges file/env config via [`ConfigLoader`] and applies CLI argument
/// overrides as the highest-priority layer.
struct CliConfigResolver {
    project_root: PathBuf,
    global_config: Option<PathBuf>,
    debug: bool,
    handler_timeout_ms: Option<u64>,
}

impl CliConfigResolver {
    fn from_args(args: &Args) -> Self {
        let project_root = args.project.clone().unwrap_or_else(|| {
            std::env::current_dir().unwrap_or_else(|e| {
                eprintln!("Warning: failed to get current directory, using '.': {e}");
                PathBuf::from(".")
            })
        });

        Self {
            project_root,
            global_config: args.config.clone(),
            debug: args.debug,
            handler_timeout_ms: args.handler_timeout_ms,
        }
    }

    fn resolve(&self) -> Result<RollcallConfig, ConfigError> {
        let mut loader = ConfigLoader::new().with_project_root(&self.project_root);
        if let Some(ref path) = self.global_config {
            loader = loader.with_global_config(path);
        }

        let mut config = loader.load()?;

        // CLI args override (highest priority); only the final values are
        // range-checked.
        if self.debug {
            config.debug = true;
        }
        if let Some(ms) = self.handler_timeout_ms {
            config.dispatch.handler_timeout_ms = ms;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let resolver = CliConfigResolver::from_args(&args);

    let config = resolver
        .resolve()
        .map_err(|e| anyhow::anyhow!("Config error: {e}"))?;

    init_tracing(&args, &config);

    info!(path = %resolver.project_root.display(), "Project root");

    let registry = procedures::default_registry().context("invalid procedure registry")?;
    let registry = Arc::new(registry);

    match args.command {
        Command::Policy { json } => {
            let table = registry.policy_table();
            let rendered = if json {
                policy::render_json(&table)?
            } else {
                policy::render_table(&table)
            };
            println!("{rendered}");
        }
        Command::Serve => {
            let sessions = Arc::new(MemorySessionStore::new());
            let seeded = config
                .sessions
                .seeded_sessions()
                .map_err(|e| anyhow::anyhow!("Config error: {e}"))?;
            let seeded_count = seeded.len();
            for (token, session) in seeded {
                sessions.insert(token, session);
            }

            let dispatcher = Dispatcher::new(registry, Database::in_memory(), sessions)
                .with_handler_timeout(config.handler_timeout());
            info!(
                procedures = dispatcher.registry().len(),
                seeded_sessions = seeded_count,
                timeout_ms = config.dispatch.handler_timeout_ms,
                "Serving JSON-lines RPC on stdio"
            );

            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let handled = serve::run(&dispatcher, stdin, tokio::io::stdout()).await?;
            info!(requests = handled, "stdin closed");
        }
    }

    Ok(())
}

/// Installs the stderr subscriber.
///
/// Filter: --debug (or `debug = true`) > --verbose > RUST_LOG env > default "warn".
fn init_tracing(args: &Args, config: &RollcallConfig) {
    let filter = if config.debug {
        EnvFilter::new("debug,tokio=warn")
    } else if args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let layer = fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn resolver_with(
        project: &TempDir,
        global: PathBuf,
        debug: bool,
        handler_timeout_ms: Option<u64>,
    ) -> CliConfigResolver {
        CliConfigResolver {
            project_root: project.path().to_path_buf(),
            global_config: Some(global),
            debug,
            handler_timeout_ms,
        }
    }

    #[test]
    fn args_parse_subcommands() {
        let args = Args::parse_from(["rollcall", "-d", "policy", "--json"]);
        assert!(args.debug);
        assert!(matches!(args.command, Command::Policy { json: true }));

        let args = Args::parse_from(["rollcall", "serve", "-C", "/tmp/project"]);
        assert!(matches!(args.command, Command::Serve));
        assert_eq!(args.project, Some(PathBuf::from("/tmp/project")));
    }

    #[test]
    fn cli_flags_override_config_files() {
        let project = TempDir::new().unwrap();
        let dir = project.path().join(".rollcall");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("config.toml"),
            "[dispatch]\nhandler_timeout_ms = 900\n",
        )
        .unwrap();

        let global = project.path().join("missing-global.toml");

        let config = resolver_with(&project, global.clone(), false, None)
            .resolve()
            .unwrap();
        assert_eq!(config.dispatch.handler_timeout_ms, 900);

        let config = resolver_with(&project, global, true, Some(50))
            .resolve()
            .unwrap();
        assert!(config.debug);
        assert_eq!(config.dispatch.handler_timeout_ms, 50);
    }

    #[test]
    fn flag_replaces_out_of_range_file_value() {
        let project = TempDir::new().unwrap();
        let dir = project.path().join(".rollcall");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), "[dispatch]\nhandler_timeout_ms = 0\n").unwrap();
        let global = project.path().join("missing-global.toml");

        let err = resolver_with(&project, global.clone(), false, None)
            .resolve()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let config = resolver_with(&project, global, false, Some(100))
            .resolve()
            .unwrap();
        assert_eq!(config.dispatch.handler_timeout_ms, 100);
    }

    #[test]
    fn zero_timeout_flag_is_rejected() {
        let project = TempDir::new().unwrap();
        let global = project.path().join("missing-global.toml");
        let err = resolver_with(&project, global, false, Some(0))
            .resolve()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
