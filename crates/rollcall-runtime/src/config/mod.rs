//! Configuration management with hierarchical layering.
//!
//! # Architecture
//!
//! Configuration is loaded from multiple sources with priority-based merging:
//!
//! ```text
//! Priority (highest to lowest):
//!
//! ┌─────────────────────────────────────────────┐
//! │  1. CLI flags (rollcall binary)             │  Invocation override
//! ├─────────────────────────────────────────────┤
//! │  2. Environment Variables (ROLLCALL_*)      │  Runtime override
//! ├─────────────────────────────────────────────┤
//! │  3. Project Config (.rollcall/config.toml)  │  Deployment-specific
//! ├─────────────────────────────────────────────┤
//! │  4. Global Config (~/.rollcall/config.toml) │  User defaults
//! ├─────────────────────────────────────────────┤
//! │  5. Default Values (compile-time)           │  Fallback
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Config Field | Type |
//! |----------|--------------|------|
//! | `ROLLCALL_DEBUG` | `debug` | bool |
//! | `ROLLCALL_HANDLER_TIMEOUT_MS` | `dispatch.handler_timeout_ms` | u64 |
//! | `ROLLCALL_SESSION_TTL_SECS` | `sessions.ttl_secs` | u64 |
//!
//! # Example Configuration
//!
//! ```toml
//! # ~/.rollcall/config.toml
//!
//! debug = false
//!
//! [dispatch]
//! handler_timeout_ms = 5000
//!
//! [sessions]
//! ttl_secs = 28800
//!
//! [[sessions.seed]]
//! token = "dev-admin"
//! user = "alice"
//! roles = ["ADMIN"]
//! ```
//!
//! Seeded sessions let the stdio transport be used without a login
//! provider. Do not seed tokens in shared deployments.

mod error;
mod loader;
mod types;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use types::{
    DispatchConfig, RollcallConfig, SeedSession, SessionsConfig, MAX_SESSION_TTL_SECS,
};

/// Default global config directory.
pub fn default_config_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".rollcall")
}

/// Default global config file path.
pub fn default_config_path() -> std::path::PathBuf {
    default_config_dir().join("config.toml")
}

/// Project config directory name.
pub const PROJECT_CONFIG_DIR: &str = ".rollcall";

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = "config.toml";
