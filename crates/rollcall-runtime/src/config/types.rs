//! Configuration types.
//!
//! All types implement [`Default`] for compile-time fallback values.

use super::ConfigError;
use rollcall_auth::{Role, Session, SessionToken};
use rollcall_types::UserId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure.
///
/// This is the unified configuration after merging all layers.
///
/// # Example
///
/// ```
/// use rollcall_runtime::config::RollcallConfig;
///
/// let config = RollcallConfig::default();
/// assert!(!config.debug);
/// assert_eq!(config.dispatch.handler_timeout_ms, 5_000);
/// assert_eq!(config.sessions.ttl_secs, 8 * 60 * 60);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RollcallConfig {
    /// Enable debug logging.
    pub debug: bool,

    /// Dispatcher settings.
    pub dispatch: DispatchConfig,

    /// Session settings.
    pub sessions: SessionsConfig,
}

impl RollcallConfig {
    /// Deserializes from TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if the TOML is invalid.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Merges another config into this one.
    ///
    /// Values from `other` override `self` where they differ from the
    /// defaults. Seeded sessions accumulate; a later seed replaces an
    /// earlier one with the same token.
    pub fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.debug != default.debug {
            self.debug = other.debug;
        }

        self.dispatch.merge(&other.dispatch);
        self.sessions.merge(&other.sessions);
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for zero durations and session
    /// lifetimes above [`MAX_SESSION_TTL_SECS`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dispatch.handler_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "dispatch.handler_timeout_ms",
                "must be greater than zero",
            ));
        }
        if self.sessions.ttl_secs == 0 || self.sessions.ttl_secs > MAX_SESSION_TTL_SECS {
            return Err(ConfigError::invalid_value(
                "sessions.ttl_secs",
                format!("must be between 1 and {MAX_SESSION_TTL_SECS}"),
            ));
        }
        Ok(())
    }

    /// Handler timeout as a [`Duration`].
    #[must_use]
    pub fn handler_timeout(&self) -> Duration {
        Duration::from_millis(self.dispatch.handler_timeout_ms)
    }
}

/// Dispatcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DispatchConfig {
    /// Upper bound on handler execution in milliseconds. Exceeding it is
    /// reported to the client as a storage failure.
    pub handler_timeout_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            handler_timeout_ms: 5_000,
        }
    }
}

impl DispatchConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.handler_timeout_ms != default.handler_timeout_ms {
            self.handler_timeout_ms = other.handler_timeout_ms;
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionsConfig {
    /// Lifetime of new sessions in seconds.
    pub ttl_secs: u64,

    /// Sessions installed at startup.
    pub seed: Vec<SeedSession>,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 8 * 60 * 60,
            seed: Vec::new(),
        }
    }
}

impl SessionsConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.ttl_secs != default.ttl_secs {
            self.ttl_secs = other.ttl_secs;
        }
        for seed in &other.seed {
            self.seed.retain(|existing| existing.token != seed.token);
            self.seed.push(seed.clone());
        }
    }

    /// Session lifetime as a [`chrono::Duration`].
    #[must_use]
    pub fn ttl(&self) -> chrono::Duration {
        ttl_from_secs(self.ttl_secs)
    }

    /// Builds the seeded sessions.
    ///
    /// Each session expires after its own `ttl_secs`, or [`ttl`](Self::ttl)
    /// if unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownRole`] if a seed names a role that
    /// does not exist, and [`ConfigError::InvalidValue`] if it names none.
    pub fn seeded_sessions(&self) -> Result<Vec<(SessionToken, Session)>, ConfigError> {
        self.seed
            .iter()
            .map(|seed| {
                let (roles, unknown) = Role::parse_list(&seed.roles);
                if let Some(role) = unknown.first() {
                    return Err(ConfigError::unknown_role(&seed.user, *role));
                }
                if roles.is_empty() {
                    return Err(ConfigError::invalid_value(
                        format!("sessions.seed[{}].roles", seed.user),
                        "must name at least one role",
                    ));
                }
                let ttl = seed.ttl_secs.map_or_else(|| self.ttl(), ttl_from_secs);
                let session = Session::new(UserId::new(seed.user.clone()), roles).expires_in(ttl);
                Ok((SessionToken::new(seed.token.clone()), session))
            })
            .collect()
    }
}

/// Longest accepted session lifetime (ten years).
pub const MAX_SESSION_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

fn ttl_from_secs(secs: u64) -> chrono::Duration {
    // Clamped so `issued_at + ttl` cannot overflow.
    chrono::Duration::seconds(secs.min(MAX_SESSION_TTL_SECS) as i64)
}

/// A session installed from configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeedSession {
    /// Bearer token clients present.
    pub token: String,
    /// Identity of the session.
    pub user: String,
    /// Role names (`ADMIN`, `OPERATOR`, `READER`, case-insensitive).
    pub roles: Vec<String>,
    /// Overrides `sessions.ttl_secs` for this seed.
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}
