//! Procedure addressing.
//!
//! A procedure is addressed by its resource group and its name, written
//! `group.name` on the wire (`volunteer.create`, `activity.getLatest`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fully qualified procedure address.
///
/// Ordering is lexicographic on `(group, name)` so policy dumps are stable.
///
/// # Example
///
/// ```
/// use rollcall_types::ProcedurePath;
///
/// let path: ProcedurePath = "volunteer.create".parse().unwrap();
/// assert_eq!(path.group(), "volunteer");
/// assert_eq!(path.name(), "create");
/// assert_eq!(path.to_string(), "volunteer.create");
///
/// assert!("volunteer".parse::<ProcedurePath>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProcedurePath {
    group: String,
    name: String,
}

/// Error returned when a procedure address is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid procedure path '{input}': {reason}")]
pub struct InvalidPath {
    /// The rejected input.
    pub input: String,
    /// Why it was rejected.
    pub reason: &'static str,
}

impl ProcedurePath {
    /// Builds a path from its two segments, validating both.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPath`] if either segment is empty or contains
    /// characters other than ASCII letters, digits and `_`.
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Result<Self, InvalidPath> {
        let group = group.into();
        let name = name.into();
        for segment in [&group, &name] {
            if !is_valid_segment(segment) {
                return Err(InvalidPath {
                    input: format!("{group}.{name}"),
                    reason: "segments must be non-empty [A-Za-z0-9_]",
                });
            }
        }
        Ok(Self { group, name })
    }

    /// Returns the resource group.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Returns the procedure name within its group.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for ProcedurePath {
    type Err = InvalidPath;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((group, name)) = s.split_once('.') else {
            return Err(InvalidPath {
                input: s.to_string(),
                reason: "expected 'group.name'",
            });
        };
        Self::new(group, name).map_err(|mut e| {
            e.input = s.to_string();
            e
        })
    }
}

impl fmt::Display for ProcedurePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.group, self.name)
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}
