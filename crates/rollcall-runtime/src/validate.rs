//! Input validation.
//!
//! Validation happens in two passes, both before any storage access:
//!
//! 1. **Shape**: `serde` deserialization into the procedure's input type.
//!    Missing, unknown or mistyped fields fail here.
//! 2. **Rules**: [`Validate::validate`] on the typed value. Business rules
//!    (non-empty names, positive quotas, date ordering) fail here.
//!
//! Either pass produces [`ValidationErrors`], a list of [`FieldIssue`]s
//! that is returned to the client as-is.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A single problem with one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    /// Wire name of the field, or `"input"` for the payload as a whole.
    pub field: String,
    /// Human-readable problem description.
    pub message: String,
}

impl FieldIssue {
    /// Creates an issue for `field`.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Accumulated field issues.
///
/// # Example
///
/// ```
/// use rollcall_runtime::ValidationErrors;
///
/// let mut errors = ValidationErrors::new();
/// errors.check(false, "name", "must not be empty");
/// errors.check(true, "maxVolunteers", "must be at least 1");
///
/// let err = errors.finish().unwrap_err();
/// assert_eq!(err.issues().len(), 1);
/// assert_eq!(err.to_string(), "name: must not be empty");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    issues: Vec<FieldIssue>,
}

impl ValidationErrors {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collector holding one issue.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![FieldIssue::new(field, message)],
        }
    }

    /// Records an issue.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(FieldIssue::new(field, message));
    }

    /// Records an issue unless `ok` holds.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.push(field, message);
        }
    }

    /// Records every issue of `nested` under `prefix`, as `prefix.field`.
    pub fn extend_nested(&mut self, prefix: &str, nested: ValidationErrors) {
        for issue in nested.issues {
            self.push(format!("{prefix}.{}", issue.field), issue.message);
        }
    }

    /// Returns the recorded issues.
    #[must_use]
    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Consumes the collector.
    ///
    /// # Errors
    ///
    /// Returns `self` if any issue was recorded.
    pub fn finish(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Converts a deserialization failure into a field issue.
    ///
    /// `serde_json` reports missing and unknown fields by name; those names
    /// become the issue's field. Other failures are attributed to `"input"`.
    #[must_use]
    pub fn from_serde(err: &serde_json::Error) -> Self {
        let message = err.to_string();
        let field = backticked_field(&message, "missing field `")
            .or_else(|| backticked_field(&message, "unknown field `"))
            .unwrap_or("input");
        let message = strip_position(&message);
        Self::single(field, message)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for issue in &self.issues {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{issue}")?;
            first = false;
        }
        Ok(())
    }
}

/// Rewrites a serde message from a nested object so that the field it
/// names carries `prefix` (`missing field `prefix.id``). Messages without a
/// field name get `prefix` in front instead.
pub(crate) fn nest_serde_message(prefix: &str, message: &str) -> String {
    let message = strip_position(message);
    if message.starts_with("missing field `") || message.starts_with("unknown field `") {
        message.replacen("field `", &format!("field `{prefix}."), 1)
    } else {
        format!("{prefix}: {message}")
    }
}

/// Returns the name between `prefix` and the next backtick.
fn backticked_field<'a>(message: &'a str, prefix: &str) -> Option<&'a str> {
    let start = message.find(prefix)? + prefix.len();
    let len = message[start..].find('`')?;
    Some(&message[start..start + len])
}

/// Drops serde_json's trailing " at line X column Y", which is meaningless
/// for payloads that were already parsed into a `Value`.
fn strip_position(message: &str) -> String {
    match message.rfind(" at line ") {
        Some(idx) => message[..idx].to_string(),
        None => message.to_string(),
    }
}

/// Business-rule validation for procedure inputs.
///
/// Runs after deserialization succeeded. Implementations push every problem
/// they find rather than stopping at the first one.
pub trait Validate {
    /// Records rule violations into `errors`.
    fn validate(&self, errors: &mut ValidationErrors);
}

/// Deserializes and validates a raw payload.
///
/// An absent payload (`null`) is treated as an empty object so that inputs
/// whose fields are all optional accept no payload at all.
///
/// # Errors
///
/// Returns [`ValidationErrors`] from either pass.
pub fn parse_input<I>(raw: Value) -> Result<I, ValidationErrors>
where
    I: DeserializeOwned + Validate,
{
    let raw = if raw.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        raw
    };
    let input: I = serde_json::from_value(raw).map_err(|e| ValidationErrors::from_serde(&e))?;
    let mut errors = ValidationErrors::new();
    input.validate(&mut errors);
    errors.finish()?;
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase", deny_unknown_fields)]
    struct Probe {
        name: String,
        #[serde(default)]
        max_volunteers: Option<i32>,
    }

    impl Validate for Probe {
        fn validate(&self, errors: &mut ValidationErrors) {
            errors.check(!self.name.trim().is_empty(), "name", "must not be empty");
            if let Some(max) = self.max_volunteers {
                errors.check(max >= 1, "maxVolunteers", "must be at least 1");
            }
        }
    }

    #[test]
    fn missing_field_is_named() {
        let err = parse_input::<Probe>(json!({})).unwrap_err();
        assert_eq!(err.issues()[0].field, "name");
        assert_eq!(err.issues()[0].message, "missing field `name`");
    }

    #[test]
    fn null_payload_counts_as_empty_object() {
        let err = parse_input::<Probe>(Value::Null).unwrap_err();
        assert_eq!(err.issues()[0].field, "name");
    }

    #[test]
    fn unknown_field_is_named() {
        let err = parse_input::<Probe>(json!({"name": "a", "role": "ADMIN"})).unwrap_err();
        assert_eq!(err.issues()[0].field, "role");
    }

    #[test]
    fn type_mismatch_is_attributed_to_input() {
        let err = parse_input::<Probe>(json!({"name": 5})).unwrap_err();
        assert_eq!(err.issues()[0].field, "input");
        assert!(err.issues()[0].message.contains("invalid type"));
    }

    #[test]
    fn rules_collect_every_issue() {
        let err = parse_input::<Probe>(json!({"name": " ", "maxVolunteers": 0})).unwrap_err();
        let fields: Vec<_> = err.issues().iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, ["name", "maxVolunteers"]);
        assert_eq!(
            err.to_string(),
            "name: must not be empty; maxVolunteers: must be at least 1"
        );
    }

    #[test]
    fn nested_messages_carry_prefix() {
        assert_eq!(
            nest_serde_message("data", "unknown field `nick`, expected `name`"),
            "unknown field `data.nick`, expected `name`"
        );
        assert_eq!(
            nest_serde_message("where", "missing field `id`"),
            "missing field `where.id`"
        );
        assert_eq!(
            nest_serde_message("data", "invalid type: null, expected a string"),
            "data: invalid type: null, expected a string"
        );
    }

    #[test]
    fn extend_nested_prefixes_fields() {
        let mut errors = ValidationErrors::new();
        errors.extend_nested("data", ValidationErrors::single("name", "must not be empty"));
        assert_eq!(errors.to_string(), "data.name: must not be empty");
    }

    #[test]
    fn valid_input_passes() {
        let probe = parse_input::<Probe>(json!({"name": "ok", "maxVolunteers": 3})).unwrap();
        assert_eq!(probe.name, "ok");
    }
}
