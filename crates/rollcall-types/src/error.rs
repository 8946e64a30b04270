//! Shared error-code interface.
//!
//! Every error enum in the workspace implements [`ErrorCode`] so that the
//! transport layer can report a stable, machine-readable kind without
//! matching on concrete types.
//!
//! # Example
//!
//! ```
//! use rollcall_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum LookupError {
//!     Missing(String),
//!     Unavailable,
//! }
//!
//! impl ErrorCode for LookupError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::Missing(_) => "LOOKUP_MISSING",
//!             Self::Unavailable => "LOOKUP_UNAVAILABLE",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::Unavailable)
//!     }
//! }
//!
//! let err = LookupError::Unavailable;
//! assert_eq!(err.code(), "LOOKUP_UNAVAILABLE");
//! assert!(err.is_recoverable());
//! ```

/// Machine-readable error kind.
///
/// # Code Format
///
/// - **UPPER_SNAKE_CASE**, e.g. `"RPC_FORBIDDEN"`
/// - **Layer prefix**: `AUTH_`, `STORE_`, `RPC_`, `REGISTRY_`
/// - **Stable**: clients branch on these strings, so they never change once
///   published
///
/// # Recoverability
///
/// An error is recoverable when repeating the same request unchanged may
/// succeed (a transient backend failure). Authentication, authorization and
/// validation failures are never recoverable: the caller has to log in,
/// obtain a different role, or correct the payload first.
pub trait ErrorCode {
    /// Returns the stable error code.
    fn code(&self) -> &'static str;

    /// Returns whether retrying the identical request may succeed.
    fn is_recoverable(&self) -> bool;
}

/// Asserts that an error code is non-empty, carries the expected prefix and
/// is UPPER_SNAKE_CASE.
///
/// Intended for tests that walk every variant of an error enum.
///
/// # Panics
///
/// Panics with a descriptive message if any check fails.
///
/// # Example
///
/// ```
/// use rollcall_types::{assert_error_code, ErrorCode};
///
/// struct Timeout;
///
/// impl ErrorCode for Timeout {
///     fn code(&self) -> &'static str { "NET_TIMEOUT" }
///     fn is_recoverable(&self) -> bool { true }
/// }
///
/// assert_error_code(&Timeout, "NET_");
/// ```
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "Error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "Error code '{}' must start with prefix '{}'",
        code,
        expected_prefix
    );
    assert!(
        is_upper_snake_case(code),
        "Error code '{}' must be UPPER_SNAKE_CASE",
        code
    );
}

/// Runs [`assert_error_code`] over a list of variants.
///
/// ```
/// use rollcall_types::{assert_error_codes, ErrorCode};
///
/// enum Probe { A, B }
///
/// impl ErrorCode for Probe {
///     fn code(&self) -> &'static str {
///         match self {
///             Self::A => "PROBE_A",
///             Self::B => "PROBE_B",
///         }
///     }
///     fn is_recoverable(&self) -> bool { false }
/// }
///
/// assert_error_codes(&[Probe::A, Probe::B], "PROBE_");
/// ```
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return false;
    }

    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
