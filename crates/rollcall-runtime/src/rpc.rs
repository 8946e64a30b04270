//! Wire envelope for procedure calls.
//!
//! # Request
//!
//! ```json
//! {"id": 1, "procedure": "volunteer.create", "token": "…", "input": {"name": "Ana", "uniqueId": "V-1"}}
//! ```
//!
//! `id`, `token` and `input` are optional. `id` is echoed back verbatim.
//!
//! # Response
//!
//! ```json
//! {"id": 1, "ok": true, "data": {"id": 3, "name": "Ana", …}}
//! {"id": 1, "ok": false, "error": {"code": "RPC_FORBIDDEN", "message": "…"}}
//! ```

use crate::{FieldIssue, RpcError};
use rollcall_auth::SessionToken;
use rollcall_types::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named call with an optional bearer token and payload.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RpcRequest {
    /// Client correlation id, echoed in the response.
    #[serde(default)]
    pub id: Value,
    /// `group.name`.
    pub procedure: String,
    /// Bearer token.
    #[serde(default)]
    pub token: Option<SessionToken>,
    /// Procedure payload.
    #[serde(default)]
    pub input: Value,
}

impl RpcRequest {
    /// Creates an anonymous request without payload.
    pub fn new(procedure: impl Into<String>) -> Self {
        Self {
            id: Value::Null,
            procedure: procedure.into(),
            token: None,
            input: Value::Null,
        }
    }

    /// Sets the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SessionToken::new(token));
        self
    }

    /// Sets the payload.
    #[must_use]
    pub fn with_input(mut self, input: Value) -> Self {
        self.input = input;
        self
    }

    /// Sets the correlation id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = id.into();
        self
    }
}

/// Error part of a failed [`RpcResponse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable `RPC_*` code.
    pub code: String,
    /// Human-readable message. Never contains storage internals.
    pub message: String,
    /// Field-level detail for validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldIssue>>,
}

impl From<&RpcError> for ErrorBody {
    fn from(err: &RpcError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            fields: err.fields().map(<[FieldIssue]>::to_vec),
        }
    }
}

/// Outcome of an [`RpcRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    /// Echo of the request id.
    pub id: Value,
    /// `true` iff `data` is present.
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl RpcResponse {
    /// Successful response.
    #[must_use]
    pub fn success(id: Value, data: Value) -> Self {
        Self {
            id,
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Failed response.
    #[must_use]
    pub fn failure(id: Value, err: &RpcError) -> Self {
        Self {
            id,
            ok: false,
            data: None,
            error: Some(ErrorBody::from(err)),
        }
    }

    /// Builds a response from a dispatcher result.
    #[must_use]
    pub fn from_result(id: Value, result: Result<Value, RpcError>) -> Self {
        match result {
            Ok(data) => Self::success(id, data),
            Err(err) => Self::failure(id, &err),
        }
    }

    /// Error code, if failed.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.code.as_str())
    }
}
