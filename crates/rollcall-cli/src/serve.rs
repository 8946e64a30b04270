//! JSON-lines transport.
//!
//! One request object per input line, one response object per output line,
//! in order. Blank lines are skipped. A line that is not a valid request
//! still gets a response (`RPC_VALIDATION_FAILED`), echoing its `id` when
//! one could be read.

use anyhow::Result;
use rollcall_runtime::{Dispatcher, RpcError, RpcRequest, RpcResponse, ValidationErrors};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Serves requests from `input` until EOF. Returns the number of requests
/// answered.
///
/// # Errors
///
/// Returns an error only for I/O failures on `input` or `output`.
pub async fn run<R, W>(dispatcher: &Dispatcher, input: R, mut output: W) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut handled = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match parse_request(line) {
            Ok(request) => dispatcher.call(request).await,
            Err(response) => response,
        };

        let mut encoded = serde_json::to_string(&response)?;
        encoded.push('\n');
        output.write_all(encoded.as_bytes()).await?;
        output.flush().await?;
        handled += 1;
    }

    Ok(handled)
}

/// Parses one line, or builds the error response for it.
fn parse_request(line: &str) -> Result<RpcRequest, RpcResponse> {
    let value: Value = serde_json::from_str(line).map_err(|e| {
        debug!(error = %e, "unparseable request line");
        RpcResponse::failure(Value::Null, &malformed(&e))
    })?;

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| {
        debug!(error = %e, "malformed request");
        RpcResponse::failure(id, &malformed(&e))
    })
}

fn malformed(err: &serde_json::Error) -> RpcError {
    RpcError::Validation(ValidationErrors::from_serde(err))
}
