//! Execution gateway: runs one request through an isolated handler process.
//!
//! The request is serialized to the child's stdin. Stdout must carry exactly
//! one response object, stderr carries free-text diagnostics. Both streams
//! are drained concurrently so neither pipe can fill up and stall the child,
//! and are only interpreted after the child has exited.

mod directory;
mod logs;

pub use directory::HandlerDirectory;
pub use logs::{FALLBACK_CATEGORY, infer_level, parse_log_line, parse_log_output};

use crate::error::{Result, TransportError};
use crate::protocol::{ReleaseRequest, ReleaseResponse};
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

/// Run `request` through the handler executable at `handler`.
///
/// A handler that exits non-zero but still printed a well-formed response
/// yields that response. Only when no response can be parsed is a transport
/// error returned, carrying the raw stderr text. No retries.
pub async fn invoke(handler: &Path, request: &ReleaseRequest) -> Result<ReleaseResponse> {
    let payload = serde_json::to_vec(request)?;

    let mut command = Command::new(handler);
    command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if request.context.working_dir.is_dir() {
        command.current_dir(&request.context.working_dir);
    }

    log::debug!("invoking {} {}", handler.display(), request.command);
    let mut child = command.spawn().map_err(|e| TransportError::Spawn {
        path: handler.to_path_buf(),
        reason: e.to_string(),
    })?;

    let missing_pipe = |stream: &str| TransportError::Spawn {
        path: handler.to_path_buf(),
        reason: format!("{} was not captured", stream),
    };
    let mut stdin = child.stdin.take().ok_or_else(|| missing_pipe("stdin"))?;
    let stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
    let stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;

    let feed = async move {
        let result = stdin.write_all(&payload).await;
        drop(stdin);
        result
    };
    let (fed, stdout, stderr) = tokio::join!(feed, drain(stdout), drain(stderr));
    let status = child.wait().await?;

    if let Err(e) = fed {
        // Handlers that never read their input close the pipe early
        log::debug!("handler did not consume its request: {}", e);
    }
    let stdout = String::from_utf8_lossy(&stdout?).trim().to_string();
    let stderr = String::from_utf8_lossy(&stderr?).into_owned();

    if !status.success() {
        if !stdout.is_empty()
            && let Ok(mut response) = serde_json::from_str::<ReleaseResponse>(&stdout)
        {
            response.logs = parse_log_output(&stderr);
            return Ok(response);
        }
        return Err(TransportError::HandlerFailed {
            status: status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string()),
            stderr,
        }
        .into());
    }

    let mut response = serde_json::from_str::<ReleaseResponse>(&stdout).map_err(|e| {
        TransportError::MalformedResponse {
            reason: e.to_string(),
            output: stdout.clone(),
        }
    })?;
    response.logs = parse_log_output(&stderr);
    Ok(response)
}

/// Locate handler `name` under `directory` and invoke it
pub async fn dispatch(
    directory: &HandlerDirectory,
    name: &str,
    request: &ReleaseRequest,
) -> Result<ReleaseResponse> {
    let handler = directory.locate(name)?;
    invoke(&handler, request).await
}

async fn drain<R: AsyncRead + Unpin>(mut reader: R) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).await?;
    Ok(buf)
}
