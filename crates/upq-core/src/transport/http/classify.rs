//! Human-readable failure messages from curl errors and HTTP statuses.

use crate::error::TransportError;

/// Short reason phrase for common upload-relevant status codes.
pub fn reason_phrase(code: u32) -> &'static str {
    match code {
        400 => "bad request",
        401 => "unauthorized",
        403 => "forbidden",
        404 => "not found",
        408 => "request timeout",
        409 => "conflict",
        413 => "payload too large",
        415 => "unsupported media type",
        429 => "too many requests",
        500 => "internal server error",
        502 => "bad gateway",
        503 => "service unavailable",
        504 => "gateway timeout",
        300..=399 => "unexpected redirect",
        400..=499 => "rejected by server",
        500..=599 => "server error",
        _ => "unexpected status",
    }
}

/// Message stored on the task when a transfer fails. For HTTP errors the first
/// line of the response body is appended when it looks like text.
pub fn failure_message(err: &TransportError, body: &[u8]) -> String {
    match err {
        TransportError::Curl(e) if e.is_operation_timedout() => format!("timed out: {}", e),
        TransportError::Curl(e) if e.is_couldnt_connect() || e.is_couldnt_resolve_host() => {
            format!("connection failed: {}", e)
        }
        TransportError::Curl(e) if e.is_read_error() => format!("cannot read payload: {}", e),
        TransportError::Http { .. } => match body_hint(body) {
            Some(hint) => format!("{} ({})", err, hint),
            None => err.to_string(),
        },
        other => other.to_string(),
    }
}

fn body_hint(body: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(body).ok()?;
    let line = text.lines().map(str::trim).find(|l| !l.is_empty())?;
    Some(line.chars().take(120).collect())
}
