//! Error types for the upload queue and its transports.

use std::path::PathBuf;
use thiserror::Error;

/// Errors building or driving an [`crate::UploadQueue`].
#[derive(Debug, Error)]
pub enum QueueError {
    /// The queue spawns one driver task per admitted upload and needs a tokio runtime for that.
    #[error("no tokio runtime available to drive uploads")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// Errors turning a local file into a transfer request.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not a regular file", .0.display())]
    NotAFile(PathBuf),
}

/// Errors inside the HTTP transport. These never leave the transport: they are
/// rendered into a failure message when the transfer settles.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("unsupported endpoint scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),
    #[error("{0}")]
    Curl(#[from] curl::Error),
    #[error("multipart form: {0}")]
    Form(#[from] curl::FormError),
    #[error("HTTP {code}: {reason}")]
    Http { code: u32, reason: &'static str },
}
