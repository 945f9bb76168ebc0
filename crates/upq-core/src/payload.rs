//! Transfer requests and the raw payloads they carry.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::PayloadError;

/// Opaque upload target (e.g. a remote folder reference).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Destination(String);

impl Destination {
    pub fn new(target: impl Into<String>) -> Self {
        Self(target.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bytes to upload. Cloning is cheap in both variants.
#[derive(Debug, Clone)]
pub enum Payload {
    Memory(Arc<[u8]>),
    File(PathBuf),
}

/// One file-transfer request as accepted by [`crate::UploadQueue::add`].
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub name: String,
    pub size: u64,
    pub payload: Payload,
}

impl TransferRequest {
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes: Arc<[u8]> = bytes.into();
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            payload: Payload::Memory(bytes),
        }
    }

    /// Builds a request for a file on disk; name and size come from the path and its metadata.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PayloadError> {
        let path = path.as_ref();
        let meta = std::fs::metadata(path).map_err(|source| PayloadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if !meta.is_file() {
            return Err(PayloadError::NotAFile(path.to_path_buf()));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string());
        Ok(Self {
            name,
            size: meta.len(),
            payload: Payload::File(path.to_path_buf()),
        })
    }
}
