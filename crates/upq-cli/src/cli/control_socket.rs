//! Control socket: server (during `upq upload`) and client (for `upq cancel` and friends).
//! Protocol: one command line in, one JSON reply line out (see `upq_core::control`).

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use upq_core::control::{ControlCommand, ControlReply};
use upq_core::UploadQueue;

/// Binds `path` and spawns a task answering each command line with `queue.apply`.
/// A stale socket file at `path` is replaced; a live one (another `upq upload`) is an error.
pub fn spawn_control_listener(
    queue: UploadQueue,
    path: impl AsRef<Path>,
) -> Result<tokio::task::JoinHandle<()>> {
    let path = path.as_ref().to_path_buf();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    clear_stale_socket(&path)?;
    let listener = UnixListener::bind(&path)
        .with_context(|| format!("bind control socket {}", path.display()))?;
    tracing::debug!(path = %path.display(), "control socket listening");

    let handle = tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let queue = queue.clone();
                    tokio::spawn(async move {
                        if let Err(e) = serve_connection(queue, stream).await {
                            tracing::debug!("control connection: {:#}", e);
                        }
                    });
                }
                Err(e) => tracing::debug!("control socket accept: {}", e),
            }
        }
    });
    Ok(handle)
}

/// Removes `path` only if nobody is listening on it.
fn clear_stale_socket(path: &Path) -> Result<()> {
    match std::os::unix::net::UnixStream::connect(path) {
        Ok(_) => anyhow::bail!(
            "another upload is running (control socket {} is in use)",
            path.display()
        ),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
            tracing::debug!(path = %path.display(), "removing stale control socket");
            std::fs::remove_file(path).with_context(|| format!("remove {}", path.display()))
        }
        Err(e) => Err(e).with_context(|| format!("probe control socket {}", path.display())),
    }
}

async fn serve_connection(queue: UploadQueue, stream: UnixStream) -> Result<()> {
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let reply = match ControlCommand::parse(line) {
            Some(command) => {
                tracing::info!(%command, "control command");
                queue.apply(command)
            }
            None => ControlReply::Invalid(line.to_string()),
        };
        let mut out = serde_json::to_string(&reply)?;
        out.push('\n');
        write.write_all(out.as_bytes()).await?;
    }
    Ok(())
}

/// Sends one command to the uploader listening on `socket_path` and returns its reply.
pub async fn send_command(socket_path: &Path, command: ControlCommand) -> Result<ControlReply> {
    if !socket_path.exists() {
        anyhow::bail!(
            "no running upload (control socket {} not found)",
            socket_path.display()
        );
    }
    let stream = UnixStream::connect(socket_path)
        .await
        .with_context(|| format!("connect {}", socket_path.display()))?;
    let (read, mut write) = stream.into_split();
    write.write_all(format!("{}\n", command).as_bytes()).await?;

    let mut reply = String::new();
    BufReader::new(read).read_line(&mut reply).await?;
    if reply.trim().is_empty() {
        anyhow::bail!("uploader closed the control connection without replying");
    }
    serde_json::from_str(reply.trim()).context("parse control reply")
}

/// Removes the socket file when the upload run ends.
pub struct SocketGuard(pub PathBuf);

impl Drop for SocketGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}
