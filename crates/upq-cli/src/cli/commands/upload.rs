//! `upq upload` – queue files, print events, wait until every upload settles.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use upq_core::config::UpqConfig;
use upq_core::control::default_control_socket_path;
use upq_core::payload::{Destination, TransferRequest};
use upq_core::transport::HttpTransport;
use upq_core::{QueueStats, UploadQueue};

use crate::cli::control_socket::{spawn_control_listener, SocketGuard};
use crate::cli::printer::PrintSink;

pub struct UploadArgs {
    pub files: Vec<PathBuf>,
    pub dest: String,
    pub endpoint: Option<String>,
    pub token: Option<String>,
    pub concurrency: Option<usize>,
    pub json: bool,
    pub linger: bool,
}

pub async fn run_upload(cfg: &UpqConfig, args: UploadArgs) -> Result<()> {
    let endpoint = args
        .endpoint
        .or_else(|| cfg.endpoint.clone())
        .context("no upload endpoint: pass --endpoint or set `endpoint` in config.toml")?;
    let token = args.token.or_else(|| cfg.auth_token.clone());
    let concurrency = args.concurrency.unwrap_or_else(|| cfg.effective_concurrency());

    let requests = args
        .files
        .iter()
        .map(TransferRequest::from_path)
        .collect::<Result<Vec<_>, _>>()?;

    let transport = HttpTransport::new(&endpoint, cfg.http_or_default())
        .with_context(|| format!("invalid endpoint {endpoint:?}"))?
        .with_bearer_token(token);
    let queue = UploadQueue::new(
        concurrency,
        Arc::new(transport),
        Arc::new(PrintSink::new(args.json)),
    )?;
    tracing::info!(%endpoint, concurrency = queue.concurrency(), files = requests.len(), "upload run");

    let socket = match default_control_socket_path() {
        Ok(path) => match spawn_control_listener(queue.clone(), &path) {
            Ok(_) => Some(SocketGuard(path)),
            Err(e) => {
                tracing::warn!("control socket unavailable: {:#}", e);
                eprintln!("upq: {:#}; cancel/retry/status cannot reach this run", e);
                None
            }
        },
        Err(e) => {
            tracing::warn!("control socket path: {}", e);
            None
        }
    };

    let ids = queue.add(requests, Destination::new(args.dest));
    if !args.json {
        println!(
            "Queued {} file(s) as tasks {}..={} (concurrency {})",
            ids.len(),
            ids.first().map(|i| i.0).unwrap_or(0),
            ids.last().map(|i| i.0).unwrap_or(0),
            queue.concurrency()
        );
    }

    // Idle also means every task's final line has been printed.
    let mut stats_rx = queue.watch_stats();
    loop {
        queue.wait_idle().await;
        let stats = queue.stats();
        if !should_linger(args.linger, socket.is_some(), &stats) {
            break;
        }
        if !args.json {
            println!(
                "{} task(s) failed or canceled; waiting for `upq retry <ID>` (Ctrl-C to finish)",
                stats.error + stats.canceled
            );
        }
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    tracing::warn!("ctrl-c handler: {}", e);
                }
                break;
            }
            _ = stats_rx.wait_for(|s| !s.is_idle()) => {}
        }
    }

    let stats = queue.stats();
    if args.json {
        println!("{}", serde_json::json!({ "summary": stats }));
    } else {
        println!("{}", summary_line(&stats));
    }
    if stats.error > 0 {
        anyhow::bail!("{} upload(s) failed", stats.error);
    }
    Ok(())
}

/// Keep serving retries only if asked to, reachable, and something is left to retry.
pub(crate) fn should_linger(linger: bool, has_socket: bool, stats: &QueueStats) -> bool {
    linger && has_socket && stats.error + stats.canceled > 0
}

pub(crate) fn summary_line(stats: &QueueStats) -> String {
    format!(
        "{} uploaded, {} failed, {} canceled ({} bytes)",
        stats.done, stats.error, stats.canceled, stats.bytes_done
    )
}
