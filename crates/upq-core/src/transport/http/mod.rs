//! Multipart HTTP upload transport (libcurl).
//!
//! Each transfer is one `POST` with two form fields: the destination as text
//! and the payload as a file part. Curl runs in `spawn_blocking`; its progress
//! callback feeds the task's [`ProgressReporter`] and returns `false` once the
//! abort signal fires, which makes curl stop with "aborted by callback".

mod classify;

use async_trait::async_trait;
use std::time::Duration;

use crate::config::HttpConfig;
use crate::error::TransportError;
use crate::payload::Payload;

use super::{AbortSignal, ProgressReporter, Settlement, TransferJob, Transport};

pub use classify::{failure_message, reason_phrase};

/// Response bytes kept for failure messages.
const MAX_BODY_SNIPPET: usize = 512;

/// Uploads to a fixed endpoint with optional bearer auth.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: String,
    auth_token: Option<String>,
    cfg: HttpConfig,
}

impl HttpTransport {
    /// Validates `endpoint` (must be http or https).
    pub fn new(endpoint: &str, cfg: HttpConfig) -> Result<Self, TransportError> {
        let parsed = url::Url::parse(endpoint)?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => return Err(TransportError::UnsupportedScheme(other.to_string())),
        }
        Ok(Self {
            endpoint: parsed.into(),
            auth_token: None,
            cfg,
        })
    }

    pub fn with_bearer_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn transfer(
        &self,
        job: TransferJob,
        progress: ProgressReporter,
        abort: AbortSignal,
    ) -> Settlement {
        if abort.is_aborted() {
            return Settlement::Aborted;
        }
        let this = self.clone();
        let signal = abort.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut body = Vec::new();
            let res = this.post_multipart(&job, &progress, &signal, &mut body);
            (res, body)
        })
        .await;

        match result {
            Ok((Ok(()), _)) => Settlement::Success,
            Ok((Err(TransportError::Curl(e)), _)) if e.is_aborted_by_callback() && abort.is_aborted() => {
                Settlement::Aborted
            }
            Ok((Err(e), body)) => Settlement::Failure(failure_message(&e, &body)),
            Err(e) => Settlement::Failure(format!("upload task join: {}", e)),
        }
    }
}

impl HttpTransport {
    fn post_multipart(
        &self,
        job: &TransferJob,
        progress: &ProgressReporter,
        abort: &AbortSignal,
        body: &mut Vec<u8>,
    ) -> Result<(), TransportError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(&self.endpoint)?;
        easy.connect_timeout(Duration::from_secs(self.cfg.connect_timeout_secs))?;
        // Abort if throughput stays below the limit for low_speed_time; the hard
        // timeout only catches transfers that are completely stuck.
        easy.low_speed_limit(self.cfg.low_speed_limit)?;
        easy.low_speed_time(Duration::from_secs(self.cfg.low_speed_time_secs))?;
        easy.timeout(Duration::from_secs(self.cfg.timeout_secs))?;

        let mut headers = curl::easy::List::new();
        // No 100-continue round trip before the body.
        headers.append("Expect:")?;
        if let Some(token) = &self.auth_token {
            headers.append(&format!("Authorization: Bearer {}", token.trim()))?;
        }
        easy.http_headers(headers)?;

        let mut form = curl::easy::Form::new();
        form.part(&self.cfg.destination_field)
            .contents(job.destination.as_str().as_bytes())
            .add()?;
        match &job.payload {
            Payload::File(path) => form
                .part(&self.cfg.file_field)
                .file(path)
                .filename(job.name.as_str())
                .add()?,
            Payload::Memory(bytes) => form
                .part(&self.cfg.file_field)
                .buffer(job.name.as_str(), bytes.to_vec())
                .add()?,
        }
        easy.httppost(form)?;
        easy.progress(true)?;

        {
            let mut transfer = easy.transfer();
            transfer.progress_function(|_dltotal, _dlnow, ultotal, ulnow| {
                if abort.is_aborted() {
                    return false;
                }
                if ultotal > 0.0 {
                    progress.report_fraction(ulnow as u64, ultotal as u64);
                }
                true
            })?;
            transfer.write_function(|data| {
                let room = MAX_BODY_SNIPPET.saturating_sub(body.len());
                body.extend_from_slice(&data[..data.len().min(room)]);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(TransportError::Http {
                code,
                reason: reason_phrase(code),
            });
        }
        tracing::debug!(task_id = %job.id, code, "upload accepted");
        Ok(())
    }
}
