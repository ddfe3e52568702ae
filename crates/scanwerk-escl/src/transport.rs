// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP transport for the eSCL endpoint tree.
//
// Every device exchange goes through the `EsclTransport` trait so the job
// controller can be driven by an in-memory device in tests. `HttpTransport`
// is the real implementation over `reqwest`:
//   - GET    /eSCL/ScannerStatus
//   - GET    /eSCL/ScannerCapabilities
//   - POST   /eSCL/ScanJobs              (Location header = job URL)
//   - GET    {jobUrl}
//   - GET    {jobUrl}/NextDocument
//   - DELETE {jobUrl}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use tracing::{debug, error, info, instrument};

use scanwerk_core::config::ScanConfig;
use scanwerk_core::error::{Result, ScanError};
use scanwerk_core::types::ScannerRef;

use crate::protocol::{NEXT_DOCUMENT_PATH, SCAN_JOBS_PATH, SCANNER_CAPABILITIES_PATH, SCANNER_STATUS_PATH};

/// Outcome of one `NextDocument` request.
///
/// Not-found is the device's normal end-of-pages signal and is kept apart
/// from genuine failures, even though the job controller currently treats
/// both as the end of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageFetch {
    /// Page bytes as delivered by the device.
    Found(Vec<u8>),
    /// HTTP 404: no (further) page for this job.
    NotYetAvailable,
    /// Anything else: other HTTP status, timeout, connection failure.
    HardFailure(String),
}

/// Device-facing operations used by the job controller.
#[async_trait]
pub trait EsclTransport: Send + Sync {
    /// Raw `ScannerStatus` document.
    async fn scanner_status(&self, scanner: &ScannerRef) -> Result<String>;

    /// Raw `ScannerCapabilities` document.
    async fn scanner_capabilities(&self, scanner: &ScannerRef) -> Result<String>;

    /// Post a `ScanSettings` document. Returns the `Location` header, if any.
    async fn create_job(&self, scanner: &ScannerRef, settings: &str) -> Result<Option<String>>;

    /// Raw job status document from `GET {jobUrl}`.
    async fn job_status(&self, job_url: &str) -> Result<String>;

    /// Request the next page of a job.
    async fn next_document(&self, job_url: &str) -> PageFetch;

    /// Delete a job.
    async fn delete_job(&self, job_url: &str) -> Result<()>;
}

/// `reqwest`-backed transport with per-call timeouts.
pub struct HttpTransport {
    client: Client,
    read_timeout: Duration,
    transfer_timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &ScanConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| ScanError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            read_timeout: config.read_timeout(),
            transfer_timeout: config.transfer_timeout(),
        })
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .timeout(self.read_timeout)
            .send()
            .await
            .map_err(|e| ScanError::Transport(format!("GET {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            error!(%url, %status, "GET failed");
            return Err(ScanError::Transport(format!("GET {url} returned HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| ScanError::Transport(format!("GET {url}: reading body: {e}")))
    }
}

#[async_trait]
impl EsclTransport for HttpTransport {
    #[instrument(skip(self, scanner), fields(host = %scanner.host, port = scanner.port))]
    async fn scanner_status(&self, scanner: &ScannerRef) -> Result<String> {
        let url = format!("{}/{}", scanner.escl_base(), SCANNER_STATUS_PATH);
        self.get_text(&url).await
    }

    #[instrument(skip(self, scanner), fields(host = %scanner.host, port = scanner.port))]
    async fn scanner_capabilities(&self, scanner: &ScannerRef) -> Result<String> {
        let url = format!("{}/{}", scanner.escl_base(), SCANNER_CAPABILITIES_PATH);
        let body = self.get_text(&url).await?;
        debug!(len = body.len(), "capabilities document received");
        Ok(body)
    }

    #[instrument(skip(self, scanner, settings), fields(host = %scanner.host, port = scanner.port))]
    async fn create_job(&self, scanner: &ScannerRef, settings: &str) -> Result<Option<String>> {
        let url = format!("{}/{}", scanner.escl_base(), SCAN_JOBS_PATH);
        debug!(%settings, "sending ScanSettings");

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "text/xml")
            .body(settings.to_owned())
            .timeout(self.transfer_timeout)
            .send()
            .await
            .map_err(|e| ScanError::Transport(format!("POST {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            error!(%status, "ScanJobs rejected the job");
            return Err(ScanError::JobCreation(format!("scanner returned HTTP {status}")));
        }

        Ok(response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned))
    }

    #[instrument(skip(self))]
    async fn job_status(&self, job_url: &str) -> Result<String> {
        self.get_text(job_url).await
    }

    #[instrument(skip(self))]
    async fn next_document(&self, job_url: &str) -> PageFetch {
        let url = format!("{job_url}/{NEXT_DOCUMENT_PATH}");
        debug!(%url, "requesting next document");

        let response = match self
            .client
            .get(&url)
            .timeout(self.transfer_timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return PageFetch::HardFailure(e.to_string()),
        };

        match response.status() {
            StatusCode::NOT_FOUND => PageFetch::NotYetAvailable,
            status if !status.is_success() => PageFetch::HardFailure(format!("HTTP {status}")),
            _ => match response.bytes().await {
                Ok(body) => {
                    info!(bytes = body.len(), "download complete");
                    PageFetch::Found(body.to_vec())
                }
                Err(e) => PageFetch::HardFailure(format!("reading body: {e}")),
            },
        }
    }

    #[instrument(skip(self))]
    async fn delete_job(&self, job_url: &str) -> Result<()> {
        let response = self
            .client
            .delete(job_url)
            .timeout(self.transfer_timeout)
            .send()
            .await
            .map_err(|e| ScanError::Transport(format!("DELETE {job_url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::Transport(format!(
                "DELETE {job_url} returned HTTP {status}"
            )));
        }
        Ok(())
    }
}
