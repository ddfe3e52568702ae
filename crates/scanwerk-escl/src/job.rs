// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan job controller.
//
// Drives one eSCL job from start to finish:
//
//   preflight (device must be Idle)
//     -> input source validation (best effort)
//     -> create job (POST ScanJobs, Location = job URL)
//     -> poll ScannerStatus until Idle / Stopped / ceiling
//     -> NextDocument until not-found (feeder) or once (platen)
//     -> DELETE job, always, failures logged only
//
// Only the polling loop repeats a request. Nothing else is retried.

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};

use scanwerk_core::config::ScanConfig;
use scanwerk_core::error::{Result, ScanError};
use scanwerk_core::types::{JobState, ScanJob, ScanRequest, ScannedPage, ScannerRef};
use scanwerk_document::PageProcessor;

use crate::capabilities;
use crate::protocol::{self, RemoteJobState, ScannerState};
use crate::transport::{EsclTransport, PageFetch};

/// Runs scan jobs against one transport. Holds no per-job state; every
/// [`run`](Self::run) owns its own [`ScanJob`].
pub struct JobController<'a> {
    transport: &'a dyn EsclTransport,
    config: &'a ScanConfig,
    pages: PageProcessor,
}

impl<'a> JobController<'a> {
    pub fn new(transport: &'a dyn EsclTransport, config: &'a ScanConfig) -> Self {
        Self {
            transport,
            config,
            pages: PageProcessor::new(),
        }
    }

    /// Run a complete scan job and return the pages that processed cleanly.
    ///
    /// Once the device has issued a job URL, the job is deleted exactly once,
    /// whatever the outcome.
    #[instrument(skip_all, fields(scanner = %scanner.name, dpi = request.dpi, source = %request.input_source))]
    pub async fn run(&self, scanner: &ScannerRef, request: &ScanRequest) -> Result<Vec<ScannedPage>> {
        info!(host = %scanner.host, port = scanner.port, "scan started");

        self.preflight(scanner).await?;
        self.validate_source(scanner, request).await?;

        let mut job = self.create_job(scanner, request).await?;
        let outcome = self.drive(scanner, request, &mut job).await;
        self.delete_job(&job).await;

        let elapsed = Utc::now() - job.created_at;
        info!(
            job_url = %job.job_url,
            state = ?job.state,
            pages_downloaded = job.pages_downloaded,
            elapsed_ms = elapsed.num_milliseconds(),
            ok = outcome.is_ok(),
            "scan job finished"
        );
        outcome
    }

    /// The device must report `Idle` before a job is created.
    async fn preflight(&self, scanner: &ScannerRef) -> Result<()> {
        let state = match self.transport.scanner_status(scanner).await {
            Ok(doc) => protocol::parse_scanner_state(&doc)
                .map_err(|e| ScanError::NotReady(e.to_string()))?,
            Err(e) => return Err(ScanError::NotReady(e.to_string())),
        };
        if state != ScannerState::Idle {
            return Err(ScanError::NotReady(state.label().to_string()));
        }
        info!("scanner ready");
        Ok(())
    }

    /// Reject a source the device explicitly does not list. A failed
    /// capability query skips validation instead of failing the scan.
    async fn validate_source(&self, scanner: &ScannerRef, request: &ScanRequest) -> Result<()> {
        let supported = match self.transport.scanner_capabilities(scanner).await {
            Ok(doc) => match capabilities::supported_input_sources(&doc) {
                Ok(sources) => sources,
                Err(e) => {
                    warn!(error = %e, "unreadable capabilities; skipping source validation");
                    return Ok(());
                }
            },
            Err(e) => {
                warn!(error = %e, "capability query failed; skipping source validation");
                return Ok(());
            }
        };

        info!(requested = %request.input_source, ?supported, "supported InputSource");
        if !supported.is_empty() && !supported.contains(&request.input_source) {
            return Err(ScanError::UnsupportedSource {
                requested: request.input_source.clone(),
                supported,
            });
        }
        Ok(())
    }

    async fn create_job(&self, scanner: &ScannerRef, request: &ScanRequest) -> Result<ScanJob> {
        let settings =
            protocol::scan_settings_xml(request.dpi, request.color_mode, &request.input_source);
        let location = self
            .transport
            .create_job(scanner, &settings)
            .await?
            .ok_or_else(|| ScanError::JobCreation("scanner did not return job URL".into()))?;

        let job_url = protocol::resolve_job_url(&scanner.origin(), &location);
        info!(%job_url, "job created");
        Ok(ScanJob::new(job_url))
    }

    async fn drive(
        &self,
        scanner: &ScannerRef,
        request: &ScanRequest,
        job: &mut ScanJob,
    ) -> Result<Vec<ScannedPage>> {
        self.poll_until_done(scanner, job).await?;
        self.download_pages(request, job).await
    }

    /// Poll `ScannerStatus` until the device goes back to `Idle`.
    ///
    /// `Stopped` fails the job. Hitting the ceiling is not fatal: the pages
    /// are requested anyway.
    async fn poll_until_done(&self, scanner: &ScannerRef, job: &mut ScanJob) -> Result<()> {
        info!("scan in progress, polling ScannerStatus");
        job.transition(JobState::Polling);

        for attempt in 0..self.config.max_polls {
            let doc = self.transport.scanner_status(scanner).await?;
            match protocol::parse_scanner_state(&doc)? {
                ScannerState::Idle => {
                    info!(attempt, "scan completed (scanner idle)");
                    job.transition(JobState::Completed);
                    return Ok(());
                }
                ScannerState::Stopped => {
                    job.transition(JobState::Stopped);
                    return Err(ScanError::Stopped);
                }
                other => debug!(attempt, state = other.label(), "scanner busy"),
            }
            tokio::time::sleep(self.config.poll_interval()).await;
        }

        warn!(
            polls = self.config.max_polls,
            "status polling timed out, attempting download anyway"
        );
        job.transition(JobState::Unknown);
        self.inspect_job(job).await;
        Ok(())
    }

    /// Ask the job itself how it is doing after a polling timeout. Purely
    /// diagnostic: the outcome only updates the recorded state.
    async fn inspect_job(&self, job: &mut ScanJob) {
        let remote = match self.transport.job_status(&job.job_url).await {
            Ok(doc) => protocol::parse_job_state(&doc).unwrap_or(RemoteJobState::Unknown),
            Err(e) => {
                debug!(error = %e, "job status check failed");
                return;
            }
        };
        let next = match remote {
            RemoteJobState::Completed => JobState::Completed,
            RemoteJobState::Aborted => JobState::Aborted,
            RemoteJobState::Canceled => JobState::Canceled,
            RemoteJobState::Pending | RemoteJobState::Processing | RemoteJobState::Unknown => {
                JobState::Unknown
            }
        };
        info!(remote = ?remote, "job status after polling timeout");
        job.transition(next);
    }

    /// Request pages until the device signals the end (feeder) or once
    /// (any other source).
    async fn download_pages(&self, request: &ScanRequest, job: &mut ScanJob) -> Result<Vec<ScannedPage>> {
        let mut pages = Vec::new();
        let mut page_number: u32 = 1;

        loop {
            info!(page = page_number, "attempting to download page");
            match self.transport.next_document(&job.job_url).await {
                PageFetch::Found(raw_bytes) => {
                    job.record_page();
                    match self.pages.process(&raw_bytes, page_number) {
                        Ok(encoded) => pages.push(ScannedPage {
                            page_number,
                            raw_bytes,
                            encoded,
                        }),
                        Err(e) => {
                            error!(page = page_number, error = %e, "page image processing error, page omitted");
                        }
                    }
                }
                PageFetch::NotYetAvailable => {
                    if page_number == 1 {
                        return Err(ScanError::NoResults);
                    }
                    info!(total = page_number - 1, "scan complete");
                    break;
                }
                PageFetch::HardFailure(reason) => {
                    // Same control flow as not-found, but kept visible.
                    warn!(page = page_number, %reason, "download failed, treating as end of document");
                    if page_number == 1 {
                        return Err(ScanError::NoResults);
                    }
                    break;
                }
            }

            if !request.is_feeder() {
                break;
            }
            page_number += 1;
        }

        if pages.is_empty() {
            return Err(ScanError::NoResults);
        }
        Ok(pages)
    }

    /// Best-effort cleanup. Devices usually delete finished jobs themselves,
    /// so a failure here is expected and only logged.
    async fn delete_job(&self, job: &ScanJob) {
        match self.transport.delete_job(&job.job_url).await {
            Ok(()) => info!("job deletion complete"),
            Err(e) => debug!(error = %e, "job deletion attempted (already deleted)"),
        }
    }
}
