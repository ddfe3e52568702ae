// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory eSCL device for unit tests. Scripted responses, recorded calls.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use scanwerk_core::error::{Result, ScanError};
use scanwerk_core::types::ScannerRef;

use crate::capabilities::tests::sample_caps;
use crate::protocol::{ESCL_NS, PWG_NS};
use crate::transport::{EsclTransport, PageFetch};

/// One recorded transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Status,
    Capabilities,
    /// Carries the posted settings document.
    CreateJob(String),
    JobStatus(String),
    NextDocument(String),
    DeleteJob(String),
}

pub struct MockDevice {
    /// Scanner states served in order; the last one repeats.
    statuses: Mutex<VecDeque<String>>,
    status_fails: bool,
    capabilities: Option<String>,
    location: Option<String>,
    job_state: String,
    /// Pages served in order; once drained, every request is not-found.
    pages: Mutex<VecDeque<PageFetch>>,
    delete_fails: bool,
    calls: Mutex<Vec<Call>>,
}

impl MockDevice {
    /// An idle flatbed that produces one page.
    pub fn new() -> Self {
        Self {
            statuses: Mutex::new(VecDeque::from(["Idle".to_string()])),
            status_fails: false,
            capabilities: Some(sample_caps(&[300, 600], true, &[])),
            location: Some("/eSCL/ScanJobs/1".into()),
            job_state: "Completed".into(),
            pages: Mutex::new(VecDeque::from([PageFetch::Found(jpeg_page())])),
            delete_fails: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_statuses(self, states: &[&str]) -> Self {
        *self.statuses.lock().unwrap() = states.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn failing_status(mut self) -> Self {
        self.status_fails = true;
        self
    }

    pub fn with_capabilities(mut self, doc: String) -> Self {
        self.capabilities = Some(doc);
        self
    }

    pub fn without_capabilities(mut self) -> Self {
        self.capabilities = None;
        self
    }

    pub fn with_location(mut self, location: &str) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn without_location(mut self) -> Self {
        self.location = None;
        self
    }

    pub fn with_job_state(mut self, state: &str) -> Self {
        self.job_state = state.into();
        self
    }

    pub fn with_pages(self, pages: Vec<PageFetch>) -> Self {
        *self.pages.lock().unwrap() = pages.into();
        self
    }

    pub fn failing_delete(mut self) -> Self {
        self.delete_fails = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl EsclTransport for MockDevice {
    async fn scanner_status(&self, _scanner: &ScannerRef) -> Result<String> {
        self.record(Call::Status);
        if self.status_fails {
            return Err(ScanError::Transport("connection refused".into()));
        }
        let mut statuses = self.statuses.lock().unwrap();
        let state = if statuses.len() > 1 {
            statuses.pop_front().unwrap_or_default()
        } else {
            statuses.front().cloned().unwrap_or_default()
        };
        Ok(format!(
            r#"<scan:ScannerStatus xmlns:scan="{ESCL_NS}" xmlns:pwg="{PWG_NS}"><pwg:State>{state}</pwg:State></scan:ScannerStatus>"#
        ))
    }

    async fn scanner_capabilities(&self, _scanner: &ScannerRef) -> Result<String> {
        self.record(Call::Capabilities);
        self.capabilities
            .clone()
            .ok_or_else(|| ScanError::Transport("HTTP 500".into()))
    }

    async fn create_job(&self, _scanner: &ScannerRef, settings: &str) -> Result<Option<String>> {
        self.record(Call::CreateJob(settings.to_string()));
        Ok(self.location.clone())
    }

    async fn job_status(&self, job_url: &str) -> Result<String> {
        self.record(Call::JobStatus(job_url.to_string()));
        Ok(format!(
            r#"<scan:ScanJobInfo xmlns:scan="{ESCL_NS}" xmlns:pwg="{PWG_NS}"><pwg:JobState>{}</pwg:JobState></scan:ScanJobInfo>"#,
            self.job_state
        ))
    }

    async fn next_document(&self, job_url: &str) -> PageFetch {
        self.record(Call::NextDocument(job_url.to_string()));
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(PageFetch::NotYetAvailable)
    }

    async fn delete_job(&self, job_url: &str) -> Result<()> {
        self.record(Call::DeleteJob(job_url.to_string()));
        if self.delete_fails {
            return Err(ScanError::Transport("HTTP 404".into()));
        }
        Ok(())
    }
}

/// The scanner every mock scenario talks to.
pub fn scanner() -> ScannerRef {
    ScannerRef {
        name: "Office MFP".into(),
        host: "192.168.1.50".into(),
        port: 8080,
        service_type: "_uscan._tcp.local.".into(),
    }
}

/// A small JPEG page as a device would deliver it.
pub fn jpeg_page() -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 8, Rgb([240, 240, 240])));
    let mut buffer = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buffer), ImageFormat::Jpeg)
        .expect("jpeg encodable");
    buffer
}
