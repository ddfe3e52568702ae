// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The eSCL protocol backend: discovery, capability queries, and scan jobs
// bundled behind one value the service layer can hold.

use tracing::info;

use scanwerk_core::config::ScanConfig;
use scanwerk_core::error::Result;
use scanwerk_core::types::{Capabilities, ScanRequest, ScannedPage, ScannerRef};

use crate::capabilities;
use crate::discovery;
use crate::job::JobController;
use crate::transport::{EsclTransport, HttpTransport};

/// Name reported alongside every eSCL result.
pub const BACKEND_NAME: &str = "eSCL";

/// eSCL scanners reached over HTTP.
pub struct EsclBackend {
    transport: Box<dyn EsclTransport>,
    config: ScanConfig,
}

impl EsclBackend {
    /// Backend talking HTTP to real devices.
    pub fn new(config: ScanConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(Box::new(transport), config))
    }

    /// Backend over any transport (used to drive an in-memory device).
    pub fn with_transport(transport: Box<dyn EsclTransport>, config: ScanConfig) -> Self {
        Self { transport, config }
    }

    /// Browse mDNS for the configured window.
    pub async fn discover(&self) -> Result<Vec<ScannerRef>> {
        discovery::discover(&self.config.service_types, self.config.discovery_window()).await
    }

    /// Fetch and parse a fresh capability snapshot. Never cached.
    pub async fn capabilities(&self, scanner: &ScannerRef) -> Result<Capabilities> {
        info!(scanner = %scanner.name, "retrieving capabilities");
        let doc = self.transport.scanner_capabilities(scanner).await?;
        capabilities::parse(&doc)
    }

    /// Run one scan job to completion.
    pub async fn scan(&self, scanner: &ScannerRef, request: &ScanRequest) -> Result<Vec<ScannedPage>> {
        JobController::new(self.transport.as_ref(), &self.config)
            .run(scanner, request)
            .await
    }
}
