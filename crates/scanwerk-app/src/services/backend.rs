// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Protocol-family backends.
//
// Only eSCL exists today. The orchestrator holds a list of `ScanBackend`s so
// another protocol family slots in without touching the façade.

use async_trait::async_trait;

use scanwerk_core::error::Result;
use scanwerk_core::types::{Capabilities, ScanRequest, ScannedPage, ScannerRef};
use scanwerk_escl::{BACKEND_NAME, EsclBackend};

/// One protocol family's view of scanners.
#[async_trait]
pub trait ScanBackend: Send + Sync {
    /// Short name reported in responses (e.g. "eSCL").
    fn name(&self) -> &'static str;

    /// Discover scanners reachable through this protocol.
    async fn list_scanners(&self) -> Result<Vec<ScannerRef>>;

    /// Query a scanner's capabilities.
    async fn get_capabilities(&self, scanner: &ScannerRef) -> Result<Capabilities>;

    /// Run a scan and return the processed pages.
    async fn scan(&self, scanner: &ScannerRef, request: &ScanRequest) -> Result<Vec<ScannedPage>>;
}

#[async_trait]
impl ScanBackend for EsclBackend {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn list_scanners(&self) -> Result<Vec<ScannerRef>> {
        self.discover().await
    }

    async fn get_capabilities(&self, scanner: &ScannerRef) -> Result<Capabilities> {
        self.capabilities(scanner).await
    }

    async fn scan(&self, scanner: &ScannerRef, request: &ScanRequest) -> Result<Vec<ScannedPage>> {
        EsclBackend::scan(self, scanner, request).await
    }
}
