// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Orchestrator façade: the three externally visible operations.
//
// Every operation returns a `{success, ...}` value. Errors from any layer
// are caught here, logged once, and folded into `{success: false, error}`;
// nothing propagates past this point.

use serde_json::{Value, json};
use tracing::{error, info, instrument};

use scanwerk_core::error::Result;
use scanwerk_core::types::ScanRequest;

use super::backend::ScanBackend;
use super::response::{error_response, success_response};
use super::session::{ScanSession, SessionEntry};

pub struct ScanOrchestrator {
    backends: Vec<Box<dyn ScanBackend>>,
    session: ScanSession,
}

impl ScanOrchestrator {
    pub fn new(backends: Vec<Box<dyn ScanBackend>>) -> Self {
        Self {
            backends,
            session: ScanSession::new(),
        }
    }

    #[cfg(test)]
    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    /// Run discovery on every backend and replace the session with the
    /// result. On failure the previous session is kept.
    #[instrument(skip(self))]
    pub async fn list_scanners(&mut self) -> Value {
        respond("list_scanners", self.try_list_scanners().await)
    }

    /// Fresh capability snapshot for a scanner from the last discovery run.
    #[instrument(skip(self))]
    pub async fn get_capabilities(&self, scanner_name: &str) -> Value {
        respond("get_capabilities", self.try_get_capabilities(scanner_name).await)
    }

    /// Scan with a scanner from the last discovery run.
    #[instrument(skip(self, request), fields(scanner = %request.scanner_name))]
    pub async fn scan(&self, request: &ScanRequest) -> Value {
        respond("scan", self.try_scan(request).await)
    }

    async fn try_list_scanners(&mut self) -> Result<Value> {
        let mut entries = Vec::new();
        for (index, backend) in self.backends.iter().enumerate() {
            let found = backend.list_scanners().await?;
            info!(backend = backend.name(), count = found.len(), "backend discovery finished");
            entries.extend(found.into_iter().map(|scanner| SessionEntry {
                backend: index,
                scanner,
            }));
        }

        let scanners: Vec<_> = entries.iter().map(|e| e.scanner.clone()).collect();
        self.session.replace(entries);
        Ok(json!({ "scanners": scanners, "backend": self.backend_label() }))
    }

    async fn try_get_capabilities(&self, scanner_name: &str) -> Result<Value> {
        let entry = self.session.resolve(scanner_name)?;
        let capabilities = self.backends[entry.backend]
            .get_capabilities(&entry.scanner)
            .await?;
        Ok(json!({ "capabilities": capabilities }))
    }

    async fn try_scan(&self, request: &ScanRequest) -> Result<Value> {
        let entry = self.session.resolve(&request.scanner_name)?;
        let backend = &self.backends[entry.backend];
        let pages = backend.scan(&entry.scanner, request).await?;
        let images: Vec<String> = pages.into_iter().map(|p| p.encoded).collect();
        info!(pages = images.len(), "scan finished");
        Ok(json!({
            "images": images,
            "count": images.len(),
            "backend": backend.name(),
        }))
    }

    fn backend_label(&self) -> String {
        self.backends
            .iter()
            .map(|b| b.name())
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn respond(operation: &str, result: Result<Value>) -> Value {
    match result {
        Ok(payload) => success_response(payload),
        Err(e) => {
            error!(operation, error = %e, "operation failed");
            error_response(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use scanwerk_core::error::ScanError;
    use scanwerk_core::types::{Capabilities, ScannedPage, ScannerRef};

    /// Backend returning canned data and recording each call by name.
    struct FakeBackend {
        scanners: Vec<ScannerRef>,
        fail_scan: bool,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl FakeBackend {
        fn new(names: &[&str]) -> (Self, Arc<Mutex<Vec<String>>>) {
            let calls = Arc::new(Mutex::new(Vec::new()));
            let scanners = names
                .iter()
                .enumerate()
                .map(|(i, name)| ScannerRef {
                    name: name.to_string(),
                    host: format!("10.0.0.{}", i + 1),
                    port: 80,
                    service_type: "_uscan._tcp.local.".into(),
                })
                .collect();
            (
                Self {
                    scanners,
                    fail_scan: false,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl ScanBackend for FakeBackend {
        fn name(&self) -> &'static str {
            "eSCL"
        }

        async fn list_scanners(&self) -> Result<Vec<ScannerRef>> {
            self.calls.lock().unwrap().push("list".into());
            Ok(self.scanners.clone())
        }

        async fn get_capabilities(&self, scanner: &ScannerRef) -> Result<Capabilities> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("capabilities {}", scanner.host));
            Ok(Capabilities {
                resolutions: vec![300, 600],
                color_modes: vec!["RGB24".into()],
                input_sources: vec!["Platen".into()],
            })
        }

        async fn scan(&self, scanner: &ScannerRef, request: &ScanRequest) -> Result<Vec<ScannedPage>> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("scan {} {}", scanner.host, request.dpi));
            if self.fail_scan {
                return Err(ScanError::NotReady("Processing".into()));
            }
            Ok(["cGFnZTE=", "cGFnZTI="]
                .iter()
                .zip(1..)
                .map(|(encoded, page_number)| ScannedPage {
                    page_number,
                    raw_bytes: Vec::new(),
                    encoded: encoded.to_string(),
                })
                .collect())
        }
    }

    fn orchestrator(backend: FakeBackend) -> ScanOrchestrator {
        ScanOrchestrator::new(vec![Box::new(backend)])
    }

    #[tokio::test]
    async fn scan_before_discovery_is_lookup_error() {
        let (backend, calls) = FakeBackend::new(&["Office MFP"]);
        let orch = orchestrator(backend);

        let resp = orch.scan(&ScanRequest::new("Office MFP")).await;
        assert_eq!(resp["success"], false);
        assert_eq!(resp["error"], "Scanner information not found: Office MFP");
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_scanner_name_is_rejected() {
        let (backend, calls) = FakeBackend::new(&["Office MFP"]);
        let mut orch = orchestrator(backend);
        orch.list_scanners().await;

        let resp = orch.get_capabilities("").await;
        assert_eq!(resp, json!({ "success": false, "error": "No scanner selected" }));
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_reports_scanners_and_backend() {
        let (backend, _) = FakeBackend::new(&["Office MFP", "Lab Scanner"]);
        let mut orch = orchestrator(backend);

        let resp = orch.list_scanners().await;
        assert_eq!(resp["success"], true);
        assert_eq!(resp["backend"], "eSCL");
        assert_eq!(resp["scanners"][1]["name"], "Lab Scanner");
        assert_eq!(resp["scanners"][1]["type"], "_uscan._tcp.local.");
        assert_eq!(orch.session().entries().len(), 2);
    }

    #[tokio::test]
    async fn empty_discovery_is_success() {
        let (backend, _) = FakeBackend::new(&[]);
        let mut orch = orchestrator(backend);

        let resp = orch.list_scanners().await;
        assert_eq!(resp, json!({ "success": true, "scanners": [], "backend": "eSCL" }));
    }

    #[tokio::test]
    async fn duplicate_names_resolve_to_last_announcement() {
        let (backend, calls) = FakeBackend::new(&["Dup", "Dup"]);
        let mut orch = orchestrator(backend);
        orch.list_scanners().await;

        let resp = orch.get_capabilities("Dup").await;
        assert_eq!(resp["success"], true);
        assert_eq!(resp["capabilities"]["resolutions"], json!([300, 600]));
        assert_eq!(resp["capabilities"]["colorModes"], json!(["RGB24"]));
        assert_eq!(calls.lock().unwrap().last().unwrap(), "capabilities 10.0.0.2");
    }

    #[tokio::test]
    async fn scan_returns_images_in_page_order() {
        let (backend, _) = FakeBackend::new(&["Office MFP"]);
        let mut orch = orchestrator(backend);
        orch.list_scanners().await;

        let resp = orch.scan(&ScanRequest::new("Office MFP")).await;
        assert_eq!(
            resp,
            json!({
                "success": true,
                "images": ["cGFnZTE=", "cGFnZTI="],
                "count": 2,
                "backend": "eSCL",
            })
        );
    }

    #[tokio::test]
    async fn scan_failure_becomes_error_value() {
        let (mut backend, _) = FakeBackend::new(&["Office MFP"]);
        backend.fail_scan = true;
        let mut orch = orchestrator(backend);
        orch.list_scanners().await;

        let resp = orch.scan(&ScanRequest::new("Office MFP")).await;
        assert_eq!(
            resp,
            json!({ "success": false, "error": "Scanner is not ready [Processing]" })
        );
    }
}
