// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan service configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// mDNS service type for plain eSCL.
pub const USCAN_SERVICE: &str = "_uscan._tcp.local.";

/// mDNS service type for TLS-secured eSCL.
pub const USCANS_SERVICE: &str = "_uscans._tcp.local.";

/// Timing and discovery settings for the eSCL client.
///
/// Durations are stored in milliseconds so the JSON form stays readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// mDNS service types browsed during discovery.
    pub service_types: Vec<String>,
    /// Fixed discovery window; results are only read after it elapses.
    pub discovery_window_ms: u64,
    /// Timeout for status, capability, and job-status reads.
    pub read_timeout_ms: u64,
    /// Timeout for job creation, page download, and job deletion.
    pub transfer_timeout_ms: u64,
    /// Delay between status polls while a job is running.
    pub poll_interval_ms: u64,
    /// Number of polls before giving up and downloading anyway.
    pub max_polls: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            service_types: vec![USCAN_SERVICE.to_string(), USCANS_SERVICE.to_string()],
            discovery_window_ms: 5_000,
            read_timeout_ms: 5_000,
            transfer_timeout_ms: 10_000,
            poll_interval_ms: 1_000,
            max_polls: 30,
        }
    }
}

impl ScanConfig {
    pub fn discovery_window(&self) -> Duration {
        Duration::from_millis(self.discovery_window_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_millis(self.transfer_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
