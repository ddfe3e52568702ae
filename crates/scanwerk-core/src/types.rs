// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Scanwerk eSCL client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Input source keyword that selects the automatic document feeder.
pub const FEEDER_SOURCE: &str = "Feeder";

/// Input source keyword for the flatbed glass.
pub const PLATEN_SOURCE: &str = "Platen";

/// A scanner discovered on the local network via mDNS.
///
/// Discovery never deduplicates: the same device announced twice yields two
/// entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerRef {
    /// Display name with the `._service._tcp.local.` suffix stripped.
    pub name: String,
    /// Textual IP address of the first advertised address.
    pub host: String,
    pub port: u16,
    /// The mDNS service type that matched (e.g. `_uscan._tcp.local.`).
    #[serde(rename = "type")]
    pub service_type: String,
}

impl ScannerRef {
    /// Base URL of the device's eSCL endpoint tree.
    pub fn escl_base(&self) -> String {
        if self.host.contains(':') {
            format!("http://[{}]:{}/eSCL", self.host, self.port)
        } else {
            format!("http://{}:{}/eSCL", self.host, self.port)
        }
    }

    /// `scheme://host:port` origin used to absolutise relative job locations.
    pub fn origin(&self) -> String {
        if self.host.contains(':') {
            format!("http://[{}]:{}", self.host, self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }
}

/// Parsed scanner capability snapshot. Never cached across queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    /// Supported DPI values, ascending, no duplicates.
    pub resolutions: Vec<u32>,
    /// Supported eSCL colour modes, no duplicates.
    pub color_modes: Vec<String>,
    /// Subset of `["Platen", "Adf"]`, by presence of the capability element.
    pub input_sources: Vec<String>,
}

/// Requested colour mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ColorMode {
    #[default]
    Gray,
    Bw,
    Color,
}

impl ColorMode {
    /// eSCL `ColorMode` keyword sent in the scan settings document.
    pub fn escl_keyword(&self) -> &'static str {
        match self {
            Self::Gray => "Grayscale8",
            Self::Bw => "BlackAndWhite1",
            Self::Color => "RGB24",
        }
    }

    /// Parse a caller-supplied mode. Unrecognised values fall back to gray.
    pub fn from_param(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "bw" => Self::Bw,
            "color" => Self::Color,
            _ => Self::Gray,
        }
    }
}

impl From<String> for ColorMode {
    fn from(value: String) -> Self {
        Self::from_param(&value)
    }
}

fn default_dpi() -> u32 {
    300
}

fn default_source() -> String {
    PLATEN_SOURCE.to_string()
}

/// Callers send `null` for "not chosen"; treat it like an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_default_dpi<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or_else(default_dpi))
}

fn null_as_default_source<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_source))
}

/// Caller-supplied scan parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    /// Must match a `ScannerRef::name` from the last discovery run.
    #[serde(rename = "scanner", default, deserialize_with = "null_as_default")]
    pub scanner_name: String,
    #[serde(default = "default_dpi", deserialize_with = "null_as_default_dpi")]
    pub dpi: u32,
    #[serde(rename = "mode", default, deserialize_with = "null_as_default")]
    pub color_mode: ColorMode,
    #[serde(
        rename = "source",
        default = "default_source",
        deserialize_with = "null_as_default_source"
    )]
    pub input_source: String,
}

impl ScanRequest {
    pub fn new(scanner_name: impl Into<String>) -> Self {
        Self {
            scanner_name: scanner_name.into(),
            dpi: default_dpi(),
            color_mode: ColorMode::default(),
            input_source: default_source(),
        }
    }

    /// Whether the request targets the document feeder (multi-page mode).
    pub fn is_feeder(&self) -> bool {
        self.input_source == FEEDER_SOURCE
    }
}

/// Lifecycle states of an eSCL scan job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    /// The device accepted the job and returned its location.
    Created,
    /// Waiting for the device to return to idle.
    Polling,
    Completed,
    Aborted,
    Canceled,
    /// The device reported `Stopped` mid-job.
    Stopped,
    /// Polling hit its ceiling without a verdict.
    Unknown,
}

impl JobState {
    /// Terminal states never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Aborted | Self::Canceled | Self::Stopped
        )
    }
}

/// Live state of one scan-job lifecycle, owned by a single job run.
#[derive(Debug, Clone)]
pub struct ScanJob {
    /// Absolute job URL issued by the device; the job's sole identity.
    pub job_url: String,
    pub state: JobState,
    pub pages_downloaded: u32,
    pub created_at: DateTime<Utc>,
}

impl ScanJob {
    pub fn new(job_url: String) -> Self {
        Self {
            job_url,
            state: JobState::Created,
            pages_downloaded: 0,
            created_at: Utc::now(),
        }
    }

    /// Move to `next` unless the job already sits in a terminal state.
    ///
    /// Returns whether the transition was applied.
    pub fn transition(&mut self, next: JobState) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = next;
        true
    }

    /// Count one more page retrieved from the device.
    pub fn record_page(&mut self) {
        self.pages_downloaded += 1;
    }
}

/// One page retrieved from the device and re-encoded for transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedPage {
    /// 1-based, sequential.
    pub page_number: u32,
    /// Bytes as downloaded from `NextDocument`.
    pub raw_bytes: Vec<u8>,
    /// Base64 of the rotated, PNG-encoded page.
    pub encoded: String,
}
