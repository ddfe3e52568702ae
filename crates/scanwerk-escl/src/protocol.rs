// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// eSCL wire vocabulary: namespaces, endpoint paths, the ScanSettings request
// document, and the small status documents read back from the device.

use roxmltree::{Document, Node};

use scanwerk_core::error::{Result, ScanError};
use scanwerk_core::types::ColorMode;

/// eSCL schema namespace (`scan:` prefix).
pub const ESCL_NS: &str = "http://schemas.hp.com/imaging/escl/2011/05/03";

/// PWG semantic model namespace (`pwg:` prefix).
pub const PWG_NS: &str = "http://www.pwg.org/schemas/2010/12/sm";

pub const SCANNER_STATUS_PATH: &str = "ScannerStatus";
pub const SCANNER_CAPABILITIES_PATH: &str = "ScannerCapabilities";
pub const SCAN_JOBS_PATH: &str = "ScanJobs";
pub const NEXT_DOCUMENT_PATH: &str = "NextDocument";

/// Fixed scan region, in 1/300 inch. Always submitted regardless of media.
pub const REGION_WIDTH: u32 = 3508;
pub const REGION_HEIGHT: u32 = 4961;

/// Device state as reported by `ScannerStatus`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannerState {
    Idle,
    Processing,
    Testing,
    Stopped,
    Down,
    /// Any keyword this client does not recognise.
    Other(String),
    /// The document carried no `pwg:State` element.
    Missing,
}

impl ScannerState {
    fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "Idle" => Self::Idle,
            "Processing" => Self::Processing,
            "Testing" => Self::Testing,
            "Stopped" => Self::Stopped,
            "Down" => Self::Down,
            other => Self::Other(other.to_string()),
        }
    }

    /// Keyword for logs and error messages.
    pub fn label(&self) -> &str {
        match self {
            Self::Idle => "Idle",
            Self::Processing => "Processing",
            Self::Testing => "Testing",
            Self::Stopped => "Stopped",
            Self::Down => "Down",
            Self::Other(keyword) => keyword,
            Self::Missing => "unknown",
        }
    }
}

/// Job state as reported by `GET {jobUrl}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteJobState {
    Pending,
    Processing,
    Completed,
    Aborted,
    Canceled,
    Unknown,
}

impl RemoteJobState {
    fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "Pending" => Self::Pending,
            "Processing" => Self::Processing,
            "Completed" => Self::Completed,
            "Aborted" => Self::Aborted,
            "Canceled" => Self::Canceled,
            _ => Self::Unknown,
        }
    }
}

/// Build the `ScanSettings` document posted to `ScanJobs`.
pub fn scan_settings_xml(dpi: u32, color_mode: ColorMode, input_source: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<scan:ScanSettings xmlns:scan="{ESCL_NS}" xmlns:pwg="{PWG_NS}">
    <pwg:Version>2.0</pwg:Version>
    <scan:Intent>Document</scan:Intent>
    <pwg:ScanRegions>
        <pwg:ScanRegion>
            <pwg:ContentRegionUnits>escl:ThreeHundredthsOfInches</pwg:ContentRegionUnits>
            <pwg:XOffset>0</pwg:XOffset>
            <pwg:YOffset>0</pwg:YOffset>
            <pwg:Width>{REGION_WIDTH}</pwg:Width>
            <pwg:Height>{REGION_HEIGHT}</pwg:Height>
        </pwg:ScanRegion>
    </pwg:ScanRegions>
    <scan:Justification>
        <pwg:XImagePosition>Center</pwg:XImagePosition>
        <pwg:YImagePosition>Center</pwg:YImagePosition>
    </scan:Justification>
    <pwg:InputSource>{source}</pwg:InputSource>
    <scan:ColorMode>{mode}</scan:ColorMode>
    <scan:XResolution>{dpi}</scan:XResolution>
    <scan:YResolution>{dpi}</scan:YResolution>
    <pwg:DocumentFormat>image/jpeg</pwg:DocumentFormat>
</scan:ScanSettings>"#,
        source = escape_text(input_source),
        mode = color_mode.escl_keyword(),
    )
}

/// Resolve a `Location` header against the device origin.
///
/// Absolute locations pass through untouched.
pub fn resolve_job_url(origin: &str, location: &str) -> String {
    if location.starts_with('/') {
        format!("{origin}{location}")
    } else {
        location.to_string()
    }
}

/// Parse a `ScannerStatus` document into the device state.
pub fn parse_scanner_state(xml: &str) -> Result<ScannerState> {
    let doc = parse_document(xml)?;
    let state = doc
        .descendants()
        .find(|n| n.has_tag_name((PWG_NS, "State")))
        .and_then(|n| n.text())
        .map(|text| ScannerState::from_keyword(text.trim()))
        .unwrap_or(ScannerState::Missing);
    Ok(state)
}

/// Parse a job status document into its `JobState`.
///
/// Devices disagree on the namespace, so PWG, eSCL, and bare names are all
/// accepted, in that order.
pub fn parse_job_state(xml: &str) -> Result<RemoteJobState> {
    let doc = parse_document(xml)?;
    let keyword = element_text(&doc, |n| n.has_tag_name((PWG_NS, "JobState")))
        .or_else(|| element_text(&doc, |n| n.has_tag_name((ESCL_NS, "JobState"))))
        .or_else(|| {
            element_text(&doc, |n| {
                n.tag_name().namespace().is_none() && n.tag_name().name() == "JobState"
            })
        });
    Ok(keyword
        .map(|k| RemoteJobState::from_keyword(&k))
        .unwrap_or(RemoteJobState::Unknown))
}

/// Trimmed text of the first element matching `pred`.
fn element_text(doc: &Document<'_>, pred: impl Fn(&Node<'_, '_>) -> bool) -> Option<String> {
    doc.descendants()
        .find(|n| n.is_element() && pred(n))
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
}

pub(crate) fn parse_document(xml: &str) -> Result<Document<'_>> {
    Document::parse(xml).map_err(|e| ScanError::Parse(format!("invalid XML: {e}")))
}

fn escape_text(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
