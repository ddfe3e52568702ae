// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-page processing for downloaded scan results.

use base64::{Engine, engine::general_purpose::STANDARD};
use scanwerk_core::error::Result;
use tracing::debug;

use crate::image::ImageProcessor;

/// Turns raw page bytes into a transport-ready string.
///
/// Scanners deliver pages in feed orientation; every page gets one fixed
/// counter-clockwise quarter turn, PNG re-encoding, then standard base64.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageProcessor;

impl PageProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Process one page. Failures are per-page; the caller decides whether
    /// they are fatal.
    pub fn process(&self, raw: &[u8], page_number: u32) -> Result<String> {
        let decoded = ImageProcessor::from_bytes(raw)?;
        debug!(
            page = page_number,
            width = decoded.width(),
            height = decoded.height(),
            "page original size"
        );

        let rotated = decoded.rotate_quarter_turns_ccw(1);
        debug!(
            page = page_number,
            width = rotated.width(),
            height = rotated.height(),
            "page size after rotation"
        );

        let png = rotated.to_png_bytes()?;
        Ok(STANDARD.encode(png))
    }
}
