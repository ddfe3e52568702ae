// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-document: Page image processing for the Scanwerk eSCL client.
//
// Scanned pages arrive as JPEG from the device. They are decoded, turned a
// quarter counter-clockwise, re-encoded as PNG, and base64-encoded for the
// JSON response stream.

pub mod image;
pub mod page;

pub use image::processor::ImageProcessor;
pub use page::PageProcessor;
