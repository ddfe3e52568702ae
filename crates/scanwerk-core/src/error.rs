// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanwerk.
//
// The `Display` text of every variant is what the caller sees at the service
// boundary, so keep it short and specific to the failing step.

use thiserror::Error;

/// Top-level error type for all Scanwerk operations.
#[derive(Debug, Error)]
pub enum ScanError {
    // -- Lookup --
    #[error("No scanner selected")]
    NoScannerSelected,

    #[error("Scanner information not found: {0}")]
    Lookup(String),

    // -- Discovery --
    #[error("Scanner discovery failed: {0}")]
    Discovery(String),

    // -- Scan job lifecycle --
    #[error("Scanner is not ready [{0}]")]
    NotReady(String),

    #[error("Unsupported input source: {requested} [supported: {}]", .supported.join(", "))]
    UnsupportedSource {
        requested: String,
        supported: Vec<String>,
    },

    #[error("Failed to create scan job: {0}")]
    JobCreation(String),

    #[error("Scanner stopped during scan")]
    Stopped,

    #[error("Cannot retrieve scan results. Please verify document is loaded in scanner.")]
    NoResults,

    // -- Protocol plumbing --
    #[error("scanner request failed: {0}")]
    Transport(String),

    #[error("malformed scanner document: {0}")]
    Parse(String),

    #[error("image processing failed: {0}")]
    Image(String),

    // -- Process plumbing --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanError>;
