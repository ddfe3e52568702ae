// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Discovery session: the scanners found by the most recent discovery run.
// The only way a scanner becomes addressable.

use scanwerk_core::error::{Result, ScanError};
use scanwerk_core::types::ScannerRef;

/// A discovered scanner and the backend that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEntry {
    /// Index into the orchestrator's backend list.
    pub backend: usize,
    pub scanner: ScannerRef,
}

/// Results of the last discovery run, replaced wholesale on each run.
#[derive(Debug, Default)]
pub struct ScanSession {
    entries: Vec<SessionEntry>,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every entry with a fresh discovery result.
    pub fn replace(&mut self, entries: Vec<SessionEntry>) {
        self.entries = entries;
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[SessionEntry] {
        &self.entries
    }

    /// Find a scanner by display name.
    ///
    /// Discovery keeps duplicates, so the last matching entry wins: it is the
    /// most recent announcement of that name.
    pub fn resolve(&self, name: &str) -> Result<&SessionEntry> {
        if name.is_empty() {
            return Err(ScanError::NoScannerSelected);
        }
        self.entries
            .iter()
            .rev()
            .find(|e| e.scanner.name == name)
            .ok_or_else(|| ScanError::Lookup(name.to_string()))
    }
}
