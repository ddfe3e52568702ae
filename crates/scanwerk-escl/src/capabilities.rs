// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanner capability parsing.
//
// Reads the `ScannerCapabilities` document into the resolutions, colour modes,
// and input sources the device advertises. Two separate questions are asked
// of the same document: which input-source capability blocks exist (Platen,
// Adf) and which literal `pwg:InputSource` values appear. Devices often omit
// the latter, so the answers can differ.

use std::collections::BTreeSet;

use roxmltree::Document;
use tracing::{debug, info};

use scanwerk_core::error::{Result, ScanError};
use scanwerk_core::types::Capabilities;

use crate::protocol::{ESCL_NS, PWG_NS, parse_document};

/// Parse a capability document.
pub fn parse(document: &str) -> Result<Capabilities> {
    let doc = parse_document(document)?;

    let mut resolutions = BTreeSet::new();
    for discrete in doc
        .descendants()
        .filter(|n| n.has_tag_name((ESCL_NS, "DiscreteResolution")))
    {
        let x_res = discrete
            .descendants()
            .find(|n| n.has_tag_name((ESCL_NS, "XResolution")))
            .and_then(|n| n.text());
        if let Some(text) = x_res {
            let dpi = text.trim().parse::<u32>().map_err(|e| {
                ScanError::Parse(format!("XResolution {text:?} is not an integer: {e}"))
            })?;
            resolutions.insert(dpi);
        }
    }

    let color_modes: BTreeSet<String> = doc
        .descendants()
        .filter(|n| n.has_tag_name((ESCL_NS, "ColorMode")))
        .filter_map(|n| n.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let mut input_sources = Vec::new();
    if has_element(&doc, "Platen") {
        input_sources.push("Platen".to_string());
    }
    if has_element(&doc, "Adf") {
        input_sources.push("Adf".to_string());
    }

    let caps = Capabilities {
        resolutions: resolutions.into_iter().collect(),
        color_modes: color_modes.into_iter().collect(),
        input_sources,
    };
    info!(
        resolutions = ?caps.resolutions,
        modes = ?caps.color_modes,
        sources = ?caps.input_sources,
        "capabilities parsed"
    );
    Ok(caps)
}

/// Every literal `pwg:InputSource` value in the document, in document order.
///
/// Used for request validation only; may be empty even when [`parse`]
/// reports Platen or Adf.
pub fn supported_input_sources(document: &str) -> Result<Vec<String>> {
    let doc = parse_document(document)?;
    let sources: Vec<String> = doc
        .descendants()
        .filter(|n| n.has_tag_name((PWG_NS, "InputSource")))
        .filter_map(|n| n.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    debug!(?sources, "supported InputSource values");
    Ok(sources)
}

fn has_element(doc: &Document<'_>, name: &str) -> bool {
    doc.descendants().any(|n| n.has_tag_name((ESCL_NS, name)))
}
