// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Line-oriented JSON command protocol.
//
// Each input line is `{"action": ..., "params": {...}}`; each handled line
// produces exactly one response value.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use scanwerk_core::types::ScanRequest;

use super::orchestrator::ScanOrchestrator;
use super::response::{error_response, success_response};

/// What the loop should do after a line was handled.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Write the response and keep reading.
    Reply(Value),
    /// Write the response and stop.
    Stop(Value),
}

impl Outcome {
    pub fn response(&self) -> &Value {
        match self {
            Outcome::Reply(v) | Outcome::Stop(v) => v,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Command {
    action: Option<String>,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Default, Deserialize)]
struct CapabilityParams {
    #[serde(default)]
    scanner: Option<String>,
}

/// Handle one input line. Blank lines yield `None`.
pub async fn handle_line(orchestrator: &mut ScanOrchestrator, line: &str) -> Option<Outcome> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let command: Command = match serde_json::from_str(line) {
        Ok(command) => command,
        Err(e) => return Some(Outcome::Reply(error_response(format!("JSON parsing error: {e}")))),
    };

    let action = command.action.as_deref().unwrap_or_default();
    info!(action, "command received");

    let outcome = match action {
        "exit" => Outcome::Stop(success_response(json!({ "message": "eSCL service stopped" }))),
        "list" => Outcome::Reply(orchestrator.list_scanners().await),
        "capabilities" => match params::<CapabilityParams>(command.params) {
            Ok(p) => {
                let name = p.scanner.unwrap_or_default();
                Outcome::Reply(orchestrator.get_capabilities(&name).await)
            }
            Err(resp) => Outcome::Reply(resp),
        },
        "scan" => match params::<ScanRequest>(command.params) {
            Ok(request) => Outcome::Reply(orchestrator.scan(&request).await),
            Err(resp) => Outcome::Reply(resp),
        },
        other => Outcome::Reply(error_response(format!("Unknown command: {other}"))),
    };
    Some(outcome)
}

/// Decode `params`, treating an absent object as empty.
fn params<T: for<'de> Deserialize<'de>>(raw: Value) -> Result<T, Value> {
    let raw = if raw.is_null() { json!({}) } else { raw };
    serde_json::from_value(raw)
        .map_err(|e| error_response(format!("Command processing error: {e}")))
}
