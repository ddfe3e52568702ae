// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Uniform `{success, ...}` response values for the command stream.

use std::fmt::Display;

use serde_json::{Map, Value, json};

/// `{"success": true, ...payload}`. Non-object payloads are nested under
/// `"result"`.
pub fn success_response(payload: Value) -> Value {
    let mut body = Map::new();
    body.insert("success".into(), Value::Bool(true));
    match payload {
        Value::Object(fields) => body.extend(fields),
        Value::Null => {}
        other => {
            body.insert("result".into(), other);
        }
    }
    Value::Object(body)
}

/// `{"success": false, "error": "<message>"}`.
pub fn error_response(error: impl Display) -> Value {
    json!({ "success": false, "error": error.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_merges_payload_fields() {
        let resp = success_response(json!({ "count": 2, "backend": "eSCL" }));
        assert_eq!(resp, json!({ "success": true, "count": 2, "backend": "eSCL" }));
    }

    #[test]
    fn error_carries_message() {
        let resp = error_response("Scanner is not ready [Processing]");
        assert_eq!(resp["success"], false);
        assert_eq!(resp["error"], "Scanner is not ready [Processing]");
    }
}
