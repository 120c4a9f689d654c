//! Match verification.
//!
//! Queries are snapshots: every call asks the engine again and reflects all
//! traffic the mock server has seen so far.

use crate::engine::PactEngine;
use crate::mock_server::MockServer;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// The engine's mismatch report.
///
/// Empty (`{}`) when the engine has nothing to report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Mismatches(Value);

impl Default for Mismatches {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl Mismatches {
    /// Parse the engine's mismatch payload.
    ///
    /// Text that is not JSON is kept verbatim as a JSON string.
    #[must_use]
    pub fn from_engine(payload: Option<&str>) -> Self {
        match payload.map(str::trim) {
            None | Some("") => Self::default(),
            Some(text) => match serde_json::from_str(text) {
                Ok(value) => Self(value),
                Err(e) => {
                    warn!(error = %e, "engine returned a mismatch report that is not JSON");
                    Self(Value::String(text.to_string()))
                }
            },
        }
    }

    /// Whether there is nothing to report.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// The report as the engine produced it.
    #[must_use]
    pub const fn as_json(&self) -> &Value {
        &self.0
    }

    /// Flattened mismatch records, in report order.
    ///
    /// Nested `mismatches` arrays are expanded; each nested entry inherits the
    /// interaction and type of its parent when it has none of its own.
    #[must_use]
    pub fn records(&self) -> Vec<MismatchRecord> {
        let mut out = Vec::new();
        match &self.0 {
            Value::Array(items) => {
                for item in items {
                    collect(item, None, &mut out);
                }
            }
            Value::Object(map) if !map.is_empty() => collect(&self.0, None, &mut out),
            Value::String(text) if !text.is_empty() => out.push(MismatchRecord {
                mismatch: Some(text.clone()),
                ..MismatchRecord::default()
            }),
            _ => {}
        }
        out
    }

    /// Whether any record refers to `field`, by path or description.
    #[must_use]
    pub fn mentions(&self, field: &str) -> bool {
        self.records().iter().any(|r| {
            r.path.as_deref().is_some_and(|p| p.contains(field))
                || r.mismatch.as_deref().is_some_and(|m| m.contains(field))
        })
    }

    /// Pretty JSON for operators.
    #[must_use]
    pub fn to_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }
}

/// One field-level divergence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MismatchRecord {
    /// Mismatch type reported by the engine
    pub kind: Option<String>,
    /// Interaction (description, or method and path) it belongs to
    pub interaction: Option<String>,
    /// Path of the diverging field
    pub path: Option<String>,
    /// Expected value
    pub expected: Option<Value>,
    /// Actual value
    pub actual: Option<Value>,
    /// Human readable description
    pub mismatch: Option<String>,
}

#[derive(Clone, Copy)]
struct Parent<'a> {
    kind: Option<&'a str>,
    interaction: Option<&'a str>,
}

fn str_field<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| map.get(*k).and_then(Value::as_str))
}

fn collect(value: &Value, parent: Option<Parent<'_>>, out: &mut Vec<MismatchRecord>) {
    let Value::Object(map) = value else {
        out.push(MismatchRecord {
            kind: parent.and_then(|p| p.kind).map(String::from),
            interaction: parent.and_then(|p| p.interaction).map(String::from),
            mismatch: Some(value.to_string()),
            ..MismatchRecord::default()
        });
        return;
    };

    let kind = str_field(map, &["type"]).or_else(|| parent.and_then(|p| p.kind));
    let interaction =
        str_field(map, &["description", "interaction"]).or_else(|| parent.and_then(|p| p.interaction));

    if let Some(Value::Array(nested)) = map.get("mismatches") {
        let interaction = interaction.map(String::from).or_else(|| {
            match (str_field(map, &["method"]), str_field(map, &["path"])) {
                (Some(method), Some(path)) => Some(format!("{method} {path}")),
                _ => None,
            }
        });
        let own = Parent {
            kind,
            interaction: interaction.as_deref(),
        };
        for entry in nested {
            collect(entry, Some(own), out);
        }
        return;
    }

    out.push(MismatchRecord {
        kind: kind.map(String::from),
        interaction: interaction.map(String::from),
        path: str_field(map, &["path"]).map(String::from),
        expected: map.get("expected").cloned(),
        actual: map.get("actual").cloned(),
        mismatch: str_field(map, &["mismatch", "error"]).map(String::from),
    });
}

/// Result of one verification query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// Whether all traffic matched
    pub matched: bool,
    /// What diverged
    pub mismatches: Mismatches,
}

impl<E: PactEngine + ?Sized> MockServer<'_, E> {
    /// Whether every request matched its interaction and every interaction
    /// received its traffic.
    #[must_use]
    pub fn is_matched(&self) -> bool {
        let matched = self.engine.mock_server_matched(self.port().as_engine());
        debug!(port = %self.port(), matched, "queried mock server match state");
        matched
    }

    /// The mismatch report. Never fails; empty when there is nothing to report.
    #[must_use]
    pub fn mismatches(&self) -> Mismatches {
        let payload = self.engine.mock_server_mismatches(self.port().as_engine());
        if payload.is_some() {
            debug!(port = %self.port(), "got mismatched traffic");
        }
        Mismatches::from_engine(payload.as_deref())
    }

    /// Both queries at once.
    #[must_use]
    pub fn match_result(&self) -> MatchResult {
        MatchResult {
            matched: self.is_matched(),
            mismatches: self.mismatches(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_payload_is_empty_mapping() {
        let mismatches = Mismatches::from_engine(None);
        assert!(mismatches.is_empty());
        assert_eq!(mismatches.as_json(), &json!({}));
        assert!(mismatches.records().is_empty());
        assert!(Mismatches::from_engine(Some("  ")).is_empty());
        assert!(Mismatches::from_engine(Some("[]")).is_empty());
    }

    #[test]
    fn test_nested_mismatches_are_flattened() {
        let payload = json!([{
            "type": "mismatched-request",
            "method": "POST",
            "path": "/area_calculator.Calculator/calculateOne",
            "mismatches": [
                {
                    "type": "BodyMismatch",
                    "path": "$.value.0",
                    "expected": 12.0,
                    "actual": 20.0,
                    "mismatch": "Expected 20.0 to be equal to 12.0"
                },
                { "path": "$.rectangle.length", "mismatch": "bad length" }
            ]
        }])
        .to_string();

        let mismatches = Mismatches::from_engine(Some(&payload));
        let records = mismatches.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind.as_deref(), Some("BodyMismatch"));
        assert_eq!(
            records[0].interaction.as_deref(),
            Some("POST /area_calculator.Calculator/calculateOne")
        );
        assert_eq!(records[0].expected, Some(json!(12.0)));
        assert_eq!(records[0].actual, Some(json!(20.0)));
        assert_eq!(records[1].kind.as_deref(), Some("mismatched-request"));
        assert!(mismatches.mentions("value"));
        assert!(mismatches.mentions("rectangle.length"));
        assert!(!mismatches.mentions("width"));
    }

    #[test]
    fn test_description_names_interaction() {
        let payload = json!({
            "description": "amit-descriptions",
            "mismatches": [{ "path": "$.value", "mismatch": "expected 12" }]
        })
        .to_string();
        let records = Mismatches::from_engine(Some(&payload)).records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].interaction.as_deref(), Some("amit-descriptions"));
    }

    #[test]
    fn test_non_json_payload_is_kept() {
        let mismatches = Mismatches::from_engine(Some("plugin crashed"));
        assert!(!mismatches.is_empty());
        assert_eq!(mismatches.as_json(), &json!("plugin crashed"));
        assert_eq!(mismatches.records()[0].mismatch.as_deref(), Some("plugin crashed"));
    }
}
