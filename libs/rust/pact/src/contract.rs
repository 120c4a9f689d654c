//! Protobuf contract description.
//!
//! The JSON object handed to the protobuf plugin as interaction contents:
//! where the schema lives, which RPC is exercised, and the expected request
//! and response expressed with matcher expressions.

use crate::error::PactError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// Default `pact:content-type` of protobuf contracts.
pub const PROTOBUF_CONTENT_TYPE: &str = "application/protobuf";

/// Expected value of one field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Expectation {
    /// A matcher expression such as `matching(number, 3)`
    Matcher(String),
    /// An ordered sequence (repeated fields)
    Sequence(Vec<Expectation>),
    /// A nested message
    Message(BTreeMap<String, Expectation>),
}

impl Expectation {
    /// Build a nested message expectation.
    pub fn message<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Self)>,
    {
        Self::Message(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a repeated field expectation.
    pub fn sequence(items: impl IntoIterator<Item = Self>) -> Self {
        Self::Sequence(items.into_iter().collect())
    }

    /// Any number close to `value`.
    pub fn number(value: impl Display) -> Self {
        Self::Matcher(format!("matching(number, {value})"))
    }

    /// An integer, example `value`.
    pub fn integer(value: i64) -> Self {
        Self::Matcher(format!("matching(integer, {value})"))
    }

    /// A decimal, example `value`.
    pub fn decimal(value: f64) -> Self {
        Self::Matcher(format!("matching(decimal, {value})"))
    }

    /// Any value of the same type as `example`.
    pub fn same_type(example: &str) -> Self {
        Self::Matcher(format!("matching(type, '{}')", quote(example)))
    }

    /// A string matching `regex`, example `example`.
    pub fn regex(regex: &str, example: &str) -> Self {
        Self::Matcher(format!("matching(regex, '{}', '{}')", quote(regex), quote(example)))
    }

    /// Exactly `value`.
    pub fn equal_to(value: &str) -> Self {
        Self::Matcher(format!("matching(equalTo, '{}')", quote(value)))
    }

    /// Any non-empty value, example `example`.
    pub fn not_empty(example: &str) -> Self {
        Self::Matcher(format!("notEmpty('{}')", quote(example)))
    }

    /// Visit every matcher expression with its field path (`rectangle.length`,
    /// `value[0]`).
    pub fn for_each_matcher<'a>(&'a self, path: &str, visit: &mut impl FnMut(&str, &'a str)) {
        match self {
            Self::Matcher(expr) => visit(path, expr),
            Self::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    item.for_each_matcher(&format!("{path}[{i}]"), visit);
                }
            }
            Self::Message(fields) => {
                for (name, field) in fields {
                    let child = if path.is_empty() {
                        name.clone()
                    } else {
                        format!("{path}.{name}")
                    };
                    field.for_each_matcher(&child, visit);
                }
            }
        }
    }
}

impl From<&str> for Expectation {
    fn from(expr: &str) -> Self {
        Self::Matcher(expr.to_string())
    }
}

fn quote(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

/// The contract for one protobuf RPC.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContractDescription {
    /// Absolute path of the `.proto` schema
    #[serde(rename = "pact:proto")]
    pub proto: PathBuf,
    /// `Service/method` being exercised
    #[serde(rename = "pact:proto-service")]
    pub proto_service: String,
    /// Content type of the messages
    #[serde(rename = "pact:content-type")]
    pub content_type: String,
    /// Expected request fields
    pub request: BTreeMap<String, Expectation>,
    /// Expected response fields
    pub response: BTreeMap<String, Expectation>,
}

impl ContractDescription {
    /// Start a contract for `service` (`Service/method`) defined in `proto`.
    ///
    /// A relative schema path is made absolute against the current directory,
    /// since the plugin runs in its own process.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is empty or the path cannot be made
    /// absolute.
    pub fn new(proto: impl AsRef<Path>, service: impl Into<String>) -> Result<Self, PactError> {
        let service = service.into();
        if service.trim().is_empty() {
            return Err(PactError::invalid_input("proto service", "must not be empty"));
        }
        let proto = std::path::absolute(proto.as_ref())
            .map_err(|e| PactError::invalid_input("proto path", e.to_string()))?;

        Ok(Self {
            proto,
            proto_service: service,
            content_type: PROTOBUF_CONTENT_TYPE.to_string(),
            request: BTreeMap::new(),
            response: BTreeMap::new(),
        })
    }

    /// Override the message content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Expect a request field.
    #[must_use]
    pub fn with_request_field(mut self, name: impl Into<String>, expectation: Expectation) -> Self {
        self.request.insert(name.into(), expectation);
        self
    }

    /// Expect a response field.
    #[must_use]
    pub fn with_response_field(mut self, name: impl Into<String>, expectation: Expectation) -> Self {
        self.response.insert(name.into(), expectation);
        self
    }

    /// Serialize to the JSON text the engine expects.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_wire(&self) -> Result<String, PactError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Every matcher expression, keyed by `request.`/`response.` field path.
    #[must_use]
    pub fn matchers(&self) -> Vec<(String, &str)> {
        let mut out = Vec::new();
        for (side, fields) in [("request", &self.request), ("response", &self.response)] {
            for (name, expectation) in fields {
                expectation.for_each_matcher(&format!("{side}.{name}"), &mut |path, expr| {
                    out.push((path.to_string(), expr));
                });
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn area_contract() -> ContractDescription {
        ContractDescription::new("/protos/area_calculator.proto", "Calculator/calculateOne")
            .unwrap()
            .with_request_field(
                "rectangle",
                Expectation::message([
                    ("length", Expectation::number(3)),
                    ("width", Expectation::number(4)),
                ]),
            )
            .with_response_field("value", Expectation::sequence([Expectation::number(12)]))
    }

    #[test]
    fn test_wire_format_keys() {
        let wire: serde_json::Value = serde_json::from_str(&area_contract().to_wire().unwrap()).unwrap();
        assert_eq!(
            wire,
            json!({
                "pact:proto": "/protos/area_calculator.proto",
                "pact:proto-service": "Calculator/calculateOne",
                "pact:content-type": "application/protobuf",
                "request": {
                    "rectangle": {
                        "length": "matching(number, 3)",
                        "width": "matching(number, 4)"
                    }
                },
                "response": {
                    "value": ["matching(number, 12)"]
                }
            })
        );
    }

    #[test]
    fn test_matchers_are_listed_with_paths() {
        let contract = area_contract();
        let matchers = contract.matchers();
        assert_eq!(
            matchers,
            vec![
                ("request.rectangle.length".to_string(), "matching(number, 3)"),
                ("request.rectangle.width".to_string(), "matching(number, 4)"),
                ("response.value[0]".to_string(), "matching(number, 12)"),
            ]
        );
    }

    #[test]
    fn test_relative_proto_path_is_made_absolute() {
        let contract = ContractDescription::new("proto/area_calculator.proto", "Calculator/calculateOne").unwrap();
        assert!(contract.proto.is_absolute());
        assert!(contract.proto.ends_with("proto/area_calculator.proto"));
    }

    #[test]
    fn test_empty_service_is_rejected() {
        let err = ContractDescription::new("/a.proto", "  ").unwrap_err();
        assert_eq!(err.code(), "PACT_INVALID_INPUT");
    }

    #[test]
    fn test_matcher_helpers_quote_strings() {
        assert_eq!(Expectation::same_type("it's"), Expectation::from("matching(type, 'it\\'s')"));
        assert_eq!(
            Expectation::regex("\\d+", "42"),
            Expectation::from("matching(regex, '\\\\d+', '42')")
        );
        assert_eq!(Expectation::integer(7), Expectation::from("matching(integer, 7)"));
        assert_eq!(Expectation::not_empty("x"), Expectation::from("notEmpty('x')"));
    }

    #[test]
    fn test_untagged_deserialization() {
        let contract: ContractDescription = serde_json::from_str(&area_contract().to_wire().unwrap()).unwrap();
        assert_eq!(contract, area_contract());
    }
}
