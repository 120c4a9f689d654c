//! Test fixtures with sample data.
//!
//! The area calculator contract used throughout the workspace, and mismatch
//! reports shaped like the ones the engine produces.

use pact_bridge::{ContractDescription, Expectation};
use serde_json::{Value, json};
use std::path::PathBuf;

/// Consumer of the sample pact.
pub const CONSUMER: &str = "amit-consumer";
/// Provider of the sample pact.
pub const PROVIDER: &str = "amit-provider";
/// Interaction description of the sample pact.
pub const DESCRIPTION: &str = "amit-descriptions";
/// RPC exercised by the sample pact.
pub const AREA_SERVICE: &str = "Calculator/calculateOne";

/// Path of a schema used by fixtures. The mock engine never reads it.
#[must_use]
pub fn area_proto_path() -> PathBuf {
    PathBuf::from("/protos/area_calculator.proto")
}

/// Contract expecting a `length` x `width` rectangle and its area back.
///
/// # Panics
///
/// Never; the fixture service name is not empty.
#[must_use]
pub fn area_contract(length: u32, width: u32) -> ContractDescription {
    ContractDescription::new(area_proto_path(), AREA_SERVICE)
        .expect("fixture contract is valid")
        .with_request_field(
            "rectangle",
            Expectation::message([
                ("length", Expectation::number(length)),
                ("width", Expectation::number(width)),
            ]),
        )
        .with_response_field(
            "value",
            Expectation::sequence([Expectation::number(length * width)]),
        )
}

/// Request a client sends for a `length` x `width` rectangle.
#[must_use]
pub fn rectangle_request(length: f32, width: f32) -> Value {
    json!({ "rectangle": { "length": length, "width": width } })
}

/// Mismatch report for a response whose first value is `actual` instead of
/// `expected`.
#[must_use]
pub fn response_value_mismatch(expected: f32, actual: f32) -> Value {
    json!([{
        "type": "mismatched-request",
        "method": "POST",
        "path": "/area_calculator.Calculator/calculateOne",
        "mismatches": [{
            "type": "BodyMismatch",
            "path": "$.value.0",
            "expected": expected,
            "actual": actual,
            "mismatch": format!("Expected {actual} to be equal to {expected}")
        }]
    }])
}

/// Mismatch report for a request field carrying the wrong type.
#[must_use]
pub fn request_type_mismatch(field: &str) -> Value {
    json!([{
        "description": DESCRIPTION,
        "mismatches": [{
            "type": "BodyTypeMismatch",
            "path": format!("$.rectangle.{field}"),
            "expected": "number",
            "actual": "string",
            "mismatch": format!("Expected field '{field}' to be a number")
        }]
    }])
}
