//! The area calculator contract.

use pact_bridge::{ContractDescription, Expectation, PactError};
use std::path::Path;

/// Consumer recorded in the pact.
pub const CONSUMER: &str = "amit-consumer";
/// Provider recorded in the pact.
pub const PROVIDER: &str = "amit-provider";
/// Interaction description.
pub const DESCRIPTION: &str = "amit-descriptions";
/// `Service/method` under test.
pub const SERVICE: &str = "Calculator/calculateOne";

/// `calculateOne` on a `length` x `width` rectangle answers with its area.
///
/// # Errors
///
/// Returns an error if `proto` cannot be made absolute.
pub fn area_contract(proto: &Path, length: u32, width: u32) -> Result<ContractDescription, PactError> {
    let area = length
        .checked_mul(width)
        .ok_or_else(|| PactError::invalid_input("width", format!("{length} x {width} overflows")))?;

    Ok(ContractDescription::new(proto, SERVICE)?
        .with_request_field(
            "rectangle",
            Expectation::message([
                ("length", Expectation::number(length)),
                ("width", Expectation::number(width)),
            ]),
        )
        .with_response_field("value", Expectation::sequence([Expectation::number(area)])))
}
