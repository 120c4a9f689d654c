//! Shared proptest generators.

use pact_bridge::{LogLevel, SpecificationVersion};
use proptest::prelude::*;

/// Consumer or provider names, including ones with spaces and unicode.
pub fn participant_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("amit-consumer".to_string()),
        Just("amit-provider".to_string()),
        Just("area-calculator".to_string()),
        "[a-z][a-z0-9-]{2,30}",
        "[A-Za-z][A-Za-z0-9 _.]{0,40}[A-Za-z0-9]",
        "[a-zé][a-zé-]{1,12}",
    ]
}

/// Human readable interaction descriptions.
pub fn description_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 ,.'-]{0,60}"
}

/// Any specification version.
pub fn specification_strategy() -> impl Strategy<Value = SpecificationVersion> {
    prop::sample::select(SpecificationVersion::ALL.to_vec())
}

/// Any log level.
pub fn log_level_strategy() -> impl Strategy<Value = LogLevel> {
    prop::sample::select(LogLevel::ALL.to_vec())
}

/// Names that are blank after trimming.
pub fn blank_name_strategy() -> impl Strategy<Value = String> {
    "[ \t]{0,5}"
}

/// Rectangle sides small enough for exact `f32` areas.
pub fn dimension_strategy() -> impl Strategy<Value = u32> {
    1u32..1000
}
