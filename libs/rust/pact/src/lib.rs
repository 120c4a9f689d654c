//! Pact FFI orchestration for gRPC/Protobuf consumer contract tests.
//!
//! Drives the native Pact engine through its C function surface:
//! - Native library loading and the process-wide engine handle
//! - Engine log sink configuration
//! - Pact and interaction building with protobuf contracts
//! - gRPC mock server lifecycle with guaranteed cleanup
//! - Match verification and pact file persistence

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod builder;
pub mod config;
pub mod contract;
pub mod engine;
pub mod error;
pub mod ffi;
pub mod handles;
pub mod logging;
pub mod mock_server;
pub mod orchestrator;
pub mod persist;
pub mod specification;
pub mod verification;

pub use builder::{GRPC_CONTENT_TYPE, PluginSpec, new_pact, use_protobuf};
pub use config::BridgeConfig;
pub use contract::{ContractDescription, Expectation};
pub use engine::PactEngine;
pub use error::PactError;
pub use ffi::NativeEngine;
pub use handles::{InteractionHandle, MockServerPort, PactHandle, PactInteraction};
pub use logging::{LogLevel, LogSink, configure_engine_logging, log_message};
pub use mock_server::{MockServer, MockServerConfig};
pub use orchestrator::{PactRunConfig, RunReport, run_pact};
pub use persist::VerificationOutcome;
pub use specification::{InteractionPart, SpecificationVersion};
pub use verification::{MatchResult, MismatchRecord, Mismatches};
