//! Area calculator consumer.
//!
//! The gRPC client for `area_calculator.Calculator`, its Pact contract, and
//! the configuration the contract test binary runs with.

pub mod client;
pub mod config;
pub mod contract;
pub mod proto;
pub mod tracing_config;

pub use client::{ClientError, rectangle_area};
pub use config::Config;
pub use contract::{CONSUMER, DESCRIPTION, PROVIDER, area_contract};
pub use tracing_config::{TracingConfig, init_tracing};
