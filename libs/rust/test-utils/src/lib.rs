//! Shared test utilities for the pact-bridge workspace.
//!
//! This crate provides:
//! - An in-memory [`MockEngine`](mocks::MockEngine) standing in for `pact_ffi`
//! - Proptest generators for names, versions and levels
//! - Fixtures for the area calculator contract

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod mocks;

pub use generators::*;
pub use mocks::{EngineCall, MockEngine};
