//! The engine seam.
//!
//! [`PactEngine`] mirrors the native function surface one method per C
//! function, with Rust types in and raw status codes out. Interpreting those
//! statuses is the job of the builder, mock server and persister modules.
//! [`crate::ffi::NativeEngine`] is the production implementation.

use crate::error::PactError;
use crate::handles::{InteractionHandle, PactHandle};
use crate::logging::LogLevel;
use crate::specification::{InteractionPart, SpecificationVersion};

/// Function surface of the contract-testing engine.
pub trait PactEngine: Send + Sync {
    /// Version of the engine.
    fn version(&self) -> String;

    /// Reset the engine's logger configuration.
    fn logger_init(&self);

    /// Attach a log sink (`stdout`, `stderr`, `file <path>`, `buffer`).
    ///
    /// # Errors
    ///
    /// Returns an error if the sink specifier cannot be encoded.
    fn logger_attach_sink(&self, sink: &str, level: LogLevel) -> Result<i32, PactError>;

    /// Activate the attached sinks.
    fn logger_apply(&self) -> i32;

    /// Emit a message through the engine's logger.
    ///
    /// # Errors
    ///
    /// Returns an error if any argument cannot be encoded.
    fn log_message(&self, source: &str, level: &str, message: &str) -> Result<(), PactError>;

    /// Create a new pact.
    ///
    /// # Errors
    ///
    /// Returns an error if any argument cannot be encoded.
    fn new_pact(&self, consumer: &str, provider: &str) -> Result<PactHandle, PactError>;

    /// Attach a metadata entry to a pact.
    ///
    /// # Errors
    ///
    /// Returns an error if any argument cannot be encoded.
    fn with_pact_metadata(
        &self,
        pact: PactHandle,
        namespace: &str,
        name: &str,
        value: &str,
    ) -> Result<bool, PactError>;

    /// Create a synchronous message interaction on a pact.
    ///
    /// # Errors
    ///
    /// Returns an error if the description cannot be encoded.
    fn new_sync_message_interaction(
        &self,
        pact: PactHandle,
        description: &str,
    ) -> Result<InteractionHandle, PactError>;

    /// Pin the pact to a specification version.
    fn with_specification(&self, pact: PactHandle, version: SpecificationVersion) -> bool;

    /// Load a plugin for the pact.
    ///
    /// # Errors
    ///
    /// Returns an error if any argument cannot be encoded.
    fn using_plugin(&self, pact: PactHandle, name: &str, version: &str) -> Result<u32, PactError>;

    /// Attach contents to one part of an interaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any argument cannot be encoded.
    fn interaction_contents(
        &self,
        interaction: InteractionHandle,
        part: InteractionPart,
        content_type: &str,
        contents: &str,
    ) -> Result<u32, PactError>;

    /// Start a mock server for the pact. Positive results are ports.
    ///
    /// # Errors
    ///
    /// Returns an error if any argument cannot be encoded.
    fn create_mock_server_for_transport(
        &self,
        pact: PactHandle,
        address: &str,
        port: u16,
        transport: &str,
        transport_config: Option<&str>,
    ) -> Result<i32, PactError>;

    /// Whether all traffic seen by the mock server matched.
    fn mock_server_matched(&self, port: i32) -> bool;

    /// Mismatch payload as JSON text, if the engine has one.
    fn mock_server_mismatches(&self, port: i32) -> Option<String>;

    /// Write the pact file for the mock server's pact.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be encoded.
    fn write_pact_file(&self, port: i32, directory: &str, overwrite: bool) -> Result<i32, PactError>;

    /// Shut the mock server down.
    fn cleanup_mock_server(&self, port: i32) -> bool;

    /// Shut down plugin processes started for the pact.
    fn cleanup_plugins(&self, pact: PactHandle);
}
