//! Error types for the Pact FFI orchestration.
//!
//! Every failure carries the offending engine call and its raw status code,
//! so a run can be diagnosed without looking inside the native engine.
//! Mismatched traffic is not an error: see [`crate::verification::Mismatches`].

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while driving the contract-testing engine.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PactError {
    /// The native library could not be opened.
    #[error("failed to load native library {}: {source}", path.display())]
    Load {
        /// Path that was handed to the dynamic loader
        path: PathBuf,
        /// Loader error
        #[source]
        source: libloading::Error,
    },

    /// The native library does not export a function the bridge needs.
    #[error("native library {} does not export `{symbol}`: {source}", path.display())]
    MissingSymbol {
        /// Path of the loaded library
        path: PathBuf,
        /// Name of the missing symbol
        symbol: &'static str,
        /// Loader error
        #[source]
        source: libloading::Error,
    },

    /// A required plugin could not be loaded for the pact.
    #[error("pactffi_using_plugin({name} {version}) failed with status {status}: {reason}")]
    Plugin {
        /// Plugin name
        name: String,
        /// Requested plugin version
        version: String,
        /// Raw engine status
        status: u32,
        /// Decoded status
        reason: &'static str,
    },

    /// The engine rejected the interaction contents.
    #[error("pactffi_interaction_contents({content_type}) failed with status {status}: {reason}")]
    Content {
        /// Content type the contents were attached for
        content_type: String,
        /// Raw engine status
        status: u32,
        /// Decoded status
        reason: &'static str,
    },

    /// The mock server could not be started.
    #[error(
        "pactffi_create_mock_server_for_transport({transport} on {address}) failed with status {status}: {reason}"
    )]
    StartServer {
        /// Requested bind address
        address: String,
        /// Requested transport
        transport: String,
        /// Raw engine result
        status: i32,
        /// Decoded status
        reason: &'static str,
    },

    /// The pact file could not be written.
    #[error("pactffi_write_pact_file({}) failed with status {status}: {reason}", directory.display())]
    Write {
        /// Output directory
        directory: PathBuf,
        /// Raw engine status
        status: i32,
        /// Decoded status
        reason: &'static str,
    },

    /// An argument was rejected before reaching the engine.
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        /// Name of the offending argument
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Contract description could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PactError {
    /// Stable identifier for the error category.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Load { .. } | Self::MissingSymbol { .. } => "PACT_LOAD_ERROR",
            Self::Plugin { .. } => "PACT_PLUGIN_ERROR",
            Self::Content { .. } => "PACT_CONTENT_ERROR",
            Self::StartServer { .. } => "PACT_START_SERVER_ERROR",
            Self::Write { .. } => "PACT_WRITE_ERROR",
            Self::InvalidInput { .. } => "PACT_INVALID_INPUT",
            Self::Serialization(_) => "PACT_SERIALIZATION_ERROR",
            Self::Config(_) => "PACT_CONFIG_ERROR",
        }
    }

    /// Whether the error aborts the run.
    ///
    /// Only a failed pact write is handed back to the caller as a recoverable
    /// outcome; every other category points at a misconfigured environment.
    /// Nothing is retried.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::Write { .. })
    }

    /// Create an invalid input error for the given argument.
    #[must_use]
    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Create a configuration error with the given message.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Decode a `pactffi_using_plugin` status.
#[must_use]
pub const fn plugin_status_reason(status: u32) -> &'static str {
    match status {
        0 => "success",
        1 => "a general panic was caught",
        2 => "failed to load the plugin",
        3 => "pact handle is not valid",
        _ => "unknown status",
    }
}

/// Decode a `pactffi_interaction_contents` status.
#[must_use]
pub const fn contents_status_reason(status: u32) -> &'static str {
    match status {
        0 => "success",
        1 => "a general panic was caught",
        2 => "the mock server has already been started",
        3 => "interaction handle is invalid",
        4 => "content type is not valid",
        5 => "contents JSON is not valid JSON",
        6 => "plugin returned an error",
        _ => "unknown status",
    }
}

/// Decode a `pactffi_create_mock_server_for_transport` result.
#[must_use]
pub const fn start_status_reason(status: i32) -> &'static str {
    match status {
        -1 => "pact handle is not valid",
        -2 => "transport config is not valid",
        -3 => "mock server could not be started",
        -4 => "a general panic was caught",
        -5 => "address is not valid",
        -6 => "could not create the TLS configuration",
        0 => "engine returned port 0",
        s if s > 0 => "port is out of range",
        _ => "unknown status",
    }
}

/// Decode a `pactffi_write_pact_file` status.
#[must_use]
pub const fn write_status_reason(status: i32) -> &'static str {
    match status {
        0 => "success",
        1 => "a general panic was caught",
        2 => "the pact file could not be written",
        3 => "no mock server is running on the given port",
        _ => "unknown status",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_write_errors_are_recoverable() {
        let write = PactError::Write {
            directory: PathBuf::from("./pacts"),
            status: 2,
            reason: write_status_reason(2),
        };
        assert!(!write.is_fatal());

        let plugin = PactError::Plugin {
            name: "protobuf".to_string(),
            version: "0.3.4".to_string(),
            status: 2,
            reason: plugin_status_reason(2),
        };
        assert!(plugin.is_fatal());
        assert!(PactError::config("bad").is_fatal());
    }

    #[test]
    fn test_error_display_names_call_and_status() {
        let err = PactError::StartServer {
            address: "0.0.0.0".to_string(),
            transport: "grpc".to_string(),
            status: -3,
            reason: start_status_reason(-3),
        };
        let msg = err.to_string();
        assert!(msg.contains("pactffi_create_mock_server_for_transport"));
        assert!(msg.contains("-3"));
        assert!(msg.contains("could not be started"));
        assert_eq!(err.code(), "PACT_START_SERVER_ERROR");
    }

    #[test]
    fn test_status_reasons() {
        assert_eq!(contents_status_reason(5), "contents JSON is not valid JSON");
        assert_eq!(start_status_reason(0), "engine returned port 0");
        assert_eq!(start_status_reason(70_000), "port is out of range");
        assert_eq!(write_status_reason(42), "unknown status");
    }

    #[test]
    fn test_invalid_input_display() {
        let err = PactError::invalid_input("consumer", "must not be empty");
        assert_eq!(err.to_string(), "invalid consumer: must not be empty");
    }
}
