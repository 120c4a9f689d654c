//! Consumer configuration.
//!
//! Bridge settings plus the rectangle the contract expects and the one the
//! client actually sends. Loaded from environment variables; a `.env` file
//! is honoured.

use crate::tracing_config::TracingConfig;
use pact_bridge::config::parse_var;
use pact_bridge::{BridgeConfig, PactError};
use std::env;
use std::path::PathBuf;

/// Rectangle the contract expects by default.
pub const DEFAULT_LENGTH: u32 = 3;
/// Rectangle the contract expects by default.
pub const DEFAULT_WIDTH: u32 = 4;

/// Area consumer configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Engine and run settings
    pub bridge: BridgeConfig,
    /// Schema the contract refers to
    pub proto_path: PathBuf,
    /// Length the contract expects
    pub expected_length: u32,
    /// Width the contract expects
    pub expected_width: u32,
    /// Length the client sends
    pub client_length: f32,
    /// Width the client sends
    pub client_width: f32,
    /// Whether logs are written as JSON
    pub log_json: bool,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, PactError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an invalid value.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PactError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bridge = BridgeConfig::from_lookup(&lookup)?;
        let proto_path = lookup("AREA_PROTO_PATH").map_or_else(default_proto_path, PathBuf::from);

        let expected_length = parse_var(&lookup, "AREA_EXPECTED_LENGTH", DEFAULT_LENGTH)?;
        let expected_width = parse_var(&lookup, "AREA_EXPECTED_WIDTH", DEFAULT_WIDTH)?;
        let client_length = parse_var(&lookup, "AREA_CLIENT_LENGTH", expected_length as f32)?;
        let client_width = parse_var(&lookup, "AREA_CLIENT_WIDTH", expected_width as f32)?;
        let log_json = parse_var(&lookup, "LOG_JSON", false)?;

        if expected_length == 0 || expected_width == 0 {
            return Err(PactError::config("AREA_EXPECTED_LENGTH and AREA_EXPECTED_WIDTH must be positive"));
        }

        Ok(Self {
            bridge,
            proto_path,
            expected_length,
            expected_width,
            client_length,
            client_width,
            log_json,
        })
    }

    /// Tracing settings, following the engine's log level.
    #[must_use]
    pub fn tracing(&self) -> TracingConfig {
        let config = TracingConfig::default().with_log_level(self.bridge.log_level.as_str());
        if self.log_json {
            config.with_json_output()
        } else {
            config
        }
    }
}

/// The schema shipped with this crate.
#[must_use]
pub fn default_proto_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("proto")
        .join("area_calculator.proto")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.expected_length, 3);
        assert_eq!(config.expected_width, 4);
        assert!((config.client_length - 3.0).abs() < f32::EPSILON);
        assert!((config.client_width - 4.0).abs() < f32::EPSILON);
        assert!(!config.log_json);
        assert!(config.proto_path.ends_with("proto/area_calculator.proto"));
        assert!(config.proto_path.exists());
        assert_eq!(config.bridge, BridgeConfig::default());
    }

    #[test]
    fn test_client_can_diverge_from_contract() {
        let config = Config::from_lookup(lookup_from(&[
            ("AREA_CLIENT_LENGTH", "5"),
            ("PACT_OUTPUT_DIR", "/tmp/pacts"),
        ]))
        .unwrap();
        assert_eq!(config.expected_length, 3);
        assert!((config.client_length - 5.0).abs() < f32::EPSILON);
        assert!((config.client_width - 4.0).abs() < f32::EPSILON);
        assert_eq!(config.bridge.output_dir, PathBuf::from("/tmp/pacts"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = Config::from_lookup(lookup_from(&[("AREA_EXPECTED_LENGTH", "three")])).unwrap_err();
        assert!(err.to_string().contains("AREA_EXPECTED_LENGTH"));

        let err = Config::from_lookup(lookup_from(&[("AREA_EXPECTED_WIDTH", "0")])).unwrap_err();
        assert_eq!(err.code(), "PACT_CONFIG_ERROR");

        assert!(Config::from_lookup(lookup_from(&[("LOG_JSON", "yes")])).is_err());
    }

    #[test]
    fn test_tracing_follows_engine_level() {
        let config = Config::from_lookup(lookup_from(&[("PACT_LOG_LEVEL", "debug"), ("LOG_JSON", "true")])).unwrap();
        let tracing = config.tracing();
        assert_eq!(tracing.log_level, "debug");
        assert!(tracing.json_output);
    }
}
