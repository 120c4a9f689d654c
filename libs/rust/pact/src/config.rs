//! Bridge configuration.
//!
//! Loaded from environment variables (a `.env` file is honoured) and
//! validated up front.

use crate::builder::PluginSpec;
use crate::error::PactError;
use crate::ffi::NativeEngine;
use crate::logging::{LogLevel, LogSink};
use crate::mock_server::MockServerConfig;
use crate::orchestrator::PactRunConfig;
use crate::specification::SpecificationVersion;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Default directory pact files are written to.
pub const DEFAULT_OUTPUT_DIR: &str = "./pacts";

/// Engine and run settings shared by every contract test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Path of the `pact_ffi` shared library
    pub library_path: PathBuf,
    /// Engine log level
    pub log_level: LogLevel,
    /// Engine log sink
    pub log_sink: LogSink,
    /// Specification version pacts are pinned to
    pub specification: SpecificationVersion,
    /// Protobuf plugin to load
    pub plugin: PluginSpec,
    /// Mock server placement
    pub mock_server: MockServerConfig,
    /// Directory pact files are written to
    pub output_dir: PathBuf,
    /// Whether an existing pact file is overwritten
    pub overwrite: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            library_path: default_library_path(),
            log_level: LogLevel::default(),
            log_sink: LogSink::default(),
            specification: SpecificationVersion::default(),
            plugin: PluginSpec::default(),
            mock_server: MockServerConfig::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            overwrite: true,
        }
    }
}

impl BridgeConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, PactError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value
    /// if it is set.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PactError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let library_path = lookup("PACT_FFI_LIBRARY").map_or(defaults.library_path, PathBuf::from);
        let log_level = parse_var(&lookup, "PACT_LOG_LEVEL", defaults.log_level)?;
        let log_sink = parse_var(&lookup, "PACT_LOG_SINK", defaults.log_sink)?;
        let specification = parse_var(&lookup, "PACT_SPECIFICATION", defaults.specification)?;
        let plugin = lookup("PACT_PROTOBUF_PLUGIN_VERSION").map_or(defaults.plugin, PluginSpec::protobuf);

        let mock_server = MockServerConfig::default()
            .with_bind_address(lookup("PACT_MOCK_SERVER_HOST").unwrap_or(defaults.mock_server.bind_address))
            .with_port(parse_var(&lookup, "PACT_MOCK_SERVER_PORT", defaults.mock_server.port)?);

        let output_dir = lookup("PACT_OUTPUT_DIR").map_or(defaults.output_dir, PathBuf::from);
        let overwrite = parse_var(&lookup, "PACT_OVERWRITE", defaults.overwrite)?;

        Ok(Self {
            library_path,
            log_level,
            log_sink,
            specification,
            plugin,
            mock_server,
            output_dir,
            overwrite,
        })
    }

    /// Run settings for one consumer/provider interaction.
    #[must_use]
    pub fn run_config(
        &self,
        consumer: impl Into<String>,
        provider: impl Into<String>,
        description: impl Into<String>,
    ) -> PactRunConfig {
        PactRunConfig {
            consumer: consumer.into(),
            provider: provider.into(),
            description: description.into(),
            specification: self.specification,
            plugin: self.plugin.clone(),
            mock_server: self.mock_server.clone(),
            output_dir: self.output_dir.clone(),
            overwrite: self.overwrite,
        }
    }
}

/// `bin/` followed by the platform's file name for `pact_ffi`.
#[must_use]
pub fn default_library_path() -> PathBuf {
    PathBuf::from("bin").join(NativeEngine::library_filename())
}

/// Parse variable `name` through `lookup`, falling back to `default` if unset.
///
/// # Errors
///
/// Returns an error naming the variable if its value does not parse.
pub fn parse_var<T, F>(lookup: &F, name: &str, default: T) -> Result<T, PactError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|e| PactError::config(format!("invalid {name}: {e}"))),
        None => Ok(default),
    }
}
