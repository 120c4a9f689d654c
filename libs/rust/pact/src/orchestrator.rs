//! One contract test run, start to finish.

use crate::builder::{self, PluginSpec};
use crate::config::DEFAULT_OUTPUT_DIR;
use crate::contract::ContractDescription;
use crate::engine::PactEngine;
use crate::error::PactError;
use crate::mock_server::{MockServer, MockServerConfig};
use crate::persist::VerificationOutcome;
use crate::specification::SpecificationVersion;
use std::future::Future;
use std::path::PathBuf;
use tracing::{info, warn};

/// Settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PactRunConfig {
    /// Consumer name
    pub consumer: String,
    /// Provider name
    pub provider: String,
    /// Interaction description
    pub description: String,
    /// Specification version
    pub specification: SpecificationVersion,
    /// Plugin serving the contract's content type
    pub plugin: PluginSpec,
    /// Mock server placement
    pub mock_server: MockServerConfig,
    /// Directory the pact file is written to
    pub output_dir: PathBuf,
    /// Whether an existing pact file is overwritten
    pub overwrite: bool,
}

impl PactRunConfig {
    /// Defaults for a consumer/provider pair.
    #[must_use]
    pub fn new(consumer: impl Into<String>, provider: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            consumer: consumer.into(),
            provider: provider.into(),
            description: description.into(),
            specification: SpecificationVersion::default(),
            plugin: PluginSpec::default(),
            mock_server: MockServerConfig::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            overwrite: true,
        }
    }

    /// Write pact files to `dir`.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

/// What happened during a run.
#[derive(Debug)]
pub struct RunReport<T, CE> {
    /// Port the mock server listened on
    pub port: u16,
    /// What the client got back
    pub client: Result<T, CE>,
    /// Verification result
    pub outcome: VerificationOutcome,
}

impl<T, CE> RunReport<T, CE> {
    /// Whether the contract was honoured.
    #[must_use]
    pub const fn is_matched(&self) -> bool {
        self.outcome.is_matched()
    }
}

/// Build the pact, start its mock server, let `client` exercise it at the
/// given `host:port`, then verify and persist.
///
/// A failing client does not stop the run; its error is reported alongside the
/// verification outcome. The mock server is shut down on every path out of
/// this function.
///
/// # Errors
///
/// Returns the first fatal engine error, or [`PactError::Write`] if traffic
/// matched but the pact file could not be written.
pub async fn run_pact<E, F, Fut, T, CE>(
    engine: &E,
    config: &PactRunConfig,
    contract: &ContractDescription,
    client: F,
) -> Result<RunReport<T, CE>, PactError>
where
    E: PactEngine + ?Sized,
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<T, CE>>,
    CE: std::fmt::Display,
{
    let handles = builder::new_pact(
        engine,
        &config.consumer,
        &config.provider,
        &config.description,
        config.specification,
    )?;
    builder::use_protobuf(engine, contract, handles, &config.plugin)?;

    let server = MockServer::start(engine, handles.pact, &config.mock_server)?;
    let port = server.port().get();

    let client_result = client(server.address()).await;
    if let Err(e) = &client_result {
        warn!(error = %e, port, "client call against mock server failed");
    }

    let outcome = server.persist_if_matched(&config.output_dir, config.overwrite)?;
    server.stop();

    info!(
        consumer = %config.consumer,
        provider = %config.provider,
        matched = outcome.is_matched(),
        "pact run finished"
    );
    Ok(RunReport {
        port,
        client: client_result,
        outcome,
    })
}
