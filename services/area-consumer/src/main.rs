//! Area Consumer - Contract Test Entry Point
//!
//! Records the area calculator contract against a Pact mock server and
//! writes the pact file when the client honours it.

use std::process::ExitCode;

use anyhow::Context;
use area_consumer::{CONSUMER, Config, DESCRIPTION, PROVIDER, area_contract, init_tracing, rectangle_area};
use pact_bridge::{
    LogLevel, NativeEngine, PactEngine, VerificationOutcome, configure_engine_logging, log_message,
    run_pact,
};
use tracing::{error, info, warn};

const LOG_SOURCE: &str = env!("CARGO_PKG_NAME");

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let config = Config::from_env().context("invalid configuration")?;
    init_tracing(&config.tracing());

    let engine = NativeEngine::global(&config.bridge.library_path)
        .with_context(|| format!("failed to load {}", config.bridge.library_path.display()))?;
    let version = engine.version();
    info!(%version, library = %engine.path().display(), "Pact FFI loaded");

    configure_engine_logging(engine, &config.bridge.log_sink, config.bridge.log_level)?;
    log_message(
        engine,
        LOG_SOURCE,
        LogLevel::Info,
        &format!("hello from {LOG_SOURCE}, using Pact FFI version {version}"),
    )?;
    log_message(engine, LOG_SOURCE, LogLevel::Off, "this message is filtered out")?;

    let contract = area_contract(&config.proto_path, config.expected_length, config.expected_width)?;
    let run = config.bridge.run_config(CONSUMER, PROVIDER, DESCRIPTION);
    let (length, width) = (config.client_length, config.client_width);

    let report = run_pact(engine, &run, &contract, |address| async move {
        rectangle_area(&address, length, width).await
    })
    .await
    .context("contract test run failed")?;

    match &report.client {
        Ok(area) => info!(area, port = report.port, "client received area"),
        Err(e) => warn!(error = %e, port = report.port, "client call failed"),
    }

    match report.outcome {
        VerificationOutcome::PactWritten { directory } => {
            info!(directory = %directory.display(), "contract honoured, pact written");
            Ok(ExitCode::SUCCESS)
        }
        VerificationOutcome::Mismatched(mismatches) => {
            error!(records = mismatches.records().len(), "contract violated");
            println!("{}", mismatches.to_pretty());
            Ok(ExitCode::FAILURE)
        }
    }
}
