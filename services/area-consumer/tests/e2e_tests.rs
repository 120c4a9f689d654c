//! End-to-end contract tests for the area consumer.
//!
//! Tests against the native engine need `pact_ffi` (see `PACT_FFI_LIBRARY`)
//! and the protobuf plugin installed, and are ignored by default:
//!
//! ```text
//! cargo test -p area-consumer -- --ignored
//! ```

use area_consumer::config::default_proto_path;
use area_consumer::{CONSUMER, ClientError, DESCRIPTION, PROVIDER, area_contract, rectangle_area};
use pact_bridge::{BridgeConfig, NativeEngine, PactEngine, PactRunConfig, VerificationOutcome, run_pact};
use serde_json::Value;
use std::fs;
use std::path::Path;
use test_utils::MockEngine;

fn native_engine() -> &'static NativeEngine {
    let config = BridgeConfig::from_env().unwrap();
    NativeEngine::global(&config.library_path).unwrap()
}

fn run_config(output_dir: &Path) -> PactRunConfig {
    PactRunConfig::new(CONSUMER, PROVIDER, DESCRIPTION).with_output_dir(output_dir)
}

#[tokio::test]
async fn test_unreachable_mock_server_is_reported_not_fatal() {
    let engine = MockEngine::new();
    let dir = tempfile::tempdir().unwrap();
    let contract = area_contract(&default_proto_path(), 3, 4).unwrap();

    let report = run_pact(&engine, &run_config(dir.path()), &contract, |address| async move {
        rectangle_area(&address, 3.0, 4.0).await
    })
    .await
    .unwrap();

    // the mock engine does not listen on its ports
    assert!(report.client.is_err());
    let VerificationOutcome::Mismatched(mismatches) = report.outcome else {
        panic!("no traffic must not verify");
    };
    assert!(mismatches.is_empty());
    assert_eq!(engine.write_count(), 0);
    assert_eq!(engine.cleanup_count(), 1);
}

#[tokio::test]
async fn test_contract_reaches_engine_intact() {
    let engine = MockEngine::new();
    let dir = tempfile::tempdir().unwrap();
    let contract = area_contract(&default_proto_path(), 3, 4).unwrap();

    run_pact(&engine, &run_config(dir.path()), &contract, |_address| async {
        Ok::<f32, ClientError>(12.0)
    })
    .await
    .unwrap();

    let pact = engine.pact(pact_bridge::PactHandle::from_raw(1)).unwrap();
    let contents: Value = serde_json::from_str(pact.interactions[0].1.as_deref().unwrap()).unwrap();
    assert_eq!(contents["pact:proto-service"], "Calculator/calculateOne");
    assert_eq!(contents["response"]["value"][0], "matching(number, 12)");
    assert!(Path::new(contents["pact:proto"].as_str().unwrap()).exists());
}

#[tokio::test]
#[ignore = "requires the pact_ffi library and protobuf plugin"]
async fn test_area_contract_is_honoured() {
    let engine = native_engine();
    assert!(!engine.version().is_empty());
    let dir = tempfile::tempdir().unwrap();
    let contract = area_contract(&default_proto_path(), 3, 4).unwrap();

    let report = run_pact(engine, &run_config(dir.path()), &contract, |address| async move {
        rectangle_area(&address, 3.0, 4.0).await
    })
    .await
    .unwrap();

    let area = report.client.as_ref().unwrap();
    assert!((area - 12.0).abs() < f32::EPSILON);
    assert!(report.is_matched());

    let pact_file = dir.path().join("amit-consumer-amit-provider.json");
    let written: Value = serde_json::from_str(&fs::read_to_string(pact_file).unwrap()).unwrap();
    assert_eq!(written["consumer"]["name"], "amit-consumer");
    assert_eq!(written["provider"]["name"], "amit-provider");
}

#[tokio::test]
#[ignore = "requires the pact_ffi library and protobuf plugin"]
async fn test_wrong_length_is_reported() {
    let engine = native_engine();
    let dir = tempfile::tempdir().unwrap();
    let contract = area_contract(&default_proto_path(), 3, 4).unwrap();

    let report = run_pact(engine, &run_config(dir.path()), &contract, |address| async move {
        rectangle_area(&address, 5.0, 4.0).await
    })
    .await
    .unwrap();

    assert!(!report.is_matched());
    let VerificationOutcome::Mismatched(mismatches) = &report.outcome else {
        panic!("length 5 must not match");
    };
    assert!(!mismatches.is_empty());
    assert!(
        mismatches.mentions("value"),
        "mismatches must name the response value: {}",
        mismatches.to_pretty()
    );
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);

    // the mock server is gone once the run returns
    let after = rectangle_area(&format!("127.0.0.1:{}", report.port), 3.0, 4.0).await;
    assert!(after.is_err());
}
