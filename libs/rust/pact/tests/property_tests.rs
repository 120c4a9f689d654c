//! Property-based tests for the pact bridge.
//!
//! Tests validate:
//! - Build then start always yields a usable port
//! - Blank participant names never reach the engine
//! - Pact files are never written for unmatched traffic
//! - Mock servers are released exactly once
//! - Engine log filtering

use pact_bridge::{
    LogLevel, MockServer, MockServerConfig, PactError, PluginSpec, VerificationOutcome, log_message,
    new_pact, use_protobuf,
};
use proptest::prelude::*;
use test_utils::fixtures::{area_contract, rectangle_request, response_value_mismatch};
use test_utils::{
    EngineCall, MockEngine, blank_name_strategy, description_strategy, dimension_strategy,
    log_level_strategy, participant_name_strategy, specification_strategy,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property 1: Build Then Start**
    /// *For any* consumer, provider and description, creating the pact and
    /// attaching a protobuf contract SHALL yield a startable mock server on a
    /// positive port, with the pact pinned to the requested version.
    #[test]
    fn prop_build_then_start_yields_port(
        consumer in participant_name_strategy(),
        provider in participant_name_strategy(),
        description in description_strategy(),
        specification in specification_strategy(),
        length in dimension_strategy(),
        width in dimension_strategy(),
    ) {
        let engine = MockEngine::new();
        let handles = new_pact(&engine, &consumer, &provider, &description, specification).unwrap();
        use_protobuf(&engine, &area_contract(length, width), handles, &PluginSpec::default()).unwrap();

        let server = MockServer::start(&engine, handles.pact, &MockServerConfig::default()).unwrap();
        prop_assert!(server.port().get() > 0);

        let pact = engine.pact(handles.pact).unwrap();
        prop_assert_eq!(&pact.consumer, &consumer);
        prop_assert_eq!(&pact.provider, &provider);
        prop_assert_eq!(pact.specification, Some(specification));
        prop_assert_eq!(pact.interactions.len(), 1);
        prop_assert!(pact.interactions[0].1.is_some(), "contract must be attached");
    }

    /// **Property 2: Blank Names Rejected Locally**
    /// *For any* blank consumer name, `new_pact` SHALL fail without creating a
    /// pact in the engine.
    #[test]
    fn prop_blank_consumer_never_reaches_engine(
        blank in blank_name_strategy(),
        provider in participant_name_strategy(),
    ) {
        let engine = MockEngine::new();
        let err = new_pact(&engine, &blank, &provider, "description", Default::default()).unwrap_err();

        let is_consumer_error = matches!(err, PactError::InvalidInput { field: "consumer", .. });
        prop_assert!(is_consumer_error);
        prop_assert!(engine.calls().is_empty());
    }

    /// **Property 3: No Write Without Match**
    /// *For any* diverging response, persisting SHALL report the mismatches and
    /// SHALL NOT ask the engine to write a pact file.
    #[test]
    fn prop_write_never_attempted_without_match(
        length in dimension_strategy(),
        width in dimension_strategy(),
        wrong_length in dimension_strategy(),
    ) {
        prop_assume!(wrong_length != length);
        #[allow(clippy::cast_precision_loss)]
        let (expected, actual) = ((length * width) as f32, (wrong_length * width) as f32);
        let engine = MockEngine::new().with_mismatches(response_value_mismatch(expected, actual));

        let handles = new_pact(&engine, "amit-consumer", "amit-provider", "area", Default::default()).unwrap();
        use_protobuf(&engine, &area_contract(length, width), handles, &PluginSpec::default()).unwrap();
        let server = MockServer::start(&engine, handles.pact, &MockServerConfig::default()).unwrap();
        #[allow(clippy::cast_precision_loss)]
        let request = rectangle_request(wrong_length as f32, width as f32);
        prop_assert!(engine.receive(server.port().get(), request));

        let outcome = server
            .persist_if_matched(std::path::Path::new("/nonexistent/pacts"), true)
            .unwrap();
        let VerificationOutcome::Mismatched(mismatches) = outcome else {
            return Err(TestCaseError::fail("unmatched traffic must not be persisted"));
        };
        prop_assert!(mismatches.mentions("value"));
        prop_assert_eq!(engine.write_count(), 0);
    }

    /// **Property 4: Release Exactly Once**
    /// *For any* mix of explicit stops and drops, the mock server and its
    /// plugins SHALL be released exactly once, after which the port is no
    /// longer served.
    #[test]
    fn prop_mock_server_released_once(stop_explicitly in any::<bool>()) {
        let engine = MockEngine::new();
        let handles = new_pact(&engine, "amit-consumer", "amit-provider", "area", Default::default()).unwrap();
        let server = MockServer::start(&engine, handles.pact, &MockServerConfig::default()).unwrap();
        let port = server.port().get();

        if stop_explicitly {
            server.stop();
        } else {
            drop(server);
        }

        prop_assert_eq!(engine.cleanup_count(), 1);
        prop_assert_eq!(engine.plugin_cleanup_count(), 1);
        prop_assert!(!engine.is_running(port));
        prop_assert!(!engine.receive(port, rectangle_request(3.0, 4.0)));
    }

    /// **Property 5: Log Filtering**
    /// *For any* level, a message SHALL reach the engine unless the level is
    /// `off`, and carry the level's name.
    #[test]
    fn prop_log_message_honours_off(level in log_level_strategy()) {
        let engine = MockEngine::new();
        log_message(&engine, "pact-bridge", level, "hello").unwrap();

        let logged: Vec<EngineCall> = engine.calls();
        if level == LogLevel::Off {
            prop_assert!(logged.is_empty());
        } else {
            prop_assert_eq!(logged, vec![EngineCall::LogMessage {
                source: "pact-bridge".to_string(),
                level: level.as_str().to_string(),
                message: "hello".to_string(),
            }]);
        }
    }
}
