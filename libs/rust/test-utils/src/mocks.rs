//! Mock implementations for testing.
//!
//! [`MockEngine`] implements [`PactEngine`] in memory. It hands out handles
//! and ports, records every call, serves "traffic" pushed through
//! [`MockEngine::receive`], and writes a small JSON pact file on request.
//! Statuses of the fallible calls are configurable to drive error paths.

use pact_bridge::{
    InteractionHandle, InteractionPart, LogLevel, PactEngine, PactError, PactHandle,
    SpecificationVersion,
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// First port handed out by the mock engine.
pub const FIRST_PORT: u16 = 41_000;

/// One call made against the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    /// `pactffi_version`
    Version,
    /// `pactffi_logger_init`
    LoggerInit,
    /// `pactffi_logger_attach_sink`
    LoggerAttachSink {
        /// Sink specifier
        sink: String,
        /// Filter level
        level: LogLevel,
    },
    /// `pactffi_logger_apply`
    LoggerApply,
    /// `pactffi_log_message`
    LogMessage {
        /// Source
        source: String,
        /// Level name
        level: String,
        /// Message
        message: String,
    },
    /// `pactffi_new_pact`
    NewPact {
        /// Consumer
        consumer: String,
        /// Provider
        provider: String,
    },
    /// `pactffi_with_pact_metadata`
    WithPactMetadata {
        /// Pact
        pact: PactHandle,
        /// Namespace
        namespace: String,
        /// Name
        name: String,
        /// Value
        value: String,
    },
    /// `pactffi_new_sync_message_interaction`
    NewSyncMessageInteraction {
        /// Pact
        pact: PactHandle,
        /// Description
        description: String,
    },
    /// `pactffi_with_specification`
    WithSpecification {
        /// Pact
        pact: PactHandle,
        /// Version
        version: SpecificationVersion,
    },
    /// `pactffi_using_plugin`
    UsingPlugin {
        /// Pact
        pact: PactHandle,
        /// Plugin name
        name: String,
        /// Plugin version
        version: String,
    },
    /// `pactffi_interaction_contents`
    InteractionContents {
        /// Interaction
        interaction: InteractionHandle,
        /// Part
        part: InteractionPart,
        /// Content type
        content_type: String,
        /// Contents
        contents: String,
    },
    /// `pactffi_create_mock_server_for_transport`
    CreateMockServer {
        /// Pact
        pact: PactHandle,
        /// Bind address
        address: String,
        /// Requested port
        port: u16,
        /// Transport
        transport: String,
    },
    /// `pactffi_mock_server_matched`
    MockServerMatched {
        /// Port
        port: i32,
    },
    /// `pactffi_mock_server_mismatches`
    MockServerMismatches {
        /// Port
        port: i32,
    },
    /// `pactffi_write_pact_file`
    WritePactFile {
        /// Port
        port: i32,
        /// Directory
        directory: String,
        /// Overwrite flag
        overwrite: bool,
    },
    /// `pactffi_cleanup_mock_server`
    CleanupMockServer {
        /// Port
        port: i32,
    },
    /// `pactffi_cleanup_plugins`
    CleanupPlugins {
        /// Pact
        pact: PactHandle,
    },
}

/// A pact as assembled in the mock engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MockPact {
    /// Consumer
    pub consumer: String,
    /// Provider
    pub provider: String,
    /// Metadata entries `(namespace, name, value)`
    pub metadata: Vec<(String, String, String)>,
    /// Specification version
    pub specification: Option<SpecificationVersion>,
    /// Loaded plugins `(name, version)`
    pub plugins: Vec<(String, String)>,
    /// Interactions `(description, contents)`
    pub interactions: Vec<(String, Option<String>)>,
}

#[derive(Debug, Clone)]
struct Behaviour {
    version: String,
    attach_sink_status: i32,
    apply_status: i32,
    plugin_status: u32,
    contents_status: u32,
    start_result: Option<i32>,
    write_status: i32,
    mismatches: Option<Value>,
}

impl Default for Behaviour {
    fn default() -> Self {
        Self {
            version: "0.4.22".to_string(),
            attach_sink_status: 0,
            apply_status: 0,
            plugin_status: 0,
            contents_status: 0,
            start_result: None,
            write_status: 0,
            mismatches: None,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<EngineCall>,
    pacts: Vec<MockPact>,
    interactions: Vec<usize>,
    servers: HashMap<i32, usize>,
    traffic: HashMap<i32, Vec<Value>>,
    next_port: u16,
}

/// In-memory stand-in for the native engine.
#[derive(Debug, Default)]
pub struct MockEngine {
    behaviour: Behaviour,
    state: Mutex<State>,
}

impl MockEngine {
    /// An engine on which every call succeeds and all traffic matches.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `version` from `pactffi_version`.
    #[must_use]
    pub fn with_version(mut self, version: &str) -> Self {
        self.behaviour.version = version.to_string();
        self
    }

    /// Return `status` from `pactffi_logger_attach_sink`.
    #[must_use]
    pub const fn with_attach_sink_status(mut self, status: i32) -> Self {
        self.behaviour.attach_sink_status = status;
        self
    }

    /// Return `status` from `pactffi_logger_apply`.
    #[must_use]
    pub const fn with_apply_status(mut self, status: i32) -> Self {
        self.behaviour.apply_status = status;
        self
    }

    /// Return `status` from `pactffi_using_plugin`.
    #[must_use]
    pub const fn with_plugin_status(mut self, status: u32) -> Self {
        self.behaviour.plugin_status = status;
        self
    }

    /// Return `status` from `pactffi_interaction_contents`.
    #[must_use]
    pub const fn with_contents_status(mut self, status: u32) -> Self {
        self.behaviour.contents_status = status;
        self
    }

    /// Return `result` from `pactffi_create_mock_server_for_transport`
    /// instead of a fresh port.
    #[must_use]
    pub const fn with_start_result(mut self, result: i32) -> Self {
        self.behaviour.start_result = Some(result);
        self
    }

    /// Return `status` from `pactffi_write_pact_file` without writing.
    #[must_use]
    pub const fn with_write_status(mut self, status: i32) -> Self {
        self.behaviour.write_status = status;
        self
    }

    /// Treat all received traffic as diverging, reporting `report`.
    #[must_use]
    pub fn with_mismatches(mut self, report: Value) -> Self {
        self.behaviour.mismatches = Some(report);
        self
    }

    /// Deliver a request to the mock server on `port`.
    ///
    /// Returns `false` if no server is running there.
    pub fn receive(&self, port: u16, request: Value) -> bool {
        let mut state = self.state.lock();
        let port = i32::from(port);
        if !state.servers.contains_key(&port) {
            return false;
        }
        state.traffic.entry(port).or_default().push(request);
        true
    }

    /// Every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<EngineCall> {
        self.state.lock().calls.clone()
    }

    /// Number of calls satisfying `pred`.
    pub fn count(&self, pred: impl Fn(&EngineCall) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| pred(c)).count()
    }

    /// Number of `pactffi_cleanup_mock_server` calls.
    #[must_use]
    pub fn cleanup_count(&self) -> usize {
        self.count(|c| matches!(c, EngineCall::CleanupMockServer { .. }))
    }

    /// Number of `pactffi_cleanup_plugins` calls.
    #[must_use]
    pub fn plugin_cleanup_count(&self) -> usize {
        self.count(|c| matches!(c, EngineCall::CleanupPlugins { .. }))
    }

    /// Number of `pactffi_write_pact_file` calls.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.count(|c| matches!(c, EngineCall::WritePactFile { .. }))
    }

    /// Whether a mock server is running on `port`.
    #[must_use]
    pub fn is_running(&self, port: u16) -> bool {
        self.state.lock().servers.contains_key(&i32::from(port))
    }

    /// Number of running mock servers.
    #[must_use]
    pub fn running_servers(&self) -> usize {
        self.state.lock().servers.len()
    }

    /// The pact behind `handle`.
    #[must_use]
    pub fn pact(&self, handle: PactHandle) -> Option<MockPact> {
        let index = usize::from(handle.raw()).checked_sub(1)?;
        self.state.lock().pacts.get(index).cloned()
    }

    fn record(&self, call: EngineCall) {
        self.state.lock().calls.push(call);
    }
}

fn pact_index(state: &State, pact: PactHandle) -> Option<usize> {
    let index = usize::from(pact.raw()).checked_sub(1)?;
    (index < state.pacts.len()).then_some(index)
}

fn pact_file_name(pact: &MockPact) -> String {
    format!("{}-{}.json", pact.consumer, pact.provider)
}

fn pact_document(pact: &MockPact) -> Value {
    let interactions: Vec<Value> = pact
        .interactions
        .iter()
        .map(|(description, contents)| {
            let contents = contents
                .as_deref()
                .and_then(|c| serde_json::from_str::<Value>(c).ok())
                .unwrap_or(Value::Null);
            json!({
                "type": "Synchronous/Messages",
                "description": description,
                "contents": contents,
            })
        })
        .collect();
    json!({
        "consumer": { "name": pact.consumer },
        "provider": { "name": pact.provider },
        "interactions": interactions,
        "metadata": {
            "pactSpecification": {
                "version": pact.specification.unwrap_or_default().as_str()
            }
        }
    })
}

fn write_document(directory: &Path, pact: &MockPact, overwrite: bool) -> std::io::Result<()> {
    fs::create_dir_all(directory)?;
    let path: PathBuf = directory.join(pact_file_name(pact));
    if path.exists() && !overwrite {
        return Ok(());
    }
    let body = serde_json::to_string_pretty(&pact_document(pact)).map_err(std::io::Error::other)?;
    fs::write(path, body)
}

impl PactEngine for MockEngine {
    fn version(&self) -> String {
        self.record(EngineCall::Version);
        self.behaviour.version.clone()
    }

    fn logger_init(&self) {
        self.record(EngineCall::LoggerInit);
    }

    fn logger_attach_sink(&self, sink: &str, level: LogLevel) -> Result<i32, PactError> {
        self.record(EngineCall::LoggerAttachSink {
            sink: sink.to_string(),
            level,
        });
        Ok(self.behaviour.attach_sink_status)
    }

    fn logger_apply(&self) -> i32 {
        self.record(EngineCall::LoggerApply);
        self.behaviour.apply_status
    }

    fn log_message(&self, source: &str, level: &str, message: &str) -> Result<(), PactError> {
        self.record(EngineCall::LogMessage {
            source: source.to_string(),
            level: level.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }

    fn new_pact(&self, consumer: &str, provider: &str) -> Result<PactHandle, PactError> {
        let mut state = self.state.lock();
        state.calls.push(EngineCall::NewPact {
            consumer: consumer.to_string(),
            provider: provider.to_string(),
        });
        state.pacts.push(MockPact {
            consumer: consumer.to_string(),
            provider: provider.to_string(),
            ..MockPact::default()
        });
        let raw = u16::try_from(state.pacts.len())
            .map_err(|_| PactError::invalid_input("consumer", "too many pacts"))?;
        Ok(PactHandle::from_raw(raw))
    }

    fn with_pact_metadata(
        &self,
        pact: PactHandle,
        namespace: &str,
        name: &str,
        value: &str,
    ) -> Result<bool, PactError> {
        let mut state = self.state.lock();
        state.calls.push(EngineCall::WithPactMetadata {
            pact,
            namespace: namespace.to_string(),
            name: name.to_string(),
            value: value.to_string(),
        });
        let Some(index) = pact_index(&state, pact) else {
            return Ok(false);
        };
        state.pacts[index]
            .metadata
            .push((namespace.to_string(), name.to_string(), value.to_string()));
        Ok(true)
    }

    fn new_sync_message_interaction(
        &self,
        pact: PactHandle,
        description: &str,
    ) -> Result<InteractionHandle, PactError> {
        let mut state = self.state.lock();
        state.calls.push(EngineCall::NewSyncMessageInteraction {
            pact,
            description: description.to_string(),
        });
        let Some(index) = pact_index(&state, pact) else {
            return Ok(InteractionHandle::from_raw(0));
        };
        state.pacts[index].interactions.push((description.to_string(), None));
        state.interactions.push(index);
        let raw = u32::try_from(state.interactions.len())
            .map_err(|_| PactError::invalid_input("description", "too many interactions"))?;
        Ok(InteractionHandle::from_raw(raw))
    }

    fn with_specification(&self, pact: PactHandle, version: SpecificationVersion) -> bool {
        let mut state = self.state.lock();
        state.calls.push(EngineCall::WithSpecification { pact, version });
        let Some(index) = pact_index(&state, pact) else {
            return false;
        };
        state.pacts[index].specification = Some(version);
        true
    }

    fn using_plugin(&self, pact: PactHandle, name: &str, version: &str) -> Result<u32, PactError> {
        let mut state = self.state.lock();
        state.calls.push(EngineCall::UsingPlugin {
            pact,
            name: name.to_string(),
            version: version.to_string(),
        });
        if self.behaviour.plugin_status != 0 {
            return Ok(self.behaviour.plugin_status);
        }
        let Some(index) = pact_index(&state, pact) else {
            return Ok(3);
        };
        state.pacts[index].plugins.push((name.to_string(), version.to_string()));
        Ok(0)
    }

    fn interaction_contents(
        &self,
        interaction: InteractionHandle,
        part: InteractionPart,
        content_type: &str,
        contents: &str,
    ) -> Result<u32, PactError> {
        let mut state = self.state.lock();
        state.calls.push(EngineCall::InteractionContents {
            interaction,
            part,
            content_type: content_type.to_string(),
            contents: contents.to_string(),
        });
        if self.behaviour.contents_status != 0 {
            return Ok(self.behaviour.contents_status);
        }
        if serde_json::from_str::<Value>(contents).is_err() {
            return Ok(5);
        }
        let Some(slot) = usize::try_from(interaction.raw())
            .ok()
            .and_then(|raw| raw.checked_sub(1))
        else {
            return Ok(3);
        };
        let Some(&owner) = state.interactions.get(slot) else {
            return Ok(3);
        };
        let position = state.interactions[..slot]
            .iter()
            .filter(|&&p| p == owner)
            .count();
        state.pacts[owner].interactions[position].1 = Some(contents.to_string());
        Ok(0)
    }

    fn create_mock_server_for_transport(
        &self,
        pact: PactHandle,
        address: &str,
        port: u16,
        transport: &str,
        _transport_config: Option<&str>,
    ) -> Result<i32, PactError> {
        let mut state = self.state.lock();
        state.calls.push(EngineCall::CreateMockServer {
            pact,
            address: address.to_string(),
            port,
            transport: transport.to_string(),
        });
        if address.contains('\0') {
            return Err(PactError::invalid_input("bind address", "contains a NUL byte"));
        }
        if let Some(result) = self.behaviour.start_result {
            return Ok(result);
        }
        let Some(index) = pact_index(&state, pact) else {
            return Ok(-1);
        };
        let assigned = if port == 0 {
            let next = FIRST_PORT + state.next_port;
            state.next_port += 1;
            next
        } else {
            port
        };
        let assigned = i32::from(assigned);
        if state.servers.contains_key(&assigned) {
            return Ok(-3);
        }
        state.servers.insert(assigned, index);
        Ok(assigned)
    }

    fn mock_server_matched(&self, port: i32) -> bool {
        let mut state = self.state.lock();
        state.calls.push(EngineCall::MockServerMatched { port });
        if !state.servers.contains_key(&port) || self.behaviour.mismatches.is_some() {
            return false;
        }
        state.traffic.get(&port).is_some_and(|t| !t.is_empty())
    }

    fn mock_server_mismatches(&self, port: i32) -> Option<String> {
        let mut state = self.state.lock();
        state.calls.push(EngineCall::MockServerMismatches { port });
        let received = state.traffic.get(&port).is_some_and(|t| !t.is_empty());
        if !state.servers.contains_key(&port) || !received {
            return None;
        }
        self.behaviour.mismatches.as_ref().map(Value::to_string)
    }

    fn write_pact_file(&self, port: i32, directory: &str, overwrite: bool) -> Result<i32, PactError> {
        let mut state = self.state.lock();
        state.calls.push(EngineCall::WritePactFile {
            port,
            directory: directory.to_string(),
            overwrite,
        });
        if self.behaviour.write_status != 0 {
            return Ok(self.behaviour.write_status);
        }
        let Some(&index) = state.servers.get(&port) else {
            return Ok(3);
        };
        match write_document(Path::new(directory), &state.pacts[index], overwrite) {
            Ok(()) => Ok(0),
            Err(_) => Ok(2),
        }
    }

    fn cleanup_mock_server(&self, port: i32) -> bool {
        let mut state = self.state.lock();
        state.calls.push(EngineCall::CleanupMockServer { port });
        state.traffic.remove(&port);
        state.servers.remove(&port).is_some()
    }

    fn cleanup_plugins(&self, pact: PactHandle) {
        let mut state = self.state.lock();
        state.calls.push(EngineCall::CleanupPlugins { pact });
        if let Some(index) = pact_index(&state, pact) {
            state.pacts[index].plugins.clear();
        }
    }
}
