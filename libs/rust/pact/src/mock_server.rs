//! Mock server controller.
//!
//! [`MockServer`] owns one running mock server. Dropping it, or calling
//! [`MockServer::stop`], shuts the server down and then the plugins loaded for
//! its pact, exactly once.

use crate::engine::PactEngine;
use crate::error::{PactError, start_status_reason};
use crate::handles::{MockServerPort, PactHandle};
use std::fmt;
use tracing::{info, warn};

/// Where and how to start a mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockServerConfig {
    /// Address to bind to
    pub bind_address: String,
    /// Port to bind to; 0 lets the engine pick one
    pub port: u16,
    /// Transport name (`grpc`, `http`, ...)
    pub transport: String,
    /// Transport specific JSON configuration
    pub transport_config: Option<String>,
}

impl Default for MockServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 0,
            transport: "grpc".to_string(),
            transport_config: None,
        }
    }
}

impl MockServerConfig {
    /// Bind to `address`.
    #[must_use]
    pub fn with_bind_address(mut self, address: impl Into<String>) -> Self {
        self.bind_address = address.into();
        self
    }

    /// Bind to `port` instead of an ephemeral one.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Serve `transport`.
    #[must_use]
    pub fn with_transport(mut self, transport: impl Into<String>) -> Self {
        self.transport = transport.into();
        self
    }

    /// Pass transport specific configuration.
    #[must_use]
    pub fn with_transport_config(mut self, config: impl Into<String>) -> Self {
        self.transport_config = Some(config.into());
        self
    }
}

/// A running mock server bound to one pact.
pub struct MockServer<'e, E: PactEngine + ?Sized> {
    pub(crate) engine: &'e E,
    pact: PactHandle,
    port: MockServerPort,
    host: String,
    stopped: bool,
}

impl<'e, E: PactEngine + ?Sized> MockServer<'e, E> {
    /// Start a mock server for `pact`.
    ///
    /// If the engine cannot start the server, the plugins already loaded for
    /// the pact are released before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`PactError::StartServer`] if the engine does not hand back a
    /// usable port, or [`PactError::InvalidInput`] if the configuration
    /// cannot be passed to the engine.
    pub fn start(engine: &'e E, pact: PactHandle, config: &MockServerConfig) -> Result<Self, PactError> {
        let result = match engine.create_mock_server_for_transport(
            pact,
            &config.bind_address,
            config.port,
            &config.transport,
            config.transport_config.as_deref(),
        ) {
            Ok(result) => result,
            Err(e) => {
                engine.cleanup_plugins(pact);
                return Err(e);
            }
        };

        let Some(port) = MockServerPort::from_engine(result) else {
            engine.cleanup_plugins(pact);
            return Err(PactError::StartServer {
                address: config.bind_address.clone(),
                transport: config.transport.clone(),
                status: result,
                reason: start_status_reason(result),
            });
        };

        info!(%pact, %port, transport = %config.transport, "mock server started");
        Ok(Self {
            engine,
            pact,
            port,
            host: client_host(&config.bind_address),
            stopped: false,
        })
    }

    /// Port the server is bound to.
    #[must_use]
    pub const fn port(&self) -> MockServerPort {
        self.port
    }

    /// Pact the server serves.
    #[must_use]
    pub const fn pact(&self) -> PactHandle {
        self.pact
    }

    /// `host:port` a client should connect to.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Shut the server down, then the pact's plugins.
    pub fn stop(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;

        if !self.engine.cleanup_mock_server(self.port.as_engine()) {
            warn!(port = %self.port, "engine found no mock server to clean up");
        }
        self.engine.cleanup_plugins(self.pact);
        info!(pact = %self.pact, port = %self.port, "mock server stopped");
    }
}

impl<E: PactEngine + ?Sized> Drop for MockServer<'_, E> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<E: PactEngine + ?Sized> fmt::Debug for MockServer<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockServer")
            .field("pact", &self.pact)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("stopped", &self.stopped)
            .finish_non_exhaustive()
    }
}

/// Host a client on this machine uses to reach a server bound to `bind`.
fn client_host(bind: &str) -> String {
    match bind {
        "0.0.0.0" | "" => "127.0.0.1".to_string(),
        "::" | "[::]" => "[::1]".to_string(),
        host if host.contains(':') && !host.starts_with('[') => format!("[{host}]"),
        host => host.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MockServerConfig::default();
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.port, 0);
        assert_eq!(config.transport, "grpc");
        assert!(config.transport_config.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = MockServerConfig::default()
            .with_bind_address("127.0.0.1")
            .with_port(50051)
            .with_transport("http")
            .with_transport_config("{}");
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.port, 50051);
        assert_eq!(config.transport, "http");
        assert_eq!(config.transport_config.as_deref(), Some("{}"));
    }

    #[test]
    fn test_client_host() {
        assert_eq!(client_host("0.0.0.0"), "127.0.0.1");
        assert_eq!(client_host("::"), "[::1]");
        assert_eq!(client_host("::1"), "[::1]");
        assert_eq!(client_host("localhost"), "localhost");
    }
}
