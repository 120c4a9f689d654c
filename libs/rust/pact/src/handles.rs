//! Opaque handles into engine-owned state.

use std::fmt;

/// Handle to one consumer/provider pact assembled inside the engine.
///
/// Only an engine implementation creates these; everything else passes them
/// back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct PactHandle(u16);

impl PactHandle {
    /// Wrap a raw handle returned by the engine.
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Raw value to hand back to the engine.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl fmt::Display for PactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pact#{}", self.0)
    }
}

/// Handle to one interaction attached to a pact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct InteractionHandle(u32);

impl InteractionHandle {
    /// Wrap a raw handle returned by the engine.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw value to hand back to the engine.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for InteractionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "interaction#{}", self.0)
    }
}

/// A pact together with the interaction being configured on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PactInteraction {
    /// Pact the interaction belongs to
    pub pact: PactHandle,
    /// The interaction itself
    pub interaction: InteractionHandle,
}

/// Port a running mock server is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MockServerPort(u16);

impl MockServerPort {
    /// Interpret the result of `pactffi_create_mock_server_for_transport`.
    ///
    /// Zero, negative and out-of-range values are not ports.
    #[must_use]
    pub fn from_engine(result: i32) -> Option<Self> {
        u16::try_from(result).ok().filter(|p| *p != 0).map(Self)
    }

    /// The port number.
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }

    /// The port in the signed form the engine's mock server calls take.
    #[must_use]
    pub fn as_engine(self) -> i32 {
        i32::from(self.0)
    }
}

impl fmt::Display for MockServerPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_from_engine_result() {
        assert_eq!(MockServerPort::from_engine(50_123).map(MockServerPort::get), Some(50_123));
        assert!(MockServerPort::from_engine(0).is_none());
        assert!(MockServerPort::from_engine(-3).is_none());
        assert!(MockServerPort::from_engine(70_000).is_none());
    }

    #[test]
    fn test_handles_display() {
        assert_eq!(PactHandle::from_raw(3).to_string(), "pact#3");
        assert_eq!(InteractionHandle::from_raw(7).to_string(), "interaction#7");
        assert_eq!(MockServerPort::from_engine(8080).map(|p| p.as_engine()), Some(8080));
    }
}
