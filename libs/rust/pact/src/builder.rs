//! Pact interaction builder.

use crate::contract::ContractDescription;
use crate::engine::PactEngine;
use crate::error::{PactError, contents_status_reason, plugin_status_reason};
use crate::handles::PactInteraction;
use crate::specification::{InteractionPart, SpecificationVersion};
use tracing::{debug, info, warn};

/// Content type interaction contents are attached under for gRPC.
pub const GRPC_CONTENT_TYPE: &str = "application/grpc";

/// Metadata namespace recorded in every pact for provenance.
pub const METADATA_NAMESPACE: &str = "pact-rust-bridge";

/// A plugin to load into a pact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginSpec {
    /// Plugin name
    pub name: String,
    /// Pinned version
    pub version: String,
}

impl PluginSpec {
    /// Name of the protobuf plugin.
    pub const PROTOBUF: &'static str = "protobuf";
    /// Protobuf plugin version pinned by default.
    pub const PROTOBUF_VERSION: &'static str = "0.3.4";

    /// The protobuf plugin at `version`.
    #[must_use]
    pub fn protobuf(version: impl Into<String>) -> Self {
        Self {
            name: Self::PROTOBUF.to_string(),
            version: version.into(),
        }
    }
}

impl Default for PluginSpec {
    fn default() -> Self {
        Self::protobuf(Self::PROTOBUF_VERSION)
    }
}

fn require_non_empty(field: &'static str, value: &str) -> Result<(), PactError> {
    if value.trim().is_empty() {
        return Err(PactError::invalid_input(field, "must not be empty"));
    }
    Ok(())
}

/// Create a pact between `consumer` and `provider` with one synchronous
/// message interaction, pinned to `specification`.
///
/// The pact is tagged with [`METADATA_NAMESPACE`] and the engine version.
///
/// # Errors
///
/// Returns [`PactError::InvalidInput`] if a name or the description is empty
/// or cannot be encoded.
pub fn new_pact<E>(
    engine: &E,
    consumer: &str,
    provider: &str,
    description: &str,
    specification: SpecificationVersion,
) -> Result<PactInteraction, PactError>
where
    E: PactEngine + ?Sized,
{
    require_non_empty("consumer", consumer)?;
    require_non_empty("provider", provider)?;
    require_non_empty("description", description)?;

    let pact = engine.new_pact(consumer, provider)?;
    if !engine.with_pact_metadata(pact, METADATA_NAMESPACE, "ffi", &engine.version())? {
        warn!(%pact, "engine refused pact metadata");
    }
    let interaction = engine.new_sync_message_interaction(pact, description)?;
    if !engine.with_specification(pact, specification) {
        warn!(%pact, %specification, "engine refused specification version");
    }

    info!(%pact, %interaction, consumer, provider, %specification, "pact created");
    Ok(PactInteraction { pact, interaction })
}

/// Load `plugin` into the pact and attach `contract` as the interaction's
/// gRPC contents.
///
/// If the contract cannot be attached, the plugin is released again before
/// the error is returned.
///
/// # Errors
///
/// Returns [`PactError::Plugin`] if the plugin cannot be loaded and
/// [`PactError::Content`] if the engine rejects the contract.
pub fn use_protobuf<E>(
    engine: &E,
    contract: &ContractDescription,
    handles: PactInteraction,
    plugin: &PluginSpec,
) -> Result<(), PactError>
where
    E: PactEngine + ?Sized,
{
    let status = engine.using_plugin(handles.pact, &plugin.name, &plugin.version)?;
    if status != 0 {
        return Err(PactError::Plugin {
            name: plugin.name.clone(),
            version: plugin.version.clone(),
            status,
            reason: plugin_status_reason(status),
        });
    }
    debug!(pact = %handles.pact, plugin = %plugin.name, version = %plugin.version, "plugin loaded");

    if let Err(e) = attach_contents(engine, contract, handles) {
        warn!(pact = %handles.pact, error = %e, "releasing plugins after failed attach");
        engine.cleanup_plugins(handles.pact);
        return Err(e);
    }

    info!(
        interaction = %handles.interaction,
        service = %contract.proto_service,
        "protobuf contract attached"
    );
    Ok(())
}

fn attach_contents<E>(engine: &E, contract: &ContractDescription, handles: PactInteraction) -> Result<(), PactError>
where
    E: PactEngine + ?Sized,
{
    let contents = contract.to_wire()?;
    let status = engine.interaction_contents(
        handles.interaction,
        InteractionPart::Request,
        GRPC_CONTENT_TYPE,
        &contents,
    )?;
    if status != 0 {
        return Err(PactError::Content {
            content_type: GRPC_CONTENT_TYPE.to_string(),
            status,
            reason: contents_status_reason(status),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plugin_is_pinned_protobuf() {
        let plugin = PluginSpec::default();
        assert_eq!(plugin.name, "protobuf");
        assert_eq!(plugin.version, "0.3.4");
    }

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty("consumer", "amit-consumer").is_ok());
        assert!(require_non_empty("consumer", "").is_err());
        assert!(require_non_empty("consumer", "   ").is_err());
    }

    #[test]
    fn test_metadata_namespace_is_fixed() {
        assert_eq!(METADATA_NAMESPACE, "pact-rust-bridge");
    }
}
