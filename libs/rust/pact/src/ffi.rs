//! Native library handle.
//!
//! Loads the `pact_ffi` shared library, resolves the function table once and
//! exposes it through [`PactEngine`]. Nothing else in the crate touches raw
//! pointers.

#![allow(unsafe_code)]

use crate::engine::PactEngine;
use crate::error::PactError;
use crate::handles::{InteractionHandle, PactHandle};
use crate::logging::LogLevel;
use crate::specification::{InteractionPart, SpecificationVersion};
use libloading::Library;
use once_cell::sync::OnceCell;
use std::ffi::{CStr, CString, OsString, c_char, c_int, c_uint};
use std::path::{Path, PathBuf};
use std::ptr;
use tracing::{debug, info};

type VersionFn = unsafe extern "C" fn() -> *const c_char;
type LoggerInitFn = unsafe extern "C" fn();
type LoggerAttachSinkFn = unsafe extern "C" fn(*const c_char, c_uint) -> c_int;
type LoggerApplyFn = unsafe extern "C" fn() -> c_int;
type LogMessageFn = unsafe extern "C" fn(*const c_char, *const c_char, *const c_char);
type NewPactFn = unsafe extern "C" fn(*const c_char, *const c_char) -> u16;
type WithPactMetadataFn =
    unsafe extern "C" fn(u16, *const c_char, *const c_char, *const c_char) -> bool;
type NewSyncMessageInteractionFn = unsafe extern "C" fn(u16, *const c_char) -> u32;
type WithSpecificationFn = unsafe extern "C" fn(u16, c_uint) -> bool;
type UsingPluginFn = unsafe extern "C" fn(u16, *const c_char, *const c_char) -> c_uint;
type InteractionContentsFn =
    unsafe extern "C" fn(u32, c_uint, *const c_char, *const c_char) -> c_uint;
type CreateMockServerForTransportFn =
    unsafe extern "C" fn(u16, *const c_char, u16, *const c_char, *const c_char) -> i32;
type MockServerMatchedFn = unsafe extern "C" fn(i32) -> bool;
type MockServerMismatchesFn = unsafe extern "C" fn(i32) -> *mut c_char;
type WritePactFileFn = unsafe extern "C" fn(i32, *const c_char, bool) -> i32;
type CleanupMockServerFn = unsafe extern "C" fn(i32) -> bool;
type CleanupPluginsFn = unsafe extern "C" fn(u16);

/// Resolved function pointers. Valid for as long as the owning [`Library`].
struct FunctionTable {
    version: VersionFn,
    logger_init: LoggerInitFn,
    logger_attach_sink: LoggerAttachSinkFn,
    logger_apply: LoggerApplyFn,
    log_message: LogMessageFn,
    new_pact: NewPactFn,
    with_pact_metadata: WithPactMetadataFn,
    new_sync_message_interaction: NewSyncMessageInteractionFn,
    with_specification: WithSpecificationFn,
    using_plugin: UsingPluginFn,
    interaction_contents: InteractionContentsFn,
    create_mock_server_for_transport: CreateMockServerForTransportFn,
    mock_server_matched: MockServerMatchedFn,
    mock_server_mismatches: MockServerMismatchesFn,
    write_pact_file: WritePactFileFn,
    cleanup_mock_server: CleanupMockServerFn,
    cleanup_plugins: CleanupPluginsFn,
}

/// Copy a function pointer out of the library.
///
/// # Safety
///
/// `T` must be the exact function pointer type of `symbol`.
unsafe fn resolve<T: Copy>(library: &Library, path: &Path, symbol: &'static str) -> Result<T, PactError> {
    let name = format!("{symbol}\0");
    // SAFETY: upheld by the caller.
    let sym = unsafe { library.get::<T>(name.as_bytes()) }.map_err(|source| {
        PactError::MissingSymbol {
            path: path.to_path_buf(),
            symbol,
            source,
        }
    })?;
    Ok(*sym)
}

impl FunctionTable {
    fn resolve(library: &Library, path: &Path) -> Result<Self, PactError> {
        // SAFETY: every type alias above matches the declaration in pact.h.
        unsafe {
            Ok(Self {
                version: resolve(library, path, "pactffi_version")?,
                logger_init: resolve(library, path, "pactffi_logger_init")?,
                logger_attach_sink: resolve(library, path, "pactffi_logger_attach_sink")?,
                logger_apply: resolve(library, path, "pactffi_logger_apply")?,
                log_message: resolve(library, path, "pactffi_log_message")?,
                new_pact: resolve(library, path, "pactffi_new_pact")?,
                with_pact_metadata: resolve(library, path, "pactffi_with_pact_metadata")?,
                new_sync_message_interaction: resolve(
                    library,
                    path,
                    "pactffi_new_sync_message_interaction",
                )?,
                with_specification: resolve(library, path, "pactffi_with_specification")?,
                using_plugin: resolve(library, path, "pactffi_using_plugin")?,
                interaction_contents: resolve(library, path, "pactffi_interaction_contents")?,
                create_mock_server_for_transport: resolve(
                    library,
                    path,
                    "pactffi_create_mock_server_for_transport",
                )?,
                mock_server_matched: resolve(library, path, "pactffi_mock_server_matched")?,
                mock_server_mismatches: resolve(library, path, "pactffi_mock_server_mismatches")?,
                write_pact_file: resolve(library, path, "pactffi_write_pact_file")?,
                cleanup_mock_server: resolve(library, path, "pactffi_cleanup_mock_server")?,
                cleanup_plugins: resolve(library, path, "pactffi_cleanup_plugins")?,
            })
        }
    }
}

/// The loaded `pact_ffi` library.
pub struct NativeEngine {
    path: PathBuf,
    fns: FunctionTable,
    // Must stay the last field: unmapped only after `fns` is dropped.
    _library: Library,
}

static GLOBAL: OnceCell<NativeEngine> = OnceCell::new();

impl NativeEngine {
    /// Open the library at `path` and resolve the whole function table.
    ///
    /// # Errors
    ///
    /// Returns [`PactError::Load`] if the library cannot be opened and
    /// [`PactError::MissingSymbol`] if a function is not exported.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PactError> {
        let path = path.as_ref().to_path_buf();
        debug!(path = %path.display(), "loading pact_ffi");

        // SAFETY: loading runs the library's initializers; pact_ffi has none
        // with preconditions.
        let library = unsafe { Library::new(&path) }.map_err(|source| PactError::Load {
            path: path.clone(),
            source,
        })?;
        let fns = FunctionTable::resolve(&library, &path)?;

        let engine = Self {
            path,
            fns,
            _library: library,
        };
        info!(path = %engine.path.display(), version = %engine.version(), "pact_ffi loaded");
        Ok(engine)
    }

    /// Process-wide engine, loaded from `path` on first use.
    ///
    /// Later calls return the already loaded engine whatever path they pass.
    ///
    /// # Errors
    ///
    /// Returns the load error if loading fails. A failed attempt leaves
    /// nothing cached, so the next call tries again.
    pub fn global(path: impl AsRef<Path>) -> Result<&'static Self, PactError> {
        GLOBAL.get_or_try_init(|| Self::load(path))
    }

    /// Platform file name of the library (`libpact_ffi.so`, `pact_ffi.dll`, ...).
    #[must_use]
    pub fn library_filename() -> OsString {
        libloading::library_filename("pact_ffi")
    }

    /// Path the library was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn c_string(field: &'static str, value: &str) -> Result<CString, PactError> {
    CString::new(value).map_err(|e| PactError::invalid_input(field, e.to_string()))
}

/// Copy an engine-owned string. Null yields `None`.
///
/// # Safety
///
/// `ptr` must be null or point at a NUL-terminated string that stays valid
/// for the duration of the call.
unsafe fn owned_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: upheld by the caller.
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

// SAFETY (all calls below): arguments are live `CString`s or plain integers,
// matching the signatures resolved in `FunctionTable::resolve`.
impl PactEngine for NativeEngine {
    fn version(&self) -> String {
        // The version string is static inside the library.
        unsafe { owned_string((self.fns.version)()) }.unwrap_or_default()
    }

    fn logger_init(&self) {
        unsafe { (self.fns.logger_init)() }
    }

    fn logger_attach_sink(&self, sink: &str, level: LogLevel) -> Result<i32, PactError> {
        let sink = c_string("sink", sink)?;
        Ok(unsafe { (self.fns.logger_attach_sink)(sink.as_ptr(), level.native()) })
    }

    fn logger_apply(&self) -> i32 {
        unsafe { (self.fns.logger_apply)() }
    }

    fn log_message(&self, source: &str, level: &str, message: &str) -> Result<(), PactError> {
        let source = c_string("source", source)?;
        let level = c_string("log level", level)?;
        let message = c_string("message", message)?;
        unsafe { (self.fns.log_message)(source.as_ptr(), level.as_ptr(), message.as_ptr()) };
        Ok(())
    }

    fn new_pact(&self, consumer: &str, provider: &str) -> Result<PactHandle, PactError> {
        let consumer = c_string("consumer", consumer)?;
        let provider = c_string("provider", provider)?;
        let raw = unsafe { (self.fns.new_pact)(consumer.as_ptr(), provider.as_ptr()) };
        Ok(PactHandle::from_raw(raw))
    }

    fn with_pact_metadata(
        &self,
        pact: PactHandle,
        namespace: &str,
        name: &str,
        value: &str,
    ) -> Result<bool, PactError> {
        let namespace = c_string("metadata namespace", namespace)?;
        let name = c_string("metadata name", name)?;
        let value = c_string("metadata value", value)?;
        Ok(unsafe {
            (self.fns.with_pact_metadata)(pact.raw(), namespace.as_ptr(), name.as_ptr(), value.as_ptr())
        })
    }

    fn new_sync_message_interaction(
        &self,
        pact: PactHandle,
        description: &str,
    ) -> Result<InteractionHandle, PactError> {
        let description = c_string("description", description)?;
        let raw = unsafe { (self.fns.new_sync_message_interaction)(pact.raw(), description.as_ptr()) };
        Ok(InteractionHandle::from_raw(raw))
    }

    fn with_specification(&self, pact: PactHandle, version: SpecificationVersion) -> bool {
        unsafe { (self.fns.with_specification)(pact.raw(), version.native()) }
    }

    fn using_plugin(&self, pact: PactHandle, name: &str, version: &str) -> Result<u32, PactError> {
        let name = c_string("plugin name", name)?;
        let version = c_string("plugin version", version)?;
        Ok(unsafe { (self.fns.using_plugin)(pact.raw(), name.as_ptr(), version.as_ptr()) })
    }

    fn interaction_contents(
        &self,
        interaction: InteractionHandle,
        part: InteractionPart,
        content_type: &str,
        contents: &str,
    ) -> Result<u32, PactError> {
        let content_type = c_string("content type", content_type)?;
        let contents = c_string("contents", contents)?;
        Ok(unsafe {
            (self.fns.interaction_contents)(
                interaction.raw(),
                part.native(),
                content_type.as_ptr(),
                contents.as_ptr(),
            )
        })
    }

    fn create_mock_server_for_transport(
        &self,
        pact: PactHandle,
        address: &str,
        port: u16,
        transport: &str,
        transport_config: Option<&str>,
    ) -> Result<i32, PactError> {
        let address = c_string("bind address", address)?;
        let transport = c_string("transport", transport)?;
        let transport_config = transport_config
            .map(|config| c_string("transport config", config))
            .transpose()?;
        let config_ptr = transport_config.as_ref().map_or(ptr::null(), |c| c.as_ptr());
        Ok(unsafe {
            (self.fns.create_mock_server_for_transport)(
                pact.raw(),
                address.as_ptr(),
                port,
                transport.as_ptr(),
                config_ptr,
            )
        })
    }

    fn mock_server_matched(&self, port: i32) -> bool {
        unsafe { (self.fns.mock_server_matched)(port) }
    }

    fn mock_server_mismatches(&self, port: i32) -> Option<String> {
        // The string is owned by the mock server and must not be freed here.
        unsafe { owned_string((self.fns.mock_server_mismatches)(port)) }
    }

    fn write_pact_file(&self, port: i32, directory: &str, overwrite: bool) -> Result<i32, PactError> {
        let directory = c_string("output directory", directory)?;
        Ok(unsafe { (self.fns.write_pact_file)(port, directory.as_ptr(), overwrite) })
    }

    fn cleanup_mock_server(&self, port: i32) -> bool {
        unsafe { (self.fns.cleanup_mock_server)(port) }
    }

    fn cleanup_plugins(&self, pact: PactHandle) {
        unsafe { (self.fns.cleanup_plugins)(pact.raw()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_library_is_a_load_error() {
        let err = NativeEngine::load("/nonexistent/libpact_ffi.so")
            .err()
            .expect("loading a missing library must fail");
        assert!(matches!(err, PactError::Load { .. }));
        assert_eq!(err.code(), "PACT_LOAD_ERROR");
        assert!(err.to_string().contains("/nonexistent/libpact_ffi.so"));
    }

    #[test]
    fn test_library_filename_names_pact_ffi() {
        let name = NativeEngine::library_filename();
        assert!(name.to_string_lossy().contains("pact_ffi"));
    }

    #[test]
    fn test_c_string_rejects_interior_nul() {
        let err = c_string("consumer", "amit\0consumer").unwrap_err();
        assert!(matches!(err, PactError::InvalidInput { field: "consumer", .. }));
        assert!(c_string("consumer", "amit-consumer").is_ok());
    }
}
