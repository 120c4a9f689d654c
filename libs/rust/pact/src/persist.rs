//! Pact persister.

use crate::engine::PactEngine;
use crate::error::{PactError, write_status_reason};
use crate::mock_server::MockServer;
use crate::verification::Mismatches;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What verification led to.
#[derive(Debug, Clone, PartialEq)]
pub enum VerificationOutcome {
    /// All traffic matched and the pact file was written.
    PactWritten {
        /// Directory the pact file went to
        directory: PathBuf,
    },
    /// Traffic diverged from the contract; nothing was written.
    Mismatched(Mismatches),
}

impl VerificationOutcome {
    /// Whether the contract was honoured.
    #[must_use]
    pub const fn is_matched(&self) -> bool {
        matches!(self, Self::PactWritten { .. })
    }
}

impl<E: PactEngine + ?Sized> MockServer<'_, E> {
    /// Write the pact served by this mock server under `directory`.
    ///
    /// The engine does not check that traffic matched; use
    /// [`MockServer::persist_if_matched`] for that.
    ///
    /// # Errors
    ///
    /// Returns [`PactError::Write`] if the engine reports a failure and
    /// [`PactError::InvalidInput`] if `directory` is not valid UTF-8.
    pub fn write_pact_file(&self, directory: &Path, overwrite: bool) -> Result<(), PactError> {
        let dir = directory
            .to_str()
            .ok_or_else(|| PactError::invalid_input("output directory", "path is not valid UTF-8"))?;
        let status = self
            .engine
            .write_pact_file(self.port().as_engine(), dir, overwrite)?;
        if status != 0 {
            return Err(PactError::Write {
                directory: directory.to_path_buf(),
                status,
                reason: write_status_reason(status),
            });
        }
        info!(directory = %directory.display(), overwrite, "pact file written");
        Ok(())
    }

    /// Write the pact only if all traffic matched, otherwise report the
    /// mismatches and leave `directory` untouched.
    ///
    /// # Errors
    ///
    /// Returns [`PactError::Write`] if the traffic matched but the file could
    /// not be written.
    pub fn persist_if_matched(&self, directory: &Path, overwrite: bool) -> Result<VerificationOutcome, PactError> {
        if !self.is_matched() {
            let mismatches = self.mismatches();
            warn!(port = %self.port(), records = mismatches.records().len(), "mock server did not match");
            return Ok(VerificationOutcome::Mismatched(mismatches));
        }

        self.write_pact_file(directory, overwrite)?;
        Ok(VerificationOutcome::PactWritten {
            directory: directory.to_path_buf(),
        })
    }
}
