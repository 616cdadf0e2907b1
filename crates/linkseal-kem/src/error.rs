//! KEM capability error types.

use std::time::Duration;

use thiserror::Error;

/// Errors from invoking the external KEM capability.
#[derive(Debug, Error)]
pub enum KemError {
    /// The KEM tool could not be started.
    #[error("failed to execute KEM tool '{tool}': {source}")]
    Spawn {
        /// Configured tool path.
        tool: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The KEM tool did not finish within the configured timeout.
    #[error("KEM operation '{operation}' timed out after {elapsed:?}")]
    Timeout {
        /// The subcommand that hung.
        operation: &'static str,
        /// How long we waited.
        elapsed: Duration,
    },

    /// The KEM tool exited with a non-success status.
    ///
    /// Any non-success result from the capability is a hard failure; there
    /// is no partial-success path.
    #[error("KEM operation '{operation}' failed ({status}): {stderr}")]
    ToolFailed {
        /// The subcommand that failed.
        operation: &'static str,
        /// Exit status description.
        status: String,
        /// Captured diagnostic output.
        stderr: String,
    },

    /// The tool's reported shared secret could not be decoded.
    #[error("KEM tool produced an undecodable shared secret: {detail}")]
    BadSecret {
        /// What was wrong with the output.
        detail: String,
    },

    /// File hand-off with the tool or keystore failed.
    #[error("key material i/o failed at '{path}': {source}")]
    Io {
        /// The path involved.
        path: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },
}
