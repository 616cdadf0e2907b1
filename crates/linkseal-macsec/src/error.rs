//! Provisioning error types.

use std::time::Duration;

use thiserror::Error;

/// Errors from MACsec provisioning.
///
/// The two kernel-configuration classes are deliberately distinct so
/// callers can present "install the missing capability" guidance instead
/// of an opaque failure.
#[derive(Debug, Error)]
pub enum MacsecError {
    /// The platform lacks MACsec support.
    ///
    /// Classified from the tool's diagnostic text: a missing kernel
    /// module or an iproute2 build without the `macsec` subcommand.
    #[error("platform lacks MACsec support ({detail}); {remediation}")]
    PlatformUnsupported {
        /// Diagnostic text that triggered the classification.
        detail: String,
        /// Actionable remediation guidance for the operator.
        remediation: &'static str,
    },

    /// Any other kernel-configuration failure.
    #[error("{action} failed: {detail}")]
    ProvisioningFailed {
        /// The operation that failed (for automation and operators).
        action: String,
        /// The tool's diagnostic text.
        detail: String,
    },

    /// The network configuration tool did not finish in time.
    #[error("'{program}' timed out after {elapsed:?}")]
    ToolTimeout {
        /// The tool that hung.
        program: String,
        /// The configured limit that was exceeded.
        elapsed: Duration,
    },

    /// The network configuration tool could not be started.
    #[error("failed to execute '{program}': {source}")]
    Exec {
        /// The tool path.
        program: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },
}
