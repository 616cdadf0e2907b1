//! Linkseal MACsec provisioner.
//!
//! Turns a derived data-plane key into an active kernel MACsec security
//! association on a named physical interface, by driving the system
//! network configuration tool (`ip` from iproute2):
//!
//! 1. delete any stale virtual interface (tolerant), create a fresh one
//! 2. install the transmit security association
//! 3. optionally install a receive security association for a known peer
//! 4. bring the physical and MACsec interfaces up
//!
//! Re-provisioning is always delete-then-create, never an incremental
//! update, so repeating the sequence is idempotent.
//!
//! Failures are classified before propagation: diagnostics that indicate
//! missing platform capability (no `macsec` kernel module, or an iproute2
//! build without the `macsec` subcommand) become
//! [`MacsecError::PlatformUnsupported`] with remediation guidance; every
//! other failure is [`MacsecError::ProvisioningFailed`]. The classifier is
//! a single translation function so the substring heuristic can later be
//! replaced by a structured capability probe without touching callers.
//!
//! All operations are privileged and mutate live kernel networking state;
//! there is no dry-run and no rollback beyond the tolerant delete.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod provisioner;
mod runner;

pub use error::MacsecError;
pub use provisioner::{MacsecConfig, Provisioner};
pub use runner::{CommandOutput, CommandRunner, SystemRunner};
