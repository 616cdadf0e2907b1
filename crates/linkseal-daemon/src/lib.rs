//! Linkseal daemon library.
//!
//! Orchestrates the full pipeline for one invocation:
//!
//! 1. ensure the node identity key pair exists (generate once, reuse)
//! 2. run the role-appropriate handshake over TCP
//! 3. derive the session key set from the shared secret (when this side
//!    holds one)
//! 4. provision the kernel MACsec security association
//!
//! Strictly sequential: one handshake completes (or fails) before any
//! provisioning step runs. Ctrl-C feeds the handshake's cancellation
//! signal.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod pipeline;

pub use config::{DaemonConfig, Role};
pub use pipeline::{DaemonError, provision, run};
