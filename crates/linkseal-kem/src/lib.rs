//! Linkseal KEM capability.
//!
//! The key-encapsulation mechanism is an external collaborator, not
//! implemented here. This crate defines the [`KemProvider`] capability
//! trait the handshake consumes, a [`CliKem`] implementation that shells
//! out to a KEM command-line tool, and the [`KeyStore`] that persists one
//! node identity key pair across runs.
//!
//! # Security
//!
//! - The private key never crosses the network boundary; it only moves
//!   between the keystore files and the KEM tool
//! - Shared secrets are wrapped in [`linkseal_crypto::SharedSecret`] and
//!   zeroized after the derivation step consumes them
//! - Every external invocation runs under a configurable timeout; a hung
//!   tool aborts the run instead of blocking it forever

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cli;
mod error;
mod keystore;
mod provider;

pub use cli::{CliKem, KemCliConfig};
pub use error::KemError;
pub use keystore::{KeyStore, KeyStoreConfig};
pub use provider::{KemProvider, KeyPair, PrivateKey};
