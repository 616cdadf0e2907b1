//! Linkseal Cryptographic Primitives
//!
//! Key derivation building blocks for the Linkseal pipeline. Pure functions
//! with deterministic outputs: both link peers run the same derivation over
//! the same KEM output and must arrive at byte-identical keys.
//!
//! # Key Lifecycle
//!
//! One KEM shared secret is expanded into two independent, purpose-bound
//! session keys and is then discarded:
//!
//! ```text
//! KEM Shared Secret
//!        │
//!        ▼
//! Extract-then-expand KDF (SHA3-256)
//!        │
//!        ├──▶ CAK (32 bytes, control plane)
//!        └──▶ SAK (16 bytes, data plane, AES-GCM-128)
//! ```
//!
//! # Security
//!
//! Domain Separation:
//! - CAK and SAK use distinct expansion labels; they are independent in
//!   expectation even though they come from one secret
//!
//! Key Hygiene:
//! - [`SharedSecret`] and [`SessionKeySet`] zeroize their bytes on drop
//! - Neither type exposes key material through `Debug` output
//! - A shared secret is consumed by exactly one derivation and never reused
//!   across sessions

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod kdf;
mod secret;
mod session;

pub use kdf::{HASH_OUTPUT_LEN, KdfError, MAX_OUTPUT_LEN, derive};
pub use secret::SharedSecret;
pub use session::{CAK_LABEL, CAK_LEN, SAK_LABEL, SAK_LEN, SessionKeySet};
