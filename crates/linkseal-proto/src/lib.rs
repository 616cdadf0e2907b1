//! Linkseal wire protocol.
//!
//! One handshake runs over one cleartext TCP connection and exchanges
//! exactly three messages:
//!
//! ```text
//! responder ──▶ initiator   uint32_be(len) || public_key_bytes
//! initiator ──▶ responder   uint32_be(len) || ciphertext_bytes
//! responder ──▶ initiator   "OK" (2-byte acknowledgement token)
//! ```
//!
//! Framing is symmetric: every length-prefixed message is encoded and
//! decoded by the same rules on both sides.
//!
//! # Security
//!
//! - Size Limit: declared lengths are capped at [`MAX_PAYLOAD_SIZE`] before
//!   any allocation, so a corrupted or adversarial peer cannot trigger
//!   unbounded memory use
//! - Truncation Detection: reads loop until the declared length is
//!   satisfied; an early close yields [`ProtoError::TruncatedTransfer`],
//!   never a silently short buffer
//! - No Confidentiality: the channel itself is cleartext by design; the
//!   payloads are public KEM material

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod errors;
mod frame;

pub use errors::{ProtoError, Result};
pub use frame::{
    ACK_TOKEN, MAX_PAYLOAD_SIZE, decode_frame, encode_frame, read_ack, read_frame, write_ack,
    write_frame,
};
