//! Wire protocol error types.

use thiserror::Error;

/// Convenience result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtoError>;

/// Errors from encoding or decoding length-prefixed messages.
#[derive(Debug, Error)]
pub enum ProtoError {
    /// A declared or actual payload length exceeds the protocol cap.
    ///
    /// Raised before any payload allocation, on both encode and decode.
    #[error("payload of {size} bytes exceeds protocol maximum of {max}")]
    FrameTooLarge {
        /// Offending payload size.
        size: usize,
        /// The enforced maximum.
        max: usize,
    },

    /// The peer closed the connection before the declared length arrived.
    #[error("peer closed after {received} of {expected} expected bytes")]
    TruncatedTransfer {
        /// Bytes the length prefix promised.
        expected: usize,
        /// Bytes actually received before the close.
        received: usize,
    },

    /// The acknowledgement token was missing or garbled.
    #[error("bad acknowledgement token: {got:02x?}")]
    BadAck {
        /// The bytes received in place of the token.
        got: Vec<u8>,
    },

    /// Underlying socket failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
