//! Length-prefixed message framing.
//!
//! Every key-material message on the wire is `uint32_be(len) || payload`.
//! The pure [`encode_frame`]/[`decode_frame`] pair operates on byte
//! buffers; [`write_frame`]/[`read_frame`] drive an async stream with the
//! same rules.

use bytes::BufMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::errors::{ProtoError, Result};

/// Size of the length prefix in bytes.
const LEN_PREFIX_SIZE: usize = 4;

/// Maximum accepted payload length (1 MiB).
///
/// KEM public keys and ciphertexts are a few kilobytes; anything near this
/// cap indicates a corrupted or hostile peer.
pub const MAX_PAYLOAD_SIZE: usize = 1024 * 1024;

/// Fixed acknowledgement token sent by the responder after decapsulation.
pub const ACK_TOKEN: [u8; 2] = *b"OK";

/// Encode a payload into wire format.
///
/// # Errors
///
/// [`ProtoError::FrameTooLarge`] if the payload exceeds
/// [`MAX_PAYLOAD_SIZE`].
pub fn encode_frame(payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(ProtoError::FrameTooLarge { size: payload.len(), max: MAX_PAYLOAD_SIZE });
    }

    // INVARIANT: payload.len() <= MAX_PAYLOAD_SIZE < u32::MAX, so the
    // length always fits the 4-byte prefix.
    let mut wire = Vec::with_capacity(LEN_PREFIX_SIZE + payload.len());
    wire.put_u32(payload.len() as u32);
    wire.put_slice(payload);
    Ok(wire)
}

/// Decode one frame from a byte buffer, ignoring trailing data.
///
/// # Errors
///
/// - [`ProtoError::FrameTooLarge`] if the declared length exceeds the cap
/// - [`ProtoError::TruncatedTransfer`] if the buffer ends before the
///   declared length is satisfied (including a short length prefix)
pub fn decode_frame(bytes: &[u8]) -> Result<Vec<u8>> {
    if bytes.len() < LEN_PREFIX_SIZE {
        return Err(ProtoError::TruncatedTransfer {
            expected: LEN_PREFIX_SIZE,
            received: bytes.len(),
        });
    }

    let mut prefix = [0u8; LEN_PREFIX_SIZE];
    prefix.copy_from_slice(&bytes[..LEN_PREFIX_SIZE]);
    let declared = u32::from_be_bytes(prefix) as usize;

    if declared > MAX_PAYLOAD_SIZE {
        return Err(ProtoError::FrameTooLarge { size: declared, max: MAX_PAYLOAD_SIZE });
    }

    let body = &bytes[LEN_PREFIX_SIZE..];
    if body.len() < declared {
        return Err(ProtoError::TruncatedTransfer { expected: declared, received: body.len() });
    }

    Ok(body[..declared].to_vec())
}

/// Write one framed payload to the stream and flush it.
///
/// # Errors
///
/// [`ProtoError::FrameTooLarge`] for oversized payloads, otherwise any
/// socket error.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let wire = encode_frame(payload)?;
    writer.write_all(&wire).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one framed payload from the stream.
///
/// Loops over partial reads until the declared length is satisfied.
///
/// # Errors
///
/// - [`ProtoError::FrameTooLarge`] if the declared length exceeds the cap
///   (rejected before allocating the payload buffer)
/// - [`ProtoError::TruncatedTransfer`] if the peer closes early, for the
///   prefix and the payload alike
pub async fn read_frame<R>(reader: &mut R) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; LEN_PREFIX_SIZE];
    let got = read_until_full(reader, &mut prefix).await?;
    if got < LEN_PREFIX_SIZE {
        return Err(ProtoError::TruncatedTransfer { expected: LEN_PREFIX_SIZE, received: got });
    }

    let declared = u32::from_be_bytes(prefix) as usize;
    if declared > MAX_PAYLOAD_SIZE {
        return Err(ProtoError::FrameTooLarge { size: declared, max: MAX_PAYLOAD_SIZE });
    }

    let mut payload = vec![0u8; declared];
    let received = read_until_full(reader, &mut payload).await?;
    if received < declared {
        return Err(ProtoError::TruncatedTransfer { expected: declared, received });
    }

    Ok(payload)
}

/// Send the fixed acknowledgement token.
pub async fn write_ack<W>(writer: &mut W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&ACK_TOKEN).await?;
    writer.flush().await?;
    Ok(())
}

/// Read and validate the acknowledgement token.
///
/// # Errors
///
/// [`ProtoError::BadAck`] when the peer sent something other than the
/// token, including a premature close (the partial bytes are carried in
/// the error for diagnostics).
pub async fn read_ack<R>(reader: &mut R) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; ACK_TOKEN.len()];
    let got = read_until_full(reader, &mut buf).await?;
    if got < ACK_TOKEN.len() || buf != ACK_TOKEN {
        return Err(ProtoError::BadAck { got: buf[..got].to_vec() });
    }
    Ok(())
}

/// Fill `buf` from the stream, returning how many bytes arrived before a
/// clean EOF. Socket errors propagate; a short count signals truncation to
/// the caller.
async fn read_until_full<R>(reader: &mut R, buf: &mut [u8]) -> Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_empty_payload() {
        let wire = encode_frame(b"").unwrap();
        assert_eq!(wire, vec![0, 0, 0, 0]);
        assert_eq!(decode_frame(&wire).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn round_trip_single_byte() {
        let wire = encode_frame(b"x").unwrap();
        assert_eq!(decode_frame(&wire).unwrap(), b"x".to_vec());
    }

    #[test]
    fn round_trip_large_payload() {
        let payload = vec![0xA5u8; 65536];
        let wire = encode_frame(&payload).unwrap();
        assert_eq!(decode_frame(&wire).unwrap(), payload);
    }

    #[test]
    fn reject_oversized_encode() {
        let payload = vec![0u8; MAX_PAYLOAD_SIZE + 1];
        assert!(matches!(encode_frame(&payload), Err(ProtoError::FrameTooLarge { .. })));
    }

    #[test]
    fn reject_oversized_declared_length() {
        // Prefix claims 2 MiB without carrying any payload.
        let wire = ((MAX_PAYLOAD_SIZE * 2) as u32).to_be_bytes();
        assert!(matches!(decode_frame(&wire), Err(ProtoError::FrameTooLarge { .. })));
    }

    #[test]
    fn detect_truncated_payload() {
        let mut wire = encode_frame(&[1u8; 100]).unwrap();
        wire.truncate(40);
        let err = decode_frame(&wire).unwrap_err();
        assert!(
            matches!(err, ProtoError::TruncatedTransfer { expected: 100, received: 36 }),
            "got {err:?}"
        );
    }

    #[test]
    fn detect_truncated_prefix() {
        let err = decode_frame(&[0, 0]).unwrap_err();
        assert!(matches!(err, ProtoError::TruncatedTransfer { expected: 4, received: 2 }));
    }

    #[tokio::test]
    async fn stream_round_trip() {
        let wire = encode_frame(b"ciphertext bytes").unwrap();
        let payload = read_frame(&mut &wire[..]).await.unwrap();
        assert_eq!(payload, b"ciphertext bytes");
    }

    #[tokio::test]
    async fn stream_write_matches_encode() {
        let mut sink = Vec::new();
        write_frame(&mut sink, b"public key").await.unwrap();
        assert_eq!(sink, encode_frame(b"public key").unwrap());
    }

    #[tokio::test]
    async fn stream_truncation_is_detected() {
        // Declared 16 bytes, peer closes after 5.
        let mut wire = encode_frame(&[7u8; 16]).unwrap();
        wire.truncate(LEN_PREFIX_SIZE + 5);
        let err = read_frame(&mut &wire[..]).await.unwrap_err();
        assert!(matches!(err, ProtoError::TruncatedTransfer { expected: 16, received: 5 }));
    }

    #[tokio::test]
    async fn stream_rejects_oversized_length_before_alloc() {
        let wire = u32::MAX.to_be_bytes();
        let err = read_frame(&mut &wire[..]).await.unwrap_err();
        assert!(matches!(err, ProtoError::FrameTooLarge { .. }));
    }

    #[tokio::test]
    async fn ack_round_trip() {
        let mut sink = Vec::new();
        write_ack(&mut sink).await.unwrap();
        assert_eq!(sink, b"OK");
        read_ack(&mut &sink[..]).await.unwrap();
    }

    #[tokio::test]
    async fn garbled_ack_is_reported() {
        let err = read_ack(&mut &b"NO"[..]).await.unwrap_err();
        assert!(matches!(err, ProtoError::BadAck { .. }));
    }

    #[tokio::test]
    async fn missing_ack_is_reported() {
        let err = read_ack(&mut &b"O"[..]).await.unwrap_err();
        assert!(matches!(err, ProtoError::BadAck { ref got } if got == b"O"));
    }
}
