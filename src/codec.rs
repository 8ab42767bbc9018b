//! Boundary conversions between user-facing representations.
//!
//! Keys, ciphertexts and signatures cross this crate's boundary as hex
//! strings in the fixed widths of GB/T 32918: 64 hex chars for a private
//! key, 128 for an uncompressed public key (an optional leading `04` SEC1
//! tag is accepted and stripped on ingress, never emitted). Hex output is
//! lowercase; input is parsed case-insensitively.

use alloc::{string::String, vec::Vec};
use elliptic_curve::{sec1::ToEncodedPoint, Error, Result};

use crate::{PublicKey, SecretKey};

#[cfg(any(feature = "dsa", feature = "pke"))]
use crate::{AffinePoint, FieldBytes};

/// Decode a hex string, accepting both cases.
pub fn decode_hex(input: &str) -> Result<Vec<u8>> {
    base16ct::mixed::decode_vec(input).map_err(|_| Error)
}

/// Encode bytes as lowercase hex.
pub fn encode_hex(bytes: &[u8]) -> String {
    base16ct::lower::encode_string(bytes)
}

/// Interpret recovered plaintext bytes as UTF-8.
pub fn decode_utf8(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|_| Error)
}

/// Parse a public key from its 128-hex-char uncompressed `x ‖ y` form.
///
/// A leading `04` tag (130 chars total) is accepted and stripped. Points
/// which do not satisfy the curve equation, and the point at infinity,
/// are rejected.
pub fn public_key_from_hex(hex: &str) -> Result<PublicKey> {
    let hex = match hex.len() {
        130 => hex.strip_prefix("04").ok_or(Error)?,
        128 => hex,
        _ => return Err(Error),
    };

    let mut sec1 = Vec::with_capacity(65);
    sec1.push(0x04);
    sec1.extend(decode_hex(hex)?);
    PublicKey::from_sec1_bytes(&sec1)
}

/// Serialize a public key as 128 lowercase hex chars, without the `04` tag.
pub fn public_key_to_hex(public_key: &PublicKey) -> String {
    encode_hex(&public_key.to_encoded_point(false).as_bytes()[1..])
}

/// Parse a secret key from its 64-hex-char big-endian form.
pub fn secret_key_from_hex(hex: &str) -> Result<SecretKey> {
    if hex.len() != 64 {
        return Err(Error);
    }
    SecretKey::from_slice(&decode_hex(hex)?)
}

/// Serialize a secret key as 64 lowercase hex chars.
pub fn secret_key_to_hex(secret_key: &SecretKey) -> String {
    encode_hex(&secret_key.to_bytes())
}

/// Affine coordinates as fixed-width (32-byte, zero-padded) big-endian
/// buffers.
#[cfg(any(feature = "dsa", feature = "pke"))]
pub(crate) fn coordinates(point: &AffinePoint) -> Result<(FieldBytes, FieldBytes)> {
    match point.to_encoded_point(false).coordinates() {
        elliptic_curve::sec1::Coordinates::Uncompressed { x, y } => Ok((*x, *y)),
        _ => Err(Error),
    }
}
