//! Support for SM2 decryption.
//!
//! ## Algorithm
//!
//! ```text
//! B1: get C1 from C; verify that C1 satisfies the curve equation
//! B2: compute point S = [h]C1; error out if S is the point at infinity
//! B3: compute [dB]C1 = (x2, y2)
//! B4: compute t = KDF(x2 ‖ y2, klen)
//! B5: compute M' = C2 ⊕ t
//! B6: compute u = Hash(x2 ‖ M' ‖ y2); error out if u ≠ C3
//! B7: output the plaintext M'
//! ```
//!
//! The strict API surfaces integrity failure as an error. The reference
//! stacks this crate interoperates with instead return an empty result;
//! the `*_or_empty` methods reproduce that contract, at the cost of
//! making a failed decryption indistinguishable from an encrypted empty
//! message.

use alloc::{string::String, vec::Vec};
use core::fmt::{self, Debug};
use elliptic_curve::{
    subtle::{Choice, ConstantTimeEq},
    Error, Result,
};
use sm3::{Digest, Sm3};

use super::{Cipher, EncryptingKey, Mode};
use crate::{codec, kdf, FieldBytes, NonZeroScalar, ProjectivePoint, PublicKey, SecretKey};

/// An SM2 secret key used for decrypting messages.
#[derive(Clone)]
pub struct DecryptingKey {
    secret_scalar: NonZeroScalar,
    encrypting_key: EncryptingKey,
    mode: Mode,
}

impl DecryptingKey {
    /// Create a decrypting key with the default framing mode (`C1C3C2`).
    pub fn new(secret_key: &SecretKey) -> Self {
        Self::new_with_mode(secret_key.to_nonzero_scalar(), Mode::C1C3C2)
    }

    /// Create a decrypting key with the given framing mode.
    pub fn new_with_mode(secret_scalar: NonZeroScalar, mode: Mode) -> Self {
        Self {
            secret_scalar,
            encrypting_key: EncryptingKey::new_with_mode(
                PublicKey::from_secret_scalar(&secret_scalar),
                mode,
            ),
            mode,
        }
    }

    /// Parse the key from a big endian-encoded byte slice containing the
    /// secret scalar.
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let secret_scalar = NonZeroScalar::try_from(slice).map_err(|_| Error)?;
        Ok(Self::new_with_mode(secret_scalar, Mode::C1C3C2))
    }

    /// Parse the key from its 64-hex-char big-endian form.
    pub fn from_hex(hex: &str, mode: Mode) -> Result<Self> {
        let secret_key = codec::secret_key_from_hex(hex)?;
        Ok(Self::new_with_mode(secret_key.to_nonzero_scalar(), mode))
    }

    /// Serialize the secret scalar as bytes.
    pub fn to_bytes(&self) -> FieldBytes {
        self.secret_scalar.to_bytes()
    }

    /// Borrow the secret [`NonZeroScalar`] value for this key.
    ///
    /// # ⚠️ Warning
    ///
    /// This value is key material.
    ///
    /// Please treat it with the care it deserves!
    pub fn as_nonzero_scalar(&self) -> &NonZeroScalar {
        &self.secret_scalar
    }

    /// Get the [`EncryptingKey`] which corresponds to this key.
    pub fn encrypting_key(&self) -> &EncryptingKey {
        &self.encrypting_key
    }

    /// The framing mode used by the slice/hex/DER decryption methods.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Decrypt a framing-neutral [`Cipher`].
    pub fn decrypt(&self, cipher: &Cipher) -> Result<Vec<u8>> {
        // B1/B2 are enforced when the ciphertext is parsed
        // B3: compute [dB]C1 = (x2, y2)
        let shared = (ProjectivePoint::from(*cipher.c1()) * *self.secret_scalar).to_affine();
        let (x2, y2) = codec::coordinates(&shared)?;

        // B4/B5: compute M' = C2 ⊕ KDF(x2 ‖ y2, klen)
        let mut plaintext = cipher.c2().to_vec();
        kdf::xor_in_place(&x2, &y2, &mut plaintext)?;

        // B6: compute u = Hash(x2 ‖ M' ‖ y2) and compare with C3
        let u = Sm3::new_with_prefix(&x2)
            .chain_update(&plaintext)
            .chain_update(&y2)
            .finalize();

        if u.as_slice().ct_eq(cipher.c3().as_slice()).into() {
            Ok(plaintext)
        } else {
            Err(Error)
        }
    }

    /// Decrypt the raw byte framing.
    pub fn decrypt_slice(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.decrypt(&Cipher::from_slice(ciphertext, self.mode)?)
    }

    /// Decrypt the concatenated hex framing.
    pub fn decrypt_hex(&self, ciphertext: &str) -> Result<Vec<u8>> {
        self.decrypt(&Cipher::from_hex(ciphertext, self.mode)?)
    }

    /// Decrypt the ASN.1 framing.
    pub fn decrypt_der(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.decrypt(&Cipher::from_der(ciphertext, self.mode)?)
    }

    /// Decrypt the hex framing and interpret the plaintext as UTF-8.
    pub fn decrypt_string(&self, ciphertext: &str) -> Result<String> {
        codec::decode_utf8(self.decrypt_hex(ciphertext)?)
    }

    /// Decrypt the hex framing, returning an empty buffer on any parse or
    /// integrity failure.
    ///
    /// This reproduces the soft-fail contract of the reference stacks:
    /// callers cannot distinguish a failed decryption from a legitimately
    /// empty plaintext without external length knowledge.
    pub fn decrypt_hex_or_empty(&self, ciphertext: &str) -> Vec<u8> {
        self.decrypt_hex(ciphertext).unwrap_or_default()
    }

    /// Decrypt the hex framing as UTF-8, returning the empty string on any
    /// parse, integrity or encoding failure.
    pub fn decrypt_string_or_empty(&self, ciphertext: &str) -> String {
        self.decrypt_string(ciphertext).unwrap_or_default()
    }
}

//
// Other trait impls
//

impl AsRef<EncryptingKey> for DecryptingKey {
    fn as_ref(&self) -> &EncryptingKey {
        &self.encrypting_key
    }
}

impl ConstantTimeEq for DecryptingKey {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.secret_scalar.ct_eq(&other.secret_scalar)
    }
}

impl Debug for DecryptingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptingKey")
            .field("encrypting_key", self.encrypting_key())
            .finish_non_exhaustive()
    }
}

/// Constant-time comparison
impl Eq for DecryptingKey {}
impl PartialEq for DecryptingKey {
    fn eq(&self, other: &DecryptingKey) -> bool {
        self.ct_eq(other).into()
    }
}
