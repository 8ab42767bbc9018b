//! Support for SM2 encryption.
//!
//! ## Algorithm
//!
//! ```text
//! A1: generate a random number k in [1, n-1] via a random number generator
//! A2: compute point C1 = [k]G = (x1, y1)
//! A3: compute point S = [h]PB; error out if S is the point at infinity
//! A4: compute point [k]PB = (x2, y2)
//! A5: compute t = KDF(x2 ‖ y2, klen); return to A1 if t is all-zero
//! A6: compute C2 = M ⊕ t
//! A7: compute C3 = Hash(x2 ‖ M ‖ y2)
//! ```

use alloc::{string::String, vec::Vec};
use core::fmt::{self, Debug};
use elliptic_curve::{ops::MulByGenerator, rand_core::CryptoRngCore, Group, Result};
use sm3::{Digest, Sm3};

use super::{Cipher, Mode};
use crate::{
    codec,
    kdf,
    precomputed::{PointRepr, PrecomputedPublicKey},
    NonZeroScalar, ProjectivePoint, PublicKey, Scalar,
};

/// An SM2 recipient key used for encrypting messages.
#[derive(Clone)]
pub struct EncryptingKey {
    recipient: PointRepr,
    mode: Mode,
}

impl EncryptingKey {
    /// Create an encrypting key with the default framing mode (`C1C3C2`).
    pub fn new(public_key: PublicKey) -> Self {
        Self::new_with_mode(public_key, Mode::C1C3C2)
    }

    /// Create an encrypting key with the given framing mode.
    pub fn new_with_mode(public_key: PublicKey, mode: Mode) -> Self {
        Self {
            recipient: PointRepr::Plain(public_key),
            mode,
        }
    }

    /// Create an encrypting key from a table-expanded public key,
    /// amortizing repeated encryptions to the same recipient.
    pub fn new_precomputed(public_key: PrecomputedPublicKey, mode: Mode) -> Self {
        Self {
            recipient: PointRepr::Precomputed(public_key),
            mode,
        }
    }

    /// Parse the recipient key from its 128-hex-char form (an optional
    /// leading `04` is accepted).
    pub fn from_hex(hex: &str, mode: Mode) -> Result<Self> {
        Ok(Self::new_with_mode(codec::public_key_from_hex(hex)?, mode))
    }

    /// The recipient public key.
    pub fn public_key(&self) -> &PublicKey {
        self.recipient.public_key()
    }

    /// The framing mode used by [`Self::encrypt_hex`] and
    /// [`Self::encrypt_der`].
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Serialize the recipient key as 128 lowercase hex chars.
    pub fn to_hex(&self) -> String {
        codec::public_key_to_hex(self.public_key())
    }

    /// Encrypt `msg`, returning the framing-neutral [`Cipher`].
    pub fn encrypt(&self, rng: &mut impl CryptoRngCore, msg: &[u8]) -> Result<Cipher> {
        loop {
            // A1: generate a random number k in [1, n-1]
            let k: Scalar = *NonZeroScalar::random(rng);

            // A2: compute point C1 = [k]G = (x1, y1)
            let c1 = ProjectivePoint::mul_by_generator(&k).to_affine();

            // A3/A4: compute [k]PB = (x2, y2); the cofactor is one, so S
            // degenerates to PB and only the identity result is rejected
            let shared = self.recipient.mul(&k);
            if shared.is_identity().into() {
                continue;
            }
            let (x2, y2) = codec::coordinates(&shared.to_affine())?;

            // A5/A6: compute C2 = M ⊕ KDF(x2 ‖ y2, klen)
            let mut c2 = msg.to_vec();
            kdf::xor_in_place(&x2, &y2, &mut c2)?;

            // an all-zero derived stream leaks M; draw a fresh k
            if !msg.is_empty() && c2 == msg {
                continue;
            }

            // A7: compute C3 = Hash(x2 ‖ M ‖ y2)
            let c3 = Sm3::new_with_prefix(&x2)
                .chain_update(msg)
                .chain_update(&y2)
                .finalize();

            return Ok(Cipher { c1, c2, c3 });
        }
    }

    /// Encrypt `msg` into the concatenated hex framing, using this key's
    /// mode for the component order.
    pub fn encrypt_hex(&self, rng: &mut impl CryptoRngCore, msg: &[u8]) -> Result<String> {
        Ok(self.encrypt(rng, msg)?.to_hex(self.mode))
    }

    /// Encrypt `msg` into the ASN.1 framing, using this key's mode for
    /// the octet-string order.
    pub fn encrypt_der(&self, rng: &mut impl CryptoRngCore, msg: &[u8]) -> Result<Vec<u8>> {
        self.encrypt(rng, msg)?.to_der(self.mode)
    }
}

impl Debug for EncryptingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptingKey")
            .field("public_key", self.public_key())
            .field("mode", &self.mode)
            .finish()
    }
}

impl From<PublicKey> for EncryptingKey {
    fn from(public_key: PublicKey) -> Self {
        Self::new(public_key)
    }
}
