//! SM2 public-key encryption as defined in GB/T 32918.4.
//!
//! ## Usage
//!
//! ```
//! use sm2_interop::pke::{DecryptingKey, Mode};
//! use sm2_interop::SecretKey;
//! use rand_core::OsRng;
//!
//! let secret_key = SecretKey::random(&mut OsRng);
//! let decrypting_key = DecryptingKey::new(&secret_key);
//! let encrypting_key = decrypting_key.encrypting_key();
//!
//! // the interop hex framing: C1 ‖ C3 ‖ C2, no SEC1 tag
//! let ciphertext = encrypting_key.encrypt_hex(&mut OsRng, b"plaintext")?;
//! assert_eq!(decrypting_key.decrypt_hex(&ciphertext)?, b"plaintext");
//!
//! // the same ciphertext, framed as raw bytes or ASN.1 DER
//! let cipher = encrypting_key.encrypt(&mut OsRng, b"plaintext")?;
//! let der = cipher.to_der(Mode::C1C3C2)?;
//! assert_eq!(decrypting_key.decrypt_der(&der)?, b"plaintext");
//! # Ok::<(), sm2_interop::elliptic_curve::Error>(())
//! ```

mod decrypting;
mod der;
mod encrypting;

pub use self::{decrypting::DecryptingKey, encrypting::EncryptingKey};

use alloc::{string::String, vec::Vec};
use elliptic_curve::{
    sec1::{FromEncodedPoint, ToEncodedPoint},
    Error, Group, Result,
};

use crate::{codec, AffinePoint, EncodedPoint, Hash, ProjectivePoint};

/// Component order of the two variable-position ciphertext fields.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Mode {
    /// The original GB/T 32918-2010 order.
    C1C2C3,
    /// The revised order used by most deployed stacks.
    #[default]
    C1C3C2,
}

/// Coordinate width in bytes.
const COORDINATE_SIZE: usize = 32;

/// SM3 digest width in bytes; the length of `C3`.
const DIGEST_SIZE: usize = 32;

/// An SM2 ciphertext: the ephemeral point `C1`, the masked message body
/// `C2` and the integrity tag `C3 = SM3(x2 ‖ M ‖ y2)`.
///
/// The struct itself is framing-neutral; the component order only matters
/// when serializing to or parsing from one of the three wire forms (hex,
/// raw SEC1-tagged bytes, DER).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cipher {
    c1: AffinePoint,
    c2: Vec<u8>,
    c3: Hash,
}

impl Cipher {
    /// Parse from the raw byte framing: `04 ‖ x1 ‖ y1` followed by `C3`/`C2`
    /// in the order given by `mode`.
    ///
    /// Rejects ephemeral points which do not satisfy the curve equation.
    pub fn from_slice(cipher: &[u8], mode: Mode) -> Result<Self> {
        let (c1, rest) = cipher
            .split_at_checked(1 + 2 * COORDINATE_SIZE)
            .ok_or(Error)?;
        if rest.len() < DIGEST_SIZE {
            return Err(Error);
        }

        let encoded = EncodedPoint::from_bytes(c1).map_err(|_| Error)?;
        let c1 = Option::from(AffinePoint::from_encoded_point(&encoded)).ok_or(Error)?;

        // cofactor is one, so B2 ([h]C1 ≠ O) reduces to an identity check
        if ProjectivePoint::from(c1).is_identity().into() {
            return Err(Error);
        }

        let (c2, c3_bytes) = match mode {
            Mode::C1C3C2 => {
                let (c3, c2) = rest.split_at(DIGEST_SIZE);
                (c2, c3)
            }
            Mode::C1C2C3 => rest.split_at(rest.len() - DIGEST_SIZE),
        };

        let mut c3 = Hash::default();
        c3.copy_from_slice(c3_bytes);

        Ok(Self {
            c1,
            c2: c2.to_vec(),
            c3,
        })
    }

    /// Serialize to the raw byte framing.
    pub fn to_vec(&self, mode: Mode) -> Vec<u8> {
        let point = self.c1.to_encoded_point(false);
        let mut result = Vec::with_capacity(point.len() + self.c2.len() + self.c3.len());
        result.extend(point.as_bytes());
        match mode {
            Mode::C1C2C3 => {
                result.extend(&self.c2);
                result.extend(&self.c3);
            }
            Mode::C1C3C2 => {
                result.extend(&self.c3);
                result.extend(&self.c2);
            }
        }
        result
    }

    /// Parse from the concatenated hex framing.
    ///
    /// The first 128 hex chars are `x1 ‖ y1` without a SEC1 tag, followed
    /// by `C3` (64 chars) and `C2` in the order given by `mode`. Input is
    /// case-insensitive.
    pub fn from_hex(cipher: &str, mode: Mode) -> Result<Self> {
        let bytes = codec::decode_hex(cipher)?;
        let mut tagged = Vec::with_capacity(1 + bytes.len());
        tagged.push(0x04);
        tagged.extend(bytes);
        Self::from_slice(&tagged, mode)
    }

    /// Serialize to the concatenated hex framing (lowercase, untagged).
    pub fn to_hex(&self, mode: Mode) -> String {
        codec::encode_hex(&self.to_vec(mode)[1..])
    }

    /// Parse from the ASN.1 framing: `SEQUENCE { INTEGER x1, INTEGER y1,
    /// OCTET STRING, OCTET STRING }`, the octet strings holding `(C3, C2)`
    /// in `C1C3C2` order and `(C2, C3)` in `C1C2C3` order.
    pub fn from_der(cipher: &[u8], mode: Mode) -> Result<Self> {
        der::decode(cipher, mode)
    }

    /// Serialize to the ASN.1 framing.
    pub fn to_der(&self, mode: Mode) -> Result<Vec<u8>> {
        der::encode(self, mode)
    }

    /// The ephemeral point `C1`.
    pub fn c1(&self) -> &AffinePoint {
        &self.c1
    }

    /// The masked message body `C2`.
    pub fn c2(&self) -> &[u8] {
        &self.c2
    }

    /// The integrity tag `C3`.
    pub fn c3(&self) -> &Hash {
        &self.c3
    }
}
