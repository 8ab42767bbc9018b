//! SM2 Digital Signature Algorithm as defined in GB/T 32918.2.
//!
//! ## Usage
//!
//! ```
//! use rand_core::OsRng;
//! use sm2_interop::{
//!     dsa::{Signature, SigningKey, signature::{Signer, Verifier}},
//!     SecretKey,
//! };
//!
//! // Signing
//! let secret_key = SecretKey::random(&mut OsRng); // serialize with `::to_bytes()`
//! let distid = "example@example.com"; // distinguishing identifier
//! let signing_key = SigningKey::new(distid, &secret_key)?;
//! let message = b"test message";
//! let signature: Signature = signing_key.sign(message);
//!
//! // Verifying
//! use sm2_interop::dsa::VerifyingKey;
//!
//! let verifying_key = VerifyingKey::from_hex(distid, &signing_key.verifying_key().to_hex())?;
//! verifying_key.verify(message, &signature)?;
//!
//! // Interop framings: raw 128-hex-char `r ‖ s` and ASN.1 DER
//! let raw = signature.to_hex();
//! assert_eq!(Signature::from_hex(&raw)?, signature);
//! let der = signature.to_der()?;
//! assert_eq!(Signature::from_der(&der)?, signature);
//! # Ok::<(), sm2_interop::dsa::signature::Error>(())
//! ```

mod der;
mod pool;
mod signing;
mod verifying;

pub use signature;

pub use self::{
    pool::{Ephemeral, EphemeralPool},
    signing::SigningKey,
    verifying::VerifyingKey,
};

use crate::{FieldBytes, NonZeroScalar, Sm2};
use alloc::{string::String, vec::Vec};
use core::fmt::{self, Debug};
use elliptic_curve::generic_array::sequence::Concat;
use signature::{Error, Result, SignatureEncoding};

/// SM2 signature serialized as bytes.
pub type SignatureBytes = [u8; Signature::BYTE_SIZE];

/// Primitive scalar type (works without the `arithmetic` feature).
type ScalarPrimitive = elliptic_curve::ScalarPrimitive<Sm2>;

/// SM2 signature: the scalar pair `(r, s)`, both in `[1, n-1]`.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Signature {
    r: ScalarPrimitive,
    s: ScalarPrimitive,
}

impl Signature {
    /// Size of an encoded SM2 signature in bytes.
    pub const BYTE_SIZE: usize = 64;

    /// Parse an SM2 signature from a byte array.
    pub fn from_bytes(bytes: &SignatureBytes) -> Result<Self> {
        let (r_bytes, s_bytes) = bytes.split_at(Self::BYTE_SIZE / 2);
        let r = ScalarPrimitive::from_slice(r_bytes).map_err(|_| Error::new())?;
        let s = ScalarPrimitive::from_slice(s_bytes).map_err(|_| Error::new())?;

        if r.is_zero().into() || s.is_zero().into() {
            return Err(Error::new());
        }

        Ok(Self { r, s })
    }

    /// Parse an SM2 signature from a byte slice.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        SignatureBytes::try_from(bytes)
            .map_err(|_| Error::new())?
            .try_into()
    }

    /// Parse an SM2 signature from its raw 128-hex-char `r ‖ s` framing.
    /// Input is case-insensitive.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let bytes = crate::codec::decode_hex(hex).map_err(|_| Error::new())?;
        Self::from_slice(&bytes)
    }

    /// Parse an SM2 signature from `SEQUENCE { INTEGER r, INTEGER s }`
    /// ASN.1 DER.
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        der::decode(bytes)
    }

    /// Create a [`Signature`] from the serialized `r` and `s` scalar values
    /// which comprise the signature.
    #[inline]
    pub fn from_scalars(r: impl Into<FieldBytes>, s: impl Into<FieldBytes>) -> Result<Self> {
        Self::try_from(r.into().concat(s.into()).as_slice())
    }

    /// Serialize this signature as bytes.
    pub fn to_bytes(&self) -> SignatureBytes {
        let mut ret = [0; Self::BYTE_SIZE];
        let (r_bytes, s_bytes) = ret.split_at_mut(Self::BYTE_SIZE / 2);
        r_bytes.copy_from_slice(&self.r.to_bytes());
        s_bytes.copy_from_slice(&self.s.to_bytes());
        ret
    }

    /// Serialize this signature as lowercase `r ‖ s` hex, each component
    /// zero-padded to 32 bytes.
    pub fn to_hex(&self) -> String {
        crate::codec::encode_hex(&self.to_bytes())
    }

    /// Serialize this signature as ASN.1 DER.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        der::encode(self)
    }

    /// Bytes for the `r` component of a signature.
    pub fn r_bytes(&self) -> FieldBytes {
        self.r.to_bytes()
    }

    /// Bytes for the `s` component of a signature.
    pub fn s_bytes(&self) -> FieldBytes {
        self.s.to_bytes()
    }

    /// Convert this signature into a byte vector.
    pub fn to_vec(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    /// Get the `r` component of this signature.
    pub fn r(&self) -> NonZeroScalar {
        NonZeroScalar::new(self.r.into()).unwrap()
    }

    /// Get the `s` component of this signature.
    pub fn s(&self) -> NonZeroScalar {
        NonZeroScalar::new(self.s.into()).unwrap()
    }

    /// Split the signature into its `r` and `s` scalars.
    pub fn split_scalars(&self) -> (NonZeroScalar, NonZeroScalar) {
        (self.r(), self.s())
    }
}

impl Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sm2_interop::dsa::Signature(")?;

        for byte in self.to_bytes() {
            write!(f, "{:02X}", byte)?;
        }

        write!(f, ")")
    }
}

impl From<Signature> for SignatureBytes {
    fn from(signature: Signature) -> SignatureBytes {
        signature.to_bytes()
    }
}

impl From<&Signature> for SignatureBytes {
    fn from(signature: &Signature) -> SignatureBytes {
        signature.to_bytes()
    }
}

impl SignatureEncoding for Signature {
    type Repr = SignatureBytes;

    fn to_bytes(&self) -> Self::Repr {
        self.into()
    }

    fn encoded_len(&self) -> usize {
        Self::BYTE_SIZE
    }
}

impl TryFrom<SignatureBytes> for Signature {
    type Error = Error;

    fn try_from(signature: SignatureBytes) -> Result<Signature> {
        Signature::from_bytes(&signature)
    }
}

impl TryFrom<&SignatureBytes> for Signature {
    type Error = Error;

    fn try_from(signature: &SignatureBytes) -> Result<Signature> {
        Signature::from_bytes(signature)
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Signature> {
        Signature::from_slice(bytes)
    }
}
