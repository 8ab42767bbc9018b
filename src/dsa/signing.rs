//! Support for SM2 signing.
//!
//! ## Algorithm
//!
//! ```text
//! A1: set M~=ZA || M
//! A2: calculate e=Hv(M~)
//! A3: pick a random number k in [1, n-1] via a random number generator
//! A4: calculate the elliptic curve point (x1, y1)=[k]G
//! A5: calculate r=(e+x1) modn, return to A3 if r=0 or r+k=n
//! A6: calculate s=((1+dA)^(-1)*(k-r*dA)) modn, return to A3 if s=0
//! A7: the digital signature of M is (r, s)
//! ```

use super::{EphemeralPool, Signature, VerifyingKey};
use crate::{
    codec,
    distid::DistId,
    FieldBytes, NonZeroScalar, ProjectivePoint, PublicKey, Scalar, SecretKey, Sm2,
};
use core::fmt::{self, Debug};
use elliptic_curve::{
    generic_array::typenum::Unsigned,
    ops::{MulByGenerator, Reduce},
    point::AffineCoordinates,
    subtle::{Choice, ConstantTimeEq},
    Curve, FieldBytesEncoding, PrimeField,
};
use signature::{
    hazmat::{PrehashSigner, RandomizedPrehashSigner},
    rand_core::CryptoRngCore,
    Error, KeypairRef, RandomizedSigner, Result, Signer,
};
use sm3::Sm3;

/// SM2 secret key used for signing messages and producing signatures.
///
/// ## Usage
///
/// The [`signature`] crate defines the following traits which are the
/// primary API for signing:
///
/// - [`Signer`]: sign a message using this key, deriving `k` per RFC 6979
/// - [`RandomizedSigner`]: sign with a fresh uniform `k` from a CSPRNG
/// - [`PrehashSigner`]: sign a precomputed 32-byte digest directly,
///   bypassing the `Z`-bound message hash
///
/// Beyond those, [`SigningKey::sign_from_pool`] consumes precomputed
/// ephemerals from an [`EphemeralPool`].
#[derive(Clone)]
pub struct SigningKey {
    /// Secret key.
    secret_scalar: NonZeroScalar,

    /// Verifying key for this signing key.
    verifying_key: VerifyingKey,
}

impl SigningKey {
    /// Create signing key from a signer's distinguishing identifier and
    /// secret key.
    pub fn new(distid: &DistId, secret_key: &SecretKey) -> Result<Self> {
        Self::from_nonzero_scalar(distid, secret_key.to_nonzero_scalar())
    }

    /// Parse signing key from big endian-encoded bytes.
    pub fn from_bytes(distid: &DistId, bytes: &FieldBytes) -> Result<Self> {
        Self::from_slice(distid, bytes)
    }

    /// Parse signing key from big endian-encoded byte slice containing a
    /// secret scalar value.
    pub fn from_slice(distid: &DistId, slice: &[u8]) -> Result<Self> {
        let secret_scalar = NonZeroScalar::try_from(slice).map_err(|_| Error::new())?;
        Self::from_nonzero_scalar(distid, secret_scalar)
    }

    /// Parse signing key from its 64-hex-char big-endian form.
    pub fn from_hex(distid: &DistId, hex: &str) -> Result<Self> {
        let secret_key = codec::secret_key_from_hex(hex).map_err(|_| Error::new())?;
        Self::new(distid, &secret_key)
    }

    /// Create a signing key from a non-zero scalar.
    pub fn from_nonzero_scalar(distid: &DistId, secret_scalar: NonZeroScalar) -> Result<Self> {
        let public_key = PublicKey::from_secret_scalar(&secret_scalar);
        let verifying_key = VerifyingKey::new(distid, public_key)?;
        Ok(Self {
            secret_scalar,
            verifying_key,
        })
    }

    /// Serialize as bytes.
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

    /// Get the [`VerifyingKey`] which corresponds to this [`SigningKey`].
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Get the distinguishing identifier for this key.
    pub fn distid(&self) -> &DistId {
        self.verifying_key.distid()
    }

    /// Sign `msg` with the `Z`-bound pre-hash, drawing ephemerals from
    /// `pool`.
    ///
    /// One entry is consumed per signature, plus one per arithmetic
    /// rejection. Errors when the pool is exhausted.
    pub fn sign_from_pool(&self, pool: &mut EphemeralPool, msg: &[u8]) -> Result<Signature> {
        let hash = self.verifying_key.hash_msg(msg);
        self.sign_prehash_from_pool(pool, &hash)
    }

    /// Sign a precomputed 32-byte digest, drawing ephemerals from `pool`.
    pub fn sign_prehash_from_pool(
        &self,
        pool: &mut EphemeralPool,
        prehash: &[u8],
    ) -> Result<Signature> {
        loop {
            let ephemeral = pool.pop().ok_or_else(Error::new)?;
            if let Some(signature) = sign_prehash_with_ephemeral(
                &self.secret_scalar,
                &ephemeral.k(),
                ephemeral.x1(),
                prehash,
            )? {
                return Ok(signature);
            }
        }
    }
}

//
// `*Signer` trait impls
//

impl PrehashSigner<Signature> for SigningKey {
    fn sign_prehash(&self, prehash: &[u8]) -> Result<Signature> {
        sign_prehash_rfc6979(&self.secret_scalar, prehash, &[])
    }
}

impl RandomizedPrehashSigner<Signature> for SigningKey {
    fn sign_prehash_with_rng(
        &self,
        rng: &mut impl CryptoRngCore,
        prehash: &[u8],
    ) -> Result<Signature> {
        loop {
            // A3: pick a random number k in [1, n-1]
            let k: Scalar = *NonZeroScalar::random(rng);

            // A4: calculate the elliptic curve point (x1, y1)=[k]G
            let x1 = ProjectivePoint::mul_by_generator(&k).to_affine().x();

            if let Some(signature) =
                sign_prehash_with_ephemeral(&self.secret_scalar, &k, &x1, prehash)?
            {
                return Ok(signature);
            }
        }
    }
}

impl RandomizedSigner<Signature> for SigningKey {
    fn try_sign_with_rng(&self, rng: &mut impl CryptoRngCore, msg: &[u8]) -> Result<Signature> {
        // A1: set M~=ZA || M
        let hash = self.verifying_key.hash_msg(msg);
        self.sign_prehash_with_rng(rng, &hash)
    }
}

impl Signer<Signature> for SigningKey {
    fn try_sign(&self, msg: &[u8]) -> Result<Signature> {
        // A1: set M~=ZA || M
        let hash = self.verifying_key.hash_msg(msg);
        self.sign_prehash(&hash)
    }
}

//
// Other trait impls
//

impl AsRef<VerifyingKey> for SigningKey {
    fn as_ref(&self) -> &VerifyingKey {
        &self.verifying_key
    }
}

impl ConstantTimeEq for SigningKey {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.secret_scalar.ct_eq(&other.secret_scalar)
    }
}

impl Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("verifying_key", &self.verifying_key)
            .finish_non_exhaustive()
    }
}

/// Constant-time comparison
impl Eq for SigningKey {}
impl PartialEq for SigningKey {
    fn eq(&self, other: &SigningKey) -> bool {
        self.ct_eq(other).into()
    }
}

impl KeypairRef for SigningKey {
    type VerifyingKey = VerifyingKey;
}

/// Compute a signature using RFC 6979 to deterministically derive `k`.
fn sign_prehash_rfc6979(secret_scalar: &Scalar, prehash: &[u8], data: &[u8]) -> Result<Signature> {
    if prehash.len() != <Sm2 as Curve>::FieldBytesSize::USIZE {
        return Err(Error::new());
    }

    // A2: calculate e=Hv(M~)
    let e = Scalar::reduce_bytes(FieldBytes::from_slice(prehash));

    // A3: derive k in [1, n-1] from the key, order and message digest
    let k = Option::from(Scalar::from_repr(rfc6979::generate_k::<Sm3, _>(
        &secret_scalar.to_repr(),
        &FieldBytesEncoding::<Sm2>::encode_field_bytes(&Sm2::ORDER),
        &e.to_repr(),
        data,
    )))
    .ok_or_else(Error::new)?;

    // A4: calculate the elliptic curve point (x1, y1)=[k]G
    let x1 = ProjectivePoint::mul_by_generator(&k).to_affine().x();

    // with a deterministic k there is nothing to retry with; rejection is
    // surfaced as an error (probability ~2^-256)
    sign_prehash_with_ephemeral(secret_scalar, &k, &x1, prehash)?.ok_or_else(Error::new)
}

/// A5/A6 with a fixed ephemeral. `Ok(None)` signals an arithmetic
/// rejection: the caller retries with a fresh `(k, x1)`.
fn sign_prehash_with_ephemeral(
    secret_scalar: &Scalar,
    k: &Scalar,
    x1: &FieldBytes,
    prehash: &[u8],
) -> Result<Option<Signature>> {
    if prehash.len() != <Sm2 as Curve>::FieldBytesSize::USIZE {
        return Err(Error::new());
    }

    // A2: calculate e=Hv(M~)
    let e = Scalar::reduce_bytes(FieldBytes::from_slice(prehash));

    // A5: calculate r=(e+x1) modn, return to A3 if r=0 or r+k=n
    let r = e + Scalar::reduce_bytes(x1);
    if bool::from(r.is_zero() | (r + k).ct_eq(&Scalar::ZERO)) {
        return Ok(None);
    }

    // A6: calculate s=((1+dA)^(-1)*(k-r*dA)) modn, return to A3 if s=0
    let d_plus_1_inv =
        Option::<Scalar>::from((secret_scalar + &Scalar::ONE).invert()).ok_or_else(Error::new)?;

    let s = d_plus_1_inv * (*k - (r * secret_scalar));
    if s.is_zero().into() {
        return Ok(None);
    }

    // A7: the digital signature of M is (r, s)
    Signature::from_scalars(r.to_repr(), s.to_repr()).map(Some)
}
