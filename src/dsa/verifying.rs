//! Support for verifying SM2 signatures.
//!
//! ## Algorithm
//!
//! ```text
//! B1: verify whether r' in [1,n-1], verification failed if not
//! B2: verify whether s' in [1,n-1], verification failed if not
//! B3: set M'~=ZA || M'
//! B4: calculate e'=Hv(M'~)
//! B5: calculate t = (r' + s') modn, verification failed if t=0
//! B6: calculate the point (x1', y1')=[s']G + [t]PA
//! B7: calculate R=(e'+x1') modn, verification pass if R=r', otherwise failed
//! ```

use super::Signature;
use crate::{
    codec,
    distid::{hash_z, DistId},
    precomputed::{PointRepr, PrecomputedPublicKey},
    AffinePoint, EncodedPoint, FieldBytes, Hash, ProjectivePoint, PublicKey, Scalar,
};
use alloc::{boxed::Box, string::String};
use elliptic_curve::{
    generic_array::typenum::Unsigned,
    ops::{LinearCombination, MulByGenerator, Reduce},
    point::AffineCoordinates,
    sec1::ToEncodedPoint,
    Curve, Group, PrimeField,
};
use signature::{hazmat::PrehashVerifier, Error, Result, Verifier};
use sm3::{Digest, Sm3};

/// SM2 public key used for verifying signatures are valid for a given
/// message.
///
/// ## Usage
///
/// The [`signature`] crate defines the following traits which are the
/// primary API for verifying:
///
/// - [`Verifier`]: verify a message against a provided key and signature
/// - [`PrehashVerifier`]: verify the low-level raw output bytes of a
///   message digest
///
/// Verification failure is reported as an opaque [`Error`]: a malformed
/// signature and a signature that simply does not verify are
/// indistinguishable at this boundary.
#[derive(Clone, Debug)]
pub struct VerifyingKey {
    /// Signer's public key, plain or table-expanded.
    point: PointRepr,

    /// Signer's user information hash `Z`.
    identity_hash: Hash,

    /// Distinguishing identifier used to compute `Z`.
    distid: String,
}

impl VerifyingKey {
    /// Initialize [`VerifyingKey`] from a signer's distinguishing
    /// identifier and public key.
    pub fn new(distid: &DistId, public_key: PublicKey) -> Result<Self> {
        Self::from_point(PointRepr::Plain(public_key), distid)
    }

    /// Initialize [`VerifyingKey`] from a table-expanded public key,
    /// amortizing repeated verifications against the same signer.
    pub fn new_precomputed(distid: &DistId, public_key: PrecomputedPublicKey) -> Result<Self> {
        Self::from_point(PointRepr::Precomputed(public_key), distid)
    }

    /// Initialize [`VerifyingKey`] from a SEC1-encoded public key.
    pub fn from_sec1_bytes(distid: &DistId, bytes: &[u8]) -> Result<Self> {
        let public_key = PublicKey::from_sec1_bytes(bytes).map_err(|_| Error::new())?;
        Self::new(distid, public_key)
    }

    /// Initialize [`VerifyingKey`] from the 128-hex-char public key form
    /// (an optional leading `04` is accepted).
    pub fn from_hex(distid: &DistId, hex: &str) -> Result<Self> {
        let public_key = codec::public_key_from_hex(hex).map_err(|_| Error::new())?;
        Self::new(distid, public_key)
    }

    /// Initialize [`VerifyingKey`] from an affine point.
    ///
    /// Returns an [`Error`] if the given affine point is the additive
    /// identity (a.k.a. point at infinity).
    pub fn from_affine(distid: &DistId, affine: AffinePoint) -> Result<Self> {
        let public_key = PublicKey::from_affine(affine).map_err(|_| Error::new())?;
        Self::new(distid, public_key)
    }

    fn from_point(point: PointRepr, distid: &DistId) -> Result<Self> {
        let identity_hash = hash_z(distid, point.public_key()).map_err(|_| Error::new())?;

        Ok(Self {
            point,
            identity_hash,
            distid: distid.into(),
        })
    }

    /// Borrow the inner [`AffinePoint`] for this public key.
    pub fn as_affine(&self) -> &AffinePoint {
        self.point.public_key().as_affine()
    }

    /// Get the distinguishing identifier for this key.
    pub fn distid(&self) -> &DistId {
        self.distid.as_str()
    }

    /// Convert this [`VerifyingKey`] into the
    /// `Elliptic-Curve-Point-to-Octet-String` encoding described in
    /// SEC 1: Elliptic Curve Cryptography (Version 2.0) section 2.3.3
    /// (page 10).
    ///
    /// <http://www.secg.org/sec1-v2.pdf>
    pub fn to_sec1_bytes(&self) -> Box<[u8]> {
        self.point.public_key().to_sec1_bytes()
    }

    /// Serialize the public key as 128 lowercase hex chars, without the
    /// `04` tag.
    pub fn to_hex(&self) -> String {
        codec::public_key_to_hex(self.point.public_key())
    }

    /// Compute the message hash `e = SM3(Z ‖ msg)`.
    pub(crate) fn hash_msg(&self, msg: &[u8]) -> Hash {
        Sm3::new_with_prefix(self.identity_hash)
            .chain_update(msg)
            .finalize()
    }
}

//
// `*Verifier` trait impls
//

impl PrehashVerifier<Signature> for VerifyingKey {
    fn verify_prehash(&self, prehash: &[u8], signature: &Signature) -> Result<()> {
        if prehash.len() != <crate::Sm2 as Curve>::FieldBytesSize::USIZE {
            return Err(Error::new());
        }

        // B1: verify whether r' in [1,n-1], verification failed if not
        let r = *signature.r(); // NonZeroScalar checked at signature parse time

        // B2: verify whether s' in [1,n-1], verification failed if not
        let s = *signature.s(); // NonZeroScalar checked at signature parse time

        // B4: calculate e'=Hv(M'~)
        let e = Scalar::reduce_bytes(FieldBytes::from_slice(prehash));

        // B5: calculate t = (r' + s') modn, verification failed if t=0
        let t = r + s;
        if t.is_zero().into() {
            return Err(Error::new());
        }

        // B6: calculate the point (x1', y1')=[s']G + [t]PA
        let point = match &self.point {
            PointRepr::Plain(public_key) => ProjectivePoint::lincomb(
                &ProjectivePoint::generator(),
                &s,
                &ProjectivePoint::from(*public_key.as_affine()),
                &t,
            ),
            PointRepr::Precomputed(precomputed) => {
                ProjectivePoint::mul_by_generator(&s) + precomputed.mul(&t)
            }
        };
        if point.is_identity().into() {
            return Err(Error::new());
        }
        let x = point.to_affine().x();

        // B7: calculate R=(e'+x1') modn, verification pass if R=r'
        if r == e + Scalar::reduce_bytes(&x) {
            Ok(())
        } else {
            Err(Error::new())
        }
    }
}

impl Verifier<Signature> for VerifyingKey {
    fn verify(&self, msg: &[u8], signature: &Signature) -> Result<()> {
        // B3: set M'~=ZA || M'
        let hash = self.hash_msg(msg);
        self.verify_prehash(&hash, signature)
    }
}

//
// Other trait impls
//

impl AsRef<AffinePoint> for VerifyingKey {
    fn as_ref(&self) -> &AffinePoint {
        self.as_affine()
    }
}

impl From<VerifyingKey> for PublicKey {
    fn from(verifying_key: VerifyingKey) -> PublicKey {
        *verifying_key.point.public_key()
    }
}

impl From<&VerifyingKey> for PublicKey {
    fn from(verifying_key: &VerifyingKey) -> PublicKey {
        *verifying_key.point.public_key()
    }
}

impl ToEncodedPoint<crate::Sm2> for VerifyingKey {
    fn to_encoded_point(&self, compress: bool) -> EncodedPoint {
        self.as_affine().to_encoded_point(compress)
    }
}
