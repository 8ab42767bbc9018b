//! Precomputed fixed-point multiplication for repeated public-key use.

use elliptic_curve::{
    ff::PrimeField,
    group::Group,
    subtle::{ConditionallySelectable, ConstantTimeEq},
};

use crate::{ProjectivePoint, PublicKey, Scalar};

const WINDOW: usize = 4;
const TABLE_LEN: usize = (1 << WINDOW) - 1;

/// A public-key point expanded into a multiplication table.
///
/// Building the table costs a handful of point additions; afterwards every
/// scalar multiplication by this point walks fixed-size windows of the
/// scalar with a constant-time table lookup. The handle is accepted by the
/// encryption and verification entry points wherever a public key is
/// expected, amortizing the expansion across repeated operations against
/// the same recipient or signer.
#[derive(Clone, Debug)]
pub struct PrecomputedPublicKey {
    public_key: PublicKey,
    table: [ProjectivePoint; TABLE_LEN],
}

impl PrecomputedPublicKey {
    /// Expand `public_key` into a `[P, 2P, …, 15P]` table.
    pub fn new(public_key: PublicKey) -> Self {
        let p = ProjectivePoint::from(*public_key.as_affine());
        let mut table = [p; TABLE_LEN];
        for i in 1..TABLE_LEN {
            table[i] = table[i - 1] + p;
        }
        Self { public_key, table }
    }

    /// The public key this table was built from.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Compute `k·P` by 4-bit fixed windows over the big-endian scalar.
    pub(crate) fn mul(&self, k: &Scalar) -> ProjectivePoint {
        let mut acc = ProjectivePoint::IDENTITY;

        for byte in k.to_repr() {
            for nibble in [byte >> WINDOW, byte & 0x0f] {
                for _ in 0..WINDOW {
                    acc = acc.double();
                }
                acc += self.select(nibble);
            }
        }

        acc
    }

    /// Table entry `nibble · P` (identity for zero) in constant time.
    fn select(&self, nibble: u8) -> ProjectivePoint {
        let mut entry = ProjectivePoint::IDENTITY;
        let mut multiple = 0u8;

        for point in &self.table {
            multiple += 1;
            entry.conditional_assign(point, nibble.ct_eq(&multiple));
        }

        entry
    }
}

impl From<PublicKey> for PrecomputedPublicKey {
    fn from(public_key: PublicKey) -> Self {
        Self::new(public_key)
    }
}

/// A public-key point in either its plain or table-expanded form.
#[cfg(any(feature = "dsa", feature = "pke"))]
#[derive(Clone, Debug)]
pub(crate) enum PointRepr {
    Plain(PublicKey),
    Precomputed(PrecomputedPublicKey),
}

#[cfg(any(feature = "dsa", feature = "pke"))]
impl PointRepr {
    pub(crate) fn public_key(&self) -> &PublicKey {
        match self {
            Self::Plain(public_key) => public_key,
            Self::Precomputed(precomputed) => precomputed.public_key(),
        }
    }

    /// `k·P` for this point.
    pub(crate) fn mul(&self, k: &Scalar) -> ProjectivePoint {
        match self {
            Self::Plain(public_key) => ProjectivePoint::from(*public_key.as_affine()) * *k,
            Self::Precomputed(precomputed) => precomputed.mul(k),
        }
    }
}
