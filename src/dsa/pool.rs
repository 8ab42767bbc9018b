//! Caller-owned pool of precomputed signing ephemerals.
//!
//! The expensive step of SM2 signing is the base-point multiplication
//! `[k]G`. A caller may perform it ahead of time, off the signing path,
//! and hand the resulting entries to [`SigningKey::sign_from_pool`].
//!
//! [`SigningKey::sign_from_pool`]: super::SigningKey::sign_from_pool

use alloc::vec::Vec;
use elliptic_curve::{ops::MulByGenerator, point::AffineCoordinates};
use signature::rand_core::CryptoRngCore;
use zeroize::Zeroize;

use crate::{FieldBytes, NonZeroScalar, ProjectivePoint, Scalar};

/// A single-use signing ephemeral: a scalar `k` and the x-coordinate
/// of `[k]G`.
///
/// Reusing `k` across two signatures made with the same key reveals the
/// secret scalar. Entries are therefore consumed by value; the pool hands
/// each one out exactly once.
pub struct Ephemeral {
    k: NonZeroScalar,
    x1: FieldBytes,
}

impl Ephemeral {
    /// Generate a fresh ephemeral from `rng`.
    pub fn generate(rng: &mut impl CryptoRngCore) -> Self {
        Self::from_scalar(NonZeroScalar::random(rng))
    }

    /// Build the entry for a caller-chosen `k`.
    pub fn from_scalar(k: NonZeroScalar) -> Self {
        let x1 = ProjectivePoint::mul_by_generator(&*k).to_affine().x();
        Self { k, x1 }
    }

    pub(super) fn k(&self) -> Scalar {
        *self.k
    }

    pub(super) fn x1(&self) -> &FieldBytes {
        &self.x1
    }
}

impl Drop for Ephemeral {
    fn drop(&mut self) {
        self.k.zeroize();
    }
}

/// Pool of [`Ephemeral`] entries, owned by the signer's caller.
///
/// The signer pops entries as it needs them (one per signature, plus one
/// per arithmetic rejection). External synchronization is the caller's
/// responsibility when the pool is shared.
#[derive(Default)]
pub struct EphemeralPool {
    entries: Vec<Ephemeral>,
}

impl EphemeralPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate `count` fresh entries from `rng`.
    pub fn fill(&mut self, rng: &mut impl CryptoRngCore, count: usize) {
        self.entries
            .extend((0..count).map(|_| Ephemeral::generate(rng)));
    }

    /// Add a caller-built entry.
    pub fn push(&mut self, entry: Ephemeral) {
        self.entries.push(entry);
    }

    /// Remove and return an entry, if any remain.
    pub fn pop(&mut self) -> Option<Ephemeral> {
        self.entries.pop()
    }

    /// Number of remaining entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the pool is exhausted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
