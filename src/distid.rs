//! Distinguishing-identifier support: the identity hash `Z`.

use crate::{AffinePoint, Hash, Sm2};
use elliptic_curve::{ff::PrimeField, Error, Result};
use primeorder::PrimeCurveParams;
use sm3::{Digest, Sm3};

/// Type which represents distinguishing identifiers.
pub type DistId = str;

/// Identifier conventionally used by GB/T 32918 examples and assumed by
/// most deployed stacks when none is negotiated.
pub const DEFAULT_DISTID: &DistId = "1234567812345678";

/// Compute the user information hash `Z` binding identity, curve
/// parameters and public key:
///
/// ```text
/// ENTL = bit length of the identifier, 16-bit big-endian
/// Z    = SM3(ENTL ‖ id ‖ a ‖ b ‖ xG ‖ yG ‖ xA ‖ yA)
/// ```
///
/// Identifiers of 8192 or more bytes do not fit `ENTL` and are rejected.
pub fn hash_z(distid: &DistId, public_key: &impl AsRef<AffinePoint>) -> Result<Hash> {
    let entl: u16 = distid
        .len()
        .checked_mul(8)
        .and_then(|l| l.try_into().ok())
        .ok_or(Error)?;

    let (px, py) = crate::codec::coordinates(public_key.as_ref())?;

    let mut sm3 = Sm3::new();
    sm3.update(entl.to_be_bytes());
    sm3.update(distid);
    sm3.update(Sm2::EQUATION_A.to_repr());
    sm3.update(Sm2::EQUATION_B.to_repr());
    sm3.update(Sm2::GENERATOR.0.to_repr());
    sm3.update(Sm2::GENERATOR.1.to_repr());
    sm3.update(px);
    sm3.update(py);
    Ok(sm3.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::public_key_from_hex;
    use hex_literal::hex;

    const PUBLIC_KEY_HEX: &str = "09f9df311e5421a150dd7d161e4bc5c672179fad1833fc076bb08ff356f35020ccea490ce26775a52dc6ea718cc1aa600aed05fbf35e084a6632f6072da9ad13";

    #[test]
    fn annex_a_identity_hash() {
        let pk = public_key_from_hex(PUBLIC_KEY_HEX).unwrap();
        let z = hash_z(DEFAULT_DISTID, &pk).unwrap();
        assert_eq!(
            z.as_slice(),
            hex!("B2E14C5C79C6DF5B85F4FE7ED8DB7A262B9DA7E07CCB0EA9F4747B8CCDA8A4F3")
        );
    }

    #[test]
    fn identity_hash_is_deterministic() {
        let pk = public_key_from_hex(PUBLIC_KEY_HEX).unwrap();
        assert_eq!(
            hash_z(DEFAULT_DISTID, &pk).unwrap(),
            hash_z(DEFAULT_DISTID, &pk).unwrap()
        );
        assert_ne!(
            hash_z("ALICE123@YAHOO.COM", &pk).unwrap(),
            hash_z(DEFAULT_DISTID, &pk).unwrap()
        );
    }
}
