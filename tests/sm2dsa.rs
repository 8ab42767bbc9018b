//! SM2 signature tests, including the GB/T 32918.2-2016 Annex A vectors
//! for the recommended curve.

#![cfg(feature = "dsa")]

use hex_literal::hex;
use proptest::prelude::*;
use rand_core::OsRng;
use sm2_interop::{
    distid::DEFAULT_DISTID,
    dsa::{
        signature::{
            hazmat::{PrehashSigner, PrehashVerifier},
            RandomizedSigner, Signer, Verifier,
        },
        Ephemeral, EphemeralPool, Signature, SigningKey, VerifyingKey,
    },
    elliptic_curve::{ops::Reduce, PrimeField},
    precomputed::PrecomputedPublicKey,
    NonZeroScalar, Scalar, U256,
};

const PRIVATE_KEY: [u8; 32] =
    hex!("3945208F7B2144B13F36E38AC6D39F95889393692860B51A42FB81EF4DF7C5B8");

const PUBLIC_KEY_HEX: &str = "09f9df311e5421a150dd7d161e4bc5c672179fad1833fc076bb08ff356f35020ccea490ce26775a52dc6ea718cc1aa600aed05fbf35e084a6632f6072da9ad13";

const FIXED_K: [u8; 32] =
    hex!("59276E27D506861A16680F3AD9C02DCCEF3CC1FA3CDBE4CE6D54B80DEAC1BC21");

const MSG: &[u8] = b"message digest";

// e = SM3(Z || M) for the default identifier
const PREHASH: [u8; 32] =
    hex!("F0B43E94BA45ACCAACE692ED534382EB17E6AB5A19CE7B31F4486FDFC0D28640");

const SIG: [u8; 64] = hex!(
    "F5A03B0648D2C4630EEAC513E1BB81A15944DA3827D5B74143AC7EACEEE720B3" // r
    "B1B6AA29DF212FD8763182BC0D421CA1BB9038FD1F7F42D4840B69C485BBC1AA" // s
);

fn signing_key() -> SigningKey {
    SigningKey::from_slice(DEFAULT_DISTID, &PRIVATE_KEY).unwrap()
}

fn verifying_key() -> VerifyingKey {
    VerifyingKey::from_hex(DEFAULT_DISTID, PUBLIC_KEY_HEX).unwrap()
}

#[test]
fn annex_a_signature_with_fixed_k() {
    let sk = signing_key();
    let mut pool = EphemeralPool::new();
    pool.push(Ephemeral::from_scalar(
        NonZeroScalar::try_from(FIXED_K.as_slice()).unwrap(),
    ));

    let signature = sk.sign_from_pool(&mut pool, MSG).unwrap();
    assert_eq!(signature.to_bytes(), SIG);
    assert!(pool.is_empty());
}

#[test]
fn annex_a_signature_verifies() {
    let signature = Signature::from_bytes(&SIG).unwrap();
    assert!(verifying_key().verify(MSG, &signature).is_ok());
}

#[test]
fn annex_a_prehash_verifies() {
    let signature = Signature::from_bytes(&SIG).unwrap();
    assert!(verifying_key()
        .verify_prehash(&PREHASH, &signature)
        .is_ok());
}

#[test]
fn prehash_and_message_paths_agree() {
    let sk = signing_key();
    let signature = sk.sign_prehash(&PREHASH).unwrap();
    let from_msg: Signature = sk.sign(MSG);
    assert_eq!(signature, from_msg);
}

#[test]
fn deterministic_signing_is_stable() {
    let sk = signing_key();
    let sig1: Signature = sk.sign(MSG);
    let sig2: Signature = sk.sign(MSG);
    assert_eq!(sig1, sig2);
    assert!(sk.verifying_key().verify(MSG, &sig1).is_ok());
}

#[test]
fn randomized_signing_verifies() {
    let sk = signing_key();
    let sig1 = sk.try_sign_with_rng(&mut OsRng, MSG).unwrap();
    let sig2 = sk.try_sign_with_rng(&mut OsRng, MSG).unwrap();
    assert_ne!(sig1, sig2);
    assert!(sk.verifying_key().verify(MSG, &sig1).is_ok());
    assert!(sk.verifying_key().verify(MSG, &sig2).is_ok());
}

#[test]
fn mismatched_identifier_fails() {
    let vk = VerifyingKey::from_hex("ALICE123@YAHOO.COM", PUBLIC_KEY_HEX).unwrap();
    let signature = Signature::from_bytes(&SIG).unwrap();
    assert!(vk.verify(MSG, &signature).is_err());
}

#[test]
fn negated_s_is_rejected() {
    // unlike some ECDSA deployments, (r, n-s) must not verify under SM2
    let signature = Signature::from_bytes(&SIG).unwrap();
    let neg_s = -*signature.s();
    let malleated = Signature::from_scalars(signature.r_bytes(), neg_s.to_repr()).unwrap();
    assert!(verifying_key().verify(MSG, &malleated).is_err());
}

#[test]
fn raw_hex_framing_roundtrip() {
    let signature = Signature::from_bytes(&SIG).unwrap();
    let raw = signature.to_hex();
    assert_eq!(raw.len(), 128);
    assert_eq!(raw, raw.to_lowercase());
    assert_eq!(Signature::from_hex(&raw).unwrap(), signature);
    assert_eq!(Signature::from_hex(&raw.to_uppercase()).unwrap(), signature);
}

#[test]
fn der_framing_roundtrip_is_byte_identical() {
    let sk = signing_key();
    let signature: Signature = sk.sign(MSG);
    let der = signature.to_der().unwrap();

    let decoded = Signature::from_der(&der).unwrap();
    assert_eq!(decoded, signature);
    assert_eq!(decoded.to_der().unwrap(), der);
    assert!(sk.verifying_key().verify(MSG, &decoded).is_ok());
}

#[test]
fn pool_entries_are_single_use() {
    let sk = signing_key();
    let mut pool = EphemeralPool::new();
    pool.fill(&mut OsRng, 3);

    for _ in 0..3 {
        let signature = sk.sign_from_pool(&mut pool, MSG).unwrap();
        assert!(sk.verifying_key().verify(MSG, &signature).is_ok());
    }

    assert!(pool.is_empty());
    assert!(sk.sign_from_pool(&mut pool, MSG).is_err());
}

#[test]
fn precomputed_verifying_key_agrees() {
    let signature = Signature::from_bytes(&SIG).unwrap();
    let precomputed = PrecomputedPublicKey::new(verifying_key().into());
    let vk = VerifyingKey::new_precomputed(DEFAULT_DISTID, precomputed).unwrap();
    assert!(vk.verify(MSG, &signature).is_ok());

    let mut other = SIG;
    other[0] ^= 1;
    if let Ok(tampered) = Signature::from_bytes(&other) {
        assert!(vk.verify(MSG, &tampered).is_err());
    }
}

prop_compose! {
    fn random_signing_key()(bytes in any::<[u8; 32]>()) -> SigningKey {
        loop {
            let scalar = <Scalar as Reduce<U256>>::reduce_bytes(&bytes.into());
            if let Some(scalar) = Option::from(NonZeroScalar::new(scalar)) {
                return SigningKey::from_nonzero_scalar(DEFAULT_DISTID, scalar).unwrap();
            }
        }
    }
}

proptest! {
    #[test]
    fn sign_and_verify(sk in random_signing_key()) {
        let signature = sk.sign(MSG);
        prop_assert!(sk.verifying_key().verify(MSG, &signature).is_ok());
    }

    #[test]
    fn cross_key_verification_fails(sk in random_signing_key()) {
        let signature = sk.sign(MSG);
        if sk.verifying_key().to_hex() != verifying_key().to_hex() {
            prop_assert!(verifying_key().verify(MSG, &signature).is_err());
        }
    }

    #[test]
    fn reject_tampered_signature(byte in 0usize..64, bit in 0usize..8) {
        let sk = signing_key();
        let mut signature_bytes = sk.sign(MSG).to_bytes();
        signature_bytes[byte] ^= 1 << bit;

        match Signature::from_bytes(&signature_bytes) {
            Ok(tampered) => prop_assert!(sk.verifying_key().verify(MSG, &tampered).is_err()),
            // the flip pushed a component out of [1, n-1]
            Err(_) => {}
        }
    }
}
