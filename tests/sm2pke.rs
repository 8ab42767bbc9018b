//! SM2 encryption tests covering the three wire framings and both
//! component orders.

#![cfg(feature = "pke")]

use hex_literal::hex;
use proptest::prelude::*;
use rand_core::OsRng;
use sm2_interop::{
    pke::{Cipher, DecryptingKey, EncryptingKey, Mode},
    precomputed::PrecomputedPublicKey,
};

const PRIVATE_KEY: [u8; 32] =
    hex!("3945208F7B2144B13F36E38AC6D39F95889393692860B51A42FB81EF4DF7C5B8");

const MSG: &[u8] = b"encryption standard";

fn decrypting_key(mode: Mode) -> DecryptingKey {
    DecryptingKey::from_hex(
        "3945208f7b2144b13f36e38ac6d39f95889393692860b51a42fb81ef4df7c5b8",
        mode,
    )
    .unwrap()
}

#[test]
fn from_slice_and_from_hex_agree() {
    let dk = DecryptingKey::from_slice(&PRIVATE_KEY).unwrap();
    assert_eq!(dk.to_bytes().as_slice(), PRIVATE_KEY.as_slice());
    assert_eq!(decrypting_key(Mode::C1C3C2).to_bytes(), dk.to_bytes());
}

#[test]
fn hex_framing_has_fixed_layout() {
    let dk = decrypting_key(Mode::C1C3C2);
    let ek = dk.encrypting_key();

    // C1 (128) + C3 (64) + 2 hex chars per plaintext byte
    let ciphertext = ek.encrypt_hex(&mut OsRng, b"hello").unwrap();
    assert_eq!(ciphertext.len(), 128 + 64 + 2 * 5);
    assert_eq!(ciphertext, ciphertext.to_lowercase());
    assert_eq!(dk.decrypt_hex(&ciphertext).unwrap(), b"hello");

    // case-insensitive parse
    assert_eq!(dk.decrypt_hex(&ciphertext.to_uppercase()).unwrap(), b"hello");
}

#[test]
fn empty_message_roundtrip() {
    let dk = decrypting_key(Mode::C1C3C2);
    let ek = dk.encrypting_key();

    let cipher = ek.encrypt(&mut OsRng, &[]).unwrap();
    assert!(cipher.c2().is_empty());

    let ciphertext = cipher.to_hex(Mode::C1C3C2);
    assert_eq!(ciphertext.len(), 128 + 64);
    assert_eq!(dk.decrypt_hex(&ciphertext).unwrap(), Vec::<u8>::new());

    // corruption of the empty-message ciphertext is still caught
    let mut tampered = ciphertext.into_bytes();
    tampered[150] ^= 1;
    let tampered = String::from_utf8(tampered).unwrap();
    assert!(dk.decrypt_hex(&tampered).is_err());
    assert!(dk.decrypt_hex_or_empty(&tampered).is_empty());
}

#[test]
fn roundtrip_in_both_modes_and_framings() {
    for mode in [Mode::C1C3C2, Mode::C1C2C3] {
        let dk = decrypting_key(mode);
        let ek = dk.encrypting_key();

        let cipher = ek.encrypt(&mut OsRng, MSG).unwrap();

        let hex = cipher.to_hex(mode);
        assert_eq!(dk.decrypt_hex(&hex).unwrap(), MSG);

        let bytes = cipher.to_vec(mode);
        assert_eq!(dk.decrypt_slice(&bytes).unwrap(), MSG);

        let der = cipher.to_der(mode).unwrap();
        assert_eq!(dk.decrypt_der(&der).unwrap(), MSG);
    }
}

#[test]
fn modes_only_reorder_components() {
    let dk = decrypting_key(Mode::C1C3C2);
    let ek = dk.encrypting_key();
    let cipher = ek.encrypt(&mut OsRng, MSG).unwrap();

    let c1c3c2 = cipher.to_vec(Mode::C1C3C2);
    let c1c2c3 = cipher.to_vec(Mode::C1C2C3);
    assert_ne!(c1c3c2, c1c2c3);
    assert_eq!(c1c3c2[..65], c1c2c3[..65]);

    let reparsed = Cipher::from_slice(&c1c2c3, Mode::C1C2C3).unwrap();
    assert_eq!(reparsed, cipher);
}

#[test]
fn mismatched_mode_fails() {
    let dk = decrypting_key(Mode::C1C3C2);
    let ek = EncryptingKey::new_with_mode(*dk.encrypting_key().public_key(), Mode::C1C2C3);

    let hex = ek.encrypt_hex(&mut OsRng, MSG).unwrap();
    assert!(dk.decrypt_hex(&hex).is_err());
    assert!(dk.decrypt_hex_or_empty(&hex).is_empty());

    let der = ek.encrypt_der(&mut OsRng, MSG).unwrap();
    assert!(dk.decrypt_der(&der).is_err());
}

#[test]
fn tampering_any_byte_fails() {
    let dk = decrypting_key(Mode::C1C3C2);
    let ek = dk.encrypting_key();
    let ciphertext = ek.encrypt(&mut OsRng, MSG).unwrap().to_vec(Mode::C1C3C2);

    for i in 0..ciphertext.len() {
        let mut tampered = ciphertext.clone();
        tampered[i] ^= 1;
        assert!(dk.decrypt_slice(&tampered).is_err());
    }
}

#[test]
fn string_output() {
    let dk = decrypting_key(Mode::C1C3C2);
    let ek = dk.encrypting_key();

    let hex = ek.encrypt_hex(&mut OsRng, "你好, SM2".as_bytes()).unwrap();
    assert_eq!(dk.decrypt_string(&hex).unwrap(), "你好, SM2");

    // non-UTF-8 plaintext: strict API errors, interop API soft-fails
    let hex = ek.encrypt_hex(&mut OsRng, &[0xff, 0xfe]).unwrap();
    assert!(dk.decrypt_string(&hex).is_err());
    assert_eq!(dk.decrypt_string_or_empty(&hex), "");
}

#[test]
fn encryption_is_randomized() {
    let dk = decrypting_key(Mode::C1C3C2);
    let ek = dk.encrypting_key();

    let a = ek.encrypt_hex(&mut OsRng, MSG).unwrap();
    let b = ek.encrypt_hex(&mut OsRng, MSG).unwrap();
    assert_ne!(a, b);
}

#[test]
fn precomputed_recipient_roundtrip() {
    let dk = decrypting_key(Mode::C1C3C2);
    let precomputed = PrecomputedPublicKey::new(*dk.encrypting_key().public_key());
    let ek = EncryptingKey::new_precomputed(precomputed, Mode::C1C3C2);

    let hex = ek.encrypt_hex(&mut OsRng, MSG).unwrap();
    assert_eq!(dk.decrypt_hex(&hex).unwrap(), MSG);
}

#[test]
fn hex_framing_rejects_malformed_input() {
    let dk = decrypting_key(Mode::C1C3C2);

    // too short to contain C1 and C3
    assert!(dk.decrypt_hex(&"00".repeat(95)).is_err());
    // not hex at all
    assert!(dk.decrypt_hex(&"zz".repeat(101)).is_err());
    // C1 not on the curve
    assert!(dk.decrypt_hex(&"11".repeat(101)).is_err());
}

proptest! {
    #[test]
    fn roundtrip_arbitrary_plaintext(msg in any::<Vec<u8>>()) {
        for mode in [Mode::C1C3C2, Mode::C1C2C3] {
            let dk = decrypting_key(mode);
            let ek = dk.encrypting_key();
            let ciphertext = ek.encrypt_hex(&mut OsRng, &msg).unwrap();
            prop_assert_eq!(dk.decrypt_hex(&ciphertext).unwrap(), msg.clone());
        }
    }
}
