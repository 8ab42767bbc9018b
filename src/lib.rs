#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(
    clippy::mod_module_files,
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::checked_conversions,
    clippy::implicit_saturating_sub,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    missing_docs,
    rust_2018_idioms,
    unused_lifetimes,
    unused_qualifications
)]

extern crate alloc;

pub mod codec;

#[cfg(feature = "dsa")]
pub mod distid;
#[cfg(feature = "dsa")]
pub mod dsa;

#[cfg(feature = "pke")]
pub mod kdf;
#[cfg(feature = "pke")]
pub mod pke;

pub mod precomputed;

pub use elliptic_curve;
pub use sm2::{
    AffinePoint, EncodedPoint, FieldBytes, NonZeroScalar, ProjectivePoint, PublicKey, Scalar,
    SecretKey, Sm2, U256,
};

/// SM3 hash output.
#[cfg(any(feature = "dsa", feature = "pke"))]
type Hash = sm3::digest::Output<sm3::Sm3>;
