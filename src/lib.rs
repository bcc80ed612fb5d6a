//! Pure Rust arithmetic for the secp256k1 elliptic curve.
//!
//! Specified in Certicom's SECG in SEC 2: Recommended Elliptic Curve Domain
//! Parameters:
//!
//! <https://www.secg.org/sec2-v2.pdf>
//!
//! The curve's equation is `y² = x³ + 7` over the ~256-bit prime field with
//! characteristic `p = 2²⁵⁶ − 2³² − 977`.
//!
//! This crate provides:
//!
//! - [`FieldElement`]: arithmetic modulo the field characteristic `p`
//! - [`Scalar`]: arithmetic modulo the group order `n`
//! - [`AffinePoint`] and [`ProjectivePoint`]: group operations in Jacobian
//!   coordinates, with NAF-based scalar multiplication
//! - [`ecdsa`]: ECDSA signature verification over prehashed messages
//!
//! Serialization formats (SEC1 point compression, DER signatures), key
//! generation, and message hashing are deliberately out of scope: the crate
//! accepts and returns raw big-endian 256-bit integers and affine
//! coordinates only.

#![no_std]
#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

#[cfg(test)]
extern crate std;

pub mod arithmetic;
pub mod ecdsa;

#[cfg(test)]
mod test_vectors;

pub use crate::arithmetic::{
    field::FieldElement, scalar::Scalar, AffinePoint, ProjectivePoint,
};

// Benchmarked directly; not part of the supported API.
#[doc(hidden)]
pub use crate::arithmetic::mul::recode_wnaf;

/// Big-endian serialization of a field element, scalar, or point coordinate.
pub type FieldBytes = [u8; 32];
