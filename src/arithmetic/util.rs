//! Limb arithmetic helpers.

#[cfg(test)]
use num_bigint::{BigUint, ToBigUint};
#[cfg(test)]
use num_traits::cast::ToPrimitive;

/// Computes `a + b + carry`, returning the result along with the new carry.
#[inline(always)]
pub const fn adc(a: u64, b: u64, carry: u64) -> (u64, u64) {
    let ret = (a as u128) + (b as u128) + (carry as u128);
    (ret as u64, (ret >> 64) as u64)
}

/// Computes `a - (b + borrow)`, returning the result along with the new
/// borrow. The borrow is either `0` or `u64::MAX`.
#[inline(always)]
pub const fn sbb(a: u64, b: u64, borrow: u64) -> (u64, u64) {
    let ret = (a as u128).wrapping_sub((b as u128) + ((borrow >> 63) as u128));
    (ret as u64, (ret >> 64) as u64)
}

/// Converts a big-endian byte array to BigUint.
#[cfg(test)]
pub fn bytes_to_biguint(bytes: &[u8; 32]) -> BigUint {
    bytes
        .iter()
        .enumerate()
        .map(|(i, w)| w.to_biguint().unwrap() << ((31 - i) * 8))
        .sum()
}

/// Converts a BigUint to a big-endian byte array.
#[cfg(test)]
pub fn biguint_to_bytes(x: &BigUint) -> [u8; 32] {
    let mask = BigUint::from(u8::MAX);
    let mut bytes = [0u8; 32];
    for (i, b) in bytes.iter_mut().enumerate() {
        *b = ((x >> ((31 - i) * 8)) & &mask).to_u8().unwrap();
    }
    bytes
}

/// Converts a little-endian array of 64-bit words to BigUint.
#[cfg(test)]
pub fn words_to_biguint(words: &[u64; 4]) -> BigUint {
    words
        .iter()
        .enumerate()
        .map(|(i, w)| w.to_biguint().unwrap() << (i * 64))
        .sum()
}

/// Converts a BigUint to a little-endian array of 64-bit words.
#[cfg(test)]
pub fn biguint_to_words(x: &BigUint) -> [u64; 4] {
    let mask = BigUint::from(u64::MAX);
    let mut words = [0u64; 4];
    for (i, w) in words.iter_mut().enumerate() {
        *w = ((x >> (i * 64)) & &mask).to_u64().unwrap();
    }
    words
}
