//! Scalar arithmetic modulo the secp256k1 group order.
//!
//! This modulus is distinct from the coordinate field's characteristic and
//! has none of its sparse structure, so reduction works from the generic
//! identity `2^256 ≡ 2^256 - n (mod n)` rather than the field backend's
//! specialized constants.

use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};

use crate::arithmetic::util::{adc, sbb};
use crate::FieldBytes;

/// The number of 64-bit limbs used to represent a [`Scalar`].
const LIMBS: usize = 4;

/// Constant representing the modulus
/// n = FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFE BAAEDCE6 AF48A03B BFD25E8C D0364141
pub(crate) const MODULUS: [u64; LIMBS] = [
    0xBFD2_5E8C_D036_4141,
    0xBAAE_DCE6_AF48_A03B,
    0xFFFF_FFFF_FFFF_FFFE,
    0xFFFF_FFFF_FFFF_FFFF,
];

/// Limbs of `2^256 - n`. Only the low two limbs carry information;
/// the third is exactly 1 and the fourth 0.
const NEG_MODULUS: [u64; 2] = [!MODULUS[0] + 1, !MODULUS[1]];

/// The exponent for Fermat inversion, `n - 2`.
const MODULUS_MINUS_TWO: [u64; LIMBS] = [
    MODULUS[0] - 2,
    MODULUS[1],
    MODULUS[2],
    MODULUS[3],
];

/// An integer modulo the group order, always held in canonical form
/// (strictly below `n`).
#[derive(Clone, Copy, Debug, Default)]
pub struct Scalar(pub(crate) [u64; LIMBS]);

impl Scalar {
    /// Zero scalar.
    pub const ZERO: Self = Self([0, 0, 0, 0]);

    /// Multiplicative identity.
    pub const ONE: Self = Self([1, 0, 0, 0]);

    /// Parses the byte array as a big-endian integer in the range `[0, n)`.
    pub fn from_bytes(bytes: &FieldBytes) -> CtOption<Self> {
        Self::from_words(Self::words_from_be_bytes(bytes))
    }

    /// Parses the byte array as a big-endian integer and reduces it
    /// modulo `n`. Used where an arbitrary 256-bit value (a message hash,
    /// an affine X coordinate) enters scalar arithmetic.
    pub fn from_bytes_reduced(bytes: &FieldBytes) -> Self {
        let w = Self::words_from_be_bytes(bytes);

        // 2^256 < 2n, so a single conditional subtraction suffices.
        let (r0, borrow) = sbb(w[0], MODULUS[0], 0);
        let (r1, borrow) = sbb(w[1], MODULUS[1], borrow);
        let (r2, borrow) = sbb(w[2], MODULUS[2], borrow);
        let (r3, borrow) = sbb(w[3], MODULUS[3], borrow);
        let underflow = Choice::from((borrow >> 63) as u8);

        Self(conditional_select(&[r0, r1, r2, r3], &w, underflow))
    }

    /// Builds a scalar from little-endian words, checking the range.
    pub fn from_words(w: [u64; LIMBS]) -> CtOption<Self> {
        // If w < n then w - n underflows, leaving a borrow of 2^64 - 1.
        let (_, borrow) = sbb(w[0], MODULUS[0], 0);
        let (_, borrow) = sbb(w[1], MODULUS[1], borrow);
        let (_, borrow) = sbb(w[2], MODULUS[2], borrow);
        let (_, borrow) = sbb(w[3], MODULUS[3], borrow);
        let is_some = (borrow as u8) & 1;

        CtOption::new(Self(w), Choice::from(is_some))
    }

    /// Returns the raw little-endian words of the scalar.
    pub const fn to_words(self) -> [u64; LIMBS] {
        self.0
    }

    /// Returns the big-endian encoding of this scalar.
    pub fn to_bytes(&self) -> FieldBytes {
        let mut ret = [0; 32];
        ret[0..8].copy_from_slice(&self.0[3].to_be_bytes());
        ret[8..16].copy_from_slice(&self.0[2].to_be_bytes());
        ret[16..24].copy_from_slice(&self.0[1].to_be_bytes());
        ret[24..32].copy_from_slice(&self.0[0].to_be_bytes());
        ret
    }

    /// Is this scalar zero?
    pub fn is_zero(&self) -> Choice {
        self.ct_eq(&Self::ZERO)
    }

    /// Returns `self + rhs mod n`.
    pub fn add(&self, rhs: &Self) -> Self {
        let (s0, carry) = adc(self.0[0], rhs.0[0], 0);
        let (s1, carry) = adc(self.0[1], rhs.0[1], carry);
        let (s2, carry) = adc(self.0[2], rhs.0[2], carry);
        let (s3, carry) = adc(self.0[3], rhs.0[3], carry);

        // Both operands are canonical, so the sum is below 2n: subtract n
        // once if the addition carried or the raw sum is at least n. (When
        // it carried, the subtraction's borrow cancels against the carry.)
        let (d0, borrow) = sbb(s0, MODULUS[0], 0);
        let (d1, borrow) = sbb(s1, MODULUS[1], borrow);
        let (d2, borrow) = sbb(s2, MODULUS[2], borrow);
        let (d3, borrow) = sbb(s3, MODULUS[3], borrow);
        let take_diff = Choice::from(carry as u8) | !Choice::from((borrow >> 63) as u8);

        Self(conditional_select(
            &[s0, s1, s2, s3],
            &[d0, d1, d2, d3],
            take_diff,
        ))
    }

    /// Returns `self - rhs mod n`.
    pub fn sub(&self, rhs: &Self) -> Self {
        let (d0, borrow) = sbb(self.0[0], rhs.0[0], 0);
        let (d1, borrow) = sbb(self.0[1], rhs.0[1], borrow);
        let (d2, borrow) = sbb(self.0[2], rhs.0[2], borrow);
        let (d3, borrow) = sbb(self.0[3], rhs.0[3], borrow);

        // On underflow the borrow is all-ones; use it as a mask to add the
        // modulus back in.
        let (r0, carry) = adc(d0, MODULUS[0] & borrow, 0);
        let (r1, carry) = adc(d1, MODULUS[1] & borrow, carry);
        let (r2, carry) = adc(d2, MODULUS[2] & borrow, carry);
        let (r3, _) = adc(d3, MODULUS[3] & borrow, carry);

        Self([r0, r1, r2, r3])
    }

    /// Returns `self * rhs mod n`.
    pub fn mul(&self, rhs: &Self) -> Self {
        self.mul_wide(rhs).reduce()
    }

    /// Computes the full 512-bit product.
    fn mul_wide(&self, rhs: &Self) -> WideScalar {
        let mut w = [0u64; 8];
        for i in 0..LIMBS {
            let mut carry = 0u128;
            for j in 0..LIMBS {
                let v =
                    (w[i + j] as u128) + (self.0[i] as u128) * (rhs.0[j] as u128) + carry;
                w[i + j] = v as u64;
                carry = v >> 64;
            }
            w[i + LIMBS] = carry as u64;
        }
        WideScalar(w)
    }

    /// Returns the multiplicative inverse of the scalar, or `None` for
    /// zero.
    ///
    /// Fermat inversion: `self^(n - 2)`, a fixed square-and-multiply
    /// sequence over the constant exponent.
    pub fn invert(&self) -> CtOption<Self> {
        let res = self.pow_fixed(&MODULUS_MINUS_TWO);
        CtOption::new(res, !self.is_zero())
    }

    /// Raises the scalar to a compile-time-constant exponent. The branch
    /// below depends only on the constant exponent bits, so the executed
    /// operation sequence is fixed.
    fn pow_fixed(&self, exp: &[u64; LIMBS]) -> Self {
        let mut res = Self::ONE;
        for i in (0..LIMBS).rev() {
            for j in (0..64).rev() {
                res = res.mul(&res);
                if (exp[i] >> j) & 1 == 1 {
                    res = res.mul(self);
                }
            }
        }
        res
    }

    fn words_from_be_bytes(bytes: &FieldBytes) -> [u64; LIMBS] {
        let mut w = [0u64; LIMBS];
        w[3] = u64::from_be_bytes(bytes[0..8].try_into().unwrap());
        w[2] = u64::from_be_bytes(bytes[8..16].try_into().unwrap());
        w[1] = u64::from_be_bytes(bytes[16..24].try_into().unwrap());
        w[0] = u64::from_be_bytes(bytes[24..32].try_into().unwrap());
        w
    }
}

#[inline(always)]
fn conditional_select(a: &[u64; 4], b: &[u64; 4], choice: Choice) -> [u64; 4] {
    [
        u64::conditional_select(&a[0], &b[0], choice),
        u64::conditional_select(&a[1], &b[1], choice),
        u64::conditional_select(&a[2], &b[2], choice),
        u64::conditional_select(&a[3], &b[3], choice),
    ]
}

/// A 512-bit product of two scalars, pending reduction.
#[derive(Clone, Copy, Debug)]
struct WideScalar([u64; 8]);

impl WideScalar {
    /// Reduces the value modulo `n` by repeatedly folding the high half
    /// into the low half via `2^256 ≡ 2^256 - n (mod n)`. The fold widths
    /// shrink quickly: 512 → 386 → 261 → 257 → 256 bits, after which one
    /// conditional subtraction lands in the canonical range.
    fn reduce(&self) -> Scalar {
        let v = fold(&self.0[4..8], &[self.0[0], self.0[1], self.0[2], self.0[3]]);
        let v = fold(&v[4..7], &[v[0], v[1], v[2], v[3]]);
        let v = fold(&v[4..5], &[v[0], v[1], v[2], v[3]]);
        let v = fold(&v[4..5], &[v[0], v[1], v[2], v[3]]);
        debug_assert!(v[4..].iter().all(|&w| w == 0));

        let (d0, borrow) = sbb(v[0], MODULUS[0], 0);
        let (d1, borrow) = sbb(v[1], MODULUS[1], borrow);
        let (d2, borrow) = sbb(v[2], MODULUS[2], borrow);
        let (d3, borrow) = sbb(v[3], MODULUS[3], borrow);
        let underflow = Choice::from((borrow >> 63) as u8);

        Scalar(conditional_select(
            &[d0, d1, d2, d3],
            &[v[0], v[1], v[2], v[3]],
            underflow,
        ))
    }
}

/// Computes `hi * (2^256 - n) + lo` into an 8-limb buffer.
/// `2^256 - n` is a 129-bit constant: two full limbs plus a third equal
/// to 1, so the product is three shifted single-limb multiplications.
fn fold(hi: &[u64], lo: &[u64; 4]) -> [u64; 8] {
    let mut out = [0u64; 8];
    out[..4].copy_from_slice(lo);
    add_mul_shifted(&mut out, hi, NEG_MODULUS[0], 0);
    add_mul_shifted(&mut out, hi, NEG_MODULUS[1], 1);
    add_mul_shifted(&mut out, hi, 1, 2);
    out
}

/// Adds `a * b * 2^(64 * shift)` into `acc`, rippling the carry through
/// every remaining limb. The caller guarantees the result fits.
fn add_mul_shifted(acc: &mut [u64; 8], a: &[u64], b: u64, shift: usize) {
    let mut carry = 0u128;
    for (i, &limb) in a.iter().enumerate() {
        let v = (acc[shift + i] as u128) + (limb as u128) * (b as u128) + carry;
        acc[shift + i] = v as u64;
        carry = v >> 64;
    }
    for limb in acc.iter_mut().skip(shift + a.len()) {
        let v = (*limb as u128) + carry;
        *limb = v as u64;
        carry = v >> 64;
    }
    debug_assert_eq!(carry, 0);
}

impl From<u32> for Scalar {
    fn from(k: u32) -> Self {
        Self([k as u64, 0, 0, 0])
    }
}

impl From<u64> for Scalar {
    fn from(k: u64) -> Self {
        Self([k, 0, 0, 0])
    }
}

impl ConditionallySelectable for Scalar {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self(conditional_select(&a.0, &b.0, choice))
    }
}

impl ConstantTimeEq for Scalar {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0[0].ct_eq(&other.0[0])
            & self.0[1].ct_eq(&other.0[1])
            & self.0[2].ct_eq(&other.0[2])
            & self.0[3].ct_eq(&other.0[3])
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for Scalar {}

impl Neg for Scalar {
    type Output = Scalar;

    fn neg(self) -> Scalar {
        let (w0, borrow) = sbb(MODULUS[0], self.0[0], 0);
        let (w1, borrow) = sbb(MODULUS[1], self.0[1], borrow);
        let (w2, borrow) = sbb(MODULUS[2], self.0[2], borrow);
        let (w3, _) = sbb(MODULUS[3], self.0[3], borrow);
        Scalar::conditional_select(&Scalar([w0, w1, w2, w3]), &Scalar::ZERO, self.is_zero())
    }
}

impl Add<&Scalar> for &Scalar {
    type Output = Scalar;

    fn add(self, other: &Scalar) -> Scalar {
        Scalar::add(self, other)
    }
}

impl Add<&Scalar> for Scalar {
    type Output = Scalar;

    fn add(self, other: &Scalar) -> Scalar {
        Scalar::add(&self, other)
    }
}

impl AddAssign<Scalar> for Scalar {
    fn add_assign(&mut self, rhs: Scalar) {
        *self = Scalar::add(self, &rhs);
    }
}

impl Sub<&Scalar> for &Scalar {
    type Output = Scalar;

    fn sub(self, other: &Scalar) -> Scalar {
        Scalar::sub(self, other)
    }
}

impl Sub<&Scalar> for Scalar {
    type Output = Scalar;

    fn sub(self, other: &Scalar) -> Scalar {
        Scalar::sub(&self, other)
    }
}

impl SubAssign<Scalar> for Scalar {
    fn sub_assign(&mut self, rhs: Scalar) {
        *self = Scalar::sub(self, &rhs);
    }
}

impl Mul<&Scalar> for &Scalar {
    type Output = Scalar;

    fn mul(self, other: &Scalar) -> Scalar {
        Scalar::mul(self, other)
    }
}

impl Mul<&Scalar> for Scalar {
    type Output = Scalar;

    fn mul(self, other: &Scalar) -> Scalar {
        Scalar::mul(&self, other)
    }
}

impl MulAssign<Scalar> for Scalar {
    fn mul_assign(&mut self, rhs: Scalar) {
        *self = Scalar::mul(self, &rhs);
    }
}
