//! Field arithmetic modulo p = 2^256 - 2^32 - 977.

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(target_pointer_width = "64")] {
        mod field_5x52;
        use field_5x52::FieldElement5x52 as FieldElementImpl;
    } else {
        compile_error!("this crate requires a 64-bit target");
    }
}

use core::ops::{Add, AddAssign, Mul, MulAssign};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};

use crate::FieldBytes;

#[cfg(test)]
use num_bigint::{BigUint, ToBigUint};

/// An element in the finite field used for curve coordinates.
///
/// Stored with a *magnitude* contract inherited from the backend: additive
/// operations accumulate magnitude, multiplicative ones reset it to 1, and
/// [`FieldElement::normalize`] reduces to the canonical range `[0, p)`.
#[derive(Clone, Copy, Debug)]
pub struct FieldElement(FieldElementImpl);

impl FieldElement {
    /// Additive identity.
    pub const ZERO: Self = Self(FieldElementImpl::ZERO);

    /// Multiplicative identity.
    pub const ONE: Self = Self(FieldElementImpl::ONE);

    /// Determines if this element is the additive identity.
    /// The element must be normalized.
    pub fn is_zero(&self) -> Choice {
        self.0.is_zero()
    }

    /// Interprets the byte array as a big-endian integer, without checking
    /// that it lies in the canonical range.
    pub(crate) const fn from_bytes_unchecked(bytes: &[u8; 32]) -> Self {
        Self(FieldElementImpl::from_bytes_unchecked(bytes))
    }

    /// Parses a big-endian integer in the range `[0, p)`.
    ///
    /// Returns `None` (in constant time) for out-of-range encodings.
    pub fn from_bytes(bytes: &FieldBytes) -> CtOption<Self> {
        FieldElementImpl::from_bytes(bytes).map(Self)
    }

    /// Converts a small integer into a field element.
    pub const fn from_u64(val: u64) -> Self {
        Self(FieldElementImpl::from_u64(val))
    }

    /// Returns the big-endian encoding of this field element.
    pub fn to_bytes(self) -> FieldBytes {
        self.0.normalize().to_bytes()
    }

    /// Returns `-self`, treating it as a value of the given magnitude.
    /// The provided magnitude must be greater than or equal to the actual
    /// magnitude of `self`.
    pub fn negate(&self, magnitude: u32) -> Self {
        Self(self.0.negate(magnitude))
    }

    /// Fully normalizes the element: magnitude 1, value in `[0, p)`.
    pub fn normalize(&self) -> Self {
        Self(self.0.normalize())
    }

    /// Weakly normalizes the element: magnitude 1, value possibly still
    /// one modulus above the canonical range.
    pub fn normalize_weak(&self) -> Self {
        Self(self.0.normalize_weak())
    }

    /// Checks if the element would become zero if normalized.
    pub fn normalizes_to_zero(&self) -> Choice {
        self.0.normalizes_to_zero()
    }

    /// Multiplies by a small integer; multiplies the magnitude by it.
    pub fn mul_single(&self, rhs: u32) -> Self {
        Self(self.0.mul_single(rhs))
    }

    /// Returns `2 * self`; doubles the magnitude.
    pub fn double(&self) -> Self {
        Self(self.0.add(&self.0))
    }

    /// Returns `self * rhs mod p` with magnitude 1 (not normalized).
    /// Argument magnitudes must be at most 8.
    pub fn mul(&self, rhs: &Self) -> Self {
        Self(self.0.mul(&rhs.0))
    }

    /// Returns `self * self` with magnitude 1 (not normalized).
    /// The argument magnitude must be at most 8.
    pub fn square(&self) -> Self {
        Self(self.0.square())
    }

    /// Raises the element to the power `2^k`.
    fn pow2k(&self, k: usize) -> Self {
        let mut x = *self;
        for _ in 0..k {
            x = x.square();
        }
        x
    }

    /// Returns the multiplicative inverse, or `None` if the element is
    /// zero (inversion of zero is signaled, never given a value).
    ///
    /// Computed as `self^(p - 2)` per Fermat's little theorem, using a
    /// fixed addition chain over the 5 blocks of ones in the binary
    /// representation of `p - 2` (block lengths 1, 2, 22, 223). The result
    /// has magnitude 1 but is not normalized.
    pub fn invert(&self) -> CtOption<Self> {
        let x2 = self.pow2k(1).mul(self);
        let x3 = x2.pow2k(1).mul(self);
        let x6 = x3.pow2k(3).mul(&x3);
        let x9 = x6.pow2k(3).mul(&x3);
        let x11 = x9.pow2k(2).mul(&x2);
        let x22 = x11.pow2k(11).mul(&x11);
        let x44 = x22.pow2k(22).mul(&x22);
        let x88 = x44.pow2k(44).mul(&x44);
        let x176 = x88.pow2k(88).mul(&x88);
        let x220 = x176.pow2k(44).mul(&x44);
        let x223 = x220.pow2k(3).mul(&x3);

        let res = x223
            .pow2k(23)
            .mul(&x22)
            .pow2k(5)
            .mul(self)
            .pow2k(3)
            .mul(&x2)
            .pow2k(2)
            .mul(self);

        CtOption::new(res, !self.normalizes_to_zero())
    }

    /// Returns the square root of the element, or `None` if none exists.
    ///
    /// Since p ≡ 3 (mod 4), the candidate root is `self^((p + 1) / 4)`;
    /// it is squared and compared against the input to decide which of
    /// `a` and `-a` was actually a quadratic residue. The result has
    /// magnitude 1 but is not normalized.
    pub fn sqrt(&self) -> CtOption<Self> {
        let x2 = self.pow2k(1).mul(self);
        let x3 = x2.pow2k(1).mul(self);
        let x6 = x3.pow2k(3).mul(&x3);
        let x9 = x6.pow2k(3).mul(&x3);
        let x11 = x9.pow2k(2).mul(&x2);
        let x22 = x11.pow2k(11).mul(&x11);
        let x44 = x22.pow2k(22).mul(&x22);
        let x88 = x44.pow2k(44).mul(&x44);
        let x176 = x88.pow2k(88).mul(&x88);
        let x220 = x176.pow2k(44).mul(&x44);
        let x223 = x220.pow2k(3).mul(&x3);

        let res = x223.pow2k(23).mul(&x22).pow2k(6).mul(&x2).pow2k(2);

        let is_root = (res.mul(&res).negate(1) + self).normalizes_to_zero();
        CtOption::new(res, is_root)
    }

    #[cfg(test)]
    pub fn modulus_as_biguint() -> BigUint {
        Self::ONE.negate(1).to_biguint().unwrap() + 1.to_biguint().unwrap()
    }
}

impl PartialEq for FieldElement {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Default for FieldElement {
    fn default() -> Self {
        Self::ZERO
    }
}

impl ConditionallySelectable for FieldElement {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self(FieldElementImpl::conditional_select(&a.0, &b.0, choice))
    }
}

impl ConstantTimeEq for FieldElement {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl Add<&FieldElement> for &FieldElement {
    type Output = FieldElement;

    fn add(self, other: &FieldElement) -> FieldElement {
        FieldElement(self.0.add(&other.0))
    }
}

impl Add<&FieldElement> for FieldElement {
    type Output = FieldElement;

    fn add(self, other: &FieldElement) -> FieldElement {
        FieldElement(self.0.add(&other.0))
    }
}

impl AddAssign<FieldElement> for FieldElement {
    fn add_assign(&mut self, rhs: FieldElement) {
        *self = *self + &rhs;
    }
}

impl Mul<&FieldElement> for &FieldElement {
    type Output = FieldElement;

    fn mul(self, other: &FieldElement) -> FieldElement {
        FieldElement(self.0.mul(&other.0))
    }
}

impl Mul<&FieldElement> for FieldElement {
    type Output = FieldElement;

    fn mul(self, other: &FieldElement) -> FieldElement {
        FieldElement(self.0.mul(&other.0))
    }
}

impl MulAssign<FieldElement> for FieldElement {
    fn mul_assign(&mut self, rhs: FieldElement) {
        *self = *self * &rhs;
    }
}
