//! Field element backend using 64-bit limbs.
//!
//! An element is held as 5 little-endian limbs of 52 bits each (the last
//! limb carries 48 bits in normalized form), leaving 12 bits of headroom
//! per limb so that several additions can be accumulated before a
//! reduction is forced. The *magnitude* of an element bounds how much
//! headroom has been consumed: a magnitude-`m` element has limbs at most
//! `2 * m` times the normalized limb capacity.

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};

use crate::FieldBytes;

/// Mask of the low 52 bits of a limb.
const LIMB_MASK: u64 = 0xFFFF_FFFF_FFFF_F;

/// Mask of the low 48 bits of the top limb.
const TOP_MASK: u64 = 0xFFFF_FFFF_FFFF;

/// `2^256 - p`, the correction added per multiple of `2^256` folded away.
const REDUCTION: u64 = 0x1_0000_03D1;

/// `(2^256 - p) << 4`, the correction per multiple of `2^260`.
const REDUCTION_SHIFTED: u128 = 0x1_0000_03D1_0;

/// Lowest limb of the modulus `p` in this representation.
const MODULUS_LIMB_0: u64 = 0xFFFF_EFFF_FFC2F;

/// Loads a big-endian `u64` from `bytes` at `offset`.
const fn load_be(bytes: &[u8; 32], offset: usize) -> u64 {
    (bytes[offset] as u64) << 56
        | (bytes[offset + 1] as u64) << 48
        | (bytes[offset + 2] as u64) << 40
        | (bytes[offset + 3] as u64) << 32
        | (bytes[offset + 4] as u64) << 24
        | (bytes[offset + 5] as u64) << 16
        | (bytes[offset + 6] as u64) << 8
        | (bytes[offset + 7] as u64)
}

/// An integer modulo the field characteristic, 64-bit limb representation.
#[derive(Clone, Copy, Debug)]
pub struct FieldElement5x52(pub(crate) [u64; 5]);

impl FieldElement5x52 {
    /// Additive identity.
    pub const ZERO: Self = Self([0, 0, 0, 0, 0]);

    /// Multiplicative identity.
    pub const ONE: Self = Self([1, 0, 0, 0, 0]);

    /// Interprets the byte array as a big-endian integer.
    /// Does not check the result for being in the range `[0, p)`.
    pub(crate) const fn from_bytes_unchecked(bytes: &[u8; 32]) -> Self {
        let w3 = load_be(bytes, 0);
        let w2 = load_be(bytes, 8);
        let w1 = load_be(bytes, 16);
        let w0 = load_be(bytes, 24);

        Self([
            w0 & LIMB_MASK,
            (w0 >> 52) | ((w1 << 12) & LIMB_MASK),
            (w1 >> 40) | ((w2 << 24) & LIMB_MASK),
            (w2 >> 28) | ((w3 << 36) & LIMB_MASK),
            w3 >> 16,
        ])
    }

    /// Parses the byte array as a big-endian integer in the range `[0, p)`.
    pub fn from_bytes(bytes: &FieldBytes) -> CtOption<Self> {
        let res = Self::from_bytes_unchecked(bytes);
        CtOption::new(res, !res.get_overflow())
    }

    /// Converts a small integer into a field element.
    pub const fn from_u64(val: u64) -> Self {
        Self([val & LIMB_MASK, val >> 52, 0, 0, 0])
    }

    /// Returns the big-endian encoding of this (normalized) field element.
    pub fn to_bytes(self) -> FieldBytes {
        debug_assert!(self.0[4] >> 48 == 0);

        let w0 = self.0[0] | (self.0[1] << 52);
        let w1 = (self.0[1] >> 12) | (self.0[2] << 40);
        let w2 = (self.0[2] >> 24) | (self.0[3] << 28);
        let w3 = (self.0[3] >> 36) | (self.0[4] << 16);

        let mut ret = [0u8; 32];
        ret[0..8].copy_from_slice(&w3.to_be_bytes());
        ret[8..16].copy_from_slice(&w2.to_be_bytes());
        ret[16..24].copy_from_slice(&w1.to_be_bytes());
        ret[24..32].copy_from_slice(&w0.to_be_bytes());
        ret
    }

    /// Adds `x * (2^256 - p)` to the element and propagates carries up the
    /// limbs. The top limb absorbs the final carry unmasked.
    fn reduce_with(&self, x: u64) -> Self {
        let t0 = self.0[0] + x * REDUCTION;
        let t1 = self.0[1] + (t0 >> 52);
        let t2 = self.0[2] + (t1 >> 52);
        let t3 = self.0[3] + (t2 >> 52);
        let t4 = self.0[4] + (t3 >> 52);

        Self([
            t0 & LIMB_MASK,
            t1 & LIMB_MASK,
            t2 & LIMB_MASK,
            t3 & LIMB_MASK,
            t4,
        ])
    }

    /// Splits off the bits of the top limb beyond bit 48, i.e. the multiple
    /// of `2^256` currently held in the element.
    fn split_top(&self) -> (Self, u64) {
        let x = self.0[4] >> 48;
        (
            Self([self.0[0], self.0[1], self.0[2], self.0[3], self.0[4] & TOP_MASK]),
            x,
        )
    }

    /// Checks whether the element, assumed to be weakly normalized,
    /// is greater than or equal to the modulus.
    fn get_overflow(&self) -> Choice {
        let m = self.0[1] & self.0[2] & self.0[3];
        let x = (self.0[4] >> 48 != 0)
            | ((self.0[4] == TOP_MASK) & (m == LIMB_MASK) & (self.0[0] >= MODULUS_LIMB_0));
        Choice::from(x as u8)
    }

    /// Brings the magnitude to 1, without guaranteeing a value below the
    /// modulus.
    pub fn normalize_weak(&self) -> Self {
        let (t, x) = self.split_top();
        let res = t.reduce_with(x);

        // One pass leaves at most a single carry bit above bit 48
        debug_assert!(res.0[4] >> 49 == 0);

        res
    }

    /// Fully normalizes the element into the canonical range `[0, p)`.
    ///
    /// The number of primitive steps is fixed: a weak normalization, an
    /// unconditional extra reduction, and a masked select between the two.
    pub fn normalize(&self) -> Self {
        let res = self.normalize_weak();
        let overflow = res.get_overflow();

        // Performed unconditionally; the select below decides whether the
        // corrected value is kept.
        let (corrected, x) = res.reduce_with(1).split_top();
        debug_assert!(x == overflow.unwrap_u8() as u64);

        Self::conditional_select(&res, &corrected, overflow)
    }

    /// Checks whether the element would normalize to zero, without
    /// computing the full normalization.
    pub fn normalizes_to_zero(&self) -> Choice {
        let res = self.normalize_weak();

        // The weakly normalized value represents zero iff its raw limbs are
        // all zero or equal the modulus exactly.
        let z0 = res.0[0] | res.0[1] | res.0[2] | res.0[3] | res.0[4];
        let z1 = (res.0[0] ^ MODULUS_LIMB_0)
            | (res.0[1] ^ LIMB_MASK)
            | (res.0[2] ^ LIMB_MASK)
            | (res.0[3] ^ LIMB_MASK)
            | (res.0[4] ^ TOP_MASK);

        Choice::from(((z0 == 0) | (z1 == 0)) as u8)
    }

    /// Determines if the element is the additive identity (raw limbs only;
    /// the element must be normalized).
    pub fn is_zero(&self) -> Choice {
        Choice::from(
            ((self.0[0] | self.0[1] | self.0[2] | self.0[3] | self.0[4]) == 0) as u8,
        )
    }

    /// Returns `-self`, treating the input as having the given magnitude.
    /// Raises the magnitude by 1.
    pub const fn negate(&self, magnitude: u32) -> Self {
        let m = (magnitude + 1) as u64;
        Self([
            MODULUS_LIMB_0 * 2 * m - self.0[0],
            LIMB_MASK * 2 * m - self.0[1],
            LIMB_MASK * 2 * m - self.0[2],
            LIMB_MASK * 2 * m - self.0[3],
            TOP_MASK * 2 * m - self.0[4],
        ])
    }

    /// Returns `self + rhs`; magnitudes add.
    pub const fn add(&self, rhs: &Self) -> Self {
        Self([
            self.0[0] + rhs.0[0],
            self.0[1] + rhs.0[1],
            self.0[2] + rhs.0[2],
            self.0[3] + rhs.0[3],
            self.0[4] + rhs.0[4],
        ])
    }

    /// Multiplies by a small integer; the magnitude is multiplied by it.
    pub const fn mul_single(&self, rhs: u32) -> Self {
        let rhs = rhs as u64;
        Self([
            self.0[0] * rhs,
            self.0[1] * rhs,
            self.0[2] * rhs,
            self.0[3] * rhs,
            self.0[4] * rhs,
        ])
    }

    /// Full 512-bit product followed by reduction via
    /// `2^256 ≡ 2^32 + 977 (mod p)`, done in two passes: a schoolbook
    /// product carried into 52-bit limbs, then the high limbs folded back
    /// into the low ones.
    #[inline(always)]
    fn mul_inner(&self, rhs: &Self) -> Self {
        debug_assert!(self.0[0] >> 56 == 0);
        debug_assert!(self.0[1] >> 56 == 0);
        debug_assert!(self.0[2] >> 56 == 0);
        debug_assert!(self.0[3] >> 56 == 0);
        debug_assert!(self.0[4] >> 52 == 0);
        debug_assert!(rhs.0[0] >> 56 == 0);
        debug_assert!(rhs.0[1] >> 56 == 0);
        debug_assert!(rhs.0[2] >> 56 == 0);
        debug_assert!(rhs.0[3] >> 56 == 0);
        debug_assert!(rhs.0[4] >> 52 == 0);

        // Schoolbook product: prod[k] = sum(a[i] * b[k - i]).
        // Each term is below 2^112, each sum below 2^115.
        let mut prod = [0u128; 9];
        for i in 0..5 {
            for j in 0..5 {
                prod[i + j] += (self.0[i] as u128) * (rhs.0[j] as u128);
            }
        }

        // Carry-propagate the product into 52-bit limbs t[0..9] plus a
        // residual t9 (the coefficient of 2^468, below 2^63).
        let mut t = [0u64; 9];
        let mut carry = 0u128;
        for k in 0..9 {
            let v = prod[k] + carry;
            t[k] = (v as u64) & LIMB_MASK;
            carry = v >> 52;
        }
        let t9 = carry as u64;

        // Fold the high limbs: 2^(52 * (k + 5)) ≡ 2^(52 * k) * R (mod p),
        // where R = (2^32 + 977) << 4.
        let mut acc = [0u128; 5];
        for k in 0..4 {
            acc[k] = (t[k] as u128) + (t[k + 5] as u128) * REDUCTION_SHIFTED;
        }
        acc[4] = (t[4] as u128) + (t9 as u128) * REDUCTION_SHIFTED;

        let mut r = [0u64; 5];
        let mut carry = 0u128;
        for k in 0..5 {
            let v = acc[k] + carry;
            r[k] = (v as u64) & LIMB_MASK;
            carry = v >> 52;
        }

        // The carry out of the top limb counts multiples of 2^260; fold it
        // once more and ripple the (tiny) carry through.
        let mut v = (r[0] as u128) + carry * REDUCTION_SHIFTED;
        r[0] = (v as u64) & LIMB_MASK;
        for limb in r.iter_mut().skip(1) {
            v = (*limb as u128) + (v >> 52);
            *limb = (v as u64) & LIMB_MASK;
        }
        let spill = (v >> 52) as u64;

        // Strip the top limb down to 48 bits, folding the excess (a
        // multiple of 2^256) into the bottom.
        let x = (r[4] >> 48) | (spill << 4);
        r[4] &= TOP_MASK;
        let v = (r[0] as u128) + (x as u128) * (REDUCTION as u128);
        r[0] = (v as u64) & LIMB_MASK;
        let v = (r[1] as u128) + (v >> 52);
        r[1] = (v as u64) & LIMB_MASK;
        r[2] += (v >> 52) as u64;

        debug_assert!(r[4] >> 49 == 0);

        Self(r)
    }

    /// Returns `self * rhs mod p` with magnitude 1 (not normalized).
    /// Argument magnitudes must be at most 8.
    #[inline(always)]
    pub fn mul(&self, rhs: &Self) -> Self {
        self.mul_inner(rhs)
    }

    /// Returns `self * self` with magnitude 1 (not normalized).
    /// The argument magnitude must be at most 8.
    pub fn square(&self) -> Self {
        self.mul_inner(self)
    }
}

impl Default for FieldElement5x52 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl ConditionallySelectable for FieldElement5x52 {
    #[inline(always)]
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self([
            u64::conditional_select(&a.0[0], &b.0[0], choice),
            u64::conditional_select(&a.0[1], &b.0[1], choice),
            u64::conditional_select(&a.0[2], &b.0[2], choice),
            u64::conditional_select(&a.0[3], &b.0[3], choice),
            u64::conditional_select(&a.0[4], &b.0[4], choice),
        ])
    }
}

impl ConstantTimeEq for FieldElement5x52 {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0[0].ct_eq(&other.0[0])
            & self.0[1].ct_eq(&other.0[1])
            & self.0[2].ct_eq(&other.0[2])
            & self.0[3].ct_eq(&other.0[3])
            & self.0[4].ct_eq(&other.0[4])
    }
}
