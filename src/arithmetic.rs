//! Group arithmetic for secp256k1 in Jacobian coordinates.
//!
//! A Jacobian triple `(X, Y, Z)` with `Z != 0` represents the affine point
//! `(X / Z^2, Y / Z^3)`; any triple with `Z = 0` represents the point at
//! infinity. Stored coordinates always have magnitude 1.

pub mod field;
pub(crate) mod mul;
pub mod scalar;
pub(crate) mod util;

use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use hex_literal::hex;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};

use crate::FieldBytes;
use self::field::FieldElement;

/// b = 7: the constant term of the curve equation `y^2 = x^3 + 7`.
const CURVE_EQUATION_B: FieldElement = FieldElement::from_u64(7);

/// A point on the curve in affine coordinates.
///
/// The point at infinity has no affine representation; conversions out of
/// Jacobian space surface it as `None`.
#[derive(Clone, Copy, Debug)]
pub struct AffinePoint {
    x: FieldElement,
    y: FieldElement,
}

impl AffinePoint {
    /// The base point of secp256k1.
    pub const GENERATOR: Self = Self {
        x: FieldElement::from_bytes_unchecked(&hex!(
            "79BE667EF9DCBBAC55A06295CE870B07029BFCDB2DCE28D959F2815B16F81798"
        )),
        y: FieldElement::from_bytes_unchecked(&hex!(
            "483ADA7726A3C4655DA4FBFC0E1108A8FD17B448A68554199C47D08FFB10D4B8"
        )),
    };

    /// Builds a point from affine coordinate encodings, checking that the
    /// coordinates are canonical and satisfy the curve equation.
    pub fn from_coords(x: &FieldBytes, y: &FieldBytes) -> CtOption<Self> {
        FieldElement::from_bytes(x).and_then(|x| {
            FieldElement::from_bytes(y).and_then(|y| {
                let rhs = x.square().mul(&x) + &CURVE_EQUATION_B;
                let on_curve = (y.square().negate(1) + &rhs).normalizes_to_zero();
                CtOption::new(Self { x, y }, on_curve)
            })
        })
    }

    /// The affine x-coordinate, in canonical form.
    pub fn x(&self) -> FieldElement {
        self.x.normalize()
    }

    /// The affine y-coordinate, in canonical form.
    pub fn y(&self) -> FieldElement {
        self.y.normalize()
    }

    /// Big-endian encodings of the two coordinates.
    pub fn to_coords(self) -> (FieldBytes, FieldBytes) {
        (self.x.to_bytes(), self.y.to_bytes())
    }
}

impl ConditionallySelectable for AffinePoint {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        AffinePoint {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
        }
    }
}

impl ConstantTimeEq for AffinePoint {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.x.ct_eq(&other.x) & self.y.ct_eq(&other.y)
    }
}

impl Default for AffinePoint {
    // The identity has no affine form, so the base point stands in as
    // the dummy value behind `CtOption` combinators.
    fn default() -> Self {
        Self::GENERATOR
    }
}

impl PartialEq for AffinePoint {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for AffinePoint {}

impl Neg for AffinePoint {
    type Output = AffinePoint;

    fn neg(self) -> Self {
        AffinePoint {
            x: self.x,
            y: self.y.negate(1).normalize(),
        }
    }
}

/// A point on the curve in Jacobian coordinates.
#[derive(Clone, Copy, Debug)]
pub struct ProjectivePoint {
    x: FieldElement,
    y: FieldElement,
    z: FieldElement,
}

impl ProjectivePoint {
    /// The point at infinity, the additive identity of the group.
    pub const IDENTITY: Self = Self {
        x: FieldElement::ONE,
        y: FieldElement::ONE,
        z: FieldElement::ZERO,
    };

    /// The base point of secp256k1.
    pub const GENERATOR: Self = Self {
        x: AffinePoint::GENERATOR.x,
        y: AffinePoint::GENERATOR.y,
        z: FieldElement::ONE,
    };

    /// Is this the point at infinity?
    pub fn is_identity(&self) -> Choice {
        self.z.normalizes_to_zero()
    }

    /// Converts to affine coordinates, computing `(X / Z^2, Y / Z^3)`.
    /// Returns `None` for the point at infinity.
    pub fn to_affine(&self) -> CtOption<AffinePoint> {
        self.z.invert().map(|zinv| {
            let zinv2 = zinv.square();
            AffinePoint {
                x: self.x.mul(&zinv2).normalize(),
                y: self.y.mul(&zinv2.mul(&zinv)).normalize(),
            }
        })
    }

    /// Doubles this point (`dbl-2009-l`).
    ///
    /// The formula has no exceptional inputs here: the curve has no points
    /// of order two, and for the identity `Z3 = 2*Y1*Z1` stays zero.
    pub fn double(&self) -> Self {
        let a = self.x.square();
        let b = self.y.square();
        let c = b.square();
        // d = 2*((x + b)^2 - a - c) = 4*x*b
        let d = ((self.x + &b).square() + &(a + &c).negate(2)).double();
        let e = a.mul_single(3);
        let f = e.square();

        let x = (f + &d.double().negate(16)).normalize_weak();
        let y = (e.mul(&(d + &x.negate(1)).normalize_weak())
            + &c.mul_single(8).negate(8))
            .normalize_weak();
        let z = self.y.mul(&self.z).double().normalize_weak();

        Self { x, y, z }
    }

    /// Adds two Jacobian points (`add-2007-bl`).
    ///
    /// The general formula breaks down when the operands share an affine
    /// x-coordinate (`H = 0`): equal points must be doubled, and opposite
    /// points sum to the identity. Both cases, and identity operands, are
    /// resolved by conditional selection after the main computation.
    pub fn add(&self, other: &Self) -> Self {
        let z1z1 = self.z.square();
        let z2z2 = other.z.square();
        let u1 = self.x.mul(&z2z2);
        let u2 = other.x.mul(&z1z1);
        let s1 = self.y.mul(&z2z2).mul(&other.z);
        let s2 = other.y.mul(&z1z1).mul(&self.z);

        let h = u2 + &u1.negate(1);
        let rr = (s2 + &s1.negate(1)).double();
        let h_is_zero = h.normalizes_to_zero();
        let rr_is_zero = rr.normalizes_to_zero();

        let i = h.double().square();
        let j = h.mul(&i);
        let v = u1.mul(&i);

        let x = (rr.square() + &j.negate(1) + &v.double().negate(2)).normalize_weak();
        let y = (rr.mul(&(v + &x.negate(1)).normalize_weak())
            + &s1.mul(&j).double().negate(2))
            .normalize_weak();
        let z = self.z.mul(&other.z).mul(&h).double().normalize_weak();

        let mut ret = Self { x, y, z };
        ret = Self::conditional_select(&ret, &Self::IDENTITY, h_is_zero & !rr_is_zero);
        ret = Self::conditional_select(&ret, &self.double(), h_is_zero & rr_is_zero);
        ret = Self::conditional_select(&ret, self, other.is_identity());
        ret = Self::conditional_select(&ret, other, self.is_identity());
        ret
    }

    /// Adds a Jacobian point and an affine point, exploiting `Z2 = 1`.
    /// Edge cases mirror [`ProjectivePoint::add`]; the affine operand is
    /// never the identity.
    pub fn add_mixed(&self, other: &AffinePoint) -> Self {
        let z1z1 = self.z.square();
        let u2 = other.x.mul(&z1z1);
        let s2 = other.y.mul(&z1z1).mul(&self.z);

        let h = u2 + &self.x.negate(1);
        let rr = (s2 + &self.y.negate(1)).double();
        let h_is_zero = h.normalizes_to_zero();
        let rr_is_zero = rr.normalizes_to_zero();

        let i = h.double().square();
        let j = h.mul(&i);
        let v = self.x.mul(&i);

        let x = (rr.square() + &j.negate(1) + &v.double().negate(2)).normalize_weak();
        let y = (rr.mul(&(v + &x.negate(1)).normalize_weak())
            + &self.y.mul(&j).double().negate(2))
            .normalize_weak();
        let z = self.z.mul(&h).double().normalize_weak();

        let mut ret = Self { x, y, z };
        ret = Self::conditional_select(&ret, &Self::IDENTITY, h_is_zero & !rr_is_zero);
        ret = Self::conditional_select(&ret, &self.double(), h_is_zero & rr_is_zero);
        ret = Self::conditional_select(&ret, &Self::from(*other), self.is_identity());
        ret
    }

    /// Returns `self - other`.
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// Returns `self - other`, where `other` is affine.
    pub fn sub_mixed(&self, other: &AffinePoint) -> Self {
        self.add_mixed(&other.neg())
    }

    /// Negates the point by negating the Y coordinate.
    pub fn neg(&self) -> Self {
        Self {
            x: self.x,
            y: self.y.negate(1).normalize_weak(),
            z: self.z,
        }
    }
}

impl From<AffinePoint> for ProjectivePoint {
    fn from(p: AffinePoint) -> Self {
        Self {
            x: p.x,
            y: p.y,
            z: FieldElement::ONE,
        }
    }
}

impl ConditionallySelectable for ProjectivePoint {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
            z: FieldElement::conditional_select(&a.z, &b.z, choice),
        }
    }
}

impl ConstantTimeEq for ProjectivePoint {
    /// Compares two Jacobian representations by cross-multiplying the
    /// coordinates, so points equal under different `Z` values compare
    /// equal without an inversion.
    fn ct_eq(&self, other: &Self) -> Choice {
        let id1 = self.is_identity();
        let id2 = other.is_identity();

        let z1z1 = self.z.square();
        let z2z2 = other.z.square();
        let x_eq = (self.x.mul(&z2z2) + &other.x.mul(&z1z1).negate(1)).normalizes_to_zero();
        let y_eq = (self.y.mul(&z2z2).mul(&other.z)
            + &other.y.mul(&z1z1).mul(&self.z).negate(1))
            .normalizes_to_zero();

        (id1 & id2) | (!id1 & !id2 & x_eq & y_eq)
    }
}

impl PartialEq for ProjectivePoint {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for ProjectivePoint {}

impl Default for ProjectivePoint {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Add<&ProjectivePoint> for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: &ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::add(self, other)
    }
}

impl Add<&ProjectivePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: &ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::add(&self, other)
    }
}

impl AddAssign<ProjectivePoint> for ProjectivePoint {
    fn add_assign(&mut self, rhs: ProjectivePoint) {
        *self = ProjectivePoint::add(self, &rhs);
    }
}

impl Add<&AffinePoint> for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: &AffinePoint) -> ProjectivePoint {
        ProjectivePoint::add_mixed(self, other)
    }
}

impl AddAssign<AffinePoint> for ProjectivePoint {
    fn add_assign(&mut self, rhs: AffinePoint) {
        *self = ProjectivePoint::add_mixed(self, &rhs);
    }
}

impl Sub<&ProjectivePoint> for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn sub(self, other: &ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::sub(self, other)
    }
}

impl Sub<&ProjectivePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn sub(self, other: &ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::sub(&self, other)
    }
}

impl SubAssign<ProjectivePoint> for ProjectivePoint {
    fn sub_assign(&mut self, rhs: ProjectivePoint) {
        *self = ProjectivePoint::sub(self, &rhs);
    }
}

impl Sub<&AffinePoint> for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn sub(self, other: &AffinePoint) -> ProjectivePoint {
        ProjectivePoint::sub_mixed(self, other)
    }
}

impl Neg for ProjectivePoint {
    type Output = ProjectivePoint;

    fn neg(self) -> ProjectivePoint {
        ProjectivePoint::neg(&self)
    }
}
