//! ECDSA signature verification over secp256k1.
//!
//! Only verification of prehashed messages is provided; producing the
//! 32-byte message digest is the caller's concern.

use subtle::CtOption;

use crate::arithmetic::{AffinePoint, ProjectivePoint};
use crate::{FieldBytes, Scalar};

/// An ECDSA signature: the pair `(r, s)` of scalars.
///
/// Both components are nonzero and below the group order by
/// construction, so verification never has to revalidate them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    r: Scalar,
    s: Scalar,
}

impl Signature {
    /// Assembles a signature from its two scalar components, rejecting
    /// a zero `r` or `s`.
    pub fn from_scalars(r: Scalar, s: Scalar) -> Option<Self> {
        if bool::from(r.is_zero() | s.is_zero()) {
            return None;
        }
        Some(Self { r, s })
    }

    /// Parses a fixed-size signature: `r || s`, each a 32-byte
    /// big-endian integer in the range `[1, n)`.
    pub fn from_bytes(bytes: &[u8; 64]) -> Option<Self> {
        let r_bytes: &FieldBytes = bytes[..32].try_into().ok()?;
        let s_bytes: &FieldBytes = bytes[32..].try_into().ok()?;
        let r = Option::from(Scalar::from_bytes(r_bytes))?;
        let s = Option::from(Scalar::from_bytes(s_bytes))?;
        Self::from_scalars(r, s)
    }

    /// The `r` component.
    pub fn r(&self) -> Scalar {
        self.r
    }

    /// The `s` component.
    pub fn s(&self) -> Scalar {
        self.s
    }

    /// Serializes the signature as `r || s`.
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&self.r.to_bytes());
        bytes[32..].copy_from_slice(&self.s.to_bytes());
        bytes
    }
}

/// An ECDSA public key: a point on the curve, never the identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerifyingKey {
    inner: AffinePoint,
}

impl VerifyingKey {
    /// Builds a verifying key from affine coordinate encodings,
    /// checking that the point lies on the curve.
    pub fn from_affine_coords(x: &FieldBytes, y: &FieldBytes) -> CtOption<Self> {
        AffinePoint::from_coords(x, y).map(|inner| Self { inner })
    }

    /// The public key point.
    pub fn as_affine(&self) -> &AffinePoint {
        &self.inner
    }

    /// Verifies a signature over a prehashed message.
    ///
    /// Computes `w = s^-1 mod n`, `u1 = z * w`, `u2 = r * w` and
    /// `Q = u1 * G + u2 * PK`, then accepts iff `Q` is not the identity
    /// and its affine x-coordinate, reduced mod `n`, equals `r`.
    #[must_use]
    pub fn verify_prehashed(&self, prehash: &FieldBytes, signature: &Signature) -> bool {
        let z = Scalar::from_bytes_reduced(prehash);

        // s is nonzero by the Signature invariant, but stay total.
        let s_inv = match Option::<Scalar>::from(signature.s.invert()) {
            Some(s_inv) => s_inv,
            None => return false,
        };
        let u1 = z * &s_inv;
        let u2 = signature.r * &s_inv;

        let q = ProjectivePoint::mul_base(&u1) + &(ProjectivePoint::from(self.inner) * &u2);

        match Option::<AffinePoint>::from(q.to_affine()) {
            Some(q) => Scalar::from_bytes_reduced(&q.x().to_bytes()) == signature.r,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::{Signature, VerifyingKey};
    use crate::arithmetic::scalar::MODULUS;
    use crate::Scalar;

    const PUBKEY_X: [u8; 32] =
        hex!("d2e670a19c6d753d1a6d8b20bd045df8a08fb162cf508956c31268c6d81ffdab");
    const PUBKEY_Y: [u8; 32] =
        hex!("ab65528eefbb8057aa85d597258a3fbd481a24633bc9b47a9aa045c91371de52");
    const MSG_HASH: [u8; 32] =
        hex!("8de472e2399610baaa7f84840547cd409434e31f5d3bd71e4d947f283874f9c0");
    const SIG_R: [u8; 32] =
        hex!("fef45d2892953aa5bbcdb057b5e98b208f1617a7498af7eb765574e29b5d9c2c");
    const SIG_S: [u8; 32] =
        hex!("d47563f52aac6b04b55de236b7c515eb9311757db01e02cff079c3ca6efb063f");

    const PUBKEY2_X: [u8; 32] =
        hex!("f028892bad7ed57d2fb57bf33081d5cfcf6f9ed3d3d7f159c2e2fff579dc341a");
    const PUBKEY2_Y: [u8; 32] =
        hex!("07cf33da18bd734c600b96a72bbc4749d5141c90ec8ac328ae52ddfe2e505bdb");
    const MSG2_HASH: [u8; 32] =
        hex!("59162c6b059f619b0538f592de24e163061316572869ffc9a2648315dbe75997");
    const SIG2_R: [u8; 32] =
        hex!("17f53289eac961e5adc858d3ca50dab056ddca7a1a906c0815a0369312d1aa49");
    const SIG2_S: [u8; 32] =
        hex!("0d858eafa75373a36707fa8a117566af1da5e9fdf46854bf3957ec572da25fc9");

    fn signature(r: &[u8; 32], s: &[u8; 32]) -> Signature {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(r);
        bytes[32..].copy_from_slice(s);
        Signature::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn signature_accessors_round_trip() {
        let sig = signature(&SIG_R, &SIG_S);
        assert_eq!(sig.r().to_bytes(), SIG_R);
        assert_eq!(sig.s().to_bytes(), SIG_S);
        assert_eq!(Signature::from_bytes(&sig.to_bytes()).unwrap(), sig);
    }

    #[test]
    fn valid_signature_verifies() {
        let key = VerifyingKey::from_affine_coords(&PUBKEY_X, &PUBKEY_Y).unwrap();
        assert_eq!(key.as_affine().to_coords().0, PUBKEY_X);
        assert!(key.verify_prehashed(&MSG_HASH, &signature(&SIG_R, &SIG_S)));

        let key2 = VerifyingKey::from_affine_coords(&PUBKEY2_X, &PUBKEY2_Y).unwrap();
        assert!(key2.verify_prehashed(&MSG2_HASH, &signature(&SIG2_R, &SIG2_S)));
    }

    #[test]
    fn corrupted_signature_rejected() {
        let key = VerifyingKey::from_affine_coords(&PUBKEY_X, &PUBKEY_Y).unwrap();

        let mut r = SIG_R;
        r[17] ^= 0x40;
        assert!(!key.verify_prehashed(&MSG_HASH, &signature(&r, &SIG_S)));

        let mut s = SIG_S;
        s[3] ^= 0x01;
        assert!(!key.verify_prehashed(&MSG_HASH, &signature(&SIG_R, &s)));
    }

    #[test]
    fn corrupted_message_rejected() {
        let key = VerifyingKey::from_affine_coords(&PUBKEY_X, &PUBKEY_Y).unwrap();
        let mut hash = MSG_HASH;
        hash[0] ^= 0x80;
        assert!(!key.verify_prehashed(&hash, &signature(&SIG_R, &SIG_S)));
    }

    #[test]
    fn wrong_key_rejected() {
        let key2 = VerifyingKey::from_affine_coords(&PUBKEY2_X, &PUBKEY2_Y).unwrap();
        assert!(!key2.verify_prehashed(&MSG_HASH, &signature(&SIG_R, &SIG_S)));
    }

    #[test]
    fn out_of_range_components_rejected() {
        // Zero components
        assert!(Signature::from_scalars(Scalar::ZERO, Scalar::ONE).is_none());
        assert!(Signature::from_scalars(Scalar::ONE, Scalar::ZERO).is_none());

        // r = n and s = n must be rejected at parse time
        let n_bytes = Scalar(MODULUS).to_bytes();
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&n_bytes);
        bytes[32..].copy_from_slice(&SIG_S);
        assert!(Signature::from_bytes(&bytes).is_none());

        bytes[..32].copy_from_slice(&SIG_R);
        bytes[32..].copy_from_slice(&n_bytes);
        assert!(Signature::from_bytes(&bytes).is_none());
    }

    #[test]
    fn off_curve_key_rejected() {
        let mut y = PUBKEY_Y;
        y[31] ^= 1;
        assert!(bool::from(
            VerifyingKey::from_affine_coords(&PUBKEY_X, &y).is_none()
        ));
    }
}
