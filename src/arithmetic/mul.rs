//! Scalar multiplication using width-w non-adjacent form recoding.
//!
//! A scalar is recoded into signed odd digits so that any `w` consecutive
//! digits contain at most one nonzero entry, cutting the number of point
//! additions to roughly 1 in `w + 1` doublings. Variable-base
//! multiplication uses window width 4 with a small per-call table of odd
//! multiples; fixed-base multiplication uses width 7 against a
//! precomputed table of odd multiples of the generator.

use core::ops::{Mul, MulAssign};
use hex_literal::hex;

use crate::arithmetic::field::FieldElement;
use crate::arithmetic::scalar::Scalar;
use crate::arithmetic::{AffinePoint, ProjectivePoint};

/// Window width for variable-base multiplication.
const WINDOW_VAR: u32 = 4;

/// Window width for fixed-base multiplication.
const WINDOW_BASE: u32 = 7;

/// Maximum digit count for a 256-bit scalar: a negative top digit can
/// carry one position past the highest bit.
const DIGITS: usize = 257;

const fn point(x: &[u8; 32], y: &[u8; 32]) -> AffinePoint {
    AffinePoint {
        x: FieldElement::from_bytes_unchecked(x),
        y: FieldElement::from_bytes_unchecked(y),
    }
}

/// Odd multiples `1*G, 3*G, ..., 127*G` of the base point.
const BASEPOINT_TABLE: [AffinePoint; 64] = [
    point(
        &hex!("79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"),
        &hex!("483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8"),
    ),
    point(
        &hex!("f9308a019258c31049344f85f89d5229b531c845836f99b08601f113bce036f9"),
        &hex!("388f7b0f632de8140fe337e62a37f3566500a99934c2231b6cb9fd7584b8e672"),
    ),
    point(
        &hex!("2f8bde4d1a07209355b4a7250a5c5128e88b84bddc619ab7cba8d569b240efe4"),
        &hex!("d8ac222636e5e3d6d4dba9dda6c9c426f788271bab0d6840dca87d3aa6ac62d6"),
    ),
    point(
        &hex!("5cbdf0646e5db4eaa398f365f2ea7a0e3d419b7e0330e39ce92bddedcac4f9bc"),
        &hex!("6aebca40ba255960a3178d6d861a54dba813d0b813fde7b5a5082628087264da"),
    ),
    point(
        &hex!("acd484e2f0c7f65309ad178a9f559abde09796974c57e714c35f110dfc27ccbe"),
        &hex!("cc338921b0a7d9fd64380971763b61e9add888a4375f8e0f05cc262ac64f9c37"),
    ),
    point(
        &hex!("774ae7f858a9411e5ef4246b70c65aac5649980be5c17891bbec17895da008cb"),
        &hex!("d984a032eb6b5e190243dd56d7b7b365372db1e2dff9d6a8301d74c9c953c61b"),
    ),
    point(
        &hex!("f28773c2d975288bc7d1d205c3748651b075fbc6610e58cddeeddf8f19405aa8"),
        &hex!("0ab0902e8d880a89758212eb65cdaf473a1a06da521fa91f29b5cb52db03ed81"),
    ),
    point(
        &hex!("d7924d4f7d43ea965a465ae3095ff41131e5946f3c85f79e44adbcf8e27e080e"),
        &hex!("581e2872a86c72a683842ec228cc6defea40af2bd896d3a5c504dc9ff6a26b58"),
    ),
    point(
        &hex!("defdea4cdb677750a420fee807eacf21eb9898ae79b9768766e4faa04a2d4a34"),
        &hex!("4211ab0694635168e997b0ead2a93daeced1f4a04a95c0f6cfb199f69e56eb77"),
    ),
    point(
        &hex!("2b4ea0a797a443d293ef5cff444f4979f06acfebd7e86d277475656138385b6c"),
        &hex!("85e89bc037945d93b343083b5a1c86131a01f60c50269763b570c854e5c09b7a"),
    ),
    point(
        &hex!("352bbf4a4cdd12564f93fa332ce333301d9ad40271f8107181340aef25be59d5"),
        &hex!("321eb4075348f534d59c18259dda3e1f4a1b3b2e71b1039c67bd3d8bcf81998c"),
    ),
    point(
        &hex!("2fa2104d6b38d11b0230010559879124e42ab8dfeff5ff29dc9cdadd4ecacc3f"),
        &hex!("02de1068295dd865b64569335bd5dd80181d70ecfc882648423ba76b532b7d67"),
    ),
    point(
        &hex!("9248279b09b4d68dab21a9b066edda83263c3d84e09572e269ca0cd7f5453714"),
        &hex!("73016f7bf234aade5d1aa71bdea2b1ff3fc0de2a887912ffe54a32ce97cb3402"),
    ),
    point(
        &hex!("daed4f2be3a8bf278e70132fb0beb7522f570e144bf615c07e996d443dee8729"),
        &hex!("a69dce4a7d6c98e8d4a1aca87ef8d7003f83c230f3afa726ab40e52290be1c55"),
    ),
    point(
        &hex!("c44d12c7065d812e8acf28d7cbb19f9011ecd9e9fdf281b0e6a3b5e87d22e7db"),
        &hex!("2119a460ce326cdc76c45926c982fdac0e106e861edf61c5a039063f0e0e6482"),
    ),
    point(
        &hex!("6a245bf6dc698504c89a20cfded60853152b695336c28063b61c65cbd269e6b4"),
        &hex!("e022cf42c2bd4a708b3f5126f16a24ad8b33ba48d0423b6efd5e6348100d8a82"),
    ),
    point(
        &hex!("1697ffa6fd9de627c077e3d2fe541084ce13300b0bec1146f95ae57f0d0bd6a5"),
        &hex!("b9c398f186806f5d27561506e4557433a2cf15009e498ae7adee9d63d01b2396"),
    ),
    point(
        &hex!("605bdb019981718b986d0f07e834cb0d9deb8360ffb7f61df982345ef27a7479"),
        &hex!("02972d2de4f8d20681a78d93ec96fe23c26bfae84fb14db43b01e1e9056b8c49"),
    ),
    point(
        &hex!("62d14dab4150bf497402fdc45a215e10dcb01c354959b10cfe31c7e9d87ff33d"),
        &hex!("80fc06bd8cc5b01098088a1950eed0db01aa132967ab472235f5642483b25eaf"),
    ),
    point(
        &hex!("80c60ad0040f27dade5b4b06c408e56b2c50e9f56b9b8b425e555c2f86308b6f"),
        &hex!("1c38303f1cc5c30f26e66bad7fe72f70a65eed4cbe7024eb1aa01f56430bd57a"),
    ),
    point(
        &hex!("7a9375ad6167ad54aa74c6348cc54d344cc5dc9487d847049d5eabb0fa03c8fb"),
        &hex!("0d0e3fa9eca8726909559e0d79269046bdc59ea10c70ce2b02d499ec224dc7f7"),
    ),
    point(
        &hex!("d528ecd9b696b54c907a9ed045447a79bb408ec39b68df504bb51f459bc3ffc9"),
        &hex!("eecf41253136e5f99966f21881fd656ebc4345405c520dbc063465b521409933"),
    ),
    point(
        &hex!("049370a4b5f43412ea25f514e8ecdad05266115e4a7ecb1387231808f8b45963"),
        &hex!("758f3f41afd6ed428b3081b0512fd62a54c3f3afbb5b6764b653052a12949c9a"),
    ),
    point(
        &hex!("77f230936ee88cbbd73df930d64702ef881d811e0e1498e2f1c13eb1fc345d74"),
        &hex!("958ef42a7886b6400a08266e9ba1b37896c95330d97077cbbe8eb3c7671c60d6"),
    ),
    point(
        &hex!("f2dac991cc4ce4b9ea44887e5c7c0bce58c80074ab9d4dbaeb28531b7739f530"),
        &hex!("e0dedc9b3b2f8dad4da1f32dec2531df9eb5fbeb0598e4fd1a117dba703a3c37"),
    ),
    point(
        &hex!("463b3d9f662621fb1b4be8fbbe2520125a216cdfc9dae3debcba4850c690d45b"),
        &hex!("5ed430d78c296c3543114306dd8622d7c622e27c970a1de31cb377b01af7307e"),
    ),
    point(
        &hex!("f16f804244e46e2a09232d4aff3b59976b98fac14328a2d1a32496b49998f247"),
        &hex!("cedabd9b82203f7e13d206fcdf4e33d92a6c53c26e5cce26d6579962c4e31df6"),
    ),
    point(
        &hex!("caf754272dc84563b0352b7a14311af55d245315ace27c65369e15f7151d41d1"),
        &hex!("cb474660ef35f5f2a41b643fa5e460575f4fa9b7962232a5c32f908318a04476"),
    ),
    point(
        &hex!("2600ca4b282cb986f85d0f1709979d8b44a09c07cb86d7c124497bc86f082120"),
        &hex!("4119b88753c15bd6a693b03fcddbb45d5ac6be74ab5f0ef44b0be9475a7e4b40"),
    ),
    point(
        &hex!("7635ca72d7e8432c338ec53cd12220bc01c48685e24f7dc8c602a7746998e435"),
        &hex!("091b649609489d613d1d5e590f78e6d74ecfc061d57048bad9e76f302c5b9c61"),
    ),
    point(
        &hex!("754e3239f325570cdbbf4a87deee8a66b7f2b33479d468fbc1a50743bf56cc18"),
        &hex!("0673fb86e5bda30fb3cd0ed304ea49a023ee33d0197a695d0c5d98093c536683"),
    ),
    point(
        &hex!("e3e6bd1071a1e96aff57859c82d570f0330800661d1c952f9fe2694691d9b9e8"),
        &hex!("59c9e0bba394e76f40c0aa58379a3cb6a5a2283993e90c4167002af4920e37f5"),
    ),
    point(
        &hex!("186b483d056a033826ae73d88f732985c4ccb1f32ba35f4b4cc47fdcf04aa6eb"),
        &hex!("3b952d32c67cf77e2e17446e204180ab21fb8090895138b4a4a797f86e80888b"),
    ),
    point(
        &hex!("df9d70a6b9876ce544c98561f4be4f725442e6d2b737d9c91a8321724ce0963f"),
        &hex!("55eb2dafd84d6ccd5f862b785dc39d4ab157222720ef9da217b8c45cf2ba2417"),
    ),
    point(
        &hex!("5edd5cc23c51e87a497ca815d5dce0f8ab52554f849ed8995de64c5f34ce7143"),
        &hex!("efae9c8dbc14130661e8cec030c89ad0c13c66c0d17a2905cdc706ab7399a868"),
    ),
    point(
        &hex!("290798c2b6476830da12fe02287e9e777aa3fba1c355b17a722d362f84614fba"),
        &hex!("e38da76dcd440621988d00bcf79af25d5b29c094db2a23146d003afd41943e7a"),
    ),
    point(
        &hex!("af3c423a95d9f5b3054754efa150ac39cd29552fe360257362dfdecef4053b45"),
        &hex!("f98a3fd831eb2b749a93b0e6f35cfb40c8cd5aa667a15581bc2feded498fd9c6"),
    ),
    point(
        &hex!("766dbb24d134e745cccaa28c99bf274906bb66b26dcf98df8d2fed50d884249a"),
        &hex!("744b1152eacbe5e38dcc887980da38b897584a65fa06cedd2c924f97cbac5996"),
    ),
    point(
        &hex!("59dbf46f8c94759ba21277c33784f41645f7b44f6c596a58ce92e666191abe3e"),
        &hex!("c534ad44175fbc300f4ea6ce648309a042ce739a7919798cd85e216c4a307f6e"),
    ),
    point(
        &hex!("f13ada95103c4537305e691e74e9a4a8dd647e711a95e73cb62dc6018cfd87b8"),
        &hex!("e13817b44ee14de663bf4bc808341f326949e21a6a75c2570778419bdaf5733d"),
    ),
    point(
        &hex!("7754b4fa0e8aced06d4167a2c59cca4cda1869c06ebadfb6488550015a88522c"),
        &hex!("30e93e864e669d82224b967c3020b8fa8d1e4e350b6cbcc537a48b57841163a2"),
    ),
    point(
        &hex!("948dcadf5990e048aa3874d46abef9d701858f95de8041d2a6828c99e2262519"),
        &hex!("e491a42537f6e597d5d28a3224b1bc25df9154efbd2ef1d2cbba2cae5347d57e"),
    ),
    point(
        &hex!("7962414450c76c1689c7b48f8202ec37fb224cf5ac0bfa1570328a8a3d7c77ab"),
        &hex!("100b610ec4ffb4760d5c1fc133ef6f6b12507a051f04ac5760afa5b29db83437"),
    ),
    point(
        &hex!("3514087834964b54b15b160644d915485a16977225b8847bb0dd085137ec47ca"),
        &hex!("ef0afbb2056205448e1652c48e8127fc6039e77c15c2378b7e7d15a0de293311"),
    ),
    point(
        &hex!("d3cc30ad6b483e4bc79ce2c9dd8bc54993e947eb8df787b442943d3f7b527eaf"),
        &hex!("8b378a22d827278d89c5e9be8f9508ae3c2ad46290358630afb34db04eede0a4"),
    ),
    point(
        &hex!("1624d84780732860ce1c78fcbfefe08b2b29823db913f6493975ba0ff4847610"),
        &hex!("68651cf9b6da903e0914448c6cd9d4ca896878f5282be4c8cc06e2a404078575"),
    ),
    point(
        &hex!("733ce80da955a8a26902c95633e62a985192474b5af207da6df7b4fd5fc61cd4"),
        &hex!("f5435a2bd2badf7d485a4d8b8db9fcce3e1ef8e0201e4578c54673bc1dc5ea1d"),
    ),
    point(
        &hex!("15d9441254945064cf1a1c33bbd3b49f8966c5092171e699ef258dfab81c045c"),
        &hex!("d56eb30b69463e7234f5137b73b84177434800bacebfc685fc37bbe9efe4070d"),
    ),
    point(
        &hex!("a1d0fcf2ec9de675b612136e5ce70d271c21417c9d2b8aaaac138599d0717940"),
        &hex!("edd77f50bcb5a3cab2e90737309667f2641462a54070f3d519212d39c197a629"),
    ),
    point(
        &hex!("e22fbe15c0af8ccc5780c0735f84dbe9a790badee8245c06c7ca37331cb36980"),
        &hex!("0a855babad5cd60c88b430a69f53a1a7a38289154964799be43d06d77d31da06"),
    ),
    point(
        &hex!("311091dd9860e8e20ee13473c1155f5f69635e394704eaa74009452246cfa9b3"),
        &hex!("66db656f87d1f04fffd1f04788c06830871ec5a64feee685bd80f0b1286d8374"),
    ),
    point(
        &hex!("34c1fd04d301be89b31c0442d3e6ac24883928b45a9340781867d4232ec2dbdf"),
        &hex!("09414685e97b1b5954bd46f730174136d57f1ceeb487443dc5321857ba73abee"),
    ),
    point(
        &hex!("f219ea5d6b54701c1c14de5b557eb42a8d13f3abbcd08affcc2a5e6b049b8d63"),
        &hex!("4cb95957e83d40b0f73af4544cccf6b1f4b08d3c07b27fb8d8c2962a400766d1"),
    ),
    point(
        &hex!("d7b8740f74a8fbaab1f683db8f45de26543a5490bca627087236912469a0b448"),
        &hex!("fa77968128d9c92ee1010f337ad4717eff15db5ed3c049b3411e0315eaa4593b"),
    ),
    point(
        &hex!("32d31c222f8f6f0ef86f7c98d3a3335ead5bcd32abdd94289fe4d3091aa824bf"),
        &hex!("5f3032f5892156e39ccd3d7915b9e1da2e6dac9e6f26e961118d14b8462e1661"),
    ),
    point(
        &hex!("7461f371914ab32671045a155d9831ea8793d77cd59592c4340f86cbc18347b5"),
        &hex!("8ec0ba238b96bec0cbdddcae0aa442542eee1ff50c986ea6b39847b3cc092ff6"),
    ),
    point(
        &hex!("ee079adb1df1860074356a25aa38206a6d716b2c3e67453d287698bad7b2b2d6"),
        &hex!("8dc2412aafe3be5c4c5f37e0ecc5f9f6a446989af04c4e25ebaac479ec1c8c1e"),
    ),
    point(
        &hex!("16ec93e447ec83f0467b18302ee620f7e65de331874c9dc72bfd8616ba9da6b5"),
        &hex!("5e4631150e62fb40d0e8c2a7ca5804a39d58186a50e497139626778e25b0674d"),
    ),
    point(
        &hex!("eaa5f980c245f6f038978290afa70b6bd8855897f98b6aa485b96065d537bd99"),
        &hex!("f65f5d3e292c2e0819a528391c994624d784869d7e6ea67fb18041024edc07dc"),
    ),
    point(
        &hex!("078c9407544ac132692ee1910a02439958ae04877151342ea96c4b6b35a49f51"),
        &hex!("f3e0319169eb9b85d5404795539a5e68fa1fbd583c064d2462b675f194a3ddb4"),
    ),
    point(
        &hex!("494f4be219a1a77016dcd838431aea0001cdc8ae7a6fc688726578d9702857a5"),
        &hex!("42242a969283a5f339ba7f075e36ba2af925ce30d767ed6e55f4b031880d562c"),
    ),
    point(
        &hex!("a598a8030da6d86c6bc7f2f5144ea549d28211ea58faa70ebf4c1e665c1fe9b5"),
        &hex!("204b5d6f84822c307e4b4a7140737aec23fc63b65b35f86a10026dbd2d864e6b"),
    ),
    point(
        &hex!("c41916365abb2b5d09192f5f2dbeafec208f020f12570a184dbadc3e58595997"),
        &hex!("04f14351d0087efa49d245b328984989d5caf9450f34bfc0ed16e96b58fa9913"),
    ),
    point(
        &hex!("841d6063a586fa475a724604da03bc5b92a2e0d2e0a36acfe4c73a5514742881"),
        &hex!("073867f59c0659e81904f9a1c7543698e62562d6744c169ce7a36de01a8d6154"),
    ),
];

/// Recodes a scalar into width-`w` non-adjacent form.
///
/// The result holds the digits least significant first; each digit is
/// zero or odd with absolute value below `2^w`, and every nonzero digit
/// is followed by at least `w` zeros.
pub fn recode_wnaf(k: &Scalar, w: u32) -> [i8; DIGITS] {
    debug_assert!((1..=7).contains(&w));

    let mut digits = [0i8; DIGITS];
    let mut words = k.to_words();

    for digit in digits.iter_mut() {
        if words == [0; 4] {
            break;
        }

        if words[0] & 1 == 1 {
            // Take the w + 1 low bits as a signed window value, then
            // clear them by subtracting the digit from the scalar.
            let mask = (1u64 << (w + 1)) - 1;
            let mut d = (words[0] & mask) as i64;
            if d >= 1i64 << w {
                d -= 1i64 << (w + 1);
            }
            *digit = d as i8;

            if d > 0 {
                sub_small(&mut words, d as u64);
            } else {
                add_small(&mut words, (-d) as u64);
            }
        }

        // words >>= 1
        words[0] = (words[0] >> 1) | (words[1] << 63);
        words[1] = (words[1] >> 1) | (words[2] << 63);
        words[2] = (words[2] >> 1) | (words[3] << 63);
        words[3] >>= 1;
    }

    digits
}

fn sub_small(words: &mut [u64; 4], v: u64) {
    let (w0, borrow) = words[0].overflowing_sub(v);
    words[0] = w0;
    let mut borrow = borrow;
    for w in words.iter_mut().skip(1) {
        let (r, b) = w.overflowing_sub(borrow as u64);
        *w = r;
        borrow = b;
    }
    debug_assert!(!borrow);
}

fn add_small(words: &mut [u64; 4], v: u64) {
    let (w0, carry) = words[0].overflowing_add(v);
    words[0] = w0;
    let mut carry = carry;
    for w in words.iter_mut().skip(1) {
        let (r, c) = w.overflowing_add(carry as u64);
        *w = r;
        carry = c;
    }
    debug_assert!(!carry);
}

/// Computes `k * p` for an arbitrary point.
fn mul(p: &ProjectivePoint, k: &Scalar) -> ProjectivePoint {
    // Odd multiples 1*P, 3*P, ..., 15*P.
    let mut table = [*p; 8];
    let double = p.double();
    for i in 1..8 {
        table[i] = table[i - 1].add(&double);
    }

    let digits = recode_wnaf(k, WINDOW_VAR);
    let mut acc = ProjectivePoint::IDENTITY;
    for &d in digits.iter().rev() {
        acc = acc.double();
        if d > 0 {
            acc = acc.add(&table[d as usize >> 1]);
        } else if d < 0 {
            acc = acc.add(&table[(-d) as usize >> 1].neg());
        }
    }
    acc
}

impl ProjectivePoint {
    /// Computes `k * G` against the precomputed generator table.
    pub fn mul_base(k: &Scalar) -> ProjectivePoint {
        let digits = recode_wnaf(k, WINDOW_BASE);
        let mut acc = ProjectivePoint::IDENTITY;
        for &d in digits.iter().rev() {
            acc = acc.double();
            if d > 0 {
                acc = acc.add_mixed(&BASEPOINT_TABLE[d as usize >> 1]);
            } else if d < 0 {
                acc = acc.add_mixed(&(-BASEPOINT_TABLE[(-d) as usize >> 1]));
            }
        }
        acc
    }
}

impl Mul<&Scalar> for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn mul(self, other: &Scalar) -> ProjectivePoint {
        mul(self, other)
    }
}

impl Mul<&Scalar> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn mul(self, other: &Scalar) -> ProjectivePoint {
        mul(&self, other)
    }
}

impl MulAssign<Scalar> for ProjectivePoint {
    fn mul_assign(&mut self, rhs: Scalar) {
        *self = mul(self, &rhs);
    }
}

impl MulAssign<&Scalar> for ProjectivePoint {
    fn mul_assign(&mut self, rhs: &Scalar) {
        *self = mul(self, rhs);
    }
}
