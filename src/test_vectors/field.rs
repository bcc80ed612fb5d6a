//! Field arithmetic test vectors.

use hex_literal::hex;

/// Big-endian encodings of the doubling chain 2^k mod p, k = 0..40.
pub const DBL_TEST_VECTORS: &[[u8; 32]] = &[
    hex!("0000000000000000000000000000000000000000000000000000000000000001"),
    hex!("0000000000000000000000000000000000000000000000000000000000000002"),
    hex!("0000000000000000000000000000000000000000000000000000000000000004"),
    hex!("0000000000000000000000000000000000000000000000000000000000000008"),
    hex!("0000000000000000000000000000000000000000000000000000000000000010"),
    hex!("0000000000000000000000000000000000000000000000000000000000000020"),
    hex!("0000000000000000000000000000000000000000000000000000000000000040"),
    hex!("0000000000000000000000000000000000000000000000000000000000000080"),
    hex!("0000000000000000000000000000000000000000000000000000000000000100"),
    hex!("0000000000000000000000000000000000000000000000000000000000000200"),
    hex!("0000000000000000000000000000000000000000000000000000000000000400"),
    hex!("0000000000000000000000000000000000000000000000000000000000000800"),
    hex!("0000000000000000000000000000000000000000000000000000000000001000"),
    hex!("0000000000000000000000000000000000000000000000000000000000002000"),
    hex!("0000000000000000000000000000000000000000000000000000000000004000"),
    hex!("0000000000000000000000000000000000000000000000000000000000008000"),
    hex!("0000000000000000000000000000000000000000000000000000000000010000"),
    hex!("0000000000000000000000000000000000000000000000000000000000020000"),
    hex!("0000000000000000000000000000000000000000000000000000000000040000"),
    hex!("0000000000000000000000000000000000000000000000000000000000080000"),
    hex!("0000000000000000000000000000000000000000000000000000000000100000"),
    hex!("0000000000000000000000000000000000000000000000000000000000200000"),
    hex!("0000000000000000000000000000000000000000000000000000000000400000"),
    hex!("0000000000000000000000000000000000000000000000000000000000800000"),
    hex!("0000000000000000000000000000000000000000000000000000000001000000"),
    hex!("0000000000000000000000000000000000000000000000000000000002000000"),
    hex!("0000000000000000000000000000000000000000000000000000000004000000"),
    hex!("0000000000000000000000000000000000000000000000000000000008000000"),
    hex!("0000000000000000000000000000000000000000000000000000000010000000"),
    hex!("0000000000000000000000000000000000000000000000000000000020000000"),
    hex!("0000000000000000000000000000000000000000000000000000000040000000"),
    hex!("0000000000000000000000000000000000000000000000000000000080000000"),
    hex!("0000000000000000000000000000000000000000000000000000000100000000"),
    hex!("0000000000000000000000000000000000000000000000000000000200000000"),
    hex!("0000000000000000000000000000000000000000000000000000000400000000"),
    hex!("0000000000000000000000000000000000000000000000000000000800000000"),
    hex!("0000000000000000000000000000000000000000000000000000001000000000"),
    hex!("0000000000000000000000000000000000000000000000000000002000000000"),
    hex!("0000000000000000000000000000000000000000000000000000004000000000"),
    hex!("0000000000000000000000000000000000000000000000000000008000000000"),
];
