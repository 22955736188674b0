/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Keccak-256 based hashes, matching the ledger's native hash.

use ark_ff::{BigInteger, PrimeField};
use sha3::{Digest, Keccak256};

use crate::curve::*;

lazy_static! {
    ///`b` in `y^2 = x^3 + b`
    static ref CURVE_B: FieldElement = FieldElement::from(3u64);

    ///`(p + 1) / 4`; since `p = 3 mod 4`, `beta^((p + 1) / 4)` is a square root of `beta` whenever one exists.
    static ref SQRT_EXPONENT: <FieldElement as PrimeField>::BigInt = {
        let mut exponent = FieldElement::MODULUS;
        exponent.add_with_carry(&1u64.into());
        exponent.div2();
        exponent.div2();
        exponent
    };
}

///Hash bytes to bytes.
pub fn h_bytes(msg: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(msg);
    let mut digest = [0u8; 32];
    digest.copy_from_slice(hasher.finalize().as_slice());
    return digest
}

///Hash bytes to a scalar in `[0, n)`.
pub fn h_scalar(msg: &[u8]) -> Scalar {
    return Scalar::from_be_bytes_mod_order(&h_bytes(msg))
}

///Hash a point to a second, independent point (try-and-increment).
///
///Used to derive the per-member generator that key images are bound to.
///Never returns the identity, and nobody knows its discrete log with respect to `G`.
pub fn h_point(point: &Point) -> Point {
    let mut x = FieldElement::from_be_bytes_mod_order(&h_bytes(&encode_point(point)));
    loop {
        let beta = x.square() * x + *CURVE_B;
        let y = beta.pow(*SQRT_EXPONENT);
        if y.square() == beta {
            return Point::from(AffinePoint::new_unchecked(x, y))
        }
        x += FieldElement::one();
    }
}

///Hash a message the way Ethereum wallets do before signing it (`personal_sign`).
pub fn h_personal_message(msg: &[u8]) -> [u8; 32] {
    let prefix = format!("\x19Ethereum Signed Message:\n{}", msg.len());
    return h_bytes(&[prefix.as_bytes(), msg].concat())
}
