/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Elliptic curve functions and constants
//!
//! The curve is BN254 (alt_bn128) G1, the curve the ledger's precompiles operate on.
//! Points travel as `x || y` (two 32-byte big-endian base field elements),
//! with `(0, 0)` standing for the identity.

use ark_ec::{AffineRepr, CurveGroup, Group};
use ark_ff::{BigInteger, PrimeField};
use rand::{thread_rng, Rng};
use zeroize::Zeroize;

use crate::errors::{PointError, SerializationError};
use crate::tobytes::*;

pub use ark_bn254::{
    Fq as FieldElement,
    Fr as Scalar,
    G1Affine as AffinePoint,
    G1Projective as Point,
};
pub use ark_ff::{Field, One, Zero};

///Length of an encoded scalar or base field element.
pub const SCALAR_BYTES: usize = 32;
///Length of an encoded point.
pub const POINT_BYTES: usize = 2 * SCALAR_BYTES;

lazy_static! {
    ///The basepoint of the elliptic curve, `(1, 2)`.
    pub static ref G: Point = Point::generator();
}

///Encode a base field element as 32 big-endian bytes.
pub(crate) fn encode_field(element: &FieldElement) -> [u8; 32] {
    let mut encoded = [0u8; 32];
    encoded.copy_from_slice(&element.into_bigint().to_bytes_be());
    return encoded
}

///Decode a base field element, rejecting values `>= p`.
pub(crate) fn decode_field(bytes: &[u8]) -> Result<FieldElement, PointError> {
    let element = FieldElement::from_be_bytes_mod_order(bytes);
    if element.into_bigint().to_bytes_be() != bytes {
        return Err(PointError::OutOfRange)
    }
    return Ok(element)
}

///Encode a point as `x || y`.
///The identity encodes as 64 zero bytes.
pub fn encode_point(point: &Point) -> [u8; POINT_BYTES] {
    let affine = point.into_affine();
    let mut encoded = [0u8; POINT_BYTES];
    if affine.is_zero() {
        return encoded
    }
    encoded[..SCALAR_BYTES].copy_from_slice(&encode_field(&affine.x));
    encoded[SCALAR_BYTES..].copy_from_slice(&encode_field(&affine.y));
    return encoded
}

///Efficient batch encoding for multiple points.
///
///Normalizes every point to affine form with a single inversion,
///so prefer this over repeated calls to `encode_point`.
pub fn batch_encode_points(points: &[Point]) -> Vec<[u8; POINT_BYTES]> {
    let mut encoded: Vec<[u8; POINT_BYTES]> = Vec::with_capacity(points.len());
    for affine in Point::normalize_batch(points) {
        let mut bytes = [0u8; POINT_BYTES];
        if !affine.is_zero() {
            bytes[..SCALAR_BYTES].copy_from_slice(&encode_field(&affine.x));
            bytes[SCALAR_BYTES..].copy_from_slice(&encode_field(&affine.y));
        }
        encoded.push(bytes);
    }
    return encoded
}

///Decode a point from `x || y`.
///
///`(0, 0)` decodes to the identity.
///Fails if either coordinate is out of range or the point is not on the curve.
pub fn decode_point(bytes: &[u8]) -> Result<Point, PointError> {
    if bytes.len() != POINT_BYTES {
        return Err(PointError::Length)
    }
    let x = decode_field(&bytes[..SCALAR_BYTES])?;
    let y = decode_field(&bytes[SCALAR_BYTES..])?;
    if x.is_zero() && y.is_zero() {
        return Ok(Point::zero())
    }

    let affine = AffinePoint::new_unchecked(x, y);
    //BN254 G1 has cofactor 1, but check the subgroup anyway in case that ever changes
    if !affine.is_on_curve() || !affine.is_in_correct_subgroup_assuming_on_curve() {
        return Err(PointError::NotOnCurve)
    }
    return Ok(affine.into_group())
}

///Encode a scalar as 32 canonical big-endian bytes.
pub fn encode_scalar(scalar: &Scalar) -> [u8; SCALAR_BYTES] {
    let mut encoded = [0u8; SCALAR_BYTES];
    encoded.copy_from_slice(&scalar.into_bigint().to_bytes_be());
    return encoded
}

///Interpret 32 big-endian bytes as a scalar, reducing modulo the group order.
pub fn scalar_from_word(bytes: &[u8; SCALAR_BYTES]) -> Scalar {
    return Scalar::from_be_bytes_mod_order(bytes)
}

///Returns true if `point` is the identity (the "no key" sentinel).
pub fn is_identity(point: &Point) -> bool {
    return point.is_zero()
}

///return a random scalar
pub fn random_scalar() -> Scalar {
    let mut scalar_bytes = [0u8; 64];
    thread_rng().fill(&mut scalar_bytes[..]);
    let scalar = Scalar::from_le_bytes_mod_order(&scalar_bytes);
    scalar_bytes.zeroize();
    return scalar
}

///return a random point on the curve
pub fn random_point() -> Point {
    return *G * random_scalar()
}

impl ToBytes for Scalar {
    fn to_bytes(&self) -> Result<Vec<u8>, SerializationError> {
        return Ok(encode_scalar(self).to_vec())
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, SerializationError> {
        if bytes.len() != SCALAR_BYTES {
            return Err(SerializationError::DecodingError)
        }
        let scalar = Scalar::from_be_bytes_mod_order(bytes);
        return match scalar.into_bigint().to_bytes_be() == bytes {
            true => Ok(scalar),
            false => Err(SerializationError::DecodingError)
        }
    }
}

impl ToBytes for Point {
    fn to_bytes(&self) -> Result<Vec<u8>, SerializationError> {
        return Ok(encode_point(self).to_vec())
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, SerializationError> {
        return decode_point(bytes).map_err(|_| SerializationError::DecodingError)
    }
}
