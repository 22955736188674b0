/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;
use std::str::FromStr;

use crate::curve::*;
use crate::errors::SerializationError;
use crate::tobytes::*;

///A key image: `private_key * h_point(public_key)`.
///
///Identical for every signature made with the same private key,
///which is what lets the ledger refuse a second withdrawal.
pub type KeyImage = Point;

fn parse_hex<const N: usize>(s: &str) -> Result<[u8; N], SerializationError> {
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    if digits.len() != 2 * N {
        return Err(SerializationError::DecodingError)
    }
    let mut bytes = [0u8; N];
    hex::decode_to_slice(digits, &mut bytes).map_err(|_| SerializationError::DecodingError)?;
    return Ok(bytes)
}

///A 20-byte account address on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(
    pub [u8; 20]

); impl Address {
    pub fn as_bytes(&self) -> &[u8; 20] {
        return &self.0
    }

} impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }

} impl FromStr for Address {
    type Err = SerializationError;

    ///Parse a `0x`-prefixed hex address. Case (including checksum case) is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.starts_with("0x") && !s.starts_with("0X") {
            return Err(SerializationError::DecodingError)
        }
        return Ok(Self(parse_hex(s)?))
    }

} impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }

} impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_str(&s).map_err(serde::de::Error::custom)
    }
}

///The ledger's commitment to the finalized membership of one ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RingHash(
    pub [u8; 32]

); impl RingHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        return &self.0
    }

} impl fmt::Display for RingHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

///A transaction identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHash(
    pub [u8; 32]

); impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }

} impl FromStr for TxHash {
    type Err = SerializationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        return Ok(Self(parse_hex(s)?))
    }
}

///A raw 256-bit big-endian word, as scalars and coordinates travel over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Word(
    pub [u8; 32]

); impl Word {
    ///The word holding a scalar.
    pub fn from_scalar(scalar: &Scalar) -> Self {
        return Self(encode_scalar(scalar))
    }

    ///The `[x, y]` words holding a point.
    pub fn from_point(point: &Point) -> [Self; 2] {
        let encoded = encode_point(point);
        let mut x = [0u8; 32];
        let mut y = [0u8; 32];
        x.copy_from_slice(&encoded[..32]);
        y.copy_from_slice(&encoded[32..]);
        return [Self(x), Self(y)]
    }

    ///Reduce this word modulo the group order.
    pub fn to_scalar(&self) -> Scalar {
        return scalar_from_word(&self.0)
    }

    ///Decode `[x, y]` into a point.
    pub fn to_point(words: &[Word; 2]) -> Result<Point, crate::errors::PointError> {
        return decode_point(&[words[0].0, words[1].0].concat())
    }

    ///Returns the value if it fits in a `u128`.
    pub fn to_u128(&self) -> Option<u128> {
        if self.0[..16].iter().any(|byte| *byte != 0) {
            return None
        }
        let mut low = [0u8; 16];
        low.copy_from_slice(&self.0[16..]);
        return Some(u128::from_be_bytes(low))
    }

} impl From<u128> for Word {
    fn from(value: u128) -> Self {
        let mut word = [0u8; 32];
        word[16..].copy_from_slice(&value.to_be_bytes());
        return Self(word)
    }

} impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

///A Ring represents the ordered public keys a ring signature is made over.
///
///This is a wrapper type for `Vec<Point>`.
///The internal `Vec` can be accessed with `ring.0`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ring(pub Vec<Point>);
impl Ring {
    ///Creates a new, empty ring.
    pub fn new() -> Self {
        return Self(Vec::new());
    }

    ///Build a ring from the ledger's fixed-size slate,
    ///dropping placeholder (identity) slots and keeping the order of the rest.
    pub fn from_slate(slate: &[Point]) -> Self {
        return Self(slate.iter()
            .filter(|key| !is_identity(key))
            .copied()
            .collect())
    }

    ///Appends a public key to the ring.
    pub fn push(&mut self, key: Point) {
        self.0.push(key);
    }

    pub fn len(&self) -> usize {
        return self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        return self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        return self.0.iter()
    }
}
