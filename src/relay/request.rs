/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Parsing of the relay's JSON request body.
//!
//! Only the primitive shape is checked here.
//! Whether the words make a valid curve point or a valid signature is
//! decided later, by the verifier.

use std::str::FromStr;

use num_bigint::BigUint;
use serde_json::{Map, Value};

use crate::errors::SignatureError;
use crate::signature::RingSignature;
use crate::types::{Address, Word};

///The receiver's out-of-band approval of a withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    pub message: String,
    ///`r || s || v`
    pub signature: Vec<u8>,
}

///A withdrawal request whose fields all have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalRequest {
    pub receiver: Address,
    pub amount: u128,
    pub ring_index: u64,
    pub c_0: Word,
    pub key_image: [Word; 2],
    pub s: Vec<Word>,
    pub authorization: Option<Authorization>,
}

///Parse an unsigned integer given as a JSON number, a decimal string or a `0x` hex string.
pub fn parse_word(value: &Value) -> Option<Word> {
    let number = match value {
        Value::Number(number) => BigUint::from(number.as_u64()?),
        Value::String(s) => match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit()) =>
                BigUint::parse_bytes(digits.as_bytes(), 16)?,
            None if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) =>
                BigUint::parse_bytes(s.as_bytes(), 10)?,
            _ => return None
        },
        _ => return None
    };

    let bytes = number.to_bytes_be();
    if bytes.len() > 32 {
        return None
    }
    let mut word = [0u8; 32];
    word[32 - bytes.len()..].copy_from_slice(&bytes);
    return Some(Word(word))
}

fn parse_hex_bytes(value: &Value) -> Option<Vec<u8>> {
    let s = value.as_str()?;
    let digits = s.strip_prefix("0x").unwrap_or(s);
    return hex::decode(digits).ok()
}

fn field<'a>(body: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    return match body.get(name) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value)
    }
}

impl WithdrawalRequest {
    ///Check the shape of a request body.
    ///
    ///Returns `None` if the body isn't an object, a required field is missing,
    ///or any field has the wrong primitive shape.
    pub fn from_json(body: &Value) -> Option<Self> {
        let body = body.as_object()?;

        let receiver = Address::from_str(field(body, "receiver")?.as_str()?).ok()?;
        let amount = parse_word(field(body, "ethAmount")?)?.to_u128()?;
        let ring_index = parse_word(field(body, "ringIdx")?)?.to_u128()?;
        let ring_index = u64::try_from(ring_index).ok()?;
        let c_0 = parse_word(field(body, "c0")?)?;

        let key_image = match field(body, "keyImage")?.as_array()?.as_slice() {
            [x, y] => [parse_word(x)?, parse_word(y)?],
            _ => return None
        };
        let s = field(body, "s")?.as_array()?
            .iter()
            .map(parse_word)
            .collect::<Option<Vec<Word>>>()?;

        let authorization = match (field(body, "message"), field(body, "signedMessage")) {
            (None, None) => None,
            (Some(message), Some(signature)) => Some(Authorization{
                message: message.as_str()?.to_owned(),
                signature: parse_hex_bytes(signature)?
            }),
            //half an authorization is not an authorization
            _ => return None
        };

        return Some(Self{
            receiver,
            amount,
            ring_index,
            c_0,
            key_image,
            s,
            authorization
        })
    }

    ///Decode the signature words into a `RingSignature`.
    ///
    ///Fails with `SignatureError::Malformed` if the key image isn't a valid point.
    ///Scalars are reduced modulo the group order.
    pub fn ring_signature(&self) -> Result<RingSignature, SignatureError> {
        let key_image = Word::to_point(&self.key_image)?;
        return Ok(RingSignature{
            c_0: self.c_0.to_scalar(),
            s: self.s.iter().map(Word::to_scalar).collect(),
            key_image
        })
    }
}
