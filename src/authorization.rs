/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Receiver authorization.
//!
//! A ring signature says "someone in this ring wants to withdraw to this address",
//! but anyone holding that signature could hand it to the relay.
//! The receiver therefore also signs a free-form message (Ethereum `personal_sign`)
//! that names their address, and the relay checks it before doing any other work.

use libsecp256k1::{Message, PublicKey, RecoveryId, SecretKey, Signature};

use crate::errors::AuthorizationError;
use crate::hashes::{h_bytes, h_personal_message};
use crate::types::Address;

///Length of an `r || s || v` message signature.
pub const SIGNATURE_BYTES: usize = 65;

///The address controlled by a secp256k1 public key:
///the last 20 bytes of the hash of its uncompressed encoding (without the `0x04` tag).
pub fn address_of(public_key: &PublicKey) -> Address {
    let uncompressed = public_key.serialize();
    let hash = h_bytes(&uncompressed[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    return Address(address)
}

///Recover the address that signed `message`.
///
///`signature` is `r || s || v` with `v` in `{0, 1}` or `{27, 28}`.
pub fn recover_signer(message: &str, signature: &[u8]) -> Result<Address, AuthorizationError> {
    if signature.len() != SIGNATURE_BYTES {
        return Err(AuthorizationError::MalformedSignature)
    }
    let v = match signature[64] {
        v @ 0..=1 => v,
        v @ 27..=28 => v - 27,
        _ => return Err(AuthorizationError::MalformedSignature)
    };
    let recovery_id = RecoveryId::parse(v)
        .map_err(|_| AuthorizationError::MalformedSignature)?;

    let mut rs = [0u8; 64];
    rs.copy_from_slice(&signature[..64]);
    let rs = Signature::parse_standard(&rs)
        .map_err(|_| AuthorizationError::MalformedSignature)?;

    let digest = Message::parse(&h_personal_message(message.as_bytes()));
    let public_key = libsecp256k1::recover(&digest, &rs, &recovery_id)
        .map_err(|_| AuthorizationError::RecoveryFailed)?;
    return Ok(address_of(&public_key))
}

///Check that `receiver` signed `message`, and that `message` names `receiver`.
///
///Addresses are compared case-insensitively, so checksummed addresses are fine.
pub fn authorize(message: &str, signature: &[u8], receiver: &Address) -> Result<(), AuthorizationError> {
    let signer = recover_signer(message, signature)?;
    if &signer != receiver {
        return Err(AuthorizationError::SignerMismatch)
    }
    if !message.to_ascii_lowercase().contains(&receiver.to_string()) {
        return Err(AuthorizationError::ReceiverNotInMessage)
    }
    return Ok(())
}

///Sign `message` the way a wallet's `personal_sign` does, returning `r || s || v` with `v` in `{27, 28}`.
pub fn sign_message(message: &str, secret_key: &SecretKey) -> [u8; SIGNATURE_BYTES] {
    let digest = Message::parse(&h_personal_message(message.as_bytes()));
    let (rs, recovery_id) = libsecp256k1::sign(&digest, secret_key);
    let mut signature = [0u8; SIGNATURE_BYTES];
    signature[..64].copy_from_slice(&rs.serialize());
    signature[64] = recovery_id.serialize() + 27;
    return signature
}
