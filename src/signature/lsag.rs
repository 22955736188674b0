/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use zeroize::Zeroize;

use crate::internal_common::*;
use super::signature_utils::*;

///A linkable ring signature.
///
///LSAG stands for "Linkable Spontaneous Anonymous Group (signature)".
///`s` holds one response per ring member, in ring order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingSignature {
    pub c_0: Scalar,
    pub s: Vec<Scalar>,
    pub key_image: KeyImage,

} impl RingSignature {
    ///Sign `msg` over `ring` with `private_key`, whose public key must be somewhere in the ring.
    ///
    ///Returns `SignatureError::KeyNotInRing` if it isn't,
    ///or `SignatureError::Malformed` if the ring is empty.
    pub fn sign(ring: &Ring, private_key: &Scalar, msg: &[u8]) -> Result<Self, SignatureError> {
        if ring.is_empty() {
            return Err(SignatureError::Malformed)
        }
        let n = ring.len();

        //find the signer in the ring
        let public_key = *G * private_key;
        let j = match ring.iter().position(|key| key == &public_key) {
            Some(index) => index,
            None => return Err(SignatureError::KeyNotInRing)
        };

        let key_image_points = get_key_image_points(ring);
        let key_image = key_image_points[j] * private_key;

        let mut alpha = random_scalar();
        let mut s: Vec<Scalar> = (0..n).map(|_| random_scalar()).collect();
        let mut c: Vec<Scalar> = vec!(Scalar::zero(); n);

        //start just after the signer, committing to alpha
        let mut i = (j + 1) % n;
        c[i] = challenge(msg, *G * alpha, key_image_points[j] * alpha);

        //walk the rest of the ring back around to the signer
        while i != j {
            let left = (*G * s[i]) + (ring.0[i] * c[i]);
            let right = (key_image_points[i] * s[i]) + (key_image * c[i]);
            let next = (i + 1) % n;
            c[next] = challenge(msg, left, right);
            i = next;
        }

        //close the ring
        s[j] = alpha - (c[j] * private_key);
        alpha.zeroize();

        return Ok(Self{
            c_0: c[0],
            s,
            key_image
        })
    }

    ///Check the parts of a signature that don't need any curve arithmetic.
    fn check_shape(&self, ring: &Ring) -> Result<(), SignatureError> {
        if ring.is_empty() || self.s.len() != ring.len() {
            return Err(SignatureError::Malformed)
        }
        if is_identity(&self.key_image) {
            return Err(SignatureError::Malformed)
        }
        return Ok(())
    }

    ///Given a ring (placeholders already removed, in ledger order) and a message, check if this signature is valid.
    ///
    ///Returns the key image if the signature is valid, so the caller can check it hasn't been spent,
    ///`SignatureError::Malformed` if the signature doesn't fit the ring,
    ///or `SignatureError::Invalid` if the ring doesn't close.
    pub fn verify(&self, ring: &Ring, msg: &[u8]) -> Result<KeyImage, SignatureError> {
        self.check_shape(ring)?;

        let key_image_points = get_key_image_points(ring);

        //travel around the ring
        let mut c_i = self.c_0;
        for (i, key) in ring.iter().enumerate() {
            //(s[i] * G) + (c_i * P_i)
            let left = (*G * self.s[i]) + (*key * c_i);
            //(s[i] * H(P_i)) + (c_i * key_image)
            let right = (key_image_points[i] * self.s[i]) + (self.key_image * c_i);
            c_i = challenge(msg, left, right);
        }

        //check if we end up back where we started
        return match c_i == self.c_0 {
            true => Ok(self.key_image),
            false => Err(SignatureError::Invalid)
        };
    }

} impl ToBytes for RingSignature {
    ///`c_0 || key_image || len(s) (u32, big-endian) || s[0] || ... || s[n - 1]`
    fn to_bytes(&self) -> Result<Vec<u8>, SerializationError> {
        let n: u32 = self.s.len().try_into()
            .map_err(|_| SerializationError::EncodingError)?;

        let mut bytes = Vec::with_capacity(SCALAR_BYTES + POINT_BYTES + 4 + self.s.len() * SCALAR_BYTES);
        bytes.extend_from_slice(&encode_scalar(&self.c_0));
        bytes.extend_from_slice(&encode_point(&self.key_image));
        bytes.extend_from_slice(&n.to_be_bytes());
        for s_i in &self.s {
            bytes.extend_from_slice(&encode_scalar(s_i));
        }
        return Ok(bytes)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, SerializationError> {
        let header = SCALAR_BYTES + POINT_BYTES + 4;
        if bytes.len() < header {
            return Err(SerializationError::DecodingError)
        }

        let c_0 = Scalar::from_bytes(&bytes[..SCALAR_BYTES])?;
        let key_image = Point::from_bytes(&bytes[SCALAR_BYTES..SCALAR_BYTES + POINT_BYTES])?;
        let mut n = [0u8; 4];
        n.copy_from_slice(&bytes[SCALAR_BYTES + POINT_BYTES..header]);
        let n = u32::from_be_bytes(n) as usize;

        let body = &bytes[header..];
        if n.checked_mul(SCALAR_BYTES) != Some(body.len()) {
            return Err(SerializationError::DecodingError)
        }
        let s = body.chunks_exact(SCALAR_BYTES)
            .map(Scalar::from_bytes)
            .collect::<Result<Vec<Scalar>, SerializationError>>()?;

        return Ok(Self{
            c_0,
            s,
            key_image
        })
    }
}
