/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

pub use serde::{
    Serialize,
    Deserialize,
};
pub use crate::errors::SerializationError;

///Implements functions to convert to (`to_bytes`) and from (`from_bytes`) the
///canonical fixed-width encoding of the curve types and signatures in this crate.
///
///These are the same encodings the ledger hashes and checks,
///so `from_bytes` is strict: non-canonical input is rejected, never repaired.
pub trait ToBytes: Sized {
    fn to_bytes(&self) -> Result<Vec<u8>, SerializationError>;

    fn from_bytes(bytes: &[u8]) -> Result<Self, SerializationError>;
}
