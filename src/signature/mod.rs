/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//!Linkable ring signatures over BN254.
//!
//!A `RingSignature` proves that its signer holds the private key of exactly one
//!public key in a `Ring`, without revealing which one, and publishes a key image
//!that is the same for every signature made with that private key.
//!
//!Verification only checks the proof itself.
//!Refusing a key image that has already been spent is the ledger's job:
//!verifying the same valid signature twice succeeds both times.

mod lsag;
mod signature_utils;

pub use lsag::RingSignature;
pub use signature_utils::get_key_image;

pub(crate) use signature_utils::{
    get_key_image_points,
    challenge
};
