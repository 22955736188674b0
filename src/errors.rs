/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use thiserror::Error;

///Encoding/serialization errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializationError {
    ///Failure to serialize.
    #[error("Encoding error.")]
    EncodingError,
    ///Failure to deserialize.
    #[error("Decoding error.")]
    DecodingError,
}

///Curve point decoding errors.
///
///Any of these means the input is corrupt, not that a proof was forged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PointError {
    ///The encoding is not exactly 64 bytes.
    #[error("Malformed point: wrong encoding length.")]
    Length,
    ///A coordinate is not a canonical base field element.
    #[error("Malformed point: coordinate out of field range.")]
    OutOfRange,
    ///The coordinates do not satisfy the curve equation.
    #[error("Malformed point: not on curve.")]
    NotOnCurve,
}

///Ring signature errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    ///The signature is invalid.
    ///Deliberately carries no detail about where the ring failed to close.
    #[error("This signature is invalid.")]
    Invalid,
    ///The given signature is malformed in some way,
    ///or the parameters are incorrect/inconsistent.
    #[error("Malformed signature or parameters.")]
    Malformed,
    ///The signing key's public key is not in the ring.
    #[error("Public key is not in ring.")]
    KeyNotInRing,
}

impl From<PointError> for SignatureError {
    fn from(_: PointError) -> Self {
        return Self::Malformed
    }
}

///Receiver authorization errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    ///The message signature is not a 65 byte `r || s || v` value.
    #[error("Malformed message signature.")]
    MalformedSignature,
    ///No public key could be recovered from the signature.
    #[error("Failed to recover signer.")]
    RecoveryFailed,
    ///The recovered signer is not the receiver.
    #[error("Message was not signed by the receiver.")]
    SignerMismatch,
    ///The message does not name the receiver.
    #[error("Message does not mention the receiver.")]
    ReceiverNotInMessage,
}

///Errors raised by the ledger collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    ///The ledger could not be read.
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
    ///The ledger refused to encode a call with the given arguments.
    #[error("Call encoding failed: {0}")]
    Encoding(String),
}

///Errors raised while estimating the cost of a call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    ///The ledger would reject the call; carries the revert reason.
    #[error("Reverted: {0}")]
    Reverted(String),
    ///The execution layer could not be reached.
    #[error("Execution layer unavailable: {0}")]
    Unavailable(String),
}

///A submission error.
///
///The transaction may or may not have reached the ledger.
///`detail` is whatever the execution layer reported and may embed a transaction id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SubmissionError {
    pub message: String,
    pub detail: String,
}
