/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::TxHash;

///How far a request got through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Received,
    ShapeValidated,
    Authorized,
    RingFetched,
    SignatureVerified,
    CostEstimated,
    Submitted,

} impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", match self {
            Self::Received => "received",
            Self::ShapeValidated => "shape validated",
            Self::Authorized => "authorized",
            Self::RingFetched => "ring fetched",
            Self::SignatureVerified => "signature verified",
            Self::CostEstimated => "cost estimated",
            Self::Submitted => "submitted",
        })
    }
}

///Why a request was refused before anything was broadcast.
///
///Every one of these is the caller's to fix and resend.
///The messages are all the caller ever sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    ///A field is missing or has the wrong shape.
    #[error("Invalid payload")]
    InvalidPayload,
    ///The receiver's message signature doesn't check out.
    #[error("Invalid Message Signature")]
    Unauthorized,
    ///The ring signature doesn't fit the ring (length mismatch, bad key image, empty ring).
    #[error("Malformed Ring Signature")]
    MalformedRingSignature,
    ///The ring signature doesn't close.
    #[error("Invalid Ring Signature")]
    InvalidRingSignature,
    ///The ledger refused to encode the withdraw call.
    #[error("Payload invalid format")]
    UnencodableCall,
    ///Cost estimation shows the ledger itself would refuse the withdrawal
    ///(spent key image, ring not closed, ...).
    #[error("likely invalid input params")]
    LedgerRejection,
}

///The terminal state of a withdrawal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WithdrawalOutcome {
    ///The withdrawal transaction was mined.
    Submitted {
        tx_hash: TxHash
    },
    ///The request was refused. Nothing was broadcast.
    Rejected(Rejection),
    ///Something went wrong after every check passed. The on-ledger outcome may be unknown.
    ///`tx_hash` is a best-effort guess and may be absent.
    Failed {
        error_message: String,
        tx_hash: Option<TxHash>
    },

} impl WithdrawalOutcome {
    ///`400` for rejections, `200` otherwise: a failure after broadcast is still reported with `200`,
    ///with the error carried in the body.
    pub fn status_code(&self) -> u16 {
        return match self {
            Self::Rejected(_) => 400,
            Self::Submitted{..} | Self::Failed{..} => 200,
        }
    }

    pub fn is_submitted(&self) -> bool {
        return matches!(self, Self::Submitted{..})
    }
}

///The response body the transport sends back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayResponse {
    pub tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

} impl From<&WithdrawalOutcome> for RelayResponse {
    fn from(outcome: &WithdrawalOutcome) -> Self {
        return match outcome {
            WithdrawalOutcome::Submitted{tx_hash} => Self{
                tx_hash: Some(tx_hash.to_string()),
                error_message: None
            },
            WithdrawalOutcome::Rejected(rejection) => Self{
                tx_hash: None,
                error_message: Some(rejection.to_string())
            },
            WithdrawalOutcome::Failed{error_message, tx_hash} => Self{
                tx_hash: tx_hash.map(|tx_hash| tx_hash.to_string()),
                error_message: Some(error_message.clone())
            },
        }
    }
}
