/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The withdrawal relay.
//!
//! A `Relayer` takes one withdrawal request through
//! `Received -> ShapeValidated -> Authorized -> RingFetched -> SignatureVerified -> CostEstimated -> Submitted`,
//! stopping at the first step that fails.
//! Refusals before broadcast are `WithdrawalOutcome::Rejected`;
//! errors while submitting are `WithdrawalOutcome::Failed`.
//!
//! Nothing is retried. Resubmitting a signature that may already be on its way
//! to the ledger is exactly the kind of duplicate spend attempt this avoids,
//! so a failed request is final and the caller must send a new one.
//!
//! The relay keeps no state between requests. Requests may run concurrently;
//! atomic key image consumption is the ledger's responsibility.

mod config;
mod ledger;
mod outcome;
mod request;

pub use config::RelayConfig;
pub use ledger::{Executor, Ledger, Receipt, Transaction, WithdrawCall};
pub use outcome::{RelayResponse, Rejection, Stage, WithdrawalOutcome};
pub use request::{parse_word, Authorization, WithdrawalRequest};

use serde_json::Value;
use tracing::{debug, error, info, info_span, warn};

use crate::authorization::authorize;
use crate::errors::{ExecutionError, LedgerError, SignatureError};
use crate::types::{Address, Ring, RingHash, TxHash};

///The message a withdrawal's ring signature signs: `ring_hash || receiver`.
///
///Both parts are fixed-width, so no delimiter is needed.
///Binding the ring hash stops replay against another ring,
///binding the receiver stops redirection of the payout.
pub fn withdrawal_message(ring_hash: &RingHash, receiver: &Address) -> Vec<u8> {
    return [&ring_hash.as_bytes()[..], &receiver.as_bytes()[..]].concat()
}

///Best-effort recovery of a transaction id from a submission error's text.
///
///Looks for a `transactionHash` field in any JSON object embedded in `detail`,
///then for any `0x` followed by exactly 64 hex digits.
///No particular error grammar is assumed, and the id may simply not be there.
pub fn extract_transaction_id(detail: &str) -> Option<TxHash> {
    for (start, _) in detail.match_indices('{') {
        let mut objects = serde_json::Deserializer::from_str(&detail[start..]).into_iter::<Value>();
        if let Some(Ok(Value::Object(object))) = objects.next() {
            let tx_hash = object.get("transactionHash")
                .and_then(Value::as_str)
                .and_then(|tx_hash| tx_hash.parse::<TxHash>().ok());
            if tx_hash.is_some() {
                return tx_hash
            }
        }
    }

    let bytes = detail.as_bytes();
    for (start, _) in detail.match_indices("0x") {
        let digits = &bytes[start + 2..];
        let run = digits.iter().take_while(|byte| byte.is_ascii_hexdigit()).count();
        if run == 64 {
            if let Ok(tx_hash) = detail[start..start + 66].parse::<TxHash>() {
                return Some(tx_hash)
            }
        }
    }
    return None
}

fn advance(stage: &mut Stage, next: Stage) {
    debug!(from = %stage, to = %next, "withdrawal advanced");
    *stage = next;
}

///Runs withdrawal requests against a ledger and an execution layer.
pub struct Relayer<L, E> {
    config: RelayConfig,
    ledger: L,
    executor: E,

} impl<L: Ledger, E: Executor> Relayer<L, E> {
    pub fn new(config: RelayConfig, ledger: L, executor: E) -> Self {
        return Self{
            config,
            ledger,
            executor
        }
    }

    pub fn config(&self) -> &RelayConfig {
        return &self.config
    }

    pub fn ledger(&self) -> &L {
        return &self.ledger
    }

    pub fn executor(&self) -> &E {
        return &self.executor
    }

    ///Handle a raw request body, returning the status code and response body the transport should send.
    pub fn handle(&self, body: &[u8]) -> (u16, RelayResponse) {
        let outcome = match serde_json::from_slice::<Value>(body) {
            Ok(body) => self.withdraw(&body),
            Err(err) => {
                info!(%err, "withdrawal rejected: unparseable body");
                WithdrawalOutcome::Rejected(Rejection::InvalidPayload)
            }
        };
        return (outcome.status_code(), RelayResponse::from(&outcome))
    }

    ///Take one withdrawal request through the whole pipeline.
    pub fn withdraw(&self, body: &Value) -> WithdrawalOutcome {
        let span = info_span!("withdrawal");
        let _entered = span.enter();

        let mut stage = Stage::Received;
        let outcome = match self.run(body, &mut stage) {
            Ok(tx_hash) => WithdrawalOutcome::Submitted{tx_hash},
            Err(outcome) => outcome
        };

        match &outcome {
            WithdrawalOutcome::Submitted{tx_hash} =>
                info!(%tx_hash, "withdrawal submitted"),
            WithdrawalOutcome::Rejected(rejection) =>
                info!(%stage, %rejection, "withdrawal rejected"),
            WithdrawalOutcome::Failed{error_message, tx_hash} =>
                error!(%stage, %error_message, tx_hash = ?tx_hash.map(|tx_hash| tx_hash.to_string()), "withdrawal failed"),
        }
        return outcome
    }

    fn run(&self, body: &Value, stage: &mut Stage) -> Result<TxHash, WithdrawalOutcome> {
        let request = WithdrawalRequest::from_json(body)
            .ok_or(WithdrawalOutcome::Rejected(Rejection::InvalidPayload))?;
        advance(stage, Stage::ShapeValidated);

        //authenticate the receiver before spending any external calls on the request
        match &request.authorization {
            Some(authorization) => authorize(&authorization.message, &authorization.signature, &request.receiver)
                .map_err(|err| {
                    info!(%err, receiver = %request.receiver, "receiver authorization failed");
                    WithdrawalOutcome::Rejected(Rejection::Unauthorized)
                })?,
            None if self.config.require_authorization =>
                return Err(WithdrawalOutcome::Rejected(Rejection::Unauthorized)),
            None => debug!("no receiver authorization supplied"),
        }
        advance(stage, Stage::Authorized);

        //read once; everything below uses this ring state
        let ring_hash = self.ledger.ring_hash(request.amount, request.ring_index)
            .map_err(ledger_failure)?;
        let slate = self.ledger.public_keys(request.amount, request.ring_index)
            .map_err(ledger_failure)?;
        let ring = Ring::from_slate(&slate);
        debug!(%ring_hash, slots = slate.len(), members = ring.len(), "ring fetched");
        advance(stage, Stage::RingFetched);

        let message = withdrawal_message(&ring_hash, &request.receiver);
        let signature = request.ring_signature()
            .map_err(|_| WithdrawalOutcome::Rejected(Rejection::MalformedRingSignature))?;
        let key_image = signature.verify(&ring, &message)
            .map_err(|err| WithdrawalOutcome::Rejected(match err {
                SignatureError::Invalid => Rejection::InvalidRingSignature,
                _ => Rejection::MalformedRingSignature
            }))?;
        advance(stage, Stage::SignatureVerified);

        let call = WithdrawCall{
            receiver: request.receiver,
            amount: request.amount,
            ring_index: request.ring_index,
            c_0: signature.c_0,
            key_image,
            s: signature.s
        };
        let data = self.ledger.encode_withdraw(&call)
            .map_err(|err| match err {
                LedgerError::Encoding(reason) => {
                    info!(%reason, "withdraw call could not be encoded");
                    WithdrawalOutcome::Rejected(Rejection::UnencodableCall)
                },
                err => ledger_failure(err)
            })?;

        //an estimation error means the ledger would refuse the call (spent key image, open ring, ...)
        let gas = self.executor.estimate_cost(&self.config.contract, &data)
            .map_err(|err| {
                match err {
                    ExecutionError::Reverted(reason) => info!(%reason, "cost estimation reverted"),
                    ExecutionError::Unavailable(reason) => warn!(%reason, "cost estimation failed"),
                }
                WithdrawalOutcome::Rejected(Rejection::LedgerRejection)
            })?;
        if let Some(limit) = self.config.gas_limit {
            if gas > limit {
                info!(gas, limit, "estimated cost exceeds limit");
                return Err(WithdrawalOutcome::Rejected(Rejection::LedgerRejection))
            }
        }
        advance(stage, Stage::CostEstimated);

        let transaction = Transaction{
            from: self.config.sender,
            to: self.config.contract,
            gas,
            data
        };
        return match self.executor.submit(&transaction) {
            Ok(receipt) if receipt.status => {
                advance(stage, Stage::Submitted);
                Ok(receipt.transaction_id)
            },
            Ok(receipt) => Err(WithdrawalOutcome::Failed{
                error_message: String::from("Transaction reverted"),
                tx_hash: Some(receipt.transaction_id)
            }),
            Err(err) => {
                let tx_hash = extract_transaction_id(&err.detail)
                    .or_else(|| extract_transaction_id(&err.message));
                Err(WithdrawalOutcome::Failed{
                    error_message: err.message,
                    tx_hash
                })
            }
        }
    }
}

fn ledger_failure(err: LedgerError) -> WithdrawalOutcome {
    warn!(%err, "ledger read failed");
    return WithdrawalOutcome::Failed{
        error_message: String::from("Ledger unavailable"),
        tx_hash: None
    }
}
