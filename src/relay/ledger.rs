/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The relay's collaborators: the ledger holding ring state, and the execution
//! layer that prices and broadcasts transactions.
//!
//! Both are synchronous from the relay's point of view.
//! Timeouts, cancellation and connection handling are up to the implementor.

use crate::curve::{Point, Scalar};
use crate::errors::{ExecutionError, LedgerError, SubmissionError};
use crate::types::{Address, KeyImage, RingHash, TxHash};

///Arguments of the pool contract's withdraw entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawCall {
    pub receiver: Address,
    pub amount: u128,
    pub ring_index: u64,
    pub c_0: Scalar,
    pub key_image: KeyImage,
    pub s: Vec<Scalar>,
}

///A transaction ready to be broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub from: Address,
    pub to: Address,
    pub gas: u64,
    pub data: Vec<u8>,
}

///What the execution layer reports once a transaction is mined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_id: TxHash,
    ///`false` if the transaction was mined but reverted.
    pub status: bool,
}

///Read/encode access to the pool contract.
pub trait Ledger {
    ///The hash committing to the finalized members of ring `ring_index` of pool `amount`.
    fn ring_hash(&self, amount: u128, ring_index: u64) -> Result<RingHash, LedgerError>;

    ///The ring's full, fixed-size public key slate. Unfilled slots are the identity.
    fn public_keys(&self, amount: u128, ring_index: u64) -> Result<Vec<Point>, LedgerError>;

    ///Encode a withdraw call.
    ///Key image double-spend checks happen on-ledger when the call executes, not here.
    fn encode_withdraw(&self, call: &WithdrawCall) -> Result<Vec<u8>, LedgerError>;
}

///Cost estimation and broadcast.
pub trait Executor {
    ///Estimate the cost of calling `target` with `data`.
    ///Fails with `ExecutionError::Reverted` when the ledger would reject the call outright.
    fn estimate_cost(&self, target: &Address, data: &[u8]) -> Result<u64, ExecutionError>;

    ///Broadcast `transaction` and wait for its receipt.
    fn submit(&self, transaction: &Transaction) -> Result<Receipt, SubmissionError>;
}
