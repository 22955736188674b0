// SPDX short identifier: Unlicense

use std::cell::{Cell, RefCell};
use std::str::FromStr;

use libsecp256k1::{PublicKey, SecretKey};
use num_bigint::BigUint;
use serde_json::{json, Value};

use ringrelay::{
    common::*,
    authorization::{address_of, sign_message},
    relay::*,
    signature::RingSignature
};

const AMOUNT: u64 = 2;
const RING_INDEX: u64 = 5;
const SLATE_SIZE: usize = 6;
const ESTIMATE: u64 = 210_000;

fn contract() -> Address {
    return Address([0xc0; 20])
}

fn sender() -> Address {
    return Address([0x5e; 20])
}

fn mined() -> TxHash {
    return TxHash([0xab; 32])
}

struct MockLedger {
    ring_hash: RingHash,
    slate: Vec<Point>,
    unavailable: bool,
    encode_error: Option<LedgerError>,
    ring_hash_reads: Cell<usize>,
    public_key_reads: Cell<usize>,
    encoded: RefCell<Vec<WithdrawCall>>,
}

impl MockLedger {
    fn reads(&self) -> usize {
        return self.ring_hash_reads.get() + self.public_key_reads.get()
    }

    fn find(&self, amount: u128, ring_index: u64) -> Result<(), LedgerError> {
        if self.unavailable {
            return Err(LedgerError::Unavailable(String::from("connection refused")))
        }
        if amount != AMOUNT as u128 || ring_index != RING_INDEX {
            return Err(LedgerError::Unavailable(String::from("no such ring")))
        }
        return Ok(())
    }
}

impl Ledger for MockLedger {
    fn ring_hash(&self, amount: u128, ring_index: u64) -> Result<RingHash, LedgerError> {
        self.ring_hash_reads.set(self.ring_hash_reads.get() + 1);
        self.find(amount, ring_index)?;
        return Ok(self.ring_hash)
    }

    fn public_keys(&self, amount: u128, ring_index: u64) -> Result<Vec<Point>, LedgerError> {
        self.public_key_reads.set(self.public_key_reads.get() + 1);
        self.find(amount, ring_index)?;
        return Ok(self.slate.clone())
    }

    fn encode_withdraw(&self, call: &WithdrawCall) -> Result<Vec<u8>, LedgerError> {
        if let Some(err) = &self.encode_error {
            return Err(err.clone())
        }
        self.encoded.borrow_mut().push(call.clone());
        let mut data = call.receiver.0.to_vec();
        data.extend_from_slice(&encode_scalar(&call.c_0));
        data.extend_from_slice(&encode_point(&call.key_image));
        for s in &call.s {
            data.extend_from_slice(&encode_scalar(s));
        }
        return Ok(data)
    }
}

struct MockExecutor {
    estimate: Result<u64, ExecutionError>,
    submission: Result<Receipt, SubmissionError>,
    estimates: Cell<usize>,
    submitted: RefCell<Vec<Transaction>>,
}

impl Default for MockExecutor {
    fn default() -> Self {
        return Self{
            estimate: Ok(ESTIMATE),
            submission: Ok(Receipt{ transaction_id: mined(), status: true }),
            estimates: Cell::new(0),
            submitted: RefCell::new(Vec::new())
        }
    }
}

impl Executor for MockExecutor {
    fn estimate_cost(&self, target: &Address, _data: &[u8]) -> Result<u64, ExecutionError> {
        assert_eq!(target, &contract());
        self.estimates.set(self.estimates.get() + 1);
        return self.estimate.clone()
    }

    fn submit(&self, transaction: &Transaction) -> Result<Receipt, SubmissionError> {
        self.submitted.borrow_mut().push(transaction.clone());
        return self.submission.clone()
    }
}

struct Pool {
    private_keys: Vec<Scalar>,
    ledger: MockLedger,
}

///three real members, padded with placeholders
fn new_pool() -> Pool {
    let private_keys: Vec<Scalar> = (0..3).map(|_| random_scalar()).collect();
    let mut slate: Vec<Point> = private_keys.iter().map(|key| *G * key).collect();
    slate.resize(SLATE_SIZE, Point::zero());
    return Pool{
        private_keys,
        ledger: MockLedger{
            ring_hash: RingHash(ringrelay::hashes::h_bytes(b"ring 5 of the 2 ETH pool")),
            slate,
            unavailable: false,
            encode_error: None,
            ring_hash_reads: Cell::new(0),
            public_key_reads: Cell::new(0),
            encoded: RefCell::new(Vec::new())
        }
    }
}

fn receiver_key(byte: u8) -> SecretKey {
    let mut key = [0u8; 32];
    key[0] = 0x42;
    key[31] = byte;
    return SecretKey::parse(&key).unwrap()
}

fn receiver(key: &SecretKey) -> Address {
    return address_of(&PublicKey::from_secret_key(key))
}

fn sign_withdrawal(pool: &Pool, signer: usize, receiver: &Address) -> RingSignature {
    let ring = Ring::from_slate(&pool.ledger.slate);
    let msg = withdrawal_message(&pool.ledger.ring_hash, receiver);
    return RingSignature::sign(&ring, &pool.private_keys[signer], &msg).unwrap()
}

fn request_body(sig: &RingSignature, receiver: &Address, key: Option<&SecretKey>) -> Value {
    let mut body = json!({
        "receiver": receiver.to_string(),
        "ethAmount": AMOUNT,
        "ringIdx": RING_INDEX,
        "c0": Word::from_scalar(&sig.c_0).to_string(),
        "keyImage": Word::from_point(&sig.key_image).iter().map(Word::to_string).collect::<Vec<String>>(),
        "s": sig.s.iter().map(|s| Word::from_scalar(s).to_string()).collect::<Vec<String>>(),
    });
    if let Some(key) = key {
        let message = format!("I authorize withdrawing {} ETH to {}", AMOUNT, receiver);
        let signed = sign_message(&message, key);
        body["message"] = json!(message);
        body["signedMessage"] = json!(format!("0x{}", hex::encode(signed)));
    }
    return body
}

fn new_relayer(ledger: MockLedger, executor: MockExecutor) -> Relayer<MockLedger, MockExecutor> {
    return Relayer::new(RelayConfig::new(contract(), sender()), ledger, executor)
}

fn handle(relayer: &Relayer<MockLedger, MockExecutor>, body: &Value) -> (u16, RelayResponse) {
    return relayer.handle(body.to_string().as_bytes())
}

#[test]
fn withdrawal_is_submitted() {
    let pool = new_pool();
    let key = receiver_key(1);
    let to = receiver(&key);
    let sig = sign_withdrawal(&pool, 1, &to);
    let body = request_body(&sig, &to, Some(&key));

    let relayer = new_relayer(pool.ledger, MockExecutor::default());
    let (status, response) = handle(&relayer, &body);
    assert_eq!(status, 200);
    assert_eq!(response.tx_hash, Some(mined().to_string()));
    assert_eq!(response.error_message, None);

    //ring state read exactly once
    assert_eq!(relayer.ledger().ring_hash_reads.get(), 1);
    assert_eq!(relayer.ledger().public_key_reads.get(), 1);

    let encoded = relayer.ledger().encoded.borrow();
    assert_eq!(encoded.len(), 1);
    assert_eq!(encoded[0].receiver, to);
    assert_eq!(encoded[0].amount, AMOUNT as u128);
    assert_eq!(encoded[0].ring_index, RING_INDEX);
    assert_eq!(encoded[0].key_image, sig.key_image);
    assert_eq!(encoded[0].s, sig.s);

    let submitted = relayer.executor().submitted.borrow();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].from, sender());
    assert_eq!(submitted[0].to, contract());
    assert_eq!(submitted[0].gas, ESTIMATE);

    //wire shape
    let wire: Value = serde_json::to_value(&response).unwrap();
    assert_eq!(wire, json!({ "txHash": mined().to_string() }));
}

#[test]
fn decimal_words_are_accepted() {
    let pool = new_pool();
    let key = receiver_key(2);
    let to = receiver(&key);
    let sig = sign_withdrawal(&pool, 0, &to);
    let mut body = request_body(&sig, &to, Some(&key));
    body["c0"] = json!(BigUint::from_bytes_be(&encode_scalar(&sig.c_0)).to_string());
    body["ethAmount"] = json!(AMOUNT.to_string());
    body["ringIdx"] = json!(format!("0x{:x}", RING_INDEX));

    let outcome = new_relayer(pool.ledger, MockExecutor::default()).withdraw(&body);
    assert_eq!(outcome, WithdrawalOutcome::Submitted{ tx_hash: mined() });
}

#[test]
fn missing_key_image_is_rejected_before_ledger_reads() {
    let pool = new_pool();
    let key = receiver_key(1);
    let to = receiver(&key);
    let sig = sign_withdrawal(&pool, 1, &to);
    let mut body = request_body(&sig, &to, Some(&key));
    body.as_object_mut().unwrap().remove("keyImage");

    let relayer = new_relayer(pool.ledger, MockExecutor::default());
    let (status, response) = handle(&relayer, &body);
    assert_eq!(status, 400);
    assert_eq!(response.tx_hash, None);
    assert_eq!(response.error_message.as_deref(), Some("Invalid payload"));
    assert_eq!(relayer.ledger().reads(), 0);
    assert_eq!(relayer.executor().estimates.get(), 0);

    let wire: Value = serde_json::to_value(&response).unwrap();
    assert_eq!(wire, json!({ "txHash": null, "errorMessage": "Invalid payload" }));
}

#[test]
fn badly_shaped_payloads() {
    let pool = new_pool();
    let key = receiver_key(1);
    let to = receiver(&key);
    let sig = sign_withdrawal(&pool, 1, &to);
    let good = request_body(&sig, &to, Some(&key));

    let mut bodies: Vec<Value> = Vec::new();
    for (field, value) in [
        ("receiver", json!("0x1234")),
        ("receiver", json!(7)),
        ("ethAmount", json!(-1)),
        ("ethAmount", json!(1.5)),
        ("ringIdx", json!("0x1ffffffffffffffff")),
        ("c0", json!("not a number")),
        ("c0", json!(format!("0x1{}", "0".repeat(64)))),
        ("keyImage", json!(["0x1", "0x2", "0x3"])),
        ("keyImage", json!("0x12")),
        ("s", json!("0x12")),
        ("s", json!(["0x1", null])),
        ("signedMessage", json!("0xzz")),
        ("s", Value::Null),
    ] {
        let mut body = good.clone();
        body[field] = value;
        bodies.push(body);
    }
    //half an authorization
    let mut body = good.clone();
    body.as_object_mut().unwrap().remove("message");
    bodies.push(body);
    bodies.push(json!([1, 2, 3]));

    let relayer = new_relayer(pool.ledger, MockExecutor::default());
    for body in &bodies {
        assert_eq!(relayer.withdraw(body), WithdrawalOutcome::Rejected(Rejection::InvalidPayload), "{}", body);
    }
    assert_eq!(relayer.handle(b"{not json").0, 400);
    assert_eq!(relayer.ledger().reads(), 0);
}

#[test]
fn bad_authorization_is_rejected_before_ledger_reads() {
    let pool = new_pool();
    let key = receiver_key(1);
    let to = receiver(&key);
    let sig = sign_withdrawal(&pool, 1, &to);

    //authorization signed by someone other than the receiver
    let body = request_body(&sig, &to, Some(&receiver_key(3)));

    let relayer = new_relayer(pool.ledger, MockExecutor::default());
    let (status, response) = handle(&relayer, &body);
    assert_eq!(status, 400);
    assert_eq!(response.error_message.as_deref(), Some("Invalid Message Signature"));
    assert_eq!(relayer.ledger().reads(), 0);
}

#[test]
fn authorization_requirement() {
    let pool = new_pool();
    let to = receiver(&receiver_key(1));
    let sig = sign_withdrawal(&pool, 2, &to);
    let body = request_body(&sig, &to, None);

    let required = new_relayer(pool.ledger, MockExecutor::default());
    assert_eq!(required.withdraw(&body), WithdrawalOutcome::Rejected(Rejection::Unauthorized));
    assert_eq!(required.ledger().reads(), 0);

    let pool = new_pool();
    let sig = sign_withdrawal(&pool, 2, &to);
    let body = request_body(&sig, &to, None);
    let mut config = RelayConfig::new(contract(), sender());
    config.require_authorization = false;
    let optional = Relayer::new(config, pool.ledger, MockExecutor::default());
    assert!(optional.withdraw(&body).is_submitted());
}

#[test]
fn redirected_receiver_fails_verification() {
    let pool = new_pool();
    let intended = receiver(&receiver_key(1));
    let sig = sign_withdrawal(&pool, 1, &intended);

    //someone else presents the same ring signature with their own, valid, authorization
    let thief_key = receiver_key(4);
    let thief = receiver(&thief_key);
    let body = request_body(&sig, &thief, Some(&thief_key));

    let relayer = new_relayer(pool.ledger, MockExecutor::default());
    let (status, response) = handle(&relayer, &body);
    assert_eq!(status, 400);
    assert_eq!(response.error_message.as_deref(), Some("Invalid Ring Signature"));
    assert_eq!(relayer.executor().estimates.get(), 0);
    assert!(relayer.executor().submitted.borrow().is_empty());
}

#[test]
fn malformed_ring_signatures() {
    let key = receiver_key(1);
    let to = receiver(&key);

    //one response short
    let pool = new_pool();
    let mut sig = sign_withdrawal(&pool, 0, &to);
    sig.s.pop();
    let body = request_body(&sig, &to, Some(&key));
    let outcome = new_relayer(pool.ledger, MockExecutor::default()).withdraw(&body);
    assert_eq!(outcome, WithdrawalOutcome::Rejected(Rejection::MalformedRingSignature));

    //key image off the curve
    let pool = new_pool();
    let sig = sign_withdrawal(&pool, 0, &to);
    let mut body = request_body(&sig, &to, Some(&key));
    body["keyImage"] = json!(["0x1", "0x3"]);
    let outcome = new_relayer(pool.ledger, MockExecutor::default()).withdraw(&body);
    assert_eq!(outcome, WithdrawalOutcome::Rejected(Rejection::MalformedRingSignature));

    //identity key image
    let pool = new_pool();
    let sig = sign_withdrawal(&pool, 0, &to);
    let mut body = request_body(&sig, &to, Some(&key));
    body["keyImage"] = json!(["0x0", "0x0"]);
    let relayer = new_relayer(pool.ledger, MockExecutor::default());
    let (status, response) = handle(&relayer, &body);
    assert_eq!(status, 400);
    assert_eq!(response.error_message.as_deref(), Some("Malformed Ring Signature"));
    assert_eq!(relayer.executor().estimates.get(), 0);
}

#[test]
fn estimation_revert_is_a_rejection() {
    let pool = new_pool();
    let key = receiver_key(1);
    let to = receiver(&key);
    let sig = sign_withdrawal(&pool, 1, &to);
    let body = request_body(&sig, &to, Some(&key));

    let executor = MockExecutor{
        estimate: Err(ExecutionError::Reverted(String::from("key image already spent"))),
        ..Default::default()
    };
    let relayer = new_relayer(pool.ledger, executor);
    let (status, response) = handle(&relayer, &body);
    assert_eq!(status, 400);
    assert_eq!(response.tx_hash, None);
    assert_eq!(response.error_message.as_deref(), Some("likely invalid input params"));
    assert!(relayer.executor().submitted.borrow().is_empty());
}

#[test]
fn estimate_over_gas_limit_is_a_rejection() {
    let pool = new_pool();
    let key = receiver_key(1);
    let to = receiver(&key);
    let sig = sign_withdrawal(&pool, 1, &to);
    let body = request_body(&sig, &to, Some(&key));

    let mut config = RelayConfig::new(contract(), sender());
    config.gas_limit = Some(ESTIMATE - 1);
    let relayer = Relayer::new(config, pool.ledger, MockExecutor::default());
    assert_eq!(relayer.withdraw(&body), WithdrawalOutcome::Rejected(Rejection::LedgerRejection));
    assert!(relayer.executor().submitted.borrow().is_empty());
}

#[test]
fn unencodable_call_is_a_rejection() {
    let mut pool = new_pool();
    pool.ledger.encode_error = Some(LedgerError::Encoding(String::from("amount out of range")));
    let key = receiver_key(1);
    let to = receiver(&key);
    let sig = sign_withdrawal(&pool, 1, &to);
    let body = request_body(&sig, &to, Some(&key));

    let relayer = new_relayer(pool.ledger, MockExecutor::default());
    let (status, response) = handle(&relayer, &body);
    assert_eq!(status, 400);
    assert_eq!(response.error_message.as_deref(), Some("Payload invalid format"));
    assert_eq!(relayer.executor().estimates.get(), 0);
}

#[test]
fn ledger_outage_is_a_failure() {
    let mut pool = new_pool();
    let key = receiver_key(1);
    let to = receiver(&key);
    let sig = sign_withdrawal(&pool, 1, &to);
    let body = request_body(&sig, &to, Some(&key));
    pool.ledger.unavailable = true;

    let relayer = new_relayer(pool.ledger, MockExecutor::default());
    let (status, response) = handle(&relayer, &body);
    assert_eq!(status, 200);
    assert_eq!(response.tx_hash, None);
    assert_eq!(response.error_message.as_deref(), Some("Ledger unavailable"));
    assert_eq!(relayer.executor().estimates.get(), 0);
}

#[test]
fn submission_error_reports_embedded_transaction_id() {
    let pool = new_pool();
    let key = receiver_key(1);
    let to = receiver(&key);
    let sig = sign_withdrawal(&pool, 1, &to);
    let body = request_body(&sig, &to, Some(&key));

    let pending = TxHash([0x77; 32]);
    let executor = MockExecutor{
        submission: Err(SubmissionError{
            message: String::from("Transaction has been reverted by the EVM"),
            detail: format!("{{\"status\": false, \"transactionHash\": \"{}\", \"gasUsed\": 21000}}", pending)
        }),
        ..Default::default()
    };
    let relayer = new_relayer(pool.ledger, executor);
    let (status, response) = handle(&relayer, &body);
    assert_eq!(status, 200);
    assert_eq!(response.tx_hash, Some(pending.to_string()));
    assert_eq!(response.error_message.as_deref(), Some("Transaction has been reverted by the EVM"));

    //never retried
    assert_eq!(relayer.executor().submitted.borrow().len(), 1);
}

#[test]
fn submission_error_without_transaction_id() {
    let pool = new_pool();
    let key = receiver_key(1);
    let to = receiver(&key);
    let sig = sign_withdrawal(&pool, 1, &to);
    let body = request_body(&sig, &to, Some(&key));

    let executor = MockExecutor{
        submission: Err(SubmissionError{
            message: String::from("nonce too low"),
            detail: String::from("nonce too low: {\"code\": -32000}")
        }),
        ..Default::default()
    };
    let relayer = new_relayer(pool.ledger, executor);
    let (status, response) = handle(&relayer, &body);
    assert_eq!(status, 200);
    assert_eq!(response.tx_hash, None);

    let wire: Value = serde_json::to_value(&response).unwrap();
    assert_eq!(wire, json!({ "txHash": null, "errorMessage": "nonce too low" }));
}

#[test]
fn reverted_receipt_is_a_failure() {
    let pool = new_pool();
    let key = receiver_key(1);
    let to = receiver(&key);
    let sig = sign_withdrawal(&pool, 1, &to);
    let body = request_body(&sig, &to, Some(&key));

    let executor = MockExecutor{
        submission: Ok(Receipt{ transaction_id: mined(), status: false }),
        ..Default::default()
    };
    let outcome = new_relayer(pool.ledger, executor).withdraw(&body);
    assert_eq!(outcome.status_code(), 200);
    assert_eq!(outcome, WithdrawalOutcome::Failed{
        error_message: String::from("Transaction reverted"),
        tx_hash: Some(mined())
    });
}

#[test]
fn transaction_id_extraction() {
    let tx_hash = TxHash([0x1f; 32]);

    let detail = format!("Transaction has been reverted by the EVM:\n{{\"transactionHash\": \"{}\"}}", tx_hash);
    assert_eq!(extract_transaction_id(&detail), Some(tx_hash));

    let detail = format!("failed after broadcast (tx {}), try again later", tx_hash);
    assert_eq!(extract_transaction_id(&detail), Some(tx_hash));

    //an address is not a transaction id, and neither is a 65 digit run
    let detail = format!("from {} to {}", contract(), format!("{}0", tx_hash));
    assert_eq!(extract_transaction_id(&detail), None);

    assert_eq!(extract_transaction_id("{\"transactionHash\": 12}"), None);
    assert_eq!(extract_transaction_id("{ unbalanced"), None);
    assert_eq!(extract_transaction_id(""), None);
}

#[test]
fn word_parsing() {
    assert_eq!(parse_word(&json!(5)), Some(Word::from(5u128)));
    assert_eq!(parse_word(&json!("5")), Some(Word::from(5u128)));
    assert_eq!(parse_word(&json!("0x05")), Some(Word::from(5u128)));
    assert_eq!(parse_word(&json!(format!("0x{}", "f".repeat(64)))), Some(Word([0xff; 32])));

    assert_eq!(parse_word(&json!(format!("0x1{}", "0".repeat(64)))), None);
    assert_eq!(parse_word(&json!("0x")), None);
    assert_eq!(parse_word(&json!("")), None);
    assert_eq!(parse_word(&json!("-5")), None);
    assert_eq!(parse_word(&json!("+5")), None);
    assert_eq!(parse_word(&json!("1_000")), None);
    assert_eq!(parse_word(&json!(-5)), None);
    assert_eq!(parse_word(&json!(0.5)), None);
    assert_eq!(parse_word(&json!([5])), None);
}

#[test]
fn outcome_status_codes() {
    assert_eq!(WithdrawalOutcome::Submitted{ tx_hash: mined() }.status_code(), 200);
    assert_eq!(WithdrawalOutcome::Failed{ error_message: String::new(), tx_hash: None }.status_code(), 200);
    for rejection in [
        Rejection::InvalidPayload,
        Rejection::Unauthorized,
        Rejection::MalformedRingSignature,
        Rejection::InvalidRingSignature,
        Rejection::UnencodableCall,
        Rejection::LedgerRejection,
    ] {
        assert_eq!(WithdrawalOutcome::Rejected(rejection).status_code(), 400);
    }
}

#[test]
fn config_from_env() {
    std::env::set_var("RELAY_CONTRACT", contract().to_string());
    std::env::set_var("RELAY_SENDER", "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf");
    std::env::set_var("RELAY_GAS_LIMIT", "500000");

    let config = RelayConfig::from_env().unwrap();
    assert_eq!(config.contract, contract());
    assert_eq!(config.sender, Address::from_str("0x7e5f4552091a69125d5dfcb7b8c2659029395bdf").unwrap());
    assert_eq!(config.gas_limit, Some(500_000));
    assert!(config.require_authorization);
}
