//! Request fixtures.

use serde_json::{json, Value};

/// Credential configured on every [`TestApp`](crate::TestApp) by default.
pub const TEST_API_KEY: &str = "test-pi-key";

/// Wall-clock time, in Unix milliseconds, the test clock starts at.
pub const FIXED_TIME_MILLIS: u64 = 1_700_000_000_000;

/// `Authorization` header value the provider should receive.
pub fn expected_authorization() -> String {
    format!("Key {TEST_API_KEY}")
}

/// Body for `POST /a2u`.
pub fn a2u_body(uid: &str, amount: impl Into<Value>) -> Value {
    json!({"uid": uid, "amount": amount.into()})
}

/// Body for an approve action.
pub fn approve_body(payment_id: &str) -> Value {
    json!({"action": "approve", "paymentId": payment_id})
}

/// Body for a complete action.
pub fn complete_body(payment_id: &str, txid: &str) -> Value {
    json!({"action": "complete", "paymentId": payment_id, "txid": txid})
}
