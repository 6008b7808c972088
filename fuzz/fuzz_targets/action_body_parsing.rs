#![no_main]

//! Fuzz target for payment action body negotiation.
//!
//! Feeds arbitrary bytes through the same decoding the `/pi-payment`
//! handler performs and checks that it never panics and that every accepted
//! body satisfies the field invariants.

use libfuzzer_sys::fuzz_target;
use pibridge_api::extract::negotiate_object;
use pibridge_core::{ActionRequest, PaymentCommand, ValidationError};

fuzz_target!(|data: &[u8]| {
    let Ok(object) = negotiate_object(data) else {
        return;
    };

    let Ok(request) = ActionRequest::from_object(&object) else {
        return;
    };
    assert!(!request.action.is_empty());
    assert!(!request.payment_id.as_str().is_empty());

    match request.command() {
        Ok(PaymentCommand::Approve) => assert_eq!(request.action, "approve"),
        Ok(PaymentCommand::Complete { txid }) => {
            assert_eq!(request.action, "complete");
            assert!(!txid.is_empty());
        },
        Err(ValidationError::MissingTxid) => assert!(request.txid.is_none()),
        Err(ValidationError::UnknownAction) => {
            assert!(request.action != "approve" && request.action != "complete");
        },
        Err(other) => panic!("unexpected command error: {other}"),
    }
});
