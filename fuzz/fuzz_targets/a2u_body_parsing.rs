#![no_main]

//! Fuzz target for A2U request validation.
//!
//! Every body either fails with one of the two validation messages or
//! yields a non-empty uid and a finite positive amount.

use libfuzzer_sys::fuzz_target;
use pibridge_api::extract::lenient_json;
use pibridge_core::{PaymentRequest, ValidationError};

fuzz_target!(|data: &[u8]| {
    match PaymentRequest::from_value(&lenient_json(data)) {
        Ok(request) => {
            assert!(!request.uid.is_empty());
            assert!(request.amount.value().is_finite());
            assert!(request.amount.value() > 0.0);
        },
        Err(ValidationError::InvalidUid | ValidationError::InvalidAmount) => {},
        Err(other) => panic!("unexpected validation error: {other}"),
    }
});
