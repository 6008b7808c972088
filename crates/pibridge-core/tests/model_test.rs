//! Property tests for caller input validation.
//!
//! Exercises amount coercion and request validation over generated inputs
//! rather than hand-picked examples.

use pibridge_core::{Amount, PaymentRequest, ValidationError};
use proptest::prelude::*;
use serde_json::json;

proptest! {
    /// Every finite positive number is a valid amount and keeps its value.
    #[test]
    fn finite_positive_numbers_are_accepted(value in 1e-9f64..1e12) {
        let amount = Amount::coerce(&json!(value)).expect("positive amount accepted");
        prop_assert_eq!(amount.value(), value);
    }

    /// Zero and negative numbers are always rejected.
    #[test]
    fn non_positive_numbers_are_rejected(value in -1e12f64..=0.0) {
        prop_assert!(Amount::coerce(&json!(value)).is_none());
    }

    /// Numeric strings coerce to the same value as the number they spell.
    #[test]
    fn numeric_strings_match_numbers(value in 1u32..1_000_000) {
        let from_string = Amount::coerce(&json!(value.to_string())).expect("numeric string");
        let from_number = Amount::coerce(&json!(value)).expect("number");
        prop_assert_eq!(from_string, from_number);
    }

    /// Any non-empty string uid passes the uid check, so failures can only
    /// come from the amount.
    #[test]
    fn non_empty_uid_reaches_amount_check(uid in "[a-zA-Z0-9_-]{1,32}") {
        let err = PaymentRequest::from_value(&json!({"uid": uid, "amount": 0}))
            .expect_err("zero amount rejected");
        prop_assert_eq!(err, ValidationError::InvalidAmount);
    }

    /// Strings that are not numbers never coerce.
    #[test]
    fn alphabetic_strings_are_rejected(text in "[g-zG-Z]{1,12}") {
        prop_assert!(Amount::coerce(&json!(text)).is_none());
    }
}

#[test]
fn integer_amounts_round_trip_to_integer_json() {
    let request = PaymentRequest::from_value(&json!({"uid": "pioneer", "amount": 10})).unwrap();

    assert_eq!(serde_json::to_value(request.amount).unwrap(), json!(10));
}
