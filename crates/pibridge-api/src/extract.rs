//! Request body decoding.
//!
//! Callers of the payment endpoints do not reliably send well-formed JSON
//! objects. Some clients post a JSON document that was serialized twice, so
//! the body arrives as a JSON string whose contents are the real object.
//! Decoding is done by hand from raw bytes instead of through `axum::Json`
//! so those bodies can be accepted and every rejection maps onto the
//! endpoint's own error message.

use pibridge_core::ValidationError;
use serde_json::{Map, Value};

/// Decodes a body leniently, yielding `Value::Null` for anything that is not
/// JSON.
///
/// The A2U endpoint validates fields on whatever was decoded, so a missing or
/// malformed body simply has no `uid`. Numbers beyond `f64` range still
/// decode; they fail the amount check instead of the whole body.
pub fn lenient_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap_or(Value::Null)
}

/// Negotiates a body into a JSON object.
///
/// A body that decodes to a JSON string is decoded a second time. The
/// result must be an object.
///
/// # Errors
///
/// Returns `ValidationError::InvalidJsonBody` for an empty body, a decode
/// failure at either level, or a result that is not an object.
pub fn negotiate_object(body: &[u8]) -> Result<Map<String, Value>, ValidationError> {
    let decoded: Value =
        serde_json::from_slice(body).map_err(|_| ValidationError::InvalidJsonBody)?;

    let decoded = match decoded {
        Value::String(inner) => {
            serde_json::from_str(&inner).map_err(|_| ValidationError::InvalidJsonBody)?
        },
        other => other,
    };

    match decoded {
        Value::Object(object) => Ok(object),
        _ => Err(ValidationError::InvalidJsonBody),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn plain_object_is_accepted() {
        let object = negotiate_object(br#"{"action":"approve","paymentId":"P1"}"#).unwrap();

        assert_eq!(Value::Object(object), json!({"action": "approve", "paymentId": "P1"}));
    }

    #[test]
    fn string_encoded_object_is_decoded_twice() {
        let body = serde_json::to_vec(&json!(r#"{"action":"complete","paymentId":"P1","txid":"t"}"#))
            .unwrap();

        let object = negotiate_object(&body).unwrap();

        assert_eq!(object["txid"], json!("t"));
    }

    #[test]
    fn rejects_everything_that_is_not_an_object() {
        for body in [
            &b""[..],
            b"not json",
            b"[1,2,3]",
            b"42",
            b"null",
            br#""not json inside""#,
            br#""[\"array\"]""#,
        ] {
            assert_eq!(
                negotiate_object(body),
                Err(ValidationError::InvalidJsonBody),
                "body {:?}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn only_one_level_of_string_encoding_is_unwrapped() {
        let twice = serde_json::to_string(&json!({"action": "approve"})).unwrap();
        let thrice = serde_json::to_vec(&json!(serde_json::to_string(&json!(twice)).unwrap())).unwrap();

        assert_eq!(negotiate_object(&thrice), Err(ValidationError::InvalidJsonBody));
    }

    #[test]
    fn lenient_decode_falls_back_to_null() {
        assert_eq!(lenient_json(b""), Value::Null);
        assert_eq!(lenient_json(b"uid=abc"), Value::Null);
        assert_eq!(lenient_json(br#"{"uid":"abc"}"#), json!({"uid": "abc"}));
    }

    #[test]
    fn out_of_range_numbers_survive_decoding() {
        let body = lenient_json(br#"{"uid":"abc","amount":1e400}"#);

        assert_eq!(body["uid"], json!("abc"));
        assert_eq!(body["amount"].as_f64(), None);
    }
}
