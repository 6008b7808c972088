//! Payment domain models and strongly-typed identifiers.
//!
//! Defines the caller-facing request and response bodies, the create-payment
//! body sent to the provider, and newtype wrappers that keep credentials,
//! payment identifiers and amounts from being mixed up with plain strings and
//! floats. Caller input arrives as loosely-typed JSON, so the constructors here
//! perform the coercions and presence checks the HTTP contract requires.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{Result, ValidationError};

/// Largest integer a JSON consumer using IEEE-754 doubles represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Provider API credential.
///
/// The secret never appears in `Debug` output, so it is safe to derive
/// `Debug` on structs that hold one.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a credential, returning `None` when it is empty.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        (!key.is_empty()).then_some(Self(key))
    }

    /// Value for the `Authorization` header expected by the provider.
    pub fn authorization(&self) -> String {
        format!("Key {}", self.0)
    }

    /// Returns the credential with everything after the first four
    /// characters hidden, for logs.
    pub fn masked(&self) -> String {
        let visible: String = self.0.chars().take(4).collect();
        format!("{visible}***")
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Provider-assigned payment identifier.
///
/// # Example
///
/// ```
/// use pibridge_core::PaymentId;
///
/// let id = PaymentId::new("P1").unwrap();
/// assert_eq!(id.to_string(), "P1");
/// assert!(PaymentId::new("").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(String);

impl PaymentId {
    /// Wraps an identifier, returning `None` when it is empty.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        (!id.is_empty()).then_some(Self(id))
    }

    /// Borrows the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PaymentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Transfer amount in the provider's currency unit.
///
/// Always finite and strictly positive. Whole values serialize as JSON
/// integers so `1` stays `1` on the wire instead of becoming `1.0`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Amount(f64);

impl Amount {
    /// Wraps a value, returning `None` unless it is finite and above zero.
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && value > 0.0).then_some(Self(value))
    }

    /// Coerces a loosely-typed JSON value into an amount.
    ///
    /// Numbers are taken as-is and strings are trimmed and parsed. Any other
    /// JSON type, an unparsable string, or a value that is not finite and
    /// positive yields `None`.
    pub fn coerce(value: &Value) -> Option<Self> {
        let raw = match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => {
                let text = text.trim();
                if text.is_empty() {
                    None
                } else {
                    text.parse::<f64>().ok()
                }
            },
            _ => None,
        };

        raw.and_then(Self::new)
    }

    /// Returns the underlying value.
    pub fn value(self) -> f64 {
        self.0
    }

    fn as_whole(self) -> Option<u64> {
        if self.0.fract() == 0.0 && self.0 <= MAX_SAFE_INTEGER {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Some(self.0 as u64)
        } else {
            None
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_whole() {
            Some(whole) => write!(f, "{whole}"),
            None => write!(f, "{}", self.0),
        }
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.as_whole() {
            Some(whole) => serializer.serialize_u64(whole),
            None => serializer.serialize_f64(self.0),
        }
    }
}

/// Validated body of an App-to-User transfer request.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    /// Recipient account in the provider's system.
    pub uid: String,
    /// Amount to transfer.
    pub amount: Amount,
}

impl PaymentRequest {
    /// Validates a decoded request body.
    ///
    /// Checks `uid` first, then `amount`. A body that is not a JSON object
    /// has no `uid` and fails the first check.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidUid` when `uid` is missing, not a
    /// string, or empty, and `ValidationError::InvalidAmount` when `amount`
    /// does not coerce to a finite positive number.
    pub fn from_value(body: &Value) -> Result<Self> {
        let uid = match body.get("uid") {
            Some(Value::String(uid)) if !uid.is_empty() => uid.clone(),
            _ => return Err(ValidationError::InvalidUid),
        };

        let amount = body.get("amount").and_then(Amount::coerce).ok_or(ValidationError::InvalidAmount)?;

        Ok(Self { uid, amount })
    }
}

/// Body of a payment action request, with required fields present.
///
/// The `action` discriminator is kept as received; it is interpreted by
/// [`ActionRequest::command`] only after the credential check has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    /// Raw action discriminator.
    pub action: String,
    /// Payment the action applies to.
    pub payment_id: PaymentId,
    /// Blockchain transaction id, needed to complete a payment.
    pub txid: Option<String>,
}

impl ActionRequest {
    /// Extracts the action fields from a negotiated JSON object.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingActionOrPaymentId` when either field
    /// is absent or empty.
    pub fn from_object(body: &Map<String, Value>) -> Result<Self> {
        let action = body.get("action").and_then(text_field);
        let payment_id = body.get("paymentId").and_then(text_field).and_then(PaymentId::new);

        let (Some(action), Some(payment_id)) = (action, payment_id) else {
            return Err(ValidationError::MissingActionOrPaymentId);
        };

        Ok(Self { action, payment_id, txid: body.get("txid").and_then(text_field) })
    }

    /// Interprets the action discriminator.
    ///
    /// Matching is exact and case-sensitive.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingTxid` for `complete` without a
    /// `txid`, and `ValidationError::UnknownAction` for anything other than
    /// `approve` or `complete`.
    pub fn command(&self) -> Result<PaymentCommand> {
        match self.action.as_str() {
            "approve" => Ok(PaymentCommand::Approve),
            "complete" => self
                .txid
                .clone()
                .map(|txid| PaymentCommand::Complete { txid })
                .ok_or(ValidationError::MissingTxid),
            _ => Err(ValidationError::UnknownAction),
        }
    }
}

/// Reads a string-like field. Empty strings and numeric zero count as absent.
fn text_field(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) if number.as_f64() != Some(0.0) => Some(number.to_string()),
        _ => None,
    }
}

/// A single provider call requested through the action endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentCommand {
    /// Approve a user-initiated payment.
    Approve,
    /// Complete a payment with its blockchain transaction id.
    Complete {
        /// Transaction id forwarded to the provider.
        txid: String,
    },
}

impl PaymentCommand {
    /// Provider step this command performs.
    pub fn step(&self) -> PaymentStep {
        match self {
            Self::Approve => PaymentStep::Approve,
            Self::Complete { .. } => PaymentStep::Complete,
        }
    }

    /// Stage reported to the caller once the command succeeds.
    pub fn stage(&self) -> PaymentStage {
        match self {
            Self::Approve => PaymentStage::Approved,
            Self::Complete { .. } => PaymentStage::Completed,
        }
    }
}

/// Provider lifecycle step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentStep {
    /// `POST payments`
    Create,
    /// `POST payments/{id}/approve`
    Approve,
    /// `POST payments/{id}/complete`
    Complete,
}

impl PaymentStep {
    /// Caller-facing message for a provider rejection at this step.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::Create => "Create failed",
            Self::Approve => "Approve failed",
            Self::Complete => "Complete failed",
        }
    }
}

impl fmt::Display for PaymentStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Approve => write!(f, "approve"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// Stage reached by a successful payment action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStage {
    /// The payment was approved.
    Approved,
    /// The payment was completed.
    Completed,
}

/// Create-payment body sent to the provider.
#[derive(Debug, Clone, Serialize)]
pub struct NewPayment {
    /// Recipient account.
    pub uid: String,
    /// Amount to transfer.
    pub amount: Amount,
    /// Free-text memo shown to the recipient.
    pub memo: String,
    /// Application metadata attached to the payment.
    pub metadata: PaymentMetadata,
}

/// Metadata attached to an App-to-User payment.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentMetadata {
    /// Payment category label.
    #[serde(rename = "type")]
    pub kind: String,
    /// Recipient account, repeated for the application's own bookkeeping.
    pub uid: String,
    /// Creation time in milliseconds since the Unix epoch.
    pub ts: u64,
}

impl NewPayment {
    /// Builds the create body for a validated App-to-User request.
    pub fn a2u(
        request: &PaymentRequest,
        memo: impl Into<String>,
        kind: impl Into<String>,
        ts: u64,
    ) -> Self {
        Self {
            uid: request.uid.clone(),
            amount: request.amount,
            memo: memo.into(),
            metadata: PaymentMetadata { kind: kind.into(), uid: request.uid.clone(), ts },
        }
    }
}

/// Payment record returned by the provider.
///
/// The provider's schema is treated as opaque: only `identifier` is read, and
/// `status` is carried through without interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalPayment {
    /// Provider-assigned identifier, when present and non-empty.
    pub identifier: Option<PaymentId>,
    /// Provider status value, verbatim.
    pub status: Option<Value>,
    /// Full response body.
    pub raw: Value,
}

impl From<Value> for ExternalPayment {
    fn from(raw: Value) -> Self {
        let identifier = raw.get("identifier").and_then(Value::as_str).and_then(PaymentId::new);
        let status = raw.get("status").cloned();
        Self { identifier, status, raw }
    }
}

/// Successful App-to-User response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct A2uResponse {
    /// Always `true`.
    pub ok: bool,
    /// Recipient account.
    pub uid: String,
    /// Amount transferred.
    pub amount: Amount,
    /// Provider payment identifier.
    pub payment_id: PaymentId,
    /// Status from the provider's completion response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
}

/// Successful payment action response.
#[derive(Debug, Clone, Serialize)]
pub struct ActionResponse {
    /// Always `true`.
    pub ok: bool,
    /// Stage the payment reached.
    pub stage: PaymentStage,
}

impl ActionResponse {
    /// Builds the success body for a stage.
    pub fn reached(stage: PaymentStage) -> Self {
        Self { ok: true, stage }
    }
}
