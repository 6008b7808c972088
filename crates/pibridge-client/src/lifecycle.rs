//! App-to-User payment lifecycle as a typed state machine.
//!
//! A transfer moves through `Created → Approved → Completed`. Each state is a
//! distinct type and each transition consumes the previous state, so a
//! payment cannot be completed without first being approved, and a failed
//! step ends the sequence through `?`.
//!
//! ```no_run
//! use pibridge_client::{lifecycle, PaymentProvider};
//! use pibridge_core::{ApiKey, NewPayment};
//!
//! # async fn example(
//! #     provider: &dyn PaymentProvider,
//! #     api_key: &ApiKey,
//! #     payment: &NewPayment,
//! # ) -> Result<(), lifecycle::LifecycleError> {
//! let completed = lifecycle::create(provider, api_key, payment)
//!     .await?
//!     .approve(provider, api_key)
//!     .await?
//!     .complete(provider, api_key)
//!     .await?;
//! println!("payment {} finished", completed.payment_id);
//! # Ok(())
//! # }
//! ```
//!
//! Nothing here is idempotent. Restarting after a failed approve or complete
//! creates a brand new payment; there is no way to resume a previous one.

use pibridge_core::{ApiKey, ExternalPayment, NewPayment, PaymentId, PaymentStep};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

use crate::{
    error::ClientError,
    provider::{PaymentProvider, ProviderResponse},
};

/// Why a lifecycle transition did not happen.
#[derive(Debug, Clone, Error)]
pub enum LifecycleError {
    /// The provider answered but did not accept the step.
    #[error("provider rejected {step} with HTTP {status_code}")]
    Rejected {
        /// Step that was rejected
        step: PaymentStep,
        /// Provider status code
        status_code: u16,
        /// Provider body, parsed as JSON when possible
        details: Value,
    },

    /// No usable answer was obtained.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// A payment the provider has created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    /// Provider identifier of the new payment.
    pub payment_id: PaymentId,
}

/// A payment the provider has approved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approved {
    /// Provider identifier of the payment.
    pub payment_id: PaymentId,
}

/// A payment the provider has completed.
#[derive(Debug, Clone, PartialEq)]
pub struct Completed {
    /// Provider identifier of the payment.
    pub payment_id: PaymentId,
    /// Provider record returned by the completion call.
    pub payment: ExternalPayment,
}

/// Creates a payment, entering the lifecycle.
///
/// Succeeds only on a 2xx answer whose body names a non-empty `identifier`.
///
/// # Errors
///
/// `LifecycleError::Rejected` for a non-2xx answer or a missing identifier,
/// `LifecycleError::Client` when no usable answer arrived.
pub async fn create(
    provider: &dyn PaymentProvider,
    api_key: &ApiKey,
    payment: &NewPayment,
) -> Result<Created, LifecycleError> {
    let response = provider.create_payment(api_key, payment).await?;
    let record = accepted(PaymentStep::Create, &response)?;

    let Some(payment_id) = record.identifier else {
        error!(details = %record.raw, "Provider created no payment identifier");
        return Err(LifecycleError::Rejected {
            step: PaymentStep::Create,
            status_code: response.status_code,
            details: record.raw,
        });
    };

    info!(payment_id = %payment_id, "Payment created");
    Ok(Created { payment_id })
}

impl Created {
    /// Approves the created payment.
    ///
    /// # Errors
    ///
    /// `LifecycleError::Rejected` for a non-2xx answer, `LifecycleError::Client`
    /// when no usable answer arrived.
    pub async fn approve(
        self,
        provider: &dyn PaymentProvider,
        api_key: &ApiKey,
    ) -> Result<Approved, LifecycleError> {
        let response = provider.approve_payment(api_key, &self.payment_id).await?;
        accepted(PaymentStep::Approve, &response)?;

        info!(payment_id = %self.payment_id, "Payment approved");
        Ok(Approved { payment_id: self.payment_id })
    }
}

impl Approved {
    /// Completes the approved payment. No transaction id is sent.
    ///
    /// # Errors
    ///
    /// `LifecycleError::Rejected` for a non-2xx answer, `LifecycleError::Client`
    /// when no usable answer arrived.
    pub async fn complete(
        self,
        provider: &dyn PaymentProvider,
        api_key: &ApiKey,
    ) -> Result<Completed, LifecycleError> {
        let response = provider.complete_payment(api_key, &self.payment_id, None).await?;
        let payment = accepted(PaymentStep::Complete, &response)?;

        info!(payment_id = %self.payment_id, "Payment completed");
        Ok(Completed { payment_id: self.payment_id, payment })
    }
}

/// Runs create, approve and complete in order, stopping at the first failure.
///
/// # Errors
///
/// The first failing transition's error.
pub async fn run_a2u(
    provider: &dyn PaymentProvider,
    api_key: &ApiKey,
    payment: &NewPayment,
) -> Result<Completed, LifecycleError> {
    create(provider, api_key, payment)
        .await?
        .approve(provider, api_key)
        .await?
        .complete(provider, api_key)
        .await
}

/// Checks a step's answer and decodes its body.
///
/// A 2xx answer must carry JSON; anything else is an unexpected shape.
fn accepted(
    step: PaymentStep,
    response: &ProviderResponse,
) -> Result<ExternalPayment, LifecycleError> {
    if !response.is_success {
        let details = response.details();
        error!(step = %step, status = response.status_code, details = %details, "Provider rejected step");
        return Err(LifecycleError::Rejected {
            step,
            status_code: response.status_code,
            details,
        });
    }

    Ok(ExternalPayment::from(response.json()?))
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        sync::Mutex,
        time::Duration,
    };

    use async_trait::async_trait;
    use pibridge_core::{Amount, PaymentRequest};
    use serde_json::json;

    use super::*;
    use crate::error::Result;

    /// Provider that replays canned answers and records which steps ran.
    #[derive(Debug, Default)]
    struct ScriptedProvider {
        answers: Mutex<VecDeque<Result<ProviderResponse>>>,
        calls: Mutex<Vec<(PaymentStep, Option<String>)>>,
    }

    impl ScriptedProvider {
        fn answering(answers: Vec<Result<ProviderResponse>>) -> Self {
            Self { answers: Mutex::new(answers.into()), calls: Mutex::default() }
        }

        fn next(&self, step: PaymentStep, payment_id: Option<&PaymentId>) -> Result<ProviderResponse> {
            self.calls.lock().unwrap().push((step, payment_id.map(ToString::to_string)));
            self.answers.lock().unwrap().pop_front().expect("unscripted provider call")
        }

        fn steps(&self) -> Vec<PaymentStep> {
            self.calls.lock().unwrap().iter().map(|(step, _)| *step).collect()
        }
    }

    #[async_trait]
    impl PaymentProvider for ScriptedProvider {
        async fn create_payment(&self, _: &ApiKey, _: &NewPayment) -> Result<ProviderResponse> {
            self.next(PaymentStep::Create, None)
        }

        async fn approve_payment(&self, _: &ApiKey, id: &PaymentId) -> Result<ProviderResponse> {
            self.next(PaymentStep::Approve, Some(id))
        }

        async fn complete_payment(
            &self,
            _: &ApiKey,
            id: &PaymentId,
            txid: Option<&str>,
        ) -> Result<ProviderResponse> {
            assert!(txid.is_none(), "A2U completion sends no txid");
            self.next(PaymentStep::Complete, Some(id))
        }
    }

    fn answer(status_code: u16, body: serde_json::Value) -> Result<ProviderResponse> {
        Ok(ProviderResponse {
            status_code,
            body: body.to_string(),
            duration: Duration::from_millis(1),
            is_success: (200..300).contains(&status_code),
        })
    }

    fn payment() -> NewPayment {
        let request = PaymentRequest { uid: "user-1".into(), amount: Amount::new(1.0).unwrap() };
        NewPayment::a2u(&request, "memo", "a2u-testnet", 0)
    }

    fn key() -> ApiKey {
        ApiKey::new("k").unwrap()
    }

    #[tokio::test]
    async fn full_sequence_reaches_completed() {
        let provider = ScriptedProvider::answering(vec![
            answer(200, json!({"identifier": "P1"})),
            answer(200, json!({"identifier": "P1"})),
            answer(200, json!({"identifier": "P1", "status": "completed"})),
        ]);

        let completed = run_a2u(&provider, &key(), &payment()).await.unwrap();

        assert_eq!(completed.payment_id.as_str(), "P1");
        assert_eq!(completed.payment.status, Some(json!("completed")));
        assert_eq!(
            provider.steps(),
            vec![PaymentStep::Create, PaymentStep::Approve, PaymentStep::Complete]
        );
        assert!(provider
            .calls
            .lock()
            .unwrap()
            .iter()
            .skip(1)
            .all(|(_, id)| id.as_deref() == Some("P1")));
    }

    #[tokio::test]
    async fn missing_identifier_stops_after_create() {
        let provider = ScriptedProvider::answering(vec![answer(200, json!({"ok": true}))]);

        let err = run_a2u(&provider, &key(), &payment()).await.unwrap_err();

        match err {
            LifecycleError::Rejected { step, status_code, details } => {
                assert_eq!(step, PaymentStep::Create);
                assert_eq!(status_code, 200);
                assert_eq!(details, json!({"ok": true}));
            },
            other => panic!("expected rejection, got {other}"),
        }
        assert_eq!(provider.steps(), vec![PaymentStep::Create]);
    }

    #[tokio::test]
    async fn approve_rejection_skips_complete() {
        let provider = ScriptedProvider::answering(vec![
            answer(200, json!({"identifier": "P1"})),
            answer(400, json!({"error": "already_approved"})),
        ]);

        let err = run_a2u(&provider, &key(), &payment()).await.unwrap_err();

        assert!(matches!(
            err,
            LifecycleError::Rejected { step: PaymentStep::Approve, status_code: 400, .. }
        ));
        assert_eq!(provider.steps(), vec![PaymentStep::Create, PaymentStep::Approve]);
    }

    #[tokio::test]
    async fn network_failure_surfaces_as_client_error() {
        let provider = ScriptedProvider::answering(vec![
            answer(200, json!({"identifier": "P1"})),
            answer(200, json!({})),
            Err(ClientError::network("connection reset")),
        ]);

        let err = run_a2u(&provider, &key(), &payment()).await.unwrap_err();

        assert!(matches!(err, LifecycleError::Client(ClientError::NetworkError { .. })));
        assert_eq!(err.to_string(), "network request failed: connection reset");
    }

    #[tokio::test]
    async fn non_json_success_is_an_invalid_response() {
        let provider = ScriptedProvider::answering(vec![Ok(ProviderResponse {
            status_code: 200,
            body: "<html>ok</html>".to_string(),
            duration: Duration::from_millis(1),
            is_success: true,
        })]);

        let err = create(&provider, &key(), &payment()).await.unwrap_err();

        assert!(matches!(err, LifecycleError::Client(ClientError::InvalidResponse { .. })));
    }
}
