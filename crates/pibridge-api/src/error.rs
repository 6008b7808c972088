//! HTTP error responses for the payment endpoints.
//!
//! Both endpoints answer failures with a JSON object carrying an `error`
//! message, but they disagree on details: an upstream rejection is a 500 on
//! the A2U endpoint and a 502 on the action endpoint, and an unexpected
//! failure is reported under `details` by one and `message` by the other.
//! Each variant records the [`Flow`] it was raised in so the response
//! follows the right contract.

use axum::{
    http::{header::ALLOW, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use pibridge_client::LifecycleError;
use pibridge_core::{PaymentStep, ValidationError};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Endpoint whose response contract applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// `POST /a2u`
    A2u,
    /// `POST /pi-payment`
    PaymentAction,
}

/// Failure of a payment request.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The endpoint only accepts POST.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// No provider credential is configured.
    #[error("provider credential is not configured")]
    ConfigurationError {
        /// Endpoint that needed the credential
        flow: Flow,
    },

    /// The request body failed validation.
    #[error(transparent)]
    InvalidInput(ValidationError),

    /// The provider answered a step with a non-2xx status.
    #[error("provider rejected {step} with HTTP {status_code}")]
    UpstreamCallFailed {
        /// Endpoint that made the call
        flow: Flow,
        /// Step that was rejected
        step: PaymentStep,
        /// Provider status code
        status_code: u16,
        /// Provider body forwarded to the caller
        details: Value,
    },

    /// The action discriminator is not recognized.
    #[error("Unknown action")]
    UnknownAction,

    /// Anything else: network failures, malformed provider answers.
    #[error("{message}")]
    BackendException {
        /// Endpoint that failed
        flow: Flow,
        /// Underlying failure message
        message: String,
    },
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl ErrorBody {
    fn plain(error: impl Into<String>) -> Self {
        Self { error: error.into(), details: None, message: None }
    }
}

impl ApiError {
    /// Builds the error for an unexpected failure.
    pub fn backend(flow: Flow, message: impl Into<String>) -> Self {
        Self::BackendException { flow, message: message.into() }
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidInput(_) | Self::UnknownAction => StatusCode::BAD_REQUEST,
            Self::UpstreamCallFailed { flow: Flow::PaymentAction, .. } => StatusCode::BAD_GATEWAY,
            Self::ConfigurationError { .. }
            | Self::UpstreamCallFailed { flow: Flow::A2u, .. }
            | Self::BackendException { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            Self::MethodNotAllowed => ErrorBody::plain("Method not allowed"),
            Self::ConfigurationError { flow: Flow::A2u } => ErrorBody::plain("Missing PI_API_KEY"),
            Self::ConfigurationError { flow: Flow::PaymentAction } => {
                ErrorBody::plain("PI_API_KEY not configured")
            },
            Self::InvalidInput(reason) => ErrorBody::plain(reason.to_string()),
            Self::UnknownAction => ErrorBody::plain("Unknown action"),
            Self::UpstreamCallFailed { step, details, .. } => ErrorBody {
                error: step.failure_message().to_string(),
                details: Some(details.clone()),
                message: None,
            },
            Self::BackendException { flow: Flow::A2u, message } => ErrorBody {
                error: "A2U exception".to_string(),
                details: Some(Value::String(message.clone())),
                message: None,
            },
            Self::BackendException { flow: Flow::PaymentAction, message } => ErrorBody {
                error: "Backend exception".to_string(),
                details: None,
                message: Some(message.clone()),
            },
        }
    }

    /// Maps a failed A2U lifecycle onto the A2U contract.
    pub fn from_lifecycle(err: LifecycleError) -> Self {
        match err {
            LifecycleError::Rejected { step, status_code, details } => {
                Self::UpstreamCallFailed { flow: Flow::A2u, step, status_code, details }
            },
            LifecycleError::Client(e) => Self::backend(Flow::A2u, e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(reason: ValidationError) -> Self {
        match reason {
            ValidationError::UnknownAction => Self::UnknownAction,
            other => Self::InvalidInput(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = (status, Json(self.body())).into_response();
        if matches!(self, Self::MethodNotAllowed) {
            response.headers_mut().insert(ALLOW, HeaderValue::from_static("POST"));
        }
        response
    }
}
