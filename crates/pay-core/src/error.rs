//! # Payment Error Types
//!
//! Typed error handling for the Apple Pay session core.
//! All fallible operations return `Result<T, PaymentError>`.

use thiserror::Error;

/// Core error type for configuration and session operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Missing or empty required configuration field
    #[error("Configuration error [{field}]: {message}")]
    Configuration {
        field: &'static str,
        message: String,
    },

    /// Apple Pay is not available in this browser or not enabled for the merchant
    #[error("Unsupported environment: {0}")]
    UnsupportedEnvironment(String),

    /// Button clicked for a payment type that is not enabled
    #[error("Payment type {payment_type} is not enabled for this merchant")]
    PaymentTypeDisabled { payment_type: u32 },

    /// A payment sheet is already open on this orchestrator
    #[error("A payment session is already in progress")]
    SessionInProgress,

    /// Merchant validation was rejected or returned an unusable body
    #[error("Merchant validation failed: {0}")]
    MerchantValidation(String),

    /// Validation endpoint answered with a non-2xx status
    #[error("Validation endpoint returned HTTP {status}: {message}")]
    ValidationEndpoint { status: u16, message: String },

    /// Network/HTTP error talking to the gateway
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Settlement payload could not be assembled
    #[error("Authorization failed: {0}")]
    Authorization(String),

    /// Full-page navigation could not be performed
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// The native payment API threw
    #[error("Platform error: {0}")]
    Platform(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// How a native session must be terminated after an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// `session.abort()`, used while merchant validation is pending
    Abort,
    /// `session.completePayment(STATUS_FAILURE)`, used after authorization
    FailPayment,
    /// No session is open, nothing to terminate
    None,
}

impl PaymentError {
    /// Shorthand for a missing required field
    pub fn missing(field: &'static str, message: impl Into<String>) -> Self {
        PaymentError::Configuration {
            field,
            message: message.into(),
        }
    }

    /// Returns true if the error must be surfaced to the caller synchronously
    pub fn is_fatal(&self) -> bool {
        matches!(self, PaymentError::Configuration { .. })
    }

    /// Returns the session termination this error resolves into
    pub fn termination(&self) -> Termination {
        match self {
            PaymentError::MerchantValidation(_)
            | PaymentError::ValidationEndpoint { .. }
            | PaymentError::NetworkError(_)
            | PaymentError::Serialization(_) => Termination::Abort,
            PaymentError::Authorization(_) | PaymentError::Navigation(_) => {
                Termination::FailPayment
            }
            PaymentError::Configuration { .. }
            | PaymentError::UnsupportedEnvironment(_)
            | PaymentError::PaymentTypeDisabled { .. }
            | PaymentError::SessionInProgress
            | PaymentError::Platform(_) => Termination::None,
        }
    }

    /// Name of the offending configuration field, if any
    pub fn field(&self) -> Option<&'static str> {
        match self {
            PaymentError::Configuration { field, .. } => Some(*field),
            _ => None,
        }
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_errors() {
        assert!(PaymentError::missing("token", "Token is required").is_fatal());
        assert!(!PaymentError::NetworkError("timeout".into()).is_fatal());
        assert!(!PaymentError::UnsupportedEnvironment("no ApplePaySession".into()).is_fatal());
    }

    #[test]
    fn test_terminations() {
        assert_eq!(
            PaymentError::ValidationEndpoint {
                status: 500,
                message: "boom".into()
            }
            .termination(),
            Termination::Abort
        );
        assert_eq!(
            PaymentError::Serialization("bad json".into()).termination(),
            Termination::Abort
        );
        assert_eq!(
            PaymentError::Authorization("missing token".into()).termination(),
            Termination::FailPayment
        );
        assert_eq!(
            PaymentError::SessionInProgress.termination(),
            Termination::None
        );
    }

    #[test]
    fn test_display() {
        let err = PaymentError::missing("amount", "Amount is required");
        assert_eq!(err.to_string(), "Configuration error [amount]: Amount is required");
        assert_eq!(err.field(), Some("amount"));
    }
}
