//! # Platform Ports
//!
//! Traits the session orchestrator drives. The browser crate implements them
//! on top of `ApplePaySession`, `fetch` and `window.location`; tests use
//! in-memory doubles.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    SessionOrchestrator                       │
//! └──────────────────────────────────────────────────────────────┘
//!        │                 │                   │
//!        ▼                 ▼                   ▼
//! ┌───────────────┐ ┌──────────────────┐ ┌───────────────┐
//! │PaymentPlatform│ │MerchantValidator │ │ PageNavigator │
//! │ └NativeSession│ │  (HTTP GET)      │ │ (location)    │
//! └───────────────┘ └──────────────────┘ └───────────────┘
//! ```
//!
//! Everything here runs on the single UI thread, so the async traits are
//! declared `?Send`.

use crate::error::PaymentResult;
use crate::request::PaymentRequest;
use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Apple Pay JS protocol version passed to the session constructor
pub const APPLE_PAY_VERSION: u32 = 5;

/// Status passed to `completePayment`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Success,
    Failure,
}

impl PaymentStatus {
    /// `ApplePaySession.STATUS_SUCCESS` / `ApplePaySession.STATUS_FAILURE`
    pub fn code(&self) -> u16 {
        match self {
            PaymentStatus::Success => 0,
            PaymentStatus::Failure => 1,
        }
    }
}

/// Opaque merchant session returned by the validation endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MerchantSession(pub serde_json::Value);

/// Events the native session delivers, in platform order:
/// `ValidateMerchant` always precedes `PaymentAuthorized`; `Cancel` may
/// replace either.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    ValidateMerchant { validation_url: String },
    PaymentAuthorized { payment: serde_json::Value },
    Cancel,
}

/// Handler registered on a native session. The platform adapter is
/// responsible for driving the returned future.
pub type SessionEventHandler = Rc<dyn Fn(SessionEvent) -> LocalBoxFuture<'static, ()>>;

/// Handle to an open native payment sheet
pub trait NativeSession {
    /// Route `validatemerchant`, `paymentauthorized` and `cancel` to `handler`
    fn set_event_handler(&self, handler: SessionEventHandler);

    /// Show the payment sheet
    fn begin(&self) -> PaymentResult<()>;

    fn complete_merchant_validation(&self, merchant_session: &MerchantSession) -> PaymentResult<()>;

    fn abort(&self);

    fn complete_payment(&self, status: PaymentStatus);
}

/// Native payment capability and session factory
#[async_trait(?Send)]
pub trait PaymentPlatform {
    /// Whether the native payment API exists at all
    fn is_available(&self) -> bool;

    /// Whether the merchant is activated for the current domain
    async fn can_make_payments(&self, merchant_identifier: &str) -> PaymentResult<bool>;

    /// Open a native session for `request`
    fn create_session(
        &self,
        version: u32,
        request: &PaymentRequest,
    ) -> PaymentResult<Box<dyn NativeSession>>;

    /// Get the platform name (for logging)
    fn platform_name(&self) -> &'static str;
}

/// Obtains a merchant session from the gateway's validation endpoint
#[async_trait(?Send)]
pub trait MerchantValidator {
    async fn validate(&self, url: &str) -> PaymentResult<MerchantSession>;
}

/// Current page location: query parameters in, navigation out
pub trait PageNavigator {
    fn query_param(&self, name: &str) -> Option<String>;

    /// Full-page navigation; the page unloads afterwards
    fn navigate(&self, url: &str) -> PaymentResult<()>;
}
