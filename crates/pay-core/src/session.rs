//! # Session Orchestrator
//!
//! State machine driving one Apple Pay payment sheet at a time.
//!
//! ```text
//! Idle ──start_payment──▶ AwaitingValidation ──validated──▶ AwaitingAuthorization
//!                               │      │                        │      │
//!                         failure│      │cancel           cancel│      │authorized
//!                               ▼      ▼                        ▼      ▼
//!                           Aborted  Cancelled ◀─────────── Cancelled  Completed
//!                                                              (build failure → Aborted)
//! ```
//!
//! Each native event maps to one transition function. Runtime failures never
//! propagate to the host page: they are logged and resolved into `abort()`
//! or `completePayment(STATUS_FAILURE)`.

use crate::config::EffectiveConfig;
use crate::error::{PaymentError, PaymentResult, Termination};
use crate::payment_type::PaymentTypeCode;
use crate::platform::{
    MerchantValidator, NativeSession, PageNavigator, PaymentPlatform, PaymentStatus,
    SessionEvent, APPLE_PAY_VERSION,
};
use crate::redirect::{AuthorizedPayment, RedirectGateway, SERVICE_TYPE_PARAM};
use crate::request::PaymentRequestBuilder;
use futures::FutureExt;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, error, info, instrument, warn};

/// Lifecycle of the current payment attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingValidation,
    AwaitingAuthorization,
    Completed,
    Aborted,
    Cancelled,
}

impl SessionState {
    /// A native sheet is open and waiting on us or the user
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            SessionState::AwaitingValidation | SessionState::AwaitingAuthorization
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Aborted | SessionState::Cancelled
        )
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::AwaitingValidation => "awaiting_validation",
            SessionState::AwaitingAuthorization => "awaiting_authorization",
            SessionState::Completed => "completed",
            SessionState::Aborted => "aborted",
            SessionState::Cancelled => "cancelled",
        };
        write!(f, "{}", name)
    }
}

struct ActiveSession {
    session: Rc<dyn NativeSession>,
    payment_type: PaymentTypeCode,
    attempt: u64,
}

/// Owns the native session for one payment attempt at a time
pub struct SessionOrchestrator {
    config: Rc<EffectiveConfig>,
    platform: Rc<dyn PaymentPlatform>,
    validator: Rc<dyn MerchantValidator>,
    navigator: Rc<dyn PageNavigator>,
    builder: PaymentRequestBuilder,
    protocol_version: u32,
    state: Cell<SessionState>,
    active: RefCell<Option<ActiveSession>>,
    attempts: Cell<u64>,
    last_error: RefCell<Option<String>>,
}

impl SessionOrchestrator {
    pub fn new(
        config: Rc<EffectiveConfig>,
        platform: Rc<dyn PaymentPlatform>,
        validator: Rc<dyn MerchantValidator>,
        navigator: Rc<dyn PageNavigator>,
    ) -> Self {
        Self {
            config,
            platform,
            validator,
            navigator,
            builder: PaymentRequestBuilder::new(),
            protocol_version: APPLE_PAY_VERSION,
            state: Cell::new(SessionState::Idle),
            active: RefCell::new(None),
            attempts: Cell::new(0),
            last_error: RefCell::new(None),
        }
    }

    /// Builder: override the Apple Pay JS protocol version
    pub fn with_protocol_version(mut self, version: u32) -> Self {
        self.protocol_version = version;
        self
    }

    pub fn config(&self) -> &EffectiveConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    pub fn protocol_version(&self) -> u32 {
        self.protocol_version
    }

    /// Message of the most recent runtime failure
    pub fn last_error(&self) -> Option<String> {
        self.last_error.borrow().clone()
    }

    /// Native API present, merchant identifier configured, and at least one
    /// enabled code routed through Apple Pay
    pub fn is_supported(&self) -> bool {
        self.platform.is_available()
            && !self.config.merchant_identifier().is_empty()
            && self.config.has_apple_pay_gateway()
    }

    /// Full capability check run once before buttons are shown
    pub async fn ensure_supported(&self) -> PaymentResult<()> {
        if !self.platform.is_available() {
            return Err(PaymentError::UnsupportedEnvironment(format!(
                "{} not available in this browser",
                self.platform.platform_name()
            )));
        }
        if !self.is_supported() {
            return Err(PaymentError::UnsupportedEnvironment(
                "Apple Pay not supported or not enabled for merchant".to_string(),
            ));
        }

        let merchant_identifier = self.config.merchant_identifier();
        if !self.platform.can_make_payments(merchant_identifier).await? {
            return Err(PaymentError::UnsupportedEnvironment(format!(
                "{} available, but merchant {} not activated for domain",
                self.platform.platform_name(),
                merchant_identifier
            )));
        }

        Ok(())
    }

    /// Open a native session for `payment_type` and show the sheet
    #[instrument(skip(self), fields(session_id = %self.config.session_id()))]
    pub fn start_payment(self: &Rc<Self>, payment_type: PaymentTypeCode) -> PaymentResult<()> {
        if !self.is_supported() {
            warn!("Apple Pay not supported, payment not started");
            return Err(PaymentError::UnsupportedEnvironment(
                "Apple Pay not supported or not enabled for merchant".to_string(),
            ));
        }
        if !self.config.is_gateway_enabled(payment_type) {
            warn!("Apple Pay button not enabled for this merchant");
            return Err(PaymentError::PaymentTypeDisabled {
                payment_type: payment_type.value(),
            });
        }
        if self.state().is_in_flight() {
            warn!(state = %self.state(), "Payment sheet already open");
            return Err(PaymentError::SessionInProgress);
        }

        let request = self.builder.build(payment_type, &self.config);
        let session: Rc<dyn NativeSession> = Rc::from(
            self.platform
                .create_session(self.protocol_version, &request)?,
        );

        let attempt = self.attempts.get() + 1;
        self.attempts.set(attempt);
        *self.active.borrow_mut() = Some(ActiveSession {
            session: Rc::clone(&session),
            payment_type,
            attempt,
        });
        *self.last_error.borrow_mut() = None;
        self.state.set(SessionState::AwaitingValidation);

        let orchestrator = Rc::downgrade(self);
        session.set_event_handler(Rc::new(move |event: SessionEvent| {
            let orchestrator = orchestrator.clone();
            async move {
                let Some(orchestrator) = orchestrator.upgrade() else {
                    return;
                };
                // Sheets from earlier attempts keep firing after a restart.
                if orchestrator.is_current(attempt) {
                    orchestrator.dispatch(event).await;
                } else {
                    debug!(attempt, "Ignoring event from a previous payment sheet");
                }
            }
            .boxed_local()
        }));

        if let Err(e) = session.begin() {
            error!("Failed to begin Apple Pay session: {}", e);
            self.record(&e);
            self.finish(SessionState::Aborted);
            return Err(e);
        }

        info!(version = self.protocol_version, "Apple Pay session started");
        Ok(())
    }

    /// Route a native event to its transition
    pub async fn dispatch(&self, event: SessionEvent) -> SessionState {
        match event {
            SessionEvent::ValidateMerchant { validation_url } => {
                self.on_validate_merchant(&validation_url).await
            }
            SessionEvent::PaymentAuthorized { payment } => self.on_payment_authorized(payment),
            SessionEvent::Cancel => self.on_cancel(),
        }
    }

    /// `onvalidatemerchant`: fetch a merchant session and hand it to the
    /// sheet. The challenge URL is single-use, so failures abort instead of
    /// retrying.
    pub async fn on_validate_merchant(&self, validation_url: &str) -> SessionState {
        if self.state() != SessionState::AwaitingValidation {
            warn!(state = %self.state(), "Ignoring merchant validation event");
            return self.state();
        }
        let Some((session, payment_type, attempt)) = self.current() else {
            return self.state();
        };

        let service_id = self.navigator.query_param(SERVICE_TYPE_PARAM);
        let url = RedirectGateway::new(&self.config).validation_url(
            validation_url,
            payment_type,
            service_id.as_deref(),
        );

        debug!(payment_type = %payment_type, "Validating merchant...");
        let merchant_session = self.validator.validate(&url).await;

        // The user may have dismissed the sheet, or opened a new one, while
        // the request was out.
        if !self.is_current(attempt) || self.state() != SessionState::AwaitingValidation {
            debug!(state = %self.state(), "Session ended during merchant validation");
            return self.state();
        }

        let result = merchant_session
            .and_then(|merchant_session| session.complete_merchant_validation(&merchant_session));

        match result {
            Ok(()) => {
                info!("Merchant validated");
                self.state.set(SessionState::AwaitingAuthorization);
                self.state()
            }
            Err(e) => {
                error!("Merchant validation failed: {}", e);
                self.terminate(&session, e, Termination::Abort)
            }
        }
    }

    /// `onpaymentauthorized`: build the settlement URL, complete the sheet
    /// and navigate away
    pub fn on_payment_authorized(&self, payment: serde_json::Value) -> SessionState {
        if self.state() != SessionState::AwaitingAuthorization {
            warn!(state = %self.state(), "Ignoring payment authorization event");
            return self.state();
        }
        let Some((session, payment_type, _)) = self.current() else {
            return self.state();
        };

        debug!(payment_type = %payment_type, "Payment authorized");
        let settlement_url = AuthorizedPayment::from_value(payment).and_then(|payment| {
            RedirectGateway::new(&self.config).settlement_url(&payment, payment_type)
        });

        let url = match settlement_url {
            Ok(url) => url,
            Err(e) => {
                error!("Payment processing failed: {}", e);
                return self.terminate(&session, e, Termination::FailPayment);
            }
        };

        session.complete_payment(PaymentStatus::Success);
        self.finish(SessionState::Completed);

        if let Err(e) = self.navigator.navigate(&url) {
            error!("Redirect to settlement endpoint failed: {}", e);
            self.record(&e);
            self.state.set(SessionState::Aborted);
        }

        self.state()
    }

    /// `oncancel`: observational only
    pub fn on_cancel(&self) -> SessionState {
        if !self.state().is_in_flight() {
            debug!(state = %self.state(), "Ignoring cancel event");
            return self.state();
        }

        info!("Apple Pay cancelled");
        self.finish(SessionState::Cancelled);
        self.state()
    }

    fn current(&self) -> Option<(Rc<dyn NativeSession>, PaymentTypeCode, u64)> {
        self.active
            .borrow()
            .as_ref()
            .map(|active| (Rc::clone(&active.session), active.payment_type, active.attempt))
    }

    /// Whether `attempt` still owns the open native session
    fn is_current(&self, attempt: u64) -> bool {
        self.active
            .borrow()
            .as_ref()
            .is_some_and(|active| active.attempt == attempt)
    }

    fn terminate(
        &self,
        session: &Rc<dyn NativeSession>,
        error: PaymentError,
        phase: Termination,
    ) -> SessionState {
        let termination = match error.termination() {
            Termination::None => phase,
            other => other,
        };

        match termination {
            Termination::Abort => session.abort(),
            Termination::FailPayment => session.complete_payment(PaymentStatus::Failure),
            Termination::None => {}
        }

        self.record(&error);
        self.finish(SessionState::Aborted);
        self.state()
    }

    fn record(&self, error: &PaymentError) {
        *self.last_error.borrow_mut() = Some(error.to_string());
    }

    /// Enter a terminal state and release the native handle
    fn finish(&self, state: SessionState) {
        self.state.set(state);
        self.active.borrow_mut().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_classification() {
        assert!(SessionState::AwaitingValidation.is_in_flight());
        assert!(SessionState::AwaitingAuthorization.is_in_flight());
        assert!(!SessionState::Idle.is_in_flight());
        assert!(!SessionState::Completed.is_in_flight());

        assert!(SessionState::Cancelled.is_terminal());
        assert!(SessionState::Aborted.is_terminal());
        assert!(!SessionState::Idle.is_terminal());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SessionState::AwaitingAuthorization.to_string(), "awaiting_authorization");
        assert_eq!(SessionState::Cancelled.to_string(), "cancelled");
    }
}
