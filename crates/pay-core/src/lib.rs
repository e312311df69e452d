//! # pay-core
//!
//! Apple Pay session orchestration for the Hesabe payment gateway.
//!
//! This crate provides:
//! - `resolve` / `EffectiveConfig` for merchant configuration
//! - `PaymentRequestBuilder` for the payment-sheet descriptor
//! - `SessionOrchestrator` for the validate → authorize → cancel state machine
//! - `RedirectGateway` for validation and settlement URLs
//! - Port traits (`PaymentPlatform`, `MerchantValidator`, `PageNavigator`)
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_core::{resolve, RawConfig, SessionOrchestrator, PaymentTypeCode};
//! use std::rc::Rc;
//!
//! let config = resolve(
//!     RawConfig::new()
//!         .with_token("t1")
//!         .with_request_data("rd")
//!         .with_amount("10.000")
//!         .with_gateways([9u32]),
//! )?;
//!
//! let orchestrator = Rc::new(SessionOrchestrator::new(
//!     Rc::new(config),
//!     platform,
//!     validator,
//!     navigator,
//! ));
//!
//! // On button click
//! orchestrator.start_payment(PaymentTypeCode::MPGS_APPLE_PAY)?;
//! ```

pub mod config;
pub mod error;
pub mod payment_type;
pub mod platform;
pub mod redirect;
pub mod request;
pub mod session;

// Re-exports for convenience
pub use config::{resolve, EffectiveConfig, Elements, Environment, RawConfig, RawElements};
pub use error::{PaymentError, PaymentResult, Termination};
pub use payment_type::PaymentTypeCode;
pub use platform::{
    MerchantSession, MerchantValidator, NativeSession, PageNavigator, PaymentPlatform,
    PaymentStatus, SessionEvent, SessionEventHandler, APPLE_PAY_VERSION,
};
pub use redirect::{AuthorizedPayment, PaymentToken, RedirectGateway, SERVICE_TYPE_PARAM};
pub use request::{
    MerchantCapability, PaymentRequest, PaymentRequestBuilder, PaymentTotal, TotalType,
};
pub use session::{SessionOrchestrator, SessionState};
