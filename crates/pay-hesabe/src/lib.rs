//! # pay-hesabe
//!
//! Hesabe gateway transport for the Apple Pay session core.
//!
//! This crate provides:
//!
//! 1. **HttpMerchantValidator** - `MerchantValidator` over `reqwest`
//!    - GET on the prepared validation URL
//!    - Non-2xx statuses and malformed bodies become typed errors
//!    - Uses `fetch` when compiled to wasm32
//!
//! 2. **config** - `HESABE_*` environment loading
//!    - `.env` support via `dotenvy`
//!    - Produces a `RawConfig` for `pay_core::resolve`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_core::{resolve, SessionOrchestrator};
//! use pay_hesabe::{config::raw_config_from_env, HttpMerchantValidator};
//! use std::rc::Rc;
//!
//! let config = resolve(raw_config_from_env()?)?;
//!
//! let orchestrator = Rc::new(SessionOrchestrator::new(
//!     Rc::new(config),
//!     platform,
//!     Rc::new(HttpMerchantValidator::new()),
//!     navigator,
//! ));
//! ```

pub mod config;
pub mod validator;

// Re-exports
pub use config::{raw_config_from_env, raw_config_from_lookup};
pub use validator::HttpMerchantValidator;
