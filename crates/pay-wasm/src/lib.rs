//! # pay-wasm
//!
//! WebAssembly entry point for Hesabe Apple Pay.
//!
//! Wires the target-independent session core to the browser:
//! - `ApplePaySession` as the payment platform
//! - `fetch` (through `reqwest`) for merchant validation
//! - `window.location` for the settlement redirect
//! - DOM buttons carrying `data-paymenttype`
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { HesabeApplePay } from 'hesabe-applepay-wasm';
//!
//! await init();
//!
//! const applePay = new HesabeApplePay({
//!   env: 'sandbox',
//!   token: '...',
//!   requestData: '...',
//!   amount: '10.000',
//!   availablePaymentGateways: [9, 11, 12],
//! });
//!
//! const ready = await applePay.init();
//! console.log('Apple Pay ready:', ready, applePay.sessionId);
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build crates/pay-wasm --target web
//! ```

pub mod bindings;
pub mod dom;
pub mod logging;
pub mod platform;

use js_sys::Promise;
use pay_core::{resolve, PaymentTypeCode, RawConfig, SessionOrchestrator};
use pay_hesabe::HttpMerchantValidator;
use platform::{BrowserNavigator, BrowserPlatform};
use std::cell::Cell;
use std::rc::Rc;
use tracing::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

/// Initialize the WASM module (called automatically)
#[wasm_bindgen(start)]
pub fn start() {
    // Set up panic hook for better error messages
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn boundary_error(message: impl std::fmt::Display) -> JsError {
    JsError::new(&format!("{} {}", logging::LOG_PREFIX, message))
}

/// Apple Pay integration for one checkout page
#[wasm_bindgen]
pub struct HesabeApplePay {
    orchestrator: Rc<SessionOrchestrator>,
    initialized: Cell<bool>,
}

#[wasm_bindgen]
impl HesabeApplePay {
    /// Validate `config` and prepare the session core.
    ///
    /// Throws when a required option is missing or malformed.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<HesabeApplePay, JsError> {
        let raw: RawConfig = if config.is_undefined() || config.is_null() {
            RawConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(boundary_error)?
        };
        let config = resolve(raw).map_err(boundary_error)?;

        logging::init_console_logging(config.debug());
        info!(
            env = config.env(),
            session_id = config.session_id(),
            "Hesabe Apple Pay configured"
        );

        let orchestrator = SessionOrchestrator::new(
            Rc::new(config),
            Rc::new(BrowserPlatform),
            Rc::new(HttpMerchantValidator::new()),
            Rc::new(BrowserNavigator),
        );

        Ok(Self {
            orchestrator: Rc::new(orchestrator),
            initialized: Cell::new(false),
        })
    }

    /// Load the SDK, wait for the DOM, check support and show the buttons.
    ///
    /// Resolves to whether the buttons were shown. Never rejects.
    pub fn init(&self) -> Promise {
        if self.initialized.replace(true) {
            warn!("init() already called");
            return Promise::resolve(&JsValue::FALSE);
        }

        let orchestrator = Rc::clone(&self.orchestrator);
        future_to_promise(async move {
            if let Err(e) = dom::load_apple_pay_sdk().await {
                dom::log_js_failure("Apple Pay SDK loading failed", &e);
            }
            if let Err(e) = dom::dom_ready().await {
                dom::log_js_failure("Document never became ready", &e);
                return Ok(JsValue::FALSE);
            }
            if let Err(e) = orchestrator.ensure_supported().await {
                warn!("{}", e);
                return Ok(JsValue::FALSE);
            }
            if let Err(e) = dom::wire_buttons(&orchestrator) {
                dom::log_js_failure("Apple Pay buttons not wired", &e);
                return Ok(JsValue::FALSE);
            }
            Ok(JsValue::TRUE)
        })
    }

    /// Open the payment sheet for `paymentType` without a button click.
    ///
    /// Must run inside a user gesture.
    #[wasm_bindgen(js_name = startPayment)]
    pub fn start_payment(&self, payment_type: u32) -> Result<(), JsError> {
        self.orchestrator
            .start_payment(PaymentTypeCode::new(payment_type))
            .map_err(boundary_error)
    }

    #[wasm_bindgen(getter, js_name = sessionId)]
    pub fn session_id(&self) -> String {
        self.orchestrator.config().session_id().to_string()
    }

    #[wasm_bindgen(getter, js_name = merchantIdentifier)]
    pub fn merchant_identifier(&self) -> String {
        self.orchestrator.config().merchant_identifier().to_string()
    }

    /// Current session state, e.g. `idle` or `awaiting_validation`
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        self.orchestrator.state().to_string()
    }

    #[wasm_bindgen(getter, js_name = lastError)]
    pub fn last_error(&self) -> Option<String> {
        self.orchestrator.last_error()
    }

    pub fn version() -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}
