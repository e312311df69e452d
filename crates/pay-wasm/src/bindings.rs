//! Low-level wasm-bindgen bindings to Apple Pay JS.
//!
//! Exposes the raw `ApplePaySession` handle. The port implementations in
//! `platform.rs` wrap it for the session orchestrator.

use js_sys::{Function, Promise};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// Raw `ApplePaySession` handle.
    #[derive(Debug, Clone)]
    pub type ApplePaySession;

    /// `new ApplePaySession(version, paymentRequest)`
    #[wasm_bindgen(constructor, catch)]
    pub fn new(version: u32, payment_request: &JsValue) -> Result<ApplePaySession, JsValue>;

    /// `ApplePaySession.applePayCapabilities(merchantIdentifier)` → `Promise`
    #[wasm_bindgen(static_method_of = ApplePaySession, catch, js_name = applePayCapabilities)]
    pub fn apple_pay_capabilities(merchant_identifier: &str) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch)]
    pub fn begin(this: &ApplePaySession) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch)]
    pub fn abort(this: &ApplePaySession) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = completeMerchantValidation)]
    pub fn complete_merchant_validation(
        this: &ApplePaySession,
        merchant_session: &JsValue,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = completePayment)]
    pub fn complete_payment(this: &ApplePaySession, status: u16) -> Result<(), JsValue>;

    #[wasm_bindgen(method, setter = onvalidatemerchant)]
    pub fn set_onvalidatemerchant(this: &ApplePaySession, handler: Option<&Function>);

    #[wasm_bindgen(method, setter = onpaymentauthorized)]
    pub fn set_onpaymentauthorized(this: &ApplePaySession, handler: Option<&Function>);

    #[wasm_bindgen(method, setter = oncancel)]
    pub fn set_oncancel(this: &ApplePaySession, handler: Option<&Function>);
}

/// Whether `window.ApplePaySession` exists
pub fn apple_pay_session_present() -> bool {
    web_sys::window()
        .map(|window| {
            js_sys::Reflect::has(&window, &JsValue::from_str("ApplePaySession")).unwrap_or(false)
        })
        .unwrap_or(false)
}

/// Best-effort message for a thrown JS value
pub fn js_message(value: &JsValue) -> String {
    if let Some(message) = value.as_string() {
        return message;
    }
    js_sys::Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|message| message.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}
