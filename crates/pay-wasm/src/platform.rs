//! Browser implementations of the orchestrator ports.

use crate::bindings::{apple_pay_session_present, js_message, ApplePaySession};
use async_trait::async_trait;
use pay_core::{
    MerchantSession, NativeSession, PageNavigator, PaymentError, PaymentPlatform,
    PaymentRequest, PaymentResult, PaymentStatus, SessionEvent, SessionEventHandler,
};
use serde::Serialize;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use tracing::{debug, warn};

/// `paymentCredentialStatus` reported when the device cannot use Apple Pay
const APPLE_PAY_UNSUPPORTED: &str = "applePayUnsupported";

fn platform_error(value: JsValue) -> PaymentError {
    PaymentError::Platform(js_message(&value))
}

fn to_js<T: Serialize>(value: &T) -> PaymentResult<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| PaymentError::Serialization(e.to_string()))
}

/// Interpret the `applePayCapabilities` result. Any resolved object counts
/// as capable unless it reports `applePayUnsupported`.
pub(crate) fn credential_status_allows_payments(status: Option<&str>) -> bool {
    status != Some(APPLE_PAY_UNSUPPORTED)
}

/// `window.ApplePaySession`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserPlatform;

#[async_trait(?Send)]
impl PaymentPlatform for BrowserPlatform {
    fn is_available(&self) -> bool {
        apple_pay_session_present()
    }

    async fn can_make_payments(&self, merchant_identifier: &str) -> PaymentResult<bool> {
        let promise =
            ApplePaySession::apple_pay_capabilities(merchant_identifier).map_err(platform_error)?;
        let capabilities = JsFuture::from(promise).await.map_err(platform_error)?;

        if capabilities.is_null() || capabilities.is_undefined() {
            return Ok(false);
        }

        let status = js_sys::Reflect::get(&capabilities, &JsValue::from_str("paymentCredentialStatus"))
            .ok()
            .and_then(|status| status.as_string());
        debug!(status = ?status, "Apple Pay capabilities");

        Ok(credential_status_allows_payments(status.as_deref()))
    }

    fn create_session(
        &self,
        version: u32,
        request: &PaymentRequest,
    ) -> PaymentResult<Box<dyn NativeSession>> {
        let js_request = to_js(request)?;
        let session = ApplePaySession::new(version, &js_request).map_err(platform_error)?;
        Ok(Box::new(BrowserSession::new(session)))
    }

    fn platform_name(&self) -> &'static str {
        "ApplePaySession"
    }
}

/// Open `ApplePaySession` with its registered callbacks
pub struct BrowserSession {
    session: ApplePaySession,
    callbacks: RefCell<Vec<Closure<dyn FnMut(JsValue)>>>,
}

impl BrowserSession {
    pub fn new(session: ApplePaySession) -> Self {
        Self {
            session,
            callbacks: RefCell::new(Vec::new()),
        }
    }

    fn callback<F>(handler: &SessionEventHandler, to_event: F) -> Closure<dyn FnMut(JsValue)>
    where
        F: Fn(JsValue) -> SessionEvent + 'static,
    {
        let handler = handler.clone();
        Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
            spawn_local(handler(to_event(event)));
        })
    }
}

impl NativeSession for BrowserSession {
    fn set_event_handler(&self, handler: SessionEventHandler) {
        let on_validate = Self::callback(&handler, |event| SessionEvent::ValidateMerchant {
            validation_url: js_sys::Reflect::get(&event, &JsValue::from_str("validationURL"))
                .ok()
                .and_then(|url| url.as_string())
                .unwrap_or_default(),
        });

        let on_authorized = Self::callback(&handler, |event| {
            let payment = js_sys::Reflect::get(&event, &JsValue::from_str("payment"))
                .unwrap_or(JsValue::UNDEFINED);
            let payment = serde_wasm_bindgen::from_value::<serde_json::Value>(payment)
                .unwrap_or_else(|e| {
                    warn!("Unreadable payment object: {}", e);
                    serde_json::Value::Null
                });
            SessionEvent::PaymentAuthorized { payment }
        });

        let on_cancel = Self::callback(&handler, |_| SessionEvent::Cancel);

        self.session
            .set_onvalidatemerchant(Some(on_validate.as_ref().unchecked_ref()));
        self.session
            .set_onpaymentauthorized(Some(on_authorized.as_ref().unchecked_ref()));
        self.session.set_oncancel(Some(on_cancel.as_ref().unchecked_ref()));

        let mut callbacks = self.callbacks.borrow_mut();
        callbacks.clear();
        callbacks.extend([on_validate, on_authorized, on_cancel]);
    }

    fn begin(&self) -> PaymentResult<()> {
        self.session.begin().map_err(platform_error)
    }

    fn complete_merchant_validation(&self, merchant_session: &MerchantSession) -> PaymentResult<()> {
        let js_session = to_js(&merchant_session.0)?;
        self.session
            .complete_merchant_validation(&js_session)
            .map_err(platform_error)
    }

    fn abort(&self) {
        if let Err(e) = self.session.abort() {
            warn!("ApplePaySession.abort failed: {}", js_message(&e));
        }
    }

    fn complete_payment(&self, status: PaymentStatus) {
        if let Err(e) = self.session.complete_payment(status.code()) {
            warn!("ApplePaySession.completePayment failed: {}", js_message(&e));
        }
    }
}

impl Drop for BrowserSession {
    // Late native events must not reach dropped closures.
    fn drop(&mut self) {
        self.session.set_onvalidatemerchant(None);
        self.session.set_onpaymentauthorized(None);
        self.session.set_oncancel(None);
    }
}

/// `window.location`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserNavigator;

impl PageNavigator for BrowserNavigator {
    fn query_param(&self, name: &str) -> Option<String> {
        let search = web_sys::window()?.location().search().ok()?;
        web_sys::UrlSearchParams::new_with_str(&search).ok()?.get(name)
    }

    fn navigate(&self, url: &str) -> PaymentResult<()> {
        let window = web_sys::window()
            .ok_or_else(|| PaymentError::Navigation("window not available".to_string()))?;
        window
            .location()
            .set_href(url)
            .map_err(|e| PaymentError::Navigation(js_message(&e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_status() {
        assert!(credential_status_allows_payments(Some("paymentCredentialsAvailable")));
        assert!(credential_status_allows_payments(Some("paymentCredentialStatusUnknown")));
        assert!(credential_status_allows_payments(None));
        assert!(!credential_status_allows_payments(Some("applePayUnsupported")));
    }
}
