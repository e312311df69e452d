//! Page wiring: SDK script loading, DOM readiness and button binding.

use crate::bindings::{apple_pay_session_present, js_message};
use js_sys::Promise;
use pay_core::{EffectiveConfig, PaymentTypeCode, SessionOrchestrator};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, Event, HtmlElement, HtmlScriptElement};
use tracing::{debug, error, info, warn};

pub const APPLE_PAY_SDK_URL: &str = "https://applepay.cdn-apple.com/jsapi/1.latest/apple-pay-sdk.js";

const SDK_SCRIPT_SELECTOR: &str = "script[src*=\"apple-pay-sdk.js\"]";

const PAYMENT_TYPE_ATTRIBUTE: &str = "data-paymenttype";

/// Upper bound on waiting for the SDK script. A tag that already fired
/// `load` before we attached never fires again.
pub const SDK_LOAD_TIMEOUT_MS: i32 = 10_000;

const TIMEOUT_OUTCOME: &str = "timeout";

/// How waiting on the SDK script ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SdkLoad {
    Loaded,
    Failed,
    TimedOut,
}

impl SdkLoad {
    fn from_outcome(outcome: Option<&str>) -> Self {
        match outcome {
            Some("error") => SdkLoad::Failed,
            Some(TIMEOUT_OUTCOME) => SdkLoad::TimedOut,
            _ => SdkLoad::Loaded,
        }
    }
}

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("document not available"))
}

/// Promise resolving with the type of whichever of `events` fires first,
/// or with `"timeout"` once `timeout_ms` elapses
fn wait_for(target: &web_sys::EventTarget, events: &[&str], timeout_ms: Option<i32>) -> Promise {
    let target = target.clone();
    let events: Vec<String> = events.iter().map(|e| e.to_string()).collect();
    Promise::new(&mut move |resolve, _reject| {
        if let (Some(timeout_ms), Some(window)) = (timeout_ms, web_sys::window()) {
            let resolve = resolve.clone();
            let expire = Closure::once_into_js(move || {
                let _ = resolve.call1(&JsValue::UNDEFINED, &JsValue::from_str(TIMEOUT_OUTCOME));
            });
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                expire.unchecked_ref(),
                timeout_ms,
            );
        }

        let done = Closure::once_into_js(move |event: Event| {
            let _ = resolve.call1(&JsValue::UNDEFINED, &JsValue::from_str(&event.type_()));
        });
        for event in &events {
            let options = web_sys::AddEventListenerOptions::new();
            options.set_once(true);
            let _ = target.add_event_listener_with_callback_and_add_event_listener_options(
                event,
                done.unchecked_ref(),
                &options,
            );
        }
    })
}

/// Inject the Apple Pay JS SDK unless the page already provides it.
///
/// A load failure is logged and swallowed; support detection afterwards
/// decides whether the buttons appear.
pub async fn load_apple_pay_sdk() -> Result<(), JsValue> {
    if apple_pay_session_present() {
        debug!("Apple Pay SDK already present");
        return Ok(());
    }

    let document = document()?;
    let script: HtmlScriptElement = match document.query_selector(SDK_SCRIPT_SELECTOR)? {
        Some(existing) => {
            debug!("Apple Pay SDK script already on page, waiting for it");
            existing.dyn_into()?
        }
        None => {
            let script: HtmlScriptElement = document.create_element("script")?.dyn_into()?;
            script.set_src(APPLE_PAY_SDK_URL);
            script.set_cross_origin(Some("anonymous"));
            script.set_async(true);
            let parent: Element = match (document.head(), document.body()) {
                (Some(head), _) => head.unchecked_into(),
                (None, Some(body)) => body.unchecked_into(),
                (None, None) => document
                    .document_element()
                    .ok_or_else(|| JsValue::from_str("no document element"))?,
            };
            parent.append_child(&script)?;
            script
        }
    };

    let outcome = JsFuture::from(wait_for(
        &script,
        &["load", "error"],
        Some(SDK_LOAD_TIMEOUT_MS),
    ))
    .await?;
    match SdkLoad::from_outcome(outcome.as_string().as_deref()) {
        SdkLoad::Loaded => debug!("Apple Pay SDK loaded"),
        SdkLoad::Failed => warn!("Failed to load Apple Pay SDK from {}", APPLE_PAY_SDK_URL),
        SdkLoad::TimedOut => warn!(
            timeout_ms = SDK_LOAD_TIMEOUT_MS,
            "Apple Pay SDK did not finish loading"
        ),
    }
    Ok(())
}

/// Wait for `DOMContentLoaded` if the document is still loading
pub async fn dom_ready() -> Result<(), JsValue> {
    let document = document()?;
    if document.ready_state() == "loading" {
        JsFuture::from(wait_for(&document, &["DOMContentLoaded"], None)).await?;
    }
    Ok(())
}

/// Payment type a button starts, `None` when it is not enabled
pub(crate) fn enabled_payment_type(
    config: &EffectiveConfig,
    attribute: Option<&str>,
) -> Option<PaymentTypeCode> {
    attribute
        .and_then(PaymentTypeCode::from_data_attribute)
        .filter(|code| config.is_gateway_enabled(*code))
}

/// CSS `display` for a button carrying `data-paymenttype`
pub(crate) fn button_display(payment_type: Option<PaymentTypeCode>) -> &'static str {
    match payment_type {
        Some(_) => "inline-block",
        None => "none",
    }
}

/// Reveal the container and bind every button matching the selector.
///
/// Buttons are looked up across the whole document. Disabled ones are
/// hidden and still swallow clicks so a surrounding form is not submitted.
pub fn wire_buttons(orchestrator: &Rc<SessionOrchestrator>) -> Result<(), JsValue> {
    let document = document()?;
    let elements = orchestrator.config().elements();

    let container = document
        .get_element_by_id(&elements.button_container)
        .ok_or_else(|| {
            JsValue::from_str(&format!(
                "Apple Pay container #{} not found",
                elements.button_container
            ))
        })?;
    if let Some(container) = container.dyn_ref::<HtmlElement>() {
        container.style().set_property("display", "block")?;
    }

    let buttons = document.query_selector_all(&elements.button_selector)?;
    let mut bound = 0;

    for index in 0..buttons.length() {
        let Some(button) = buttons
            .item(index)
            .and_then(|node| node.dyn_into::<HtmlElement>().ok())
        else {
            continue;
        };

        let attribute = button.get_attribute(PAYMENT_TYPE_ATTRIBUTE);
        let payment_type = enabled_payment_type(orchestrator.config(), attribute.as_deref());
        button
            .style()
            .set_property("display", button_display(payment_type))?;

        let orchestrator = Rc::clone(orchestrator);
        let on_click = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            event.prevent_default();
            let Some(payment_type) = payment_type else {
                warn!("Apple Pay button not enabled for this merchant");
                return;
            };
            if let Err(e) = orchestrator.start_payment(payment_type) {
                error!("Apple Pay payment not started: {}", e);
            }
        });
        button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        // Buttons live as long as the page.
        on_click.forget();
        if payment_type.is_some() {
            bound += 1;
        }
    }

    info!(bound, "Apple Pay buttons ready");
    Ok(())
}

/// Log a JS failure from page wiring without surfacing it to the host
pub fn log_js_failure(context: &str, value: &JsValue) {
    error!("{}: {}", context, js_message(value));
}
