//! Button wiring against a real document.
//!
//! Run with `wasm-pack test --headless --firefox crates/pay-wasm`.

#![cfg(target_arch = "wasm32")]

use pay_core::{resolve, RawConfig, SessionOrchestrator};
use pay_hesabe::HttpMerchantValidator;
use pay_wasm::dom::wire_buttons;
use pay_wasm::platform::{BrowserNavigator, BrowserPlatform};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Document, Event, EventInit, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn append(parent: &web_sys::Node, tag: &str, attributes: &[(&str, &str)]) -> HtmlElement {
    let element = document().create_element(tag).unwrap();
    for (name, value) in attributes {
        element.set_attribute(name, value).unwrap();
    }
    parent.append_child(&element).unwrap();
    element.dyn_into().unwrap()
}

fn orchestrator(container: &str) -> Rc<SessionOrchestrator> {
    let config = resolve(
        RawConfig::new()
            .with_token("t1")
            .with_request_data("rd")
            .with_amount("1.000")
            .with_gateways([9u32])
            .with_button_container(container)
            .with_button_selector(".walletBtn"),
    )
    .unwrap();

    Rc::new(SessionOrchestrator::new(
        Rc::new(config),
        Rc::new(BrowserPlatform),
        Rc::new(HttpMerchantValidator::new()),
        Rc::new(BrowserNavigator),
    ))
}

fn display(element: &HtmlElement) -> String {
    element.style().get_property_value("display").unwrap()
}

#[wasm_bindgen_test]
fn test_buttons_outside_container_are_wired() {
    let body = document().body().unwrap();
    let container = append(&body, "div", &[("id", "wallets"), ("style", "display: none")]);
    let inside = append(&container, "button", &[("class", "walletBtn"), ("data-paymenttype", "9")]);
    let outside = append(&body, "button", &[("class", "walletBtn"), ("data-paymenttype", "9")]);

    wire_buttons(&orchestrator("wallets")).unwrap();

    assert_eq!(display(&container), "block");
    assert_eq!(display(&inside), "inline-block");
    assert_eq!(display(&outside), "inline-block");
}

#[wasm_bindgen_test]
fn test_disabled_button_hidden_and_click_swallowed() {
    let body = document().body().unwrap();
    let _container = append(&body, "div", &[("id", "wallets-disabled")]);
    let form = append(&body, "form", &[]);
    let disabled = append(&form, "button", &[("class", "walletBtn"), ("data-paymenttype", "11")]);

    wire_buttons(&orchestrator("wallets-disabled")).unwrap();
    assert_eq!(display(&disabled), "none");

    let init = EventInit::new();
    init.set_cancelable(true);
    let click = Event::new_with_event_init_dict("click", &init).unwrap();
    disabled.dispatch_event(&click).unwrap();

    assert!(click.default_prevented());
}
