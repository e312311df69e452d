//! # Merchant Configuration
//!
//! Resolution of caller-supplied options into an immutable effective
//! configuration. Environment-dependent identifiers (merchant identifier,
//! gateway base URL, routes) are derived from `env` and cannot be set.

use crate::error::{PaymentError, PaymentResult};
use crate::payment_type::PaymentTypeCode;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_ENV: &str = "sandbox";
pub const DEFAULT_CURRENCY_CODE: &str = "KWD";
pub const DEFAULT_COUNTRY_CODE: &str = "KW";
pub const DEFAULT_BUTTON_CONTAINER: &str = "applePayment";
pub const DEFAULT_BUTTON_SELECTOR: &str = ".applePayBtn";

const SESSION_ID_PREFIX: &str = "apple-direct";

/// Gateway environment profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Sandbox,
    Production,
}

impl Environment {
    /// `production` selects the live profile, any other name the sandbox one
    pub fn from_name(name: &str) -> Self {
        if name == "production" {
            Environment::Production
        } else {
            Environment::Sandbox
        }
    }

    /// Apple Pay merchant identifier registered for this profile
    pub fn merchant_identifier(&self) -> &'static str {
        match self {
            Environment::Production => "merchant.hesabe.prod",
            Environment::Sandbox => "merchant.hesabe.dec",
        }
    }

    /// Hesabe API base URL for this profile
    pub fn api_base_url(&self) -> &'static str {
        match self {
            Environment::Production => "https://api.hesabe.com",
            Environment::Sandbox => "https://dev-paymentapi.hesabe.com",
        }
    }
}

/// DOM binding overrides, merged key by key onto the defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawElements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apple_pay_button_container: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apple_pay_button_query_selector: Option<String>,
}

/// Caller-supplied options. Every field is optional; unset fields take the
/// defaults during [`resolve`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_payment_gateways: Option<Vec<PaymentTypeCode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<RawElements>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_code: Option<String>,
}

impl RawConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set environment name
    pub fn with_env(mut self, env: impl Into<String>) -> Self {
        self.env = Some(env.into());
        self
    }

    /// Builder: enable debug logging
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    pub fn with_currency_code(mut self, code: impl Into<String>) -> Self {
        self.currency_code = Some(code.into());
        self
    }

    pub fn with_country_code(mut self, code: impl Into<String>) -> Self {
        self.country_code = Some(code.into());
        self
    }

    pub fn with_amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_request_data(mut self, data: impl Into<String>) -> Self {
        self.request_data = Some(data.into());
        self
    }

    /// Builder: set the enabled payment-gateway codes
    pub fn with_gateways<I, C>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<PaymentTypeCode>,
    {
        self.available_payment_gateways = Some(codes.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_merchant_code(mut self, code: impl Into<String>) -> Self {
        self.merchant_code = Some(code.into());
        self
    }

    /// Builder: override the button container id
    pub fn with_button_container(mut self, id: impl Into<String>) -> Self {
        self.elements
            .get_or_insert_with(RawElements::default)
            .apple_pay_button_container = Some(id.into());
        self
    }

    /// Builder: override the button query selector
    pub fn with_button_selector(mut self, selector: impl Into<String>) -> Self {
        self.elements
            .get_or_insert_with(RawElements::default)
            .apple_pay_button_query_selector = Some(selector.into());
        self
    }
}

/// Resolved DOM binding descriptors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Elements {
    pub button_container: String,
    pub button_selector: String,
}

impl Default for Elements {
    fn default() -> Self {
        Self {
            button_container: DEFAULT_BUTTON_CONTAINER.to_string(),
            button_selector: DEFAULT_BUTTON_SELECTOR.to_string(),
        }
    }
}

impl Elements {
    fn merge(overrides: Option<RawElements>) -> Self {
        let defaults = Self::default();
        let overrides = overrides.unwrap_or_default();
        Self {
            button_container: overrides
                .apple_pay_button_container
                .unwrap_or(defaults.button_container),
            button_selector: overrides
                .apple_pay_button_query_selector
                .unwrap_or(defaults.button_selector),
        }
    }
}

/// Immutable merchant configuration. Build it with [`resolve`].
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    env: String,
    debug: bool,
    currency_code: String,
    country_code: String,
    amount: String,
    token: String,
    request_data: String,
    available_payment_gateways: Vec<PaymentTypeCode>,
    elements: Elements,
    session_id: String,
    merchant_code: Option<String>,
}

/// Merge caller options onto the defaults and validate the result.
///
/// Fails on the first missing field, checked in the order `token`,
/// `requestData`, `amount`, `availablePaymentGateways`, `countryCode`,
/// `env`, `currencyCode`.
pub fn resolve(raw: RawConfig) -> PaymentResult<EffectiveConfig> {
    let mut gateways: Vec<PaymentTypeCode> = Vec::new();
    for code in raw.available_payment_gateways.unwrap_or_default() {
        if !gateways.contains(&code) {
            gateways.push(code);
        }
    }

    let session_id = raw
        .session_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(generate_session_id);

    let config = EffectiveConfig {
        env: raw.env.unwrap_or_else(|| DEFAULT_ENV.to_string()),
        debug: raw.debug.unwrap_or(false),
        currency_code: raw
            .currency_code
            .unwrap_or_else(|| DEFAULT_CURRENCY_CODE.to_string()),
        country_code: raw
            .country_code
            .unwrap_or_else(|| DEFAULT_COUNTRY_CODE.to_string()),
        amount: raw.amount.unwrap_or_default(),
        token: raw.token.unwrap_or_default(),
        request_data: raw.request_data.unwrap_or_default(),
        available_payment_gateways: gateways,
        elements: Elements::merge(raw.elements),
        session_id,
        merchant_code: raw.merchant_code.filter(|code| !code.is_empty()),
    };

    config.validate()?;

    debug!(
        env = %config.env,
        merchant_identifier = config.merchant_identifier(),
        session_id = %config.session_id,
        gateways = ?config.available_payment_gateways,
        "Resolved Apple Pay configuration"
    );

    Ok(config)
}

impl TryFrom<RawConfig> for EffectiveConfig {
    type Error = PaymentError;

    fn try_from(raw: RawConfig) -> PaymentResult<Self> {
        resolve(raw)
    }
}

/// `apple-direct-{unix millis}-{9 random chars}`
fn generate_session_id() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        SESSION_ID_PREFIX,
        Utc::now().timestamp_millis(),
        &random[..9]
    )
}

impl EffectiveConfig {
    fn validate(&self) -> PaymentResult<()> {
        let required: [(&'static str, bool, &str); 7] = [
            ("token", self.token.is_empty(), "Token is required"),
            (
                "requestData",
                self.request_data.is_empty(),
                "Request data is required",
            ),
            ("amount", self.amount.is_empty(), "Amount is required"),
            (
                "availablePaymentGateways",
                self.available_payment_gateways.is_empty(),
                "Available payment gateways are required",
            ),
            (
                "countryCode",
                self.country_code.is_empty(),
                "Country code is required",
            ),
            ("env", self.env.is_empty(), "Environment is required"),
            (
                "currencyCode",
                self.currency_code.is_empty(),
                "Currency code is required",
            ),
        ];

        match required.iter().find(|(_, missing, _)| *missing) {
            Some((field, _, message)) => Err(PaymentError::missing(*field, *message)),
            None => Ok(()),
        }
    }

    pub fn env(&self) -> &str {
        &self.env
    }

    pub fn environment(&self) -> Environment {
        Environment::from_name(&self.env)
    }

    pub fn is_production(&self) -> bool {
        self.environment() == Environment::Production
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn currency_code(&self) -> &str {
        &self.currency_code
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn request_data(&self) -> &str {
        &self.request_data
    }

    pub fn available_payment_gateways(&self) -> &[PaymentTypeCode] {
        &self.available_payment_gateways
    }

    pub fn elements(&self) -> &Elements {
        &self.elements
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn merchant_code(&self) -> Option<&str> {
        self.merchant_code.as_deref()
    }

    pub fn merchant_identifier(&self) -> &'static str {
        self.environment().merchant_identifier()
    }

    pub fn api_base_url(&self) -> &'static str {
        self.environment().api_base_url()
    }

    /// Merchant validation endpoint
    pub fn validation_route(&self) -> String {
        format!("{}/transaction/apple", self.api_base_url())
    }

    /// Settlement endpoint the browser is redirected to
    pub fn payment_route(&self) -> String {
        format!("{}/payment", self.api_base_url())
    }

    /// Check if a payment type is in the enabled set
    pub fn is_gateway_enabled(&self, payment_type: PaymentTypeCode) -> bool {
        self.available_payment_gateways.contains(&payment_type)
    }

    /// At least one enabled code is routed through Apple Pay
    pub fn has_apple_pay_gateway(&self) -> bool {
        self.available_payment_gateways
            .iter()
            .any(PaymentTypeCode::is_apple_pay_method)
    }
}
