//! # Redirect Gateway
//!
//! Query-string encoding for the two gateway endpoints:
//! - merchant validation (`GET {base}/transaction/apple?u=..&token=..&serviceId=..&payId=..`)
//! - settlement (full-page navigation to `{base}/payment?token=..&paymentType=..&...`)
//!
//! Encoding is `application/x-www-form-urlencoded`, the same as `URLSearchParams`.

use crate::config::EffectiveConfig;
use crate::error::{PaymentError, PaymentResult};
use crate::payment_type::PaymentTypeCode;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Page query parameter carrying the service type forwarded as `serviceId`
pub const SERVICE_TYPE_PARAM: &str = "serviceTypeId";

/// Token delivered by the native `paymentauthorized` event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentToken {
    /// Encrypted payment data, forwarded as JSON
    #[serde(default)]
    pub payment_data: serde_json::Value,
    /// Card network/display descriptor, forwarded as JSON
    #[serde(default)]
    pub payment_method: serde_json::Value,
    #[serde(default)]
    pub transaction_identifier: Option<String>,
}

/// The `payment` object of the native `paymentauthorized` event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizedPayment {
    pub token: PaymentToken,
}

impl AuthorizedPayment {
    /// Parse the raw event payload
    pub fn from_value(payment: serde_json::Value) -> PaymentResult<Self> {
        serde_json::from_value(payment)
            .map_err(|e| PaymentError::Authorization(format!("Invalid payment token: {}", e)))
    }
}

/// Builds validation and settlement URLs against the configured routes
#[derive(Debug, Clone, Copy)]
pub struct RedirectGateway<'a> {
    config: &'a EffectiveConfig,
}

impl<'a> RedirectGateway<'a> {
    pub fn new(config: &'a EffectiveConfig) -> Self {
        Self { config }
    }

    /// URL the browser fetches to obtain an opaque merchant session.
    ///
    /// `service_id` is the page's `serviceTypeId` query parameter; an absent
    /// value is sent as an empty string.
    pub fn validation_url(
        &self,
        challenge_url: &str,
        payment_type: PaymentTypeCode,
        service_id: Option<&str>,
    ) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("u", challenge_url)
            .append_pair("token", self.config.token())
            .append_pair("serviceId", service_id.unwrap_or(""))
            .append_pair("payId", &payment_type.to_string())
            .finish();

        format!("{}?{}", self.config.validation_route(), query)
    }

    /// URL of the settlement endpoint carrying the authorized token
    pub fn settlement_url(
        &self,
        payment: &AuthorizedPayment,
        payment_type: PaymentTypeCode,
    ) -> PaymentResult<String> {
        let token = &payment.token;

        let payment_data = serde_json::to_string(&token.payment_data)
            .map_err(|e| PaymentError::Authorization(format!("paymentData: {}", e)))?;
        let payment_method = serde_json::to_string(&token.payment_method)
            .map_err(|e| PaymentError::Authorization(format!("paymentMethod: {}", e)))?;
        let transaction_identifier = token
            .transaction_identifier
            .as_deref()
            .unwrap_or("")
            .to_lowercase();

        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("token", self.config.token())
            .append_pair("paymentType", &payment_type.to_string())
            .append_pair("data", self.config.request_data())
            .append_pair("applePaymentToken", &payment_data)
            .append_pair("paymentMethod", &payment_method)
            .append_pair("session_id", self.config.session_id())
            .append_pair("transactionIdentifier", &transaction_identifier)
            .finish();

        Ok(format!("{}?{}", self.config.payment_route(), query))
    }
}

/// Split a URL into its decoded query pairs
pub fn query_pairs(url: &str) -> Vec<(String, String)> {
    let query = url.split_once('?').map(|(_, q)| q).unwrap_or("");
    form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}
