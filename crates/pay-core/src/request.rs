//! # Payment Request Builder
//!
//! Builds the Apple Pay payment-sheet descriptor for a payment type.
//! The output serializes to the `ApplePayPaymentRequest` shape expected by
//! the native session constructor.

use crate::config::EffectiveConfig;
use crate::payment_type::PaymentTypeCode;
use serde::{Deserialize, Serialize};

/// Label used when the merchant did not configure a display name
pub const DEFAULT_TOTAL_LABEL: &str = "Payment";

/// Country pinned for the KNET debit/credit routes
pub const KNET_COUNTRY_CODE: &str = "KW";

/// Networks offered for every payment type
pub const BASE_NETWORKS: [&str; 2] = ["visa", "masterCard"];

/// Capabilities offered for every payment type
pub const BASE_CAPABILITIES: [MerchantCapability; 1] = [MerchantCapability::Supports3DS];

/// Apple Pay merchant capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MerchantCapability {
    #[serde(rename = "supports3DS")]
    Supports3DS,
    #[serde(rename = "supportsDebit")]
    SupportsDebit,
    #[serde(rename = "supportsCredit")]
    SupportsCredit,
}

/// Line item type; the gateway only ever charges final amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalType {
    Final,
    Pending,
}

/// The total shown on the payment sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTotal {
    pub label: String,
    #[serde(rename = "type")]
    pub total_type: TotalType,
    /// Decimal string, passed through untouched
    pub amount: String,
}

/// Payment-sheet descriptor handed to the native session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub country_code: String,
    pub currency_code: String,
    pub total: PaymentTotal,
    pub supported_networks: Vec<String>,
    pub merchant_capabilities: Vec<MerchantCapability>,
    pub supported_countries: Vec<String>,
}

impl PaymentRequest {
    pub fn has_capability(&self, capability: MerchantCapability) -> bool {
        self.merchant_capabilities.contains(&capability)
    }
}

/// Builds [`PaymentRequest`]s from the effective configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentRequestBuilder;

impl PaymentRequestBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the descriptor for `payment_type`.
    ///
    /// KNET debit adds `supportsDebit`, KNET credit adds `supportsCredit`,
    /// and both pin the supported countries to Kuwait. Every other type
    /// offers the base capabilities in the configured country.
    pub fn build(&self, payment_type: PaymentTypeCode, config: &EffectiveConfig) -> PaymentRequest {
        let mut merchant_capabilities = BASE_CAPABILITIES.to_vec();
        let mut supported_countries = vec![config.country_code().to_string()];

        if payment_type == PaymentTypeCode::KNET_DEBIT {
            merchant_capabilities.push(MerchantCapability::SupportsDebit);
        }
        if payment_type == PaymentTypeCode::KNET_CREDIT {
            merchant_capabilities.push(MerchantCapability::SupportsCredit);
        }
        if payment_type == PaymentTypeCode::KNET_DEBIT || payment_type == PaymentTypeCode::KNET_CREDIT {
            supported_countries = vec![KNET_COUNTRY_CODE.to_string()];
        }

        PaymentRequest {
            country_code: config.country_code().to_string(),
            currency_code: config.currency_code().to_string(),
            total: PaymentTotal {
                label: config
                    .merchant_code()
                    .unwrap_or(DEFAULT_TOTAL_LABEL)
                    .to_string(),
                total_type: TotalType::Final,
                amount: config.amount().to_string(),
            },
            supported_networks: BASE_NETWORKS.iter().map(|n| n.to_string()).collect(),
            merchant_capabilities,
            supported_countries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve, RawConfig};

    fn config(country: &str) -> EffectiveConfig {
        resolve(
            RawConfig::new()
                .with_token("t1")
                .with_request_data("rd")
                .with_amount("10.000")
                .with_country_code(country)
                .with_gateways([9u32, 11, 12]),
        )
        .unwrap()
    }

    #[test]
    fn test_base_request() {
        let request = PaymentRequestBuilder::new().build(PaymentTypeCode::MPGS_APPLE_PAY, &config("KW"));

        assert_eq!(request.country_code, "KW");
        assert_eq!(request.currency_code, "KWD");
        assert_eq!(request.total.label, "Payment");
        assert_eq!(request.total.total_type, TotalType::Final);
        assert_eq!(request.total.amount, "10.000");
        assert_eq!(request.supported_networks, vec!["visa", "masterCard"]);
        assert_eq!(request.merchant_capabilities, vec![MerchantCapability::Supports3DS]);
        assert_eq!(request.supported_countries, vec!["KW"]);
    }

    #[test]
    fn test_knet_variants_pin_country() {
        let builder = PaymentRequestBuilder::new();

        let debit = builder.build(PaymentTypeCode::KNET_DEBIT, &config("SA"));
        assert_eq!(debit.supported_countries, vec!["KW"]);
        assert_eq!(debit.country_code, "SA");
        assert!(debit.has_capability(MerchantCapability::Supports3DS));
        assert!(debit.has_capability(MerchantCapability::SupportsDebit));
        assert!(!debit.has_capability(MerchantCapability::SupportsCredit));

        let credit = builder.build(PaymentTypeCode::KNET_CREDIT, &config("AE"));
        assert_eq!(credit.supported_countries, vec!["KW"]);
        assert!(credit.has_capability(MerchantCapability::SupportsCredit));
        assert!(!credit.has_capability(MerchantCapability::SupportsDebit));
    }

    #[test]
    fn test_other_types_use_configured_country() {
        let request = PaymentRequestBuilder::new().build(PaymentTypeCode::VISA, &config("BH"));

        assert_eq!(request.supported_countries, vec!["BH"]);
        assert_eq!(request.merchant_capabilities, BASE_CAPABILITIES.to_vec());
    }

    #[test]
    fn test_merchant_code_label() {
        let config = resolve(
            RawConfig::new()
                .with_token("t1")
                .with_request_data("rd")
                .with_amount("1.500")
                .with_merchant_code("Corner Shop")
                .with_gateways([9u32]),
        )
        .unwrap();

        let request = PaymentRequestBuilder::new().build(PaymentTypeCode::MPGS_APPLE_PAY, &config);
        assert_eq!(request.total.label, "Corner Shop");
    }

    #[test]
    fn test_serialized_shape() {
        let request = PaymentRequestBuilder::new().build(PaymentTypeCode::KNET_DEBIT, &config("KW"));
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "countryCode": "KW",
                "currencyCode": "KWD",
                "total": { "label": "Payment", "type": "final", "amount": "10.000" },
                "supportedNetworks": ["visa", "masterCard"],
                "merchantCapabilities": ["supports3DS", "supportsDebit"],
                "supportedCountries": ["KW"]
            })
        );
    }
}
