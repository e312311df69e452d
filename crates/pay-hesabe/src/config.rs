//! # Environment Configuration
//!
//! Loads merchant options from environment variables for hosts that render
//! the configuration server-side or drive the core outside a browser.
//! A `.env` file is honoured when present.

use pay_core::{PaymentError, PaymentResult, PaymentTypeCode, RawConfig};
use std::env;

pub const ENV_ENVIRONMENT: &str = "HESABE_ENV";
pub const ENV_DEBUG: &str = "HESABE_DEBUG";
pub const ENV_CURRENCY_CODE: &str = "HESABE_CURRENCY_CODE";
pub const ENV_COUNTRY_CODE: &str = "HESABE_COUNTRY_CODE";
pub const ENV_AMOUNT: &str = "HESABE_AMOUNT";
pub const ENV_TOKEN: &str = "HESABE_TOKEN";
pub const ENV_REQUEST_DATA: &str = "HESABE_REQUEST_DATA";
pub const ENV_PAYMENT_GATEWAYS: &str = "HESABE_PAYMENT_GATEWAYS";
pub const ENV_SESSION_ID: &str = "HESABE_SESSION_ID";
pub const ENV_MERCHANT_CODE: &str = "HESABE_MERCHANT_CODE";

/// Load caller options from `HESABE_*` variables.
///
/// Unset variables stay unset so [`pay_core::resolve`] applies its
/// defaults and reports missing required fields.
pub fn raw_config_from_env() -> PaymentResult<RawConfig> {
    dotenvy::dotenv().ok(); // Load .env file if present

    raw_config_from_lookup(|key| env::var(key).ok())
}

/// Build caller options from an arbitrary variable source
pub fn raw_config_from_lookup<F>(lookup: F) -> PaymentResult<RawConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let debug = match lookup(ENV_DEBUG) {
        Some(value) => Some(parse_bool(&value).ok_or_else(|| {
            PaymentError::missing("debug", format!("{} must be true or false", ENV_DEBUG))
        })?),
        None => None,
    };

    let available_payment_gateways = match lookup(ENV_PAYMENT_GATEWAYS) {
        Some(value) => Some(parse_gateways(&value)?),
        None => None,
    };

    Ok(RawConfig {
        env: lookup(ENV_ENVIRONMENT),
        debug,
        currency_code: lookup(ENV_CURRENCY_CODE),
        country_code: lookup(ENV_COUNTRY_CODE),
        amount: lookup(ENV_AMOUNT),
        token: lookup(ENV_TOKEN),
        request_data: lookup(ENV_REQUEST_DATA),
        available_payment_gateways,
        elements: None,
        session_id: lookup(ENV_SESSION_ID),
        merchant_code: lookup(ENV_MERCHANT_CODE),
    })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" | "" => Some(false),
        _ => None,
    }
}

/// Comma separated codes, e.g. `9,11,12`
fn parse_gateways(value: &str) -> PaymentResult<Vec<PaymentTypeCode>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u32>().map(PaymentTypeCode::new).map_err(|_| {
                PaymentError::missing(
                    "availablePaymentGateways",
                    format!("{} contains invalid code '{}'", ENV_PAYMENT_GATEWAYS, part),
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_full_environment() {
        let raw = raw_config_from_lookup(lookup_from(&[
            ("HESABE_ENV", "production"),
            ("HESABE_DEBUG", "true"),
            ("HESABE_TOKEN", "t1"),
            ("HESABE_REQUEST_DATA", "rd"),
            ("HESABE_AMOUNT", "10.000"),
            ("HESABE_PAYMENT_GATEWAYS", "9, 11,12"),
            ("HESABE_MERCHANT_CODE", "Shop"),
        ]))
        .unwrap();

        let config = pay_core::resolve(raw).unwrap();
        assert!(config.is_production());
        assert!(config.debug());
        assert_eq!(config.merchant_code(), Some("Shop"));
        assert_eq!(
            config.available_payment_gateways(),
            &[
                PaymentTypeCode::MPGS_APPLE_PAY,
                PaymentTypeCode::KNET_DEBIT,
                PaymentTypeCode::KNET_CREDIT
            ]
        );
        assert_eq!(config.currency_code(), "KWD");
    }

    #[test]
    fn test_missing_required_variable() {
        let raw = raw_config_from_lookup(lookup_from(&[("HESABE_AMOUNT", "1.000")])).unwrap();

        let err = pay_core::resolve(raw).unwrap_err();
        assert_eq!(err.field(), Some("token"));
    }

    #[test]
    fn test_invalid_values() {
        let err = raw_config_from_lookup(lookup_from(&[("HESABE_PAYMENT_GATEWAYS", "9,apple")]))
            .unwrap_err();
        assert_eq!(err.field(), Some("availablePaymentGateways"));

        let err = raw_config_from_lookup(lookup_from(&[("HESABE_DEBUG", "maybe")])).unwrap_err();
        assert_eq!(err.field(), Some("debug"));
    }
}
