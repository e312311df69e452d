//! # Merchant Validation
//!
//! HTTP client for the gateway's Apple Pay validation endpoint.
//! The endpoint answers a GET on the prepared validation URL with the opaque
//! merchant session object the payment sheet expects.

use async_trait::async_trait;
use pay_core::{MerchantSession, MerchantValidator, PaymentError, PaymentResult};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, instrument};

/// Validates the merchant by fetching the validation URL
#[derive(Debug, Clone, Default)]
pub struct HttpMerchantValidator {
    client: Client,
}

impl HttpMerchantValidator {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Use a preconfigured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait(?Send)]
impl MerchantValidator for HttpMerchantValidator {
    // The URL carries the merchant token, keep it out of the span.
    #[instrument(skip(self, url))]
    async fn validate(&self, url: &str) -> PaymentResult<MerchantSession> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Validation endpoint error: status={}, body={}", status, body);

            let message = serde_json::from_str::<GatewayErrorResponse>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or(body);

            return Err(PaymentError::ValidationEndpoint {
                status: status.as_u16(),
                message,
            });
        }

        let session: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse merchant session: {}", e))
        })?;

        if !session.is_object() {
            return Err(PaymentError::MerchantValidation(
                "Merchant session is not a JSON object".to_string(),
            ));
        }

        debug!("Received merchant session");
        Ok(MerchantSession(session))
    }
}

// =============================================================================
// Gateway API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct GatewayErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_message() {
        let parsed: GatewayErrorResponse =
            serde_json::from_str(r#"{"status":false,"message":"Invalid token"}"#).unwrap();
        assert_eq!(parsed.message.as_deref(), Some("Invalid token"));

        let parsed: GatewayErrorResponse = serde_json::from_str(r#"{"code":500}"#).unwrap();
        assert!(parsed.message.is_none());
    }
}
