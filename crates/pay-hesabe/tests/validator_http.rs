//! HTTP behaviour of the merchant validator against a mock gateway.

use pay_core::redirect::query_pairs;
use pay_core::{resolve, MerchantValidator, PaymentError, PaymentTypeCode, RawConfig, RedirectGateway, Termination};
use pay_hesabe::HttpMerchantValidator;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_returns_merchant_session() {
    let server = MockServer::start().await;
    let session = json!({
        "epochTimestamp": 1700000000000u64,
        "merchantSessionIdentifier": "SSH1",
        "signature": "c2ln"
    });

    Mock::given(method("GET"))
        .and(path("/transaction/apple"))
        .and(query_param("u", "https://apple.example/startSession"))
        .and(query_param("payId", "9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&session))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!(
        "{}/transaction/apple?u=https%3A%2F%2Fapple.example%2FstartSession&token=t1&serviceId=&payId=9",
        server.uri()
    );
    let merchant_session = HttpMerchantValidator::new().validate(&url).await.unwrap();

    assert_eq!(merchant_session.0, session);
}

#[tokio::test]
async fn test_server_error_is_typed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/transaction/apple"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "status": false, "message": "Invalid token" })),
        )
        .mount(&server)
        .await;

    let err = HttpMerchantValidator::new()
        .validate(&format!("{}/transaction/apple?u=x", server.uri()))
        .await
        .unwrap_err();

    match &err {
        PaymentError::ValidationEndpoint { status, message } => {
            assert_eq!(*status, 500);
            assert_eq!(message, "Invalid token");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.termination(), Termination::Abort);
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = HttpMerchantValidator::new()
        .validate(&server.uri())
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::Serialization(_)));
}

#[tokio::test]
async fn test_non_object_body_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let err = HttpMerchantValidator::new()
        .validate(&server.uri())
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::MerchantValidation(_)));
}

#[tokio::test]
async fn test_unreachable_gateway() {
    let err = HttpMerchantValidator::new()
        .validate("http://127.0.0.1:9/transaction/apple")
        .await
        .unwrap_err();

    assert!(matches!(err, PaymentError::NetworkError(_)));
}

#[tokio::test]
async fn test_query_built_by_gateway_reaches_server() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("token", "t 1"))
        .and(query_param("serviceId", "4"))
        .and(query_param("payId", "12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let config = resolve(
        RawConfig::new()
            .with_token("t 1")
            .with_request_data("rd")
            .with_amount("1.000")
            .with_gateways([12u32]),
    )
    .unwrap();

    // Swap the sandbox host for the mock server, keep the encoded query.
    let built = RedirectGateway::new(&config).validation_url(
        "https://apple.example/start",
        PaymentTypeCode::KNET_CREDIT,
        Some("4"),
    );
    let (_, query) = built.split_once('?').unwrap();
    assert_eq!(query_pairs(&built).len(), 4);

    let url = format!("{}/transaction/apple?{}", server.uri(), query);
    HttpMerchantValidator::new().validate(&url).await.unwrap();
}
