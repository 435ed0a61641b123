//! Integration Tests: Signed API Calls
//!
//! Drives typed commands against a mock endpoint and checks:
//! - the exact form body and its HMAC header
//! - reserved fields winning over caller optionals
//! - envelope handling for "ok", API errors, HTTP errors and bad results

use super::{client_for, PRIVATE_KEY, PUBLIC_KEY};
use coinpayments::{
    Client, ClientConfig, CoinPaymentsError, ErrorKind, HmacSigner, OptionalValue, Params,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use wiremock::{
    matchers::{body_string, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

const RATES_BODY: &str = "cmd=rates&format=json&key=pub&version=1";
const RATES_HMAC: &str = "5d82b77e27323c4f6468016e3346dae1bd56d4c383d27ee19cfae00278c4ca67\
                          fc363a2a95dd0e87604c92f48658f0ee2320b0b2a37db45af0b5248df8d0ed1c";

fn ok(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "error": "ok", "result": result }))
}

/// Test: a plain call posts the canonical body signed with the private key
#[tokio::test]
async fn test_rates_request_is_signed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(header("accept", "application/json"))
        .and(header(
            "user-agent",
            format!("coinpayments-rs/{}", env!("CARGO_PKG_VERSION")).as_str(),
        ))
        .and(header("HMAC", RATES_HMAC))
        .and(body_string(RATES_BODY))
        .respond_with(ok(json!({
            "BTC": {
                "is_fiat": 0,
                "rate_btc": "1.000000000000000000000000",
                "last_update": "1375473661",
                "name": "Bitcoin",
                "accepted": 1
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let rates = client.rates([]).await.expect("rates call failed");

    assert_eq!(rates.len(), 1);
    assert_eq!(rates["BTC"].name, "Bitcoin");
    assert!(rates["BTC"].is_accepted());
}

/// Test: optionals cannot replace cmd, key, format or version
#[tokio::test]
async fn test_reserved_fields_survive_optionals() {
    let mock_server = MockServer::start().await;

    let expected_body = "cmd=get_tx_info&format=json&key=pub&txid=CPTEST&version=1";
    let expected_hmac = HmacSigner::new(PRIVATE_KEY)
        .sign(expected_body.as_bytes())
        .unwrap();

    Mock::given(method("POST"))
        .and(body_string(expected_body))
        .and(header("HMAC", expected_hmac.as_str()))
        .respond_with(ok(json!({
            "time_created": 1700000000,
            "status": 1,
            "status_text": "Funds received",
            "type": "coins",
            "coin": "BTC"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let info = client
        .get_tx_info(
            "CPTEST",
            [
                OptionalValue::new("cmd", "create_withdrawal"),
                OptionalValue::new("key", "someone-else"),
                OptionalValue::new("format", "xml"),
                OptionalValue::new("version", "2"),
            ],
        )
        .await
        .expect("get_tx_info failed");

    assert_eq!(info.status_text, "Funds received");
    assert!(!info.is_complete());
}

/// Test: required arguments and optionals are merged into one sorted body
#[tokio::test]
async fn test_create_transaction_body() {
    let mock_server = MockServer::start().await;

    let expected_body = "amount=10.00&buyer_email=buyer%40example.com&cmd=create_transaction\
                         &currency1=USD&currency2=BTC&format=json&invoice=INV-1\
                         &ipn_url=https%3A%2F%2Fshop.example%2Fipn&key=pub&version=1";

    Mock::given(method("POST"))
        .and(body_string(expected_body))
        .respond_with(ok(json!({
            "amount": "0.00023000",
            "address": "3PayAddress",
            "dest_tag": "",
            "txn_id": "CPTXN1",
            "confirms_needed": "2",
            "timeout": 9000,
            "checkout_url": "https://www.coinpayments.net/index.php?cmd=checkout&id=CPTXN1",
            "status_url": "https://www.coinpayments.net/index.php?cmd=status&id=CPTXN1",
            "qrcode_url": "https://www.coinpayments.net/qrgen.php?id=CPTXN1"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let created = client
        .create_transaction(
            "10.00",
            "USD",
            "BTC",
            "buyer@example.com",
            [
                OptionalValue::ipn_url("https://shop.example/ipn"),
                OptionalValue::invoice("INV-1"),
            ],
        )
        .await
        .expect("create_transaction failed");

    assert_eq!(created.txn_id, "CPTXN1");
    assert_eq!(created.timeout, 9000);
    assert_eq!(created.confirms_needed, "2");
}

/// Test: a non-"ok" error field is an application error carrying the message
#[tokio::test]
async fn test_error_envelope_is_application_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "This API Key does not have permission to use that command!",
            "result": []
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .create_withdrawal("1", "BTC", [OptionalValue::address("1Abc")])
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Application);
    assert_eq!(
        err.api_message(),
        Some("This API Key does not have permission to use that command!")
    );
    assert!(!err.is_recoverable());
}

/// Test: HTTP failures are transport errors, even with an envelope-like body
#[tokio::test]
async fn test_http_500_is_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(500).set_body_string(r#"{"error":"ok","result":{}}"#),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.balances([]).await.unwrap_err();

    match &err {
        CoinPaymentsError::UnexpectedStatus { status, .. } => assert_eq!(*status, 500),
        other => panic!("expected UnexpectedStatus, got {:?}", other),
    }
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.is_recoverable());
    assert!(err.api_message().is_none());
}

/// Test: a body that is not an envelope is a protocol error
#[tokio::test]
async fn test_non_json_body_is_protocol_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.get_basic_info([]).await.unwrap_err();

    assert!(matches!(err, CoinPaymentsError::MalformedEnvelope(_)));
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

/// Test: an "ok" envelope whose result has the wrong shape
#[tokio::test]
async fn test_wrong_result_shape_is_protocol_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ok(json!({ "not": "a list" })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.get_tx_ids([]).await.unwrap_err();

    match err {
        CoinPaymentsError::MalformedResult { command, .. } => assert_eq!(command, "get_tx_ids"),
        other => panic!("expected MalformedResult, got {:?}", other),
    }
}

/// Test: commands whose result is empty on success
#[tokio::test]
async fn test_untyped_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string(
            "cmd=delete_pbn_tag&format=json&key=pub&tagid=TAG1&version=1",
        ))
        .respond_with(ok(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.delete_pbn_tag("TAG1", []).await.unwrap();
    assert_eq!(result, json!([]));
}

/// Test: an empty keyed result arrives as `[]` and decodes as an empty map
#[tokio::test]
async fn test_empty_balances() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string("cmd=balances&format=json&key=pub&version=1"))
        .respond_with(ok(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let balances = client.balances([]).await.expect("balances call failed");
    assert!(balances.is_empty());
}

/// Test: the configured timeout applies to the built-in transport
#[tokio::test]
async fn test_timeout_is_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ok(json!({})).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let config = ClientConfig {
        timeout_seconds: 1,
        ..ClientConfig::with_api_url(mock_server.uri())
    };
    let client = Client::from_config(PUBLIC_KEY, PRIVATE_KEY, config).unwrap();

    let err = client.get_basic_info([]).await.unwrap_err();
    assert!(matches!(err, CoinPaymentsError::Timeout(_)), "got {:?}", err);
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.code(), "CP_TIMEOUT");
}

/// Test: clones share configuration and can call concurrently
#[tokio::test]
async fn test_concurrent_calls() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string(RATES_BODY))
        .respond_with(ok(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(body_string("cmd=balances&format=json&key=pub&version=1"))
        .respond_with(ok(json!({
            "BTC": { "balance": 1500, "balancef": "0.00001500", "status": "available" }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let other = client.clone();

    let (rates, balances) = tokio::join!(client.rates([]), other.balances([]));

    assert!(rates.unwrap().is_empty());
    assert_eq!(balances.unwrap()["BTC"].balance, 1500);
}

/// Test: the signed request can be built without sending it
#[test]
fn test_sign_request_offline() {
    let client = Client::new(PUBLIC_KEY, PRIVATE_KEY).unwrap();
    let request = client.sign_request("rates", Params::new()).unwrap();

    assert_eq!(request.command, "rates");
    assert_eq!(request.body, RATES_BODY);
    assert_eq!(request.hmac, RATES_HMAC);
}
