use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ledger::AlchemyClient;
use market_data::CoingeckoClient;

use crate::ServiceController;

// One mock server stands in for both upstreams: price routes hit `/simple/price` and
// `/coins/..`, ledger routes post to `/v2/test-key`.
async fn setup() -> (MockServer, Router) {
    let server = MockServer::start().await;

    let market_data = CoingeckoClient::new(&server.uri(), None).unwrap();
    let ledger = AlchemyClient::new(&format!("{}/v2", server.uri()), "test-key").unwrap();

    (server, ServiceController::new(market_data, ledger).router())
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "id": 1, "result": result }))
}

#[tokio::test]
async fn test_root_and_health() {
    let (_server, router) = setup().await;

    let (status, body) = send(router.clone(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Test For coins and blockchain data" }));

    let (status, body) = send(router, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_item_echo() {
    let (_server, router) = setup().await;

    let (status, body) = send(router.clone(), get("/items/5?q=somequery")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "item_id": 5, "q": "somequery" }));

    let (_, body) = send(router.clone(), get("/items/6")).await;
    assert_eq!(body, json!({ "item_id": 6, "q": null }));

    let (status, _) = send(router, get("/items/not-a-number")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_process_string() {
    let (_server, router) = setup().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/process_string/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "input_string": "hello" }).to_string()))
        .unwrap();

    let (status, body) = send(router.clone(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "result": "Processed: hello" }));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/process_string/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "text": "hello" }).to_string()))
        .unwrap();

    let (status, body) = send(router.clone(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("input_string"));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/process_string/")
        .body(Body::from("input_string=hello"))
        .unwrap();

    let (status, body) = send(router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_btc_price_passes_number_through() {
    let (server, router) = setup().await;

    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .and(query_param("ids", "bitcoin"))
        .and(query_param("vs_currencies", "usd"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"bitcoin": {"usd": 50000}})))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = send(router, get("/btc_price/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "bitcoin_price_usd": 50000 }));
}

#[tokio::test]
async fn test_btc_price_upstream_failure() {
    let (server, router) = setup().await;

    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (status, body) = send(router, get("/btc_price/")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({ "error": "Failed to fetch BTC price" }));
}

#[tokio::test]
async fn test_price_defaults_to_usd() {
    let (server, router) = setup().await;

    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .and(query_param("ids", "ethereum"))
        .and(query_param("vs_currencies", "usd"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"ethereum": {"usd": 3120.5}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = send(router.clone(), get("/price/?coin=ethereum")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "coin": "ethereum", "vs_currency": "usd", "price": 3120.5 }));

    let (status, _) = send(router, get("/price/")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_blank_market_parameters_are_rejected_before_upstream() {
    let (server, router) = setup().await;

    let blank = ["/price/?coin=bitcoin&vs_currency=", "/price/?coin=&vs_currency=usd", "/ohlc_price/?coin="];

    for uri in blank {
        let (status, body) = send(router.clone(), get(uri)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body["error"].as_str().unwrap().contains("must not be empty"));
    }

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ohlc_table() {
    let (server, router) = setup().await;

    Mock::given(method("GET"))
        .and(path("/coins/bitcoin/ohlc"))
        .and(query_param("vs_currency", "usd"))
        .and(query_param("days", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            [1709337600000_i64, 61000.5, 62000.0, 60500.25, 61800.0],
            [1709683200000_i64, 61800.0, 68000.0, 61000.0, 67500.75],
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = send(router, get("/ohlc_price/?coin=bitcoin")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["index_name"], "date");
    assert_eq!(body["columns"], json!(["open", "high", "low", "close"]));
    assert_eq!(body["index"], json!([1709337600000_i64, 1709683200000_i64]));
    assert_eq!(body["data"][1], json!([61800.0, 68000.0, 61000.0, 67500.75]));
}

#[tokio::test]
async fn test_address_history_returns_provider_json() {
    let (server, router) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v2/test-key"))
        .and(body_partial_json(json!({
            "method": "alchemy_getAssetTransfers",
            "params": [{ "fromBlock": "0x0", "fromAddress": "0xabc" }],
        })))
        .respond_with(rpc_result(json!({ "transfers": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = send(router, get("/address_history/?fromAddress=0xabc")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], json!({ "transfers": [] }));
}

#[tokio::test]
async fn test_ledger_upstream_failure_is_bad_gateway() {
    let (server, router) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (status, body) = send(router, get("/trace_transaction/?address=0xfeed")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_trace_block_defaults_to_latest() {
    let (server, router) = setup().await;

    Mock::given(method("POST"))
        .and(body_json(json!({
            "id": 1,
            "jsonrpc": "2.0",
            "method": "trace_block",
            "params": ["latest"],
        })))
        .respond_with(rpc_result(json!([{ "type": "reward" }])))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = send(router, get("/trace_block/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"][0]["type"], "reward");
}

#[tokio::test]
async fn test_block_info() {
    let (server, router) = setup().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "params": ["0xb10c", true] })))
        .respond_with(rpc_result(json!({ "hash": "0xb10c", "number": "0x10" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "params": ["0xdead", true] })))
        .respond_with(rpc_result(Value::Null))
        .mount(&server)
        .await;

    let (status, body) = send(router.clone(), get("/block_info/?block_address=0xb10c")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["number"], "0x10");

    let (status, body) = send(router, get("/block_info/?block_address=0xdead")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Block not found: 0xdead" }));
}

#[tokio::test]
async fn test_unified_with_item_only_makes_no_upstream_calls() {
    let (server, router) = setup().await;

    let (status, body) = send(router, get("/unified_ETH/?item_id=9&q=eth")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "item_data": { "item_id": 9, "q": "eth" } }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unified_keeps_successful_lookups_when_one_fails() {
    let (server, router) = setup().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "alchemy_getAssetTransfers" })))
        .respond_with(rpc_result(json!({ "transfers": [{ "hash": "0x01" }] })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_getBlockByHash" })))
        .respond_with(rpc_result(Value::Null))
        .mount(&server)
        .await;

    let (status, body) = send(
        router,
        get("/unified_ETH/?item_id=1&fromAddress=0xabc&address=&block_address=0xdead"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item_data"], json!({ "item_id": 1, "q": null }));
    assert_eq!(body["address_history"]["result"]["transfers"][0]["hash"], "0x01");
    assert_eq!(body["block_info"], json!({ "error": "Block not found: 0xdead" }));
    assert!(body.get("transaction_trace").is_none());
}

#[tokio::test]
async fn test_unified_requires_item_id() {
    let (_server, router) = setup().await;

    let (status, _) = send(router, get("/unified_ETH/?q=eth")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
