use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query};
use axum::routing::{get, post};
use axum::{http::StatusCode, response::IntoResponse, Json, Router};
use log::{error, info};
use serde_json::json;

use ledger::{AlchemyClient, LedgerLookup};
use lookup_aggregation::{ItemData, LookupAggregationService, LookupRequest};
use market_data::{CoingeckoClient, OhlcProvider, TokenPriceProvider};

use crate::errors::{bad_request, error_response};
use crate::types;

pub const CHAIN_BANNER: &str = r"
    .--.      .--.      .--.
   /    \    /    \    /    \
  |  ()  |--|  ()  |--|  ()  |   chainscan
   \    /    \    /    \    /
    '--'      '--'      '--'
";

const ROOT_MESSAGE: &str = "Test For coins and blockchain data";

pub struct ServiceController {
    market_data: Arc<CoingeckoClient>,
    ledger: Arc<AlchemyClient>,
    lookup_service: Arc<LookupAggregationService<AlchemyClient>>,
}

impl ServiceController {
    pub fn new(market_data: CoingeckoClient, ledger: AlchemyClient) -> Self {
        let ledger = Arc::new(ledger);
        let lookup_service = Arc::new(LookupAggregationService::new(ledger.clone()));

        Self { market_data: Arc::new(market_data), ledger, lookup_service }
    }

    pub fn router(self) -> Router {
        let market_data = self.market_data.clone();
        let ledger = self.ledger.clone();
        let lookup_service = self.lookup_service.clone();

        Router::new()
            .route("/", get(ServiceController::root))
            .route("/api/health", get(ServiceController::status))
            .route(
                "/items/:item_id",
                get(|Path(item_id): Path<i64>, Query(query): Query<types::ItemQuery>| async move {
                    ServiceController::read_item(item_id, query).await
                }),
            )
            .route("/process_string/", post(ServiceController::process_string))
            .route(
                "/btc_price/",
                get({
                    let market_data = market_data.clone();
                    move || async move {
                        ServiceController::get_btc_price(market_data.clone()).await
                    }
                }),
            )
            .route(
                "/price/",
                get({
                    let market_data = market_data.clone();
                    move |Query(query): Query<types::PriceQuery>| async move {
                        ServiceController::get_price(market_data.clone(), query).await
                    }
                }),
            )
            .route(
                "/ohlc_price/",
                get({
                    let market_data = market_data.clone();
                    move |Query(query): Query<types::OhlcQuery>| async move {
                        ServiceController::get_ohlc_price(market_data.clone(), query).await
                    }
                }),
            )
            .route(
                "/address_history/",
                get({
                    let ledger = ledger.clone();
                    move |Query(query): Query<types::AddressHistoryQuery>| async move {
                        ServiceController::get_address_history(ledger.clone(), query).await
                    }
                }),
            )
            .route(
                "/trace_transaction/",
                get({
                    let ledger = ledger.clone();
                    move |Query(query): Query<types::TraceTransactionQuery>| async move {
                        ServiceController::trace_transaction(ledger.clone(), query).await
                    }
                }),
            )
            .route(
                "/trace_block/",
                get({
                    let ledger = ledger.clone();
                    move |Query(query): Query<types::TraceBlockQuery>| async move {
                        ServiceController::trace_block(ledger.clone(), query).await
                    }
                }),
            )
            .route(
                "/block_info/",
                get({
                    let ledger = ledger.clone();
                    move |Query(query): Query<types::BlockInfoQuery>| async move {
                        ServiceController::get_block_info(ledger.clone(), query).await
                    }
                }),
            )
            .route(
                "/unified_ETH/",
                get({
                    let lookup_service = lookup_service.clone();
                    move |Query(query): Query<LookupRequest>| async move {
                        ServiceController::unified_lookup(lookup_service.clone(), query).await
                    }
                }),
            )
    }

    /// Banner endpoint
    pub async fn root() -> impl IntoResponse {
        info!("{}", CHAIN_BANNER);
        (StatusCode::OK, Json(json!({ "message": ROOT_MESSAGE })))
    }

    /// Health check endpoint
    pub async fn status() -> impl IntoResponse {
        let response = json!({
            "message": "Service is running...",
            "status": "ok"
        });
        (StatusCode::OK, Json(response))
    }

    pub async fn read_item(item_id: i64, query: types::ItemQuery) -> impl IntoResponse {
        let item = ItemData { item_id, q: query.q };
        (StatusCode::OK, Json(json!(item)))
    }

    /// Any unreadable body, including a missing `input_string`, is a 400.
    pub async fn process_string(
        payload: Result<Json<types::ProcessStringPayload>, JsonRejection>,
    ) -> impl IntoResponse {
        match payload {
            Ok(Json(payload)) => {
                let processed = format!("Processed: {}", payload.input_string);
                (StatusCode::OK, Json(json!({ "result": processed })))
            }
            Err(rejection) => bad_request("process_string", rejection.body_text()),
        }
    }

    /// Bitcoin spot price in usd
    pub async fn get_btc_price(market_data: Arc<CoingeckoClient>) -> impl IntoResponse {
        match market_data.get_token_price("bitcoin", "usd").await {
            Ok(price) => (StatusCode::OK, Json(json!({ "bitcoin_price_usd": price }))),
            Err(err) => {
                error!("Failed to fetch BTC price: {}", err);
                (StatusCode::BAD_GATEWAY, Json(json!({ "error": "Failed to fetch BTC price" })))
            }
        }
    }

    pub async fn get_price(
        market_data: Arc<CoingeckoClient>,
        query: types::PriceQuery,
    ) -> impl IntoResponse {
        if query.coin.trim().is_empty() || query.vs_currency.trim().is_empty() {
            return bad_request("price", "coin and vs_currency must not be empty");
        }

        match market_data.get_token_price(&query.coin, &query.vs_currency).await {
            Ok(price) => {
                let response = json!({
                    "coin": query.coin,
                    "vs_currency": query.vs_currency,
                    "price": price
                });
                (StatusCode::OK, Json(response))
            }
            Err(err) => error_response("price", err),
        }
    }

    /// 30 day usd candles for a coin
    pub async fn get_ohlc_price(
        market_data: Arc<CoingeckoClient>,
        query: types::OhlcQuery,
    ) -> impl IntoResponse {
        if query.coin.trim().is_empty() {
            return bad_request("ohlc_price", "coin must not be empty");
        }

        match market_data.get_ohlc(&query.coin).await {
            Ok(table) => (StatusCode::OK, Json(json!(table))),
            Err(err) => error_response("ohlc_price", err),
        }
    }

    pub async fn get_address_history(
        ledger: Arc<AlchemyClient>,
        query: types::AddressHistoryQuery,
    ) -> impl IntoResponse {
        match ledger.address_history(&query.from_address).await {
            Ok(history) => (StatusCode::OK, Json(history)),
            Err(err) => error_response("address_history", err),
        }
    }

    pub async fn trace_transaction(
        ledger: Arc<AlchemyClient>,
        query: types::TraceTransactionQuery,
    ) -> impl IntoResponse {
        match ledger.trace_transaction(&query.address).await {
            Ok(trace) => (StatusCode::OK, Json(trace)),
            Err(err) => error_response("trace_transaction", err),
        }
    }

    pub async fn trace_block(
        ledger: Arc<AlchemyClient>,
        query: types::TraceBlockQuery,
    ) -> impl IntoResponse {
        match ledger.trace_block(&query.block).await {
            Ok(trace) => (StatusCode::OK, Json(trace)),
            Err(err) => error_response("trace_block", err),
        }
    }

    pub async fn get_block_info(
        ledger: Arc<AlchemyClient>,
        query: types::BlockInfoQuery,
    ) -> impl IntoResponse {
        match ledger.block_by_hash(&query.block_address).await {
            Ok(block) => (StatusCode::OK, Json(block)),
            Err(err) => error_response("block_info", err),
        }
    }

    /// Item echo plus every ledger lookup requested. Always 200, failed lookups carry an
    /// `error` entry under their own key.
    pub async fn unified_lookup(
        lookup_service: Arc<LookupAggregationService<AlchemyClient>>,
        query: LookupRequest,
    ) -> impl IntoResponse {
        let result = lookup_service.aggregate(&query).await;
        (StatusCode::OK, Json(json!(result)))
    }
}
