use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::{header, StatusCode};
use serde_json::{json, Value};
use thiserror::Error;

use config::Config;
use types::{JsonRpcError, JsonRpcRequest};

use crate::LedgerLookup;

mod types;

pub const LATEST_BLOCK: &str = "latest";

const GENESIS_BLOCK: &str = "0x0";

#[derive(Debug, Clone)]
pub struct AlchemyClient {
    client: reqwest::Client,
    // base url + api key, never logged
    endpoint: String,
}

impl AlchemyClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, LedgerError> {
        if api_key.trim().is_empty() {
            return Err(LedgerError::MissingApiKey);
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        Ok(AlchemyClient {
            client: reqwest::Client::builder().default_headers(headers).build()?,
            endpoint: format!("{}/{}", base_url.trim_end_matches('/'), api_key),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, LedgerError> {
        Self::new(&config.node_provider.base_url, &config.credentials.node_provider_api_key)
    }

    async fn call(&self, request: JsonRpcRequest<'_>) -> Result<Value, LedgerError> {
        debug!("Calling node provider method {} with params {}", request.method, request.params);

        let response = self.client.post(&self.endpoint).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            error!("Node provider {} Request failed with status: {}", request.method, status);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    LedgerError::Unauthorized(status)
                }
                _ => LedgerError::RequestFailed(status),
            });
        }

        let raw_text = response.text().await?;
        let envelope: Value = serde_json::from_str(&raw_text)
            .map_err(|err| LedgerError::DeserialisationError(raw_text, err))?;

        if let Some(rpc_error) = envelope.get("error").filter(|rpc_error| !rpc_error.is_null()) {
            let err = match serde_json::from_value::<JsonRpcError>(rpc_error.clone()) {
                Ok(JsonRpcError { code, message }) => LedgerError::Rpc { code, message },
                Err(_) => LedgerError::Rpc { code: 0, message: rpc_error.to_string() },
            };
            error!("Node provider {} returned an error: {}", request.method, err);
            return Err(err);
        }

        Ok(envelope)
    }
}

#[async_trait]
impl LedgerLookup for AlchemyClient {
    async fn address_history(&self, from_address: &str) -> Result<Value, LedgerError> {
        info!("Fetching asset transfers from {}", from_address);

        self.call(JsonRpcRequest::new(
            0,
            "alchemy_getAssetTransfers",
            json!([{ "fromBlock": GENESIS_BLOCK, "fromAddress": from_address }]),
        ))
        .await
    }

    async fn trace_transaction(&self, transaction: &str) -> Result<Value, LedgerError> {
        info!("Tracing transaction {}", transaction);

        self.call(JsonRpcRequest::new(1, "trace_transaction", json!([transaction]))).await
    }

    async fn trace_block(&self, block: &str) -> Result<Value, LedgerError> {
        info!("Tracing block {}", block);

        self.call(JsonRpcRequest::new(1, "trace_block", json!([block]))).await
    }

    async fn block_by_hash(&self, block_hash: &str) -> Result<Value, LedgerError> {
        info!("Fetching block {}", block_hash);

        let envelope = self
            .call(JsonRpcRequest::new(1, "eth_getBlockByHash", json!([block_hash, true])))
            .await?;

        if envelope.get("result").map_or(true, Value::is_null) {
            error!("Block {} not found", block_hash);
            return Err(LedgerError::BlockNotFound(block_hash.to_string()));
        }

        Ok(envelope)
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Node provider API key is empty")]
    MissingApiKey,

    #[error("Node provider rejected the credentials with status {0}")]
    Unauthorized(StatusCode),

    #[error("Node provider request failed with status {0}")]
    RequestFailed(StatusCode),

    #[error("Error while making request: {0}")]
    ApiCallError(#[source] reqwest::Error),

    #[error("Deserialization Error - Original String {0}, Error {1}")]
    DeserialisationError(String, serde_json::Error),

    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Block not found: {0}")]
    BlockNotFound(String),
}

// The request url carries the api key, strip it before the error can be displayed
impl From<reqwest::Error> for LedgerError {
    fn from(err: reqwest::Error) -> Self {
        LedgerError::ApiCallError(err.without_url())
    }
}
