use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use log::{error, info};
use reqwest::{header, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{Number, Value};
use thiserror::Error;

use config::Config;

use crate::ohlc::{OhlcProvider, OhlcShapeError, OhlcTable, OHLC_VS_CURRENCY, OHLC_WINDOW_DAYS};
use crate::token_price::TokenPriceProvider;

#[derive(Debug, Clone)]
pub struct CoingeckoClient {
    base_url: Url,
    client: reqwest::Client,
}

impl CoingeckoClient {
    pub fn new(base_url: &str, api_key: Option<&str>) -> Result<Self, CoingeckoClientError> {
        let mut headers = header::HeaderMap::new();
        if let Some(api_key) = api_key {
            headers.insert("x-cg-pro-api-key", header::HeaderValue::from_str(api_key)?);
        }

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        let base_url = Url::parse(base_url).map_err(|err| {
            CoingeckoClientError::InvalidBaseUrl(format!("{}: {}", base_url, err))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CoingeckoClientError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(CoingeckoClient { base_url, client })
    }

    pub fn from_config(config: &Config) -> Result<Self, CoingeckoClientError> {
        Self::new(&config.coingecko.base_url, config.credentials.coingecko_api_key.as_deref())
    }

    // Each segment is percent-encoded, so caller input cannot leave the intended route
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CoingeckoClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CoingeckoClientError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<T, CoingeckoClientError> {
        let url = self.endpoint(segments)?;
        let path = url.path().to_string();

        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            error!("CoinGecko {} Request failed with status: {}", path, status);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    CoingeckoClientError::Unauthorized(status)
                }
                _ => CoingeckoClientError::RequestFailed(status),
            });
        }

        let raw_text = response.text().await?;

        serde_json::from_str(&raw_text)
            .map_err(|err| CoingeckoClientError::DeserialisationError(raw_text, err))
    }
}

#[async_trait]
impl TokenPriceProvider for CoingeckoClient {
    type Error = CoingeckoClientError;

    async fn get_token_price(
        &self,
        coin_id: &str,
        vs_currency: &str,
    ) -> Result<Number, Self::Error> {
        let coin_id = coin_id.to_lowercase();
        let vs_currency = vs_currency.to_lowercase();
        info!("Fetching token price for {} in {}", coin_id, vs_currency);

        let query = [("ids", coin_id.as_str()), ("vs_currencies", vs_currency.as_str())];
        let response: SimplePriceResponse = self.get(&["simple", "price"], &query).await?;

        let price = match response.get(&coin_id).and_then(|quotes| quotes.get(&vs_currency)) {
            Some(Value::Number(price)) => price.clone(),
            _ => return Err(CoingeckoClientError::PriceNotFound { coin_id, vs_currency }),
        };

        info!("Token price fetched from API for token {}: {}", coin_id, price);

        Ok(price)
    }
}

#[async_trait]
impl OhlcProvider for CoingeckoClient {
    type Error = CoingeckoClientError;

    async fn get_ohlc(&self, coin_id: &str) -> Result<OhlcTable, Self::Error> {
        info!("Fetching {} day OHLC for {}", OHLC_WINDOW_DAYS, coin_id);

        let days = OHLC_WINDOW_DAYS.to_string();
        let records: Vec<Value> = self
            .get(
                &["coins", coin_id, "ohlc"],
                &[("vs_currency", OHLC_VS_CURRENCY), ("days", days.as_str())],
            )
            .await?;

        let table = OhlcTable::from_records(&records).map_err(|err| {
            error!("CoinGecko OHLC response for {} has an unexpected shape: {}", coin_id, err);
            err
        })?;

        info!("Fetched {} OHLC candles for {}", table.len(), coin_id);

        Ok(table)
    }
}

#[derive(Debug, Error)]
pub enum CoingeckoClientError {
    #[error("Invalid CoinGecko base url: {0}")]
    InvalidBaseUrl(String),

    #[error("Invalid CoinGecko API Key: {0}")]
    InvalidApiKey(#[from] header::InvalidHeaderValue),

    #[error("CoinGecko rejected the credentials with status {0}")]
    Unauthorized(StatusCode),

    #[error("CoinGecko request failed with status {0}")]
    RequestFailed(StatusCode),

    #[error("Error while making request: {0}")]
    ApiCallError(#[from] reqwest::Error),

    #[error("Deserialization Error - Original String {0}, Error {1}")]
    DeserialisationError(String, serde_json::Error),

    #[error("Unexpected OHLC response: {0}")]
    UnexpectedShape(#[from] OhlcShapeError),

    #[error("No {vs_currency} price returned for {coin_id}")]
    PriceNotFound { coin_id: String, vs_currency: String },
}

// { "<coin id>": { "<currency>": <price> } }
type SimplePriceResponse = HashMap<String, HashMap<String, Value>>;
