use std::error::Error;
use std::fmt::Debug;

use async_trait::async_trait;
use serde_json::Number;

pub use coingecko::{CoingeckoClient, CoingeckoClientError};

mod coingecko;

#[async_trait]
pub trait TokenPriceProvider: Debug + Send + Sync {
    type Error: Error + Debug + Send;

    /// Price of `coin_id` quoted in `vs_currency`, passed through as the upstream's JSON number.
    async fn get_token_price(&self, coin_id: &str, vs_currency: &str)
        -> Result<Number, Self::Error>;
}
