pub use ohlc::{
    Candle, OhlcProvider, OhlcShapeError, OhlcTable, OHLC_VS_CURRENCY, OHLC_WINDOW_DAYS,
};
pub use token_price::{CoingeckoClient, CoingeckoClientError, TokenPriceProvider};

pub mod ohlc;
pub mod token_price;
