use std::error::Error;
use std::fmt::Debug;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub const OHLC_WINDOW_DAYS: u32 = 30;
pub const OHLC_VS_CURRENCY: &str = "usd";

const INDEX_NAME: &str = "date";
const COLUMNS: [&str; 4] = ["open", "high", "low", "close"];

#[async_trait]
pub trait OhlcProvider: Debug + Send + Sync {
    type Error: Error + Debug + Send;

    /// Candles for the trailing `OHLC_WINDOW_DAYS` days, quoted in `OHLC_VS_CURRENCY`.
    async fn get_ohlc(&self, coin_id: &str) -> Result<OhlcTable, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candle {
    pub date: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    /// Upstream records are `[timestamp_ms, open, high, low, close]`.
    pub fn from_record(position: usize, record: &Value) -> Result<Self, OhlcShapeError> {
        let fields = record.as_array().ok_or(OhlcShapeError::NotAnArray(position))?;
        if fields.len() != 5 {
            return Err(OhlcShapeError::WrongFieldCount(position, fields.len()));
        }

        let date = fields[0]
            .as_i64()
            .or_else(|| fields[0].as_f64().filter(|ts| ts.fract() == 0.0).map(|ts| ts as i64))
            .ok_or(OhlcShapeError::InvalidTimestamp(position))?;

        let price = |column: usize| {
            fields[column]
                .as_f64()
                .ok_or(OhlcShapeError::NonNumericField(position, COLUMNS[column - 1]))
        };

        Ok(Candle { date, open: price(1)?, high: price(2)?, low: price(3)?, close: price(4)? })
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum OhlcShapeError {
    #[error("OHLC record {0} is not an array")]
    NotAnArray(usize),

    #[error("OHLC record {0} has {1} fields, expected 5")]
    WrongFieldCount(usize, usize),

    #[error("OHLC record {0} has an invalid timestamp")]
    InvalidTimestamp(usize),

    #[error("OHLC record {0} has a non numeric {1} value")]
    NonNumericField(usize, &'static str),
}

/// Candles laid out as a table: one row per candle, indexed by `date`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OhlcTable {
    index_name: &'static str,
    columns: [&'static str; 4],
    index: Vec<i64>,
    data: Vec<[f64; 4]>,
}

impl OhlcTable {
    pub fn from_candles(candles: impl IntoIterator<Item = Candle>) -> Self {
        let (index, data) = candles
            .into_iter()
            .map(|candle| (candle.date, [candle.open, candle.high, candle.low, candle.close]))
            .unzip();

        OhlcTable { index_name: INDEX_NAME, columns: COLUMNS, index, data }
    }

    pub fn from_records(records: &[Value]) -> Result<Self, OhlcShapeError> {
        let candles = records
            .iter()
            .enumerate()
            .map(|(position, record)| Candle::from_record(position, record))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_candles(candles))
    }

    pub fn index_name(&self) -> &str {
        self.index_name
    }

    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    pub fn index(&self) -> &[i64] {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = Candle> + '_ {
        self.index.iter().zip(self.data.iter()).map(|(date, [open, high, low, close])| Candle {
            date: *date,
            open: *open,
            high: *high,
            low: *low,
            close: *close,
        })
    }
}
