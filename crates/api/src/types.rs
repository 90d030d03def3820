use serde::Deserialize;

use ledger::LATEST_BLOCK;

#[derive(Deserialize, Debug)]
pub struct ItemQuery {
    pub q: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ProcessStringPayload {
    pub input_string: String,
}

#[derive(Deserialize, Debug)]
pub struct PriceQuery {
    pub coin: String,
    #[serde(default = "default_vs_currency")]
    pub vs_currency: String,
}

fn default_vs_currency() -> String {
    "usd".to_string()
}

#[derive(Deserialize, Debug)]
pub struct OhlcQuery {
    pub coin: String,
}

#[derive(Deserialize, Debug)]
pub struct AddressHistoryQuery {
    #[serde(rename = "fromAddress")]
    pub from_address: String,
}

// The transaction hash, the legacy query name is kept
#[derive(Deserialize, Debug)]
pub struct TraceTransactionQuery {
    pub address: String,
}

#[derive(Deserialize, Debug)]
pub struct TraceBlockQuery {
    #[serde(default = "default_block")]
    pub block: String,
}

fn default_block() -> String {
    LATEST_BLOCK.to_string()
}

#[derive(Deserialize, Debug)]
pub struct BlockInfoQuery {
    pub block_address: String,
}
