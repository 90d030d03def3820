use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// Unified lookup query, every parameter but item_id is optional
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct LookupRequest {
    pub item_id: i64,
    pub q: Option<String>,
    #[serde(rename = "fromAddress")]
    pub from_address: Option<String>,
    pub address: Option<String>,
    pub block_address: Option<String>,
}

// Item echo, also served on its own by the items route
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ItemData {
    pub item_id: i64,
    pub q: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    ItemData,
    AddressHistory,
    TransactionTrace,
    BlockInfo,
}

impl LookupKind {
    pub fn key(&self) -> &'static str {
        match self {
            LookupKind::ItemData => "item_data",
            LookupKind::AddressHistory => "address_history",
            LookupKind::TransactionTrace => "transaction_trace",
            LookupKind::BlockInfo => "block_info",
        }
    }
}

/// Lookup results keyed by `LookupKind::key`. Failed lookups hold `{"error": <message>}`.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct AggregatedResult(Map<String, Value>);

impl AggregatedResult {
    pub fn insert(&mut self, kind: LookupKind, value: Value) {
        self.0.insert(kind.key().to_string(), value);
    }

    pub fn get(&self, kind: LookupKind) -> Option<&Value> {
        self.0.get(kind.key())
    }

    pub fn contains(&self, kind: LookupKind) -> bool {
        self.0.contains_key(kind.key())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}
