use std::fmt::Display;
use std::sync::Arc;

use log::{debug, error};
use serde_json::{json, Value};

use ledger::LedgerLookup;

use crate::types::{AggregatedResult, ItemData, LookupKind, LookupRequest};

pub struct LookupAggregationService<L: LedgerLookup> {
    ledger: Arc<L>,
}

impl<L: LedgerLookup> Clone for LookupAggregationService<L> {
    fn clone(&self) -> Self {
        Self { ledger: self.ledger.clone() }
    }
}

impl<L: LedgerLookup> LookupAggregationService<L> {
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    /// Runs every lookup whose parameter is present, one after the other. A failed lookup is
    /// recorded under its own key and never aborts the others.
    pub async fn aggregate(&self, request: &LookupRequest) -> AggregatedResult {
        debug!("Aggregating lookups for {:?}", request);

        let mut result = AggregatedResult::default();

        let item = ItemData { item_id: request.item_id, q: request.q.clone() };
        result.insert(LookupKind::ItemData, json!(item));

        if let Some(from_address) = present(&request.from_address) {
            let lookup = self.ledger.address_history(from_address).await;
            record(&mut result, LookupKind::AddressHistory, lookup);
        }

        if let Some(transaction) = present(&request.address) {
            let lookup = self.ledger.trace_transaction(transaction).await;
            record(&mut result, LookupKind::TransactionTrace, lookup);
        }

        if let Some(block_hash) = present(&request.block_address) {
            let lookup = self.ledger.block_by_hash(block_hash).await;
            record(&mut result, LookupKind::BlockInfo, lookup);
        }

        result
    }
}

// Empty strings count as absent
fn present(param: &Option<String>) -> Option<&str> {
    param.as_deref().filter(|value| !value.trim().is_empty())
}

fn record<E: Display>(result: &mut AggregatedResult, kind: LookupKind, lookup: Result<Value, E>) {
    match lookup {
        Ok(value) => result.insert(kind, value),
        Err(err) => {
            error!("Lookup {} failed: {}", kind.key(), err);
            result.insert(kind, json!({ "error": err.to_string() }));
        }
    }
}
