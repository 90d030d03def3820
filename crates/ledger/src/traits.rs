use async_trait::async_trait;
use serde_json::Value;

use crate::LedgerError;

/// Blockchain lookups served by a node provider. Every method is a single round trip and
/// returns the provider's JSON-RPC response envelope.
#[async_trait]
pub trait LedgerLookup: Send + Sync {
    /// Asset transfers sent from `from_address`, starting at the genesis block.
    async fn address_history(&self, from_address: &str) -> Result<Value, LedgerError>;

    async fn trace_transaction(&self, transaction: &str) -> Result<Value, LedgerError>;

    /// `block` is a block tag (`latest`) or a block number.
    async fn trace_block(&self, block: &str) -> Result<Value, LedgerError>;

    /// Full block contents including transaction objects.
    async fn block_by_hash(&self, block_hash: &str) -> Result<Value, LedgerError>;
}
