pub use alchemy::{AlchemyClient, LedgerError, LATEST_BLOCK};
pub use traits::LedgerLookup;

mod alchemy;
mod traits;
