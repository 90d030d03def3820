pub use service::LookupAggregationService;
pub use types::{AggregatedResult, ItemData, LookupKind, LookupRequest};

pub mod service;
pub mod types;
