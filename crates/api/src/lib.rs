pub use service_controller::{ServiceController, CHAIN_BANNER};

mod errors;
pub mod service_controller;
mod types;

#[cfg(test)]
mod tests;
