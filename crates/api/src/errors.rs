use std::fmt::Display;

use axum::http::StatusCode;
use axum::Json;
use log::{error, info};
use serde_json::{json, Value};

use ledger::LedgerError;
use market_data::CoingeckoClientError;

/// Status code an upstream failure is reported with.
pub(crate) trait ErrorStatus: Display {
    fn status_code(&self) -> StatusCode;
}

impl ErrorStatus for LedgerError {
    fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::BlockNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

impl ErrorStatus for CoingeckoClientError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_GATEWAY
    }
}

pub(crate) fn error_response<E: ErrorStatus>(route: &str, err: E) -> (StatusCode, Json<Value>) {
    error!("{} failed: {}", route, err);
    (err.status_code(), Json(json!({ "error": err.to_string() })))
}

/// Malformed input, rejected before any upstream call.
pub(crate) fn bad_request(route: &str, message: impl Display) -> (StatusCode, Json<Value>) {
    info!("{} rejected: {}", route, message);
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message.to_string() })))
}
