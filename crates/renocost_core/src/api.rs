//! JSON API envelopes for the catalog endpoints.
//!
//! # Responsibility
//! - Translate service results into `(status, json body)` pairs for the
//!   `GET /api/<category>/catalog` and `POST /api/<category>/update-price`
//!   endpoints.
//! - Keep error semantics stable for the web front end.
//!
//! # Invariants
//! - Functions here never panic; every failure becomes an envelope.
//! - Error bodies are `{"detail": "<message>"}`.
//! - Unknown keys map to 404, bad input to 422, everything else to 500.

use crate::service::catalog_service::{CatalogService, ServiceError};
use crate::store::catalog_store::CatalogStore;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const STATUS_OK: u16 = 200;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_UNPROCESSABLE: u16 = 422;
pub const STATUS_SERVER_ERROR: u16 = 500;

/// Response envelope handed to the HTTP layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn success(body: impl Serialize) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self {
                status: STATUS_OK,
                body,
            },
            Err(err) => Self::failure(STATUS_SERVER_ERROR, err.to_string()),
        }
    }

    fn failure(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "detail": detail.into() }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Body of `POST update-price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePricePayload {
    /// Unique key of the catalog item.
    pub key: String,
    /// New price to persist; must be greater than zero.
    pub latest_price: f64,
}

/// Parses a raw request body, answering 422 when it is not a valid payload.
pub fn parse_update_payload(body: &str) -> Result<UpdatePricePayload, ApiResponse> {
    serde_json::from_str(body).map_err(|err| {
        ApiResponse::failure(STATUS_UNPROCESSABLE, format!("invalid request body: {err}"))
    })
}

/// `GET catalog`: group name -> ordered item list.
pub fn catalog_response<S: CatalogStore>(service: &CatalogService<S>) -> ApiResponse {
    match service.list() {
        Ok(catalog) => ApiResponse::success(&catalog),
        Err(err) => ApiResponse::failure(STATUS_SERVER_ERROR, err.to_string()),
    }
}

/// `POST update-price`: `{status: "ok", item}` on success.
pub fn update_price_response<S: CatalogStore>(
    service: &CatalogService<S>,
    payload: &UpdatePricePayload,
) -> ApiResponse {
    match service.set_price(&payload.key, payload.latest_price) {
        Ok(update) => ApiResponse::success(&update),
        Err(err) => {
            let status = status_for(&err);
            warn!(
                "event=api_update_price module=api status=rejected category={} http_status={} error={}",
                service.category(),
                status,
                err
            );
            ApiResponse::failure(status, err.to_string())
        }
    }
}

/// Parses `body` and applies the update in one step.
pub fn handle_update_price<S: CatalogStore>(service: &CatalogService<S>, body: &str) -> ApiResponse {
    match parse_update_payload(body) {
        Ok(payload) => update_price_response(service, &payload),
        Err(response) => response,
    }
}

fn status_for(err: &ServiceError) -> u16 {
    match err {
        ServiceError::ItemNotFound(_) => STATUS_NOT_FOUND,
        err if err.is_validation() => STATUS_UNPROCESSABLE,
        _ => STATUS_SERVER_ERROR,
    }
}
