/// Axum HTTP handlers for the explorer endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::state::ExplorerState;
use crate::types::*;

/// Shared application state
pub type AppState = Arc<ExplorerState>;

pub const DEFAULT_PAGE_LIMIT: usize = 20;
pub const MOCK_VERSION: &str = "v1.0.0-mock";

/// Custom error type for handlers
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        (status, message).into_response()
    }
}

/// Count the hit and fail it if the address was marked failing
fn touch(state: &ExplorerState, address: &str) -> Result<(), ApiError> {
    state.record_request(address);
    if state.is_failing(address) {
        return Err(ApiError::Unavailable(format!(
            "Address {} temporarily unavailable",
            address
        )));
    }
    Ok(())
}

fn parse_amount(raw: &str) -> Result<u128, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid amount: {}", raw)))
}

/// GET /infos
pub async fn get_infos() -> Json<InfoResponse> {
    Json(InfoResponse {
        version: MOCK_VERSION.to_string(),
    })
}

/// GET /addresses/{address}/balance
pub async fn get_address_balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    touch(&state, &address)?;
    let (balance, locked) = state.balance(&address);
    Ok(Json(BalanceResponse {
        balance: balance.to_string(),
        locked_balance: locked.to_string(),
    }))
}

/// GET /addresses/{address}/total-transactions
/// Returns the number of confirmed transactions as a bare JSON number
pub async fn get_total_transactions(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<usize>, ApiError> {
    touch(&state, &address)?;
    Ok(Json(state.total_transactions(&address)))
}

/// GET /addresses/{address}/transactions?page=&limit=
/// Confirmed history, newest first
pub async fn get_address_transactions(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<ConfirmedTx>>, ApiError> {
    touch(&state, &address)?;
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    if limit == 0 {
        return Err(ApiError::BadRequest("limit must be positive".to_string()));
    }
    Ok(Json(state.transactions(&address, page, limit)))
}

/// GET /addresses/{address}/unconfirmed-transactions
pub async fn get_unconfirmed_transactions(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<Vec<UnconfirmedTx>>, ApiError> {
    touch(&state, &address)?;
    Ok(Json(state.unconfirmed(&address)))
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

// ============================================================================
// MOCK HELPER ENDPOINTS
// ============================================================================

/// POST /mock/addresses/{address}/balance
pub async fn set_address_balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Json(request): Json<SetBalanceRequest>,
) -> Result<StatusCode, ApiError> {
    let balance = parse_amount(&request.balance)?;
    let locked = match request.locked_balance.as_deref() {
        Some(raw) => parse_amount(raw)?,
        None => 0,
    };
    state.set_balance(&address, balance, locked);
    log::info!("💰 {} balance set to {} ({} locked)", address, balance, locked);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /mock/unconfirmed
pub async fn add_unconfirmed(
    State(state): State<AppState>,
    Json(tx): Json<UnconfirmedTx>,
) -> Result<StatusCode, ApiError> {
    if let Some(raw) = tx.amount.as_deref() {
        parse_amount(raw)?;
    }
    state.add_unconfirmed(tx);
    Ok(StatusCode::CREATED)
}

/// POST /mock/confirm/{hash}
pub async fn confirm_transaction(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<ConfirmResponse>, ApiError> {
    let response = state
        .confirm(&hash)
        .map_err(|e| ApiError::NotFound(e.to_string()))?;
    Ok(Json(response))
}
