use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use mint_core::models::{DownloadReceipt, LedgerEntry, User};

use crate::error::ApiResult;
use crate::identity::Identity;
use crate::AppState;

pub async fn signup(State(state): State<AppState>, Identity(identity): Identity) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state.service.register_user(&identity).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub identity: String,
    pub balance: i64,
}

pub async fn balance(State(state): State<AppState>, Identity(identity): Identity) -> ApiResult<Json<BalanceResponse>> {
    let balance = state.service.get_balance(&identity).await?;
    Ok(Json(BalanceResponse { identity, balance }))
}

pub async fn ledger(State(state): State<AppState>, Identity(identity): Identity) -> ApiResult<Json<Vec<LedgerEntry>>> {
    Ok(Json(state.service.get_ledger_history(&identity).await?))
}

pub async fn receipts(
    State(state): State<AppState>,
    Identity(identity): Identity,
) -> ApiResult<Json<Vec<DownloadReceipt>>> {
    Ok(Json(state.service.list_receipts(&identity).await?))
}
