use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use mint_core::models::{Decision, WithdrawRequest, WithdrawStatus};

use crate::error::ApiResult;
use crate::identity::Identity;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct WithdrawBody {
    pub amount: i64,
    pub payout_address: String,
}

pub async fn request_withdrawal(
    State(state): State<AppState>,
    Identity(identity): Identity,
    Json(body): Json<WithdrawBody>,
) -> ApiResult<(StatusCode, Json<WithdrawRequest>)> {
    let request = state
        .service
        .request_withdrawal(&identity, body.amount, &body.payout_address)
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<WithdrawStatus>,
}

pub async fn list_withdrawals(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<WithdrawRequest>>> {
    Ok(Json(state.service.list_withdrawals(query.status).await?))
}

pub async fn get_withdrawal(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<WithdrawRequest>> {
    Ok(Json(state.service.get_withdrawal(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct ResolveBody {
    pub decision: Decision,
}

pub async fn resolve_withdrawal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ResolveBody>,
) -> ApiResult<Json<WithdrawRequest>> {
    Ok(Json(state.service.resolve_withdrawal(id, body.decision).await?))
}
