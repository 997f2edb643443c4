use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use mint_core::models::{Document, Grant, UploaderKind};
use mint_service::documents::UploadParams;

use super::file_response;
use crate::error::ApiResult;
use crate::identity::Identity;
use crate::AppState;

pub async fn list_documents(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    Ok(Json(state.service.list_documents().await?))
}

pub async fn get_document(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<Document>> {
    Ok(Json(state.service.get_document(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub display_name: String,
    pub file_name: String,
    #[serde(default = "admin")]
    pub uploader: UploaderKind,
    pub category: Option<String>,
    pub section: Option<String>,
    /// Comma separated.
    pub tags: Option<String>,
}

fn admin() -> UploaderKind {
    UploaderKind::Admin
}

/// Body is the raw file; metadata travels in the query string.
pub async fn upload_document(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Document>)> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let tags = query
        .tags
        .map(|t| t.split(',').map(str::trim).filter(|t| !t.is_empty()).map(str::to_string).collect())
        .unwrap_or_default();

    let document = state
        .service
        .upload_document(UploadParams {
            display_name: query.display_name,
            file_name: query.file_name,
            content_type,
            bytes: body.to_vec(),
            uploader_kind: query.uploader,
            category: query.category,
            section: query.section,
            tags,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// Public: no identity, no charge.
pub async fn get_preview(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Response> {
    let preview = state.service.get_preview(id).await?;
    Ok(file_response(preview.bytes, "application/pdf", None))
}

pub async fn download(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Identity(identity): Identity,
) -> ApiResult<Response> {
    let delivery = state.service.purchase_and_download(&identity, id).await?;

    let mut response = file_response(delivery.bytes, &delivery.content_type, Some(&delivery.file_name));
    let replayed = if delivery.grant.replayed { "true" } else { "false" };
    response
        .headers_mut()
        .insert("x-mint-replayed", HeaderValue::from_static(replayed));
    Ok(response)
}

/// Authorizes (and charges once) without streaming the file.
pub async fn entitle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Identity(identity): Identity,
) -> ApiResult<Json<Grant>> {
    Ok(Json(state.service.request_download(&identity, id).await?))
}
