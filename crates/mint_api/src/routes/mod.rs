use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{account, documents, health_check, withdrawals};
use crate::AppState;

pub fn app_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/health", get(health_check))
        // Catalog and delivery
        .route(
            "/documents",
            get(documents::list_documents).post(documents::upload_document).layer(upload_limit),
        )
        .route("/documents/:id", get(documents::get_document))
        .route("/documents/:id/preview", get(documents::get_preview))
        .route("/documents/:id/entitlement", post(documents::entitle))
        .route("/documents/:id/download", post(documents::download))
        // The caller's account
        .route("/me", get(account::balance).post(account::signup))
        .route("/me/ledger", get(account::ledger))
        .route("/me/receipts", get(account::receipts))
        .route("/me/withdrawals", post(withdrawals::request_withdrawal))
        // Admin queue
        .route("/admin/withdrawals", get(withdrawals::list_withdrawals))
        .route("/admin/withdrawals/:id", get(withdrawals::get_withdrawal))
        .route("/admin/withdrawals/:id/resolve", post(withdrawals::resolve_withdrawal))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
