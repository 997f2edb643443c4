pub mod error;
pub mod handlers;
pub mod identity;
pub mod routes;

use mint_service::config::DEFAULT_MAX_UPLOAD_BYTES;
use mint_service::MintService;

#[derive(Clone)]
pub struct AppState {
    pub service: MintService,
    /// Body limit for document uploads; every other route keeps axum's default.
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(service: MintService) -> Self {
        Self { service, max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES }
    }

    pub fn with_upload_limit(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}
