use tracing::info;
use uuid::Uuid;

use mint_core::models::document::is_pdf;
use mint_core::models::{Document, NewDocument, UploaderKind};
use mint_core::{Error, Result};

use crate::blobs::content_key;
use crate::retry::{bounded, retrying};
use crate::MintService;

#[derive(Debug, Clone)]
pub struct UploadParams {
    pub display_name: String,
    pub file_name: String,
    /// Declared by the uploader; inferred from the file name when absent.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub uploader_kind: UploaderKind,
    pub category: Option<String>,
    pub section: Option<String>,
    pub tags: Vec<String>,
}

impl MintService {
    /// Stores the original and registers it in the catalog.
    pub async fn upload_document(&self, params: UploadParams) -> Result<Document> {
        let display_name = params.display_name.trim().to_string();
        if display_name.is_empty() {
            return Err(Error::InvalidInput("display name must not be empty".into()));
        }
        if params.bytes.is_empty() {
            return Err(Error::InvalidInput("document is empty".into()));
        }

        // 1. Checksum
        let key = content_key(&params.bytes);
        let content_type = match params.content_type.as_deref().map(str::trim) {
            Some(declared) if !declared.is_empty() => declared.to_string(),
            _ if is_pdf("", &params.file_name) => "application/pdf".to_string(),
            _ => "application/octet-stream".to_string(),
        };
        let byte_size = params.bytes.len() as i64;

        // 2. Upload (same key for same bytes, so retrying is harmless)
        retrying(&self.policy, "blob put", || {
            self.blobs.put(&key, params.bytes.clone(), &content_type)
        })
        .await?;

        // 3. Register
        let document = bounded(
            &self.policy,
            self.registry.create_document(NewDocument {
                display_name,
                blob_key: key,
                original_file_name: params.file_name,
                content_type,
                byte_size,
                uploader_kind: params.uploader_kind,
                category: params.category,
                section: params.section,
                tags: params.tags,
            }),
        )
        .await?;

        info!(document_id = %document.id, size = byte_size, "Registered document");
        Ok(document)
    }

    pub async fn get_document(&self, id: Uuid) -> Result<Document> {
        retrying(&self.policy, "document lookup", || self.registry.get_document(id))
            .await?
            .ok_or(Error::DocumentNotFound(id))
    }

    pub async fn list_documents(&self) -> Result<Vec<Document>> {
        retrying(&self.policy, "document list", || self.registry.list_documents()).await
    }
}
