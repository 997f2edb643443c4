//! Paid delivery and free previews.

use tracing::{debug, info, warn};
use uuid::Uuid;

use mint_core::models::{normalize_identity, Document, DownloadReceipt, Grant};
use mint_core::pipeline::{render_preview, stamp_for_delivery, Degradation, Rendered};
use mint_core::{Error, Result};

use crate::blobs::Blob;
use crate::retry::retrying;
use crate::MintService;

const PDF: &str = "application/pdf";

/// A delivered file, ready to stream.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub bytes: Vec<u8>,
    /// Attachment name: the display name with the original extension.
    pub file_name: String,
    pub content_type: String,
    pub grant: Grant,
    /// Watermarks that could not be applied. Never shown to the buyer.
    pub degradations: Vec<Degradation>,
}

impl MintService {
    /// Charges at most once per (identity, document).
    ///
    /// The grant is a single atomic unit in the ledger store; a replayed
    /// or retried call finds the existing receipt and costs nothing.
    pub async fn request_download(&self, identity: &str, document_id: Uuid) -> Result<Grant> {
        let identity = normalize_identity(identity)?;
        let document = self.get_document(document_id).await?;
        self.grant(&identity, &document).await
    }

    async fn grant(&self, identity: &str, document: &Document) -> Result<Grant> {
        let file_name = document.attachment_name();
        let cost = self.policy.download_cost;

        let grant = retrying(&self.policy, "entitlement grant", || {
            self.ledger.purchase(identity, document.id, &file_name, cost)
        })
        .await?;

        if grant.replayed {
            debug!(identity, document_id = %document.id, "Already delivered, replaying receipt");
        } else {
            info!(identity, document_id = %document.id, cost, "Charged for download");
        }
        Ok(grant)
    }

    /// Grants access, then returns the original stamped with the buyer's
    /// identity. Files the pipeline cannot transform are passed through.
    pub async fn purchase_and_download(&self, identity: &str, document_id: Uuid) -> Result<Delivery> {
        let identity = normalize_identity(identity)?;
        let document = self.get_document(document_id).await?;

        // 1. Entitlement (commits before any bytes move)
        let grant = self.grant(&identity, &document).await?;

        // 2. Fetch the original
        let blob = self.fetch(&document).await?;

        // 3. Derive the delivered copy
        if !document.is_pdf() {
            debug!(document_id = %document.id, content_type = %document.content_type, "Passing through non-PDF");
            let content_type = if document.content_type.trim().is_empty() {
                blob.content_type
            } else {
                document.content_type.clone()
            };
            return Ok(Delivery {
                bytes: blob.bytes,
                file_name: document.attachment_name(),
                content_type,
                grant,
                degradations: Vec::new(),
            });
        }

        let options = self.pipeline.clone();
        let brand = self.brand.clone();
        let stamped_for = identity.clone();
        let rendered = tokio::task::spawn_blocking(move || {
            stamp_for_delivery(&blob.bytes, &stamped_for, &options, brand.as_deref())
        })
        .await
        .map_err(|e| Error::Pipeline(format!("stamping task failed: {}", e)))??;

        let degradations = self.with_brand_degradation(rendered.degradations);
        Ok(Delivery {
            bytes: rendered.bytes,
            file_name: document.attachment_name(),
            content_type: PDF.to_string(),
            grant,
            degradations,
        })
    }

    /// Free, watermarked preview. No entitlement check and no receipt.
    pub async fn get_preview(&self, document_id: Uuid) -> Result<Rendered> {
        let document = self.get_document(document_id).await?;
        if !document.is_pdf() {
            return Err(Error::UnsupportedFormat(format!(
                "previews are only available for PDF documents, '{}' is {}",
                document.display_name, document.content_type
            )));
        }

        let blob = self.fetch(&document).await?;
        let options = self.pipeline.clone();
        let brand = self.brand.clone();
        let mut rendered = tokio::task::spawn_blocking(move || {
            render_preview(&blob.bytes, &options, brand.as_deref())
        })
        .await
        .map_err(|e| Error::Pipeline(format!("preview task failed: {}", e)))??;
        rendered.degradations = self.with_brand_degradation(rendered.degradations);

        debug!(%document_id, pages = rendered.page_count, "Served preview");
        Ok(rendered)
    }

    /// Purchased documents, newest first.
    pub async fn list_receipts(&self, identity: &str) -> Result<Vec<DownloadReceipt>> {
        let user = self.get_user(identity).await?;
        retrying(&self.policy, "receipt list", || self.ledger.list_receipts(&user.identity)).await
    }

    async fn fetch(&self, document: &Document) -> Result<Blob> {
        retrying(&self.policy, "blob get", || self.blobs.get(&document.blob_key)).await
    }

    /// The pipeline only knows it was handed no brand; the startup reason
    /// (missing or unreadable asset) replaces whatever it reported.
    fn with_brand_degradation(&self, mut degradations: Vec<Degradation>) -> Vec<Degradation> {
        if let Some(degradation) = &self.brand_degradation {
            degradations.retain(|d| *d != Degradation::BrandAssetMissing);
            if !degradations.contains(degradation) {
                warn!(%degradation, "Rendering without brand mark");
                degradations.push(degradation.clone());
            }
        }
        degradations
    }
}
