pub mod blobs;
pub mod config;
pub mod documents;
pub mod entitlement;
pub mod ledger;
pub mod withdrawals;

mod retry;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use mint_core::pipeline::{BrandMark, Degradation, PipelineOptions};
use mint_db::{DocumentRegistry, LedgerStore, MintRepository};

use blobs::{BlobStore, S3BlobStore};
use config::{Config, Policy};

/// The boundary every transport (CLI, HTTP) calls into.
///
/// Cheap to clone; all collaborators are shared.
#[derive(Clone)]
pub struct MintService {
    ledger: Arc<dyn LedgerStore>,
    registry: Arc<dyn DocumentRegistry>,
    blobs: Arc<dyn BlobStore>,
    policy: Policy,
    pipeline: PipelineOptions,
    brand: Option<Arc<BrandMark>>,
    /// Why no brand mark is drawn, reported with every rendered document.
    brand_degradation: Option<Degradation>,
}

impl MintService {
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        registry: Arc<dyn DocumentRegistry>,
        blobs: Arc<dyn BlobStore>,
        policy: Policy,
        pipeline: PipelineOptions,
    ) -> Self {
        Self {
            ledger,
            registry,
            blobs,
            policy,
            pipeline,
            brand: None,
            brand_degradation: Some(Degradation::BrandAssetMissing),
        }
    }

    /// One store backing both the ledger and the registry.
    pub fn from_store<S>(store: Arc<S>, blobs: Arc<dyn BlobStore>, policy: Policy, pipeline: PipelineOptions) -> Self
    where
        S: LedgerStore + DocumentRegistry + 'static,
    {
        let ledger: Arc<dyn LedgerStore> = store.clone();
        let registry: Arc<dyn DocumentRegistry> = store;
        Self::new(ledger, registry, blobs, policy, pipeline)
    }

    pub fn with_brand(mut self, brand: BrandMark) -> Self {
        self.brand = Some(Arc::new(brand));
        self.brand_degradation = None;
        self
    }

    /// Reads a JPEG brand mark from disk. A missing or unreadable file
    /// only downgrades watermarks to text.
    pub async fn with_brand_file(mut self, path: &Path) -> Self {
        let loaded = match tokio::fs::read(path).await {
            Ok(bytes) => BrandMark::from_jpeg(bytes),
            Err(e) => Err(Degradation::BrandAssetUnreadable(format!("{}: {}", path.display(), e))),
        };
        match loaded {
            Ok(brand) => {
                info!(path = %path.display(), width = brand.width(), height = brand.height(), "Loaded brand mark");
                self = self.with_brand(brand);
            }
            Err(degradation) => {
                warn!(%degradation, "Brand mark unavailable");
                self.brand = None;
                self.brand_degradation = Some(degradation);
            }
        }
        self
    }

    /// Production wiring: Postgres ledger and registry, S3 blobs.
    pub async fn connect(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(config.storage_timeout)
            .connect(&config.database_url)
            .await
            .context("Failed to connect to Postgres")?;

        let blobs = S3BlobStore::from_config(config).await;
        blobs
            .ensure_bucket()
            .await
            .context("Failed to initialize storage backend")?;

        let service = Self::from_store(
            Arc::new(MintRepository::new(pool)),
            Arc::new(blobs),
            config.policy(),
            config.pipeline_options(),
        );
        Ok(match &config.brand_asset {
            Some(path) => service.with_brand_file(path).await,
            None => service,
        })
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }
}
