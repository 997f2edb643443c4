#![allow(dead_code)]

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, Stream};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mint_core::models::{Document, LedgerKind, UploaderKind};
use mint_core::pipeline::PipelineOptions;
use mint_core::{Error, Result};
use mint_db::MemoryStore;
use mint_service::blobs::{Blob, BlobStore, MemoryBlobStore};
use mint_service::config::Policy;
use mint_service::documents::UploadParams;
use mint_service::MintService;

pub const READER: &str = "reader@example.com";

pub fn policy() -> Policy {
    Policy {
        storage_timeout: Duration::from_secs(2),
        ..Policy::default()
    }
}

pub fn service_with(policy: Policy, blobs: Arc<dyn BlobStore>) -> MintService {
    MintService::from_store(Arc::new(MemoryStore::new()), blobs, policy, PipelineOptions::default())
}

pub fn service() -> MintService {
    service_with(policy(), Arc::new(MemoryBlobStore::new()))
}

/// A Letter-sized document whose pages say "Page N".
pub fn sample_pdf(pages: usize) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let kids: Vec<Object> = (1..=pages)
        .map(|n| {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 18_i64.into()]),
                    Operation::new("Td", vec![72_i64.into(), 720_i64.into()]),
                    Operation::new("Tj", vec![Object::string_literal(format!("Page {}", n))]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "MediaBox" => vec![0_i64.into(), 0_i64.into(), 612_i64.into(), 792_i64.into()],
                "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

pub fn page_count(bytes: &[u8]) -> usize {
    lopdf::Document::load_mem(bytes).unwrap().get_pages().len()
}

pub fn mentions(bytes: &[u8], needle: &str) -> bool {
    bytes.windows(needle.len()).any(|w| w == needle.as_bytes())
}

pub async fn upload_pdf(service: &MintService, name: &str, pages: usize) -> Document {
    service
        .upload_document(UploadParams {
            display_name: name.to_string(),
            file_name: "upload.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
            bytes: sample_pdf(pages),
            uploader_kind: UploaderKind::Admin,
            category: None,
            section: None,
            tags: Vec::new(),
        })
        .await
        .unwrap()
}

pub async fn upload_file(service: &MintService, name: &str, file_name: &str, bytes: &[u8]) -> Document {
    service
        .upload_document(UploadParams {
            display_name: name.to_string(),
            file_name: file_name.to_string(),
            content_type: None,
            bytes: bytes.to_vec(),
            uploader_kind: UploaderKind::User,
            category: Some("slides".to_string()),
            section: None,
            tags: Vec::new(),
        })
        .await
        .unwrap()
}

pub async fn assert_reconciled(service: &MintService, identity: &str) {
    let balance = service.get_balance(identity).await.unwrap();
    let sum: i64 = service
        .get_ledger_history(identity)
        .await
        .unwrap()
        .iter()
        .map(|e| e.amount)
        .sum();
    assert_eq!(balance, sum, "balance must equal the sum of the ledger");
}

pub async fn download_entries(service: &MintService, identity: &str) -> usize {
    service
        .get_ledger_history(identity)
        .await
        .unwrap()
        .iter()
        .filter(|e| e.kind == LedgerKind::Download)
        .count()
}

/// Fails (or stalls) the first `failures` reads, then behaves.
pub struct UnreliableBlobs {
    inner: MemoryBlobStore,
    failures: u32,
    stall: Option<Duration>,
    reads: AtomicU32,
}

impl UnreliableBlobs {
    pub fn failing(failures: u32) -> Self {
        Self { inner: MemoryBlobStore::new(), failures, stall: None, reads: AtomicU32::new(0) }
    }

    pub fn stalling(failures: u32, stall: Duration) -> Self {
        Self { inner: MemoryBlobStore::new(), failures, stall: Some(stall), reads: AtomicU32::new(0) }
    }

    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for UnreliableBlobs {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        self.inner.put(key, bytes, content_type).await
    }

    async fn get(&self, key: &str) -> Result<Blob> {
        let attempt = self.reads.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            match self.stall {
                Some(stall) => tokio::time::sleep(stall).await,
                None => return Err(Error::TransientStorage("connection reset by peer".into())),
            }
        }
        self.inner.get(key).await
    }
}
