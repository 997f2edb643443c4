mod common;

use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use common::*;
use mint_core::pipeline::Degradation;
use mint_core::{Error, ErrorKind};
use mint_service::blobs::MemoryBlobStore;
use mint_service::config::Policy;

#[tokio::test]
async fn repeated_download_charges_once() {
    let service = service();
    service.register_user(READER).await.unwrap();
    let doc = upload_pdf(&service, "Organic Chemistry", 3).await;

    let first = service.purchase_and_download(READER, doc.id).await.unwrap();
    assert!(!first.grant.replayed);
    assert_eq!(service.get_balance(READER).await.unwrap(), 40);

    let second = service.purchase_and_download(READER, doc.id).await.unwrap();
    assert!(second.grant.replayed);
    assert_eq!(second.grant.receipt, first.grant.receipt);
    assert_eq!(second.bytes, first.bytes);
    assert_eq!(service.get_balance(READER).await.unwrap(), 40);

    assert_eq!(download_entries(&service, READER).await, 1);
    assert_reconciled(&service, READER).await;
}

#[tokio::test]
async fn delivered_copy_names_the_buyer_on_every_page() {
    let service = service();
    service.register_user(READER).await.unwrap();
    let doc = upload_pdf(&service, "Organic Chemistry", 4).await;

    let delivery = service.purchase_and_download("  Reader@Example.com ", doc.id).await.unwrap();
    assert_eq!(delivery.file_name, "Organic Chemistry.pdf");
    assert_eq!(delivery.content_type, "application/pdf");
    assert_eq!(page_count(&delivery.bytes), 4);
    assert!(mentions(&delivery.bytes, "Downloaded by: reader@example.com"));
    // No brand mark is configured, which only downgrades the watermark.
    assert_eq!(delivery.degradations, vec![Degradation::BrandAssetMissing]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_charge_exactly_once() {
    let policy = Policy { signup_bonus: 10, ..policy() };
    let service = Arc::new(service_with(policy, Arc::new(MemoryBlobStore::new())));
    service.register_user(READER).await.unwrap();
    let doc_id = upload_pdf(&service, "Thermodynamics", 2).await.id;

    let requests = (0..10).map(|_| {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.purchase_and_download(READER, doc_id).await })
    });
    let deliveries: Vec<_> = futures::future::join_all(requests)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert_eq!(deliveries.iter().filter(|d| !d.grant.replayed).count(), 1);
    assert_eq!(deliveries.iter().filter(|d| d.grant.replayed).count(), 9);
    assert_eq!(service.get_balance(READER).await.unwrap(), 0);
    assert_eq!(download_entries(&service, READER).await, 1);
    assert_eq!(service.list_receipts(READER).await.unwrap().len(), 1);
    assert_reconciled(&service, READER).await;
}

#[tokio::test]
async fn insufficient_balance_changes_nothing() {
    let policy = Policy { signup_bonus: 5, ..policy() };
    let service = service_with(policy, Arc::new(MemoryBlobStore::new()));
    service.register_user(READER).await.unwrap();
    let doc = upload_pdf(&service, "Thermodynamics", 2).await;

    let err = service.purchase_and_download(READER, doc.id).await.unwrap_err();
    assert!(matches!(err, Error::InsufficientBalance { balance: 5, required: 10 }));
    assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
    assert!(!err.is_retryable());

    assert_eq!(service.get_balance(READER).await.unwrap(), 5);
    assert!(service.list_receipts(READER).await.unwrap().is_empty());
    assert_reconciled(&service, READER).await;
}

#[tokio::test]
async fn unknown_document_or_user_is_not_found() {
    let service = service();
    service.register_user(READER).await.unwrap();
    let doc = upload_pdf(&service, "Thermodynamics", 1).await;

    let missing_doc = service.purchase_and_download(READER, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(missing_doc, Error::DocumentNotFound(_)));

    let missing_user = service.purchase_and_download("ghost@example.com", doc.id).await.unwrap_err();
    assert!(matches!(missing_user, Error::UserNotFound(_)));
    assert_eq!(missing_user.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn non_pdf_files_pass_through_untouched() {
    let service = service();
    service.register_user(READER).await.unwrap();
    let original = b"PK\x03\x04 slide deck bytes".to_vec();
    let doc = upload_file(&service, "Unit 3", "unit3.PPTX", &original).await;
    assert_eq!(doc.content_type, "application/octet-stream");

    let delivery = service.purchase_and_download(READER, doc.id).await.unwrap();
    assert_eq!(delivery.bytes, original);
    assert_eq!(delivery.file_name, "Unit 3.pptx");
    assert!(delivery.degradations.is_empty());
    assert_eq!(service.get_balance(READER).await.unwrap(), 40);
}

#[tokio::test]
async fn unreadable_brand_asset_still_delivers() {
    let service = service()
        .with_brand_file(std::path::Path::new("/nonexistent/brand.jpg"))
        .await;
    service.register_user(READER).await.unwrap();
    let doc = upload_pdf(&service, "Optics", 2).await;

    let delivery = service.purchase_and_download(READER, doc.id).await.unwrap();
    assert_eq!(page_count(&delivery.bytes), 2);
    assert!(matches!(delivery.degradations[..], [Degradation::BrandAssetUnreadable(_)]));
}

#[tokio::test]
async fn transient_blob_failures_are_retried_without_recharging() {
    let blobs = Arc::new(UnreliableBlobs::failing(2));
    let service = service_with(policy(), blobs.clone());
    service.register_user(READER).await.unwrap();
    let doc = upload_pdf(&service, "Optics", 1).await;

    let delivery = service.purchase_and_download(READER, doc.id).await.unwrap();
    assert!(!delivery.grant.replayed);
    assert_eq!(blobs.reads(), 3);
    assert_eq!(service.get_balance(READER).await.unwrap(), 40);
    assert_eq!(download_entries(&service, READER).await, 1);
}

#[tokio::test]
async fn interrupted_delivery_resumes_for_free() {
    let policy = Policy {
        storage_timeout: Duration::from_millis(100),
        max_retries: 0,
        ..Policy::default()
    };
    let blobs = Arc::new(UnreliableBlobs::stalling(1, Duration::from_secs(2)));
    let service = service_with(policy, blobs);
    service.register_user(READER).await.unwrap();
    let doc = upload_pdf(&service, "Optics", 1).await;

    // The charge commits, then the fetch times out.
    let err = service.purchase_and_download(READER, doc.id).await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(err.kind(), ErrorKind::Transient);
    assert_eq!(service.get_balance(READER).await.unwrap(), 40);

    let resumed = service.purchase_and_download(READER, doc.id).await.unwrap();
    assert!(resumed.grant.replayed);
    assert_eq!(service.get_balance(READER).await.unwrap(), 40);
    assert_eq!(download_entries(&service, READER).await, 1);
}

#[tokio::test]
async fn request_download_authorizes_without_fetching() {
    let blobs = Arc::new(UnreliableBlobs::failing(0));
    let service = service_with(policy(), blobs.clone());
    service.register_user(READER).await.unwrap();
    let doc = upload_pdf(&service, "Optics", 1).await;

    let grant = service.request_download(READER, doc.id).await.unwrap();
    assert!(!grant.replayed);
    assert_eq!(grant.receipt.file_name, "Optics.pdf");
    assert_eq!(grant.receipt.coins_deducted, 10);
    assert_eq!(blobs.reads(), 0);

    let again = service.request_download(READER, doc.id).await.unwrap();
    assert!(again.replayed);
    assert_eq!(service.get_balance(READER).await.unwrap(), 40);
}
