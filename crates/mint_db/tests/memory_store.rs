mod common;

use std::sync::Arc;

use mint_db::{DocumentRegistry, MemoryStore};

#[tokio::test]
async fn signup_bonus_is_a_ledger_entry() {
    common::signup_bonus_is_a_ledger_entry(&MemoryStore::new()).await;
}

#[tokio::test]
async fn debit_never_goes_negative() {
    common::debit_never_goes_negative(&MemoryStore::new()).await;
}

#[tokio::test]
async fn credit_overflow_is_rejected() {
    common::credit_overflow_is_rejected(&MemoryStore::new()).await;
}

#[tokio::test]
async fn purchase_charges_once() {
    common::purchase_charges_once(&MemoryStore::new()).await;
}

#[tokio::test]
async fn purchase_without_funds_changes_nothing() {
    common::purchase_without_funds_changes_nothing(&MemoryStore::new()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_purchases_charge_once() {
    common::racing_purchases_charge_once(Arc::new(MemoryStore::new())).await;
}

#[tokio::test]
async fn rejection_refunds_the_held_amount() {
    common::rejection_refunds_the_held_amount(&MemoryStore::new()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_rejections_refund_once() {
    common::racing_rejections_refund_once(Arc::new(MemoryStore::new())).await;
}

#[tokio::test]
async fn approval_keeps_the_hold() {
    common::approval_keeps_the_hold(&MemoryStore::new()).await;
}

#[tokio::test]
async fn documents_list_newest_first() {
    let store = MemoryStore::new();
    let first = common::register_document(&store).await;
    let second = common::register_document(&store).await;

    let listed: Vec<_> = store.list_documents().await.unwrap().into_iter().map(|d| d.id).collect();
    assert_eq!(listed, vec![second, first]);
    assert_eq!(store.get_document(first).await.unwrap().unwrap().tags, vec!["exam".to_string()]);
}
