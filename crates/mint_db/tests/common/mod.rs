use std::sync::Arc;
use uuid::Uuid;

use mint_core::models::{Decision, LedgerKind, NewDocument, UploaderKind, WithdrawStatus};
use mint_core::Error;
use mint_db::{DocumentRegistry, LedgerStore};

/// Unique identity per run so the suite can share a database.
pub fn identity(tag: &str) -> String {
    format!("{}-{}@example.com", tag, Uuid::new_v4().simple())
}

pub async fn register_document<S: DocumentRegistry>(store: &S) -> Uuid {
    store
        .create_document(NewDocument {
            display_name: "Linear Algebra Notes".into(),
            blob_key: format!("sha256-{}", Uuid::new_v4().simple()),
            original_file_name: "linalg.pdf".into(),
            content_type: "application/pdf".into(),
            byte_size: 1024,
            uploader_kind: UploaderKind::Admin,
            category: Some("maths".into()),
            section: None,
            tags: vec!["exam".into()],
        })
        .await
        .unwrap()
        .id
}

async fn assert_reconciled<S: LedgerStore>(store: &S, identity: &str) {
    let balance = store.get_user(identity).await.unwrap().unwrap().balance;
    let sum: i64 = store.history(identity).await.unwrap().iter().map(|e| e.amount).sum();
    assert_eq!(balance, sum, "balance drifted from ledger for {}", identity);
}

pub async fn signup_bonus_is_a_ledger_entry<S: LedgerStore>(store: &S) {
    let who = identity("signup");
    let user = store.create_user(&who, 50).await.unwrap();
    assert_eq!(user.balance, 50);

    let history = store.history(&who).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, LedgerKind::SignupBonus);
    assert_eq!(history[0].amount, 50);

    assert!(matches!(store.create_user(&who, 50).await, Err(Error::UserExists(_))));
    assert_reconciled(store, &who).await;
}

pub async fn debit_never_goes_negative<S: LedgerStore>(store: &S) {
    let who = identity("debit");
    store.create_user(&who, 30).await.unwrap();

    let err = store.debit(&who, 31, LedgerKind::Redeem, None).await.unwrap_err();
    assert!(matches!(err, Error::InsufficientBalance { balance: 30, required: 31 }));
    assert_eq!(store.get_user(&who).await.unwrap().unwrap().balance, 30);
    assert_eq!(store.history(&who).await.unwrap().len(), 1);

    let entry = store.debit(&who, 30, LedgerKind::Redeem, None).await.unwrap();
    assert_eq!(entry.amount, -30);
    assert_eq!(store.get_user(&who).await.unwrap().unwrap().balance, 0);

    assert!(matches!(store.credit(&who, 0, LedgerKind::RedeemRefund, None).await, Err(Error::InvalidAmount(0))));
    assert!(matches!(store.debit(&who, -5, LedgerKind::Redeem, None).await, Err(Error::InvalidAmount(-5))));
    assert_reconciled(store, &who).await;
}

pub async fn credit_overflow_is_rejected<S: LedgerStore>(store: &S) {
    let who = identity("overflow");
    store.create_user(&who, 50).await.unwrap();

    let err = store.credit(&who, i64::MAX, LedgerKind::RedeemRefund, None).await.unwrap_err();
    assert!(matches!(err, Error::InvalidAmount(i64::MAX)));
    assert_eq!(store.get_user(&who).await.unwrap().unwrap().balance, 50);
    assert_eq!(store.history(&who).await.unwrap().len(), 1);

    store.credit(&who, i64::MAX - 50, LedgerKind::RedeemRefund, None).await.unwrap();
    assert_eq!(store.get_user(&who).await.unwrap().unwrap().balance, i64::MAX);
    assert!(matches!(
        store.credit(&who, 1, LedgerKind::RedeemRefund, None).await,
        Err(Error::InvalidAmount(1))
    ));
    assert_eq!(store.history(&who).await.unwrap().len(), 2);
    assert_reconciled(store, &who).await;
}

pub async fn purchase_charges_once<S: LedgerStore + DocumentRegistry>(store: &S) {
    let who = identity("purchase");
    store.create_user(&who, 50).await.unwrap();
    let doc = register_document(store).await;

    let first = store.purchase(&who, doc, "Linear Algebra Notes.pdf", 10).await.unwrap();
    assert!(!first.replayed);
    assert_eq!(first.receipt.coins_deducted, 10);

    let second = store.purchase(&who, doc, "Linear Algebra Notes.pdf", 10).await.unwrap();
    assert!(second.replayed);
    assert_eq!(second.receipt, first.receipt);

    assert_eq!(store.get_user(&who).await.unwrap().unwrap().balance, 40);
    let downloads: Vec<_> = store
        .history(&who)
        .await
        .unwrap()
        .into_iter()
        .filter(|e| e.kind == LedgerKind::Download)
        .collect();
    assert_eq!(downloads.len(), 1);
    assert_eq!(downloads[0].document_id, Some(doc));
    assert_eq!(store.list_receipts(&who).await.unwrap().len(), 1);
    assert_reconciled(store, &who).await;
}

pub async fn purchase_without_funds_changes_nothing<S: LedgerStore + DocumentRegistry>(store: &S) {
    let who = identity("broke");
    store.create_user(&who, 5).await.unwrap();
    let doc = register_document(store).await;

    let err = store.purchase(&who, doc, "notes.pdf", 10).await.unwrap_err();
    assert!(matches!(err, Error::InsufficientBalance { balance: 5, required: 10 }));
    assert!(store.find_receipt(&who, doc).await.unwrap().is_none());
    assert_eq!(store.history(&who).await.unwrap().len(), 1);

    assert!(matches!(
        store.purchase("nobody@example.com", doc, "notes.pdf", 10).await,
        Err(Error::UserNotFound(_))
    ));
    assert!(matches!(
        store.purchase(&who, Uuid::new_v4(), "notes.pdf", 0).await,
        Err(Error::DocumentNotFound(_))
    ));
}

pub async fn racing_purchases_charge_once<S>(store: Arc<S>)
where
    S: LedgerStore + DocumentRegistry + 'static,
{
    let who = identity("race");
    store.create_user(&who, 10).await.unwrap();
    let doc = register_document(store.as_ref()).await;

    let attempts = (0..8).map(|_| {
        let store = Arc::clone(&store);
        let who = who.clone();
        tokio::spawn(async move { store.purchase(&who, doc, "notes.pdf", 10).await })
    });
    let grants: Vec<_> = futures::future::join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert_eq!(grants.iter().filter(|g| !g.replayed).count(), 1);
    assert_eq!(grants.iter().filter(|g| g.replayed).count(), 7);
    assert_eq!(store.get_user(&who).await.unwrap().unwrap().balance, 0);
    let downloads = store
        .history(&who)
        .await
        .unwrap()
        .iter()
        .filter(|e| e.kind == LedgerKind::Download)
        .count();
    assert_eq!(downloads, 1);
    assert_reconciled(store.as_ref(), &who).await;
}

pub async fn rejection_refunds_the_held_amount<S: LedgerStore>(store: &S) {
    let who = identity("withdraw");
    store.create_user(&who, 50).await.unwrap();

    let request = store.open_withdrawal(&who, 40, "upi:reader@bank").await.unwrap();
    assert_eq!(request.status, WithdrawStatus::Pending);
    assert!(request.resolved_at.is_none());
    assert_eq!(store.get_user(&who).await.unwrap().unwrap().balance, 10);

    let rejected = store.resolve_withdrawal(request.id, Decision::Reject).await.unwrap();
    assert_eq!(rejected.status, WithdrawStatus::Rejected);
    assert!(rejected.resolved_at.is_some());
    assert_eq!(store.get_user(&who).await.unwrap().unwrap().balance, 50);

    let history = store.history(&who).await.unwrap();
    let refunds: Vec<_> = history.iter().filter(|e| e.kind == LedgerKind::RedeemRefund).collect();
    assert_eq!(refunds.len(), 1);
    assert_eq!(refunds[0].amount, 40);

    assert!(matches!(
        store.resolve_withdrawal(request.id, Decision::Approve).await,
        Err(Error::AlreadyResolved(_))
    ));
    assert!(matches!(
        store.resolve_withdrawal(Uuid::new_v4(), Decision::Reject).await,
        Err(Error::WithdrawalNotFound(_))
    ));
    assert_reconciled(store, &who).await;
}

pub async fn racing_rejections_refund_once<S>(store: Arc<S>)
where
    S: LedgerStore + 'static,
{
    let who = identity("reject-race");
    store.create_user(&who, 50).await.unwrap();
    let id = store.open_withdrawal(&who, 40, "upi:reader@bank").await.unwrap().id;

    let attempts = (0..8).map(|_| {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.resolve_withdrawal(id, Decision::Reject).await })
    });
    let outcomes: Vec<_> = futures::future::join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(outcomes.iter().filter(|o| o.is_ok()).count(), 1);
    assert_eq!(
        outcomes.iter().filter(|o| matches!(o, Err(Error::AlreadyResolved(_)))).count(),
        7
    );
    assert_eq!(store.get_user(&who).await.unwrap().unwrap().balance, 50);
    let refunds = store
        .history(&who)
        .await
        .unwrap()
        .iter()
        .filter(|e| e.kind == LedgerKind::RedeemRefund)
        .count();
    assert_eq!(refunds, 1);
    assert_reconciled(store.as_ref(), &who).await;
}

pub async fn approval_keeps_the_hold<S: LedgerStore>(store: &S) {
    let who = identity("approve");
    store.create_user(&who, 50).await.unwrap();

    let request = store.open_withdrawal(&who, 25, "upi:reader@bank").await.unwrap();
    let approved = store.resolve_withdrawal(request.id, Decision::Approve).await.unwrap();
    assert_eq!(approved.status, WithdrawStatus::Approved);
    assert_eq!(store.get_user(&who).await.unwrap().unwrap().balance, 25);
    assert_eq!(store.history(&who).await.unwrap().len(), 2);

    let approved_only = store.list_withdrawals(Some(WithdrawStatus::Approved)).await.unwrap();
    assert!(approved_only.iter().any(|w| w.id == request.id));
    let pending_only = store.list_withdrawals(Some(WithdrawStatus::Pending)).await.unwrap();
    assert!(pending_only.iter().all(|w| w.id != request.id));
    assert_eq!(store.get_withdrawal(request.id).await.unwrap().unwrap(), approved);
}
