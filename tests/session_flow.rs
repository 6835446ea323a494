use std::sync::Arc;

use storefront_sync::{
    AppConfig, CollectionKind, MemoryCollectionStore, OwnerId, Quantity, RemoteCollectionStore,
    RemoteEntryId, SubjectId, SyncSession,
};

fn owner() -> OwnerId {
    OwnerId::new("user-42".to_string()).unwrap()
}

fn subject(id: &str) -> SubjectId {
    SubjectId::new(id.to_string()).unwrap()
}

async fn fresh_session() -> (SyncSession, Arc<MemoryCollectionStore>) {
    let store = Arc::new(MemoryCollectionStore::new());
    let session = SyncSession::start(owner(), store.clone(), &AppConfig::default())
        .await
        .unwrap();
    (session, store)
}

#[tokio::test]
async fn confirmed_add_then_failed_remove_restores_the_entry() {
    let (session, store) = fresh_session().await;
    let cart = session.cart();
    store.stage_remote_id("900");

    assert!(cart.add(subject("42"), None).await);
    assert_eq!(
        cart.entry_id_of(&subject("42")),
        Some(RemoteEntryId::new("900".to_string()).unwrap())
    );

    store.set_fail_delete(true);
    assert!(!cart.remove(subject("42")).await);

    // The failed delete rolled back: still a member, same server id.
    assert!(cart.is_member(&subject("42")));
    assert_eq!(
        cart.entry_id_of(&subject("42")),
        Some(RemoteEntryId::new("900".to_string()).unwrap())
    );

    store.set_fail_delete(false);
    assert!(cart.remove(subject("42")).await);
    assert!(!cart.is_member(&subject("42")));
}

#[tokio::test]
async fn cart_quantity_flow_against_the_store() {
    let (session, store) = fresh_session().await;
    let cart = session.cart();

    assert!(cart.add(subject("p1"), Some(Quantity::new(2).unwrap())).await);
    assert!(cart.update_quantity_raw(subject("p1"), 5).await);
    assert_eq!(cart.quantity_of(&subject("p1")), 5);

    // The server agrees after a full refresh.
    cart.refresh().await.unwrap();
    assert_eq!(cart.quantity_of(&subject("p1")), 5);

    let rows = store
        .list_by_owner(&owner(), CollectionKind::Cart)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].quantity, Some(Quantity::new(5).unwrap()));
}

#[tokio::test]
async fn wishlist_membership_is_independent_of_the_cart() {
    let (session, _store) = fresh_session().await;

    assert!(session.wishlist().add(subject("p1"), None).await);
    assert!(session.wishlist().is_member(&subject("p1")));
    assert!(!session.cart().is_member(&subject("p1")));

    assert!(session.cart().add(subject("p1"), None).await);
    assert!(session.wishlist().remove(subject("p1")).await);
    assert!(session.cart().is_member(&subject("p1")));
    assert!(!session.wishlist().is_member(&subject("p1")));
}

#[tokio::test]
async fn observers_see_every_settled_state() {
    let (session, store) = fresh_session().await;
    let cart = session.cart();
    let mut rx = cart.subscribe();

    store.set_fail_create(true);
    assert!(!cart.add(subject("p1"), None).await);

    // The rollback left the published snapshot empty again.
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().is_empty());

    store.set_fail_create(false);
    assert!(cart.add(subject("p1"), None).await);
    assert!(rx.borrow_and_update().contains(&subject("p1")));
}

#[tokio::test]
async fn refresh_all_reconciles_both_collections() {
    let store = Arc::new(MemoryCollectionStore::new());
    let mut config = AppConfig::default();
    config.sync.refresh_on_start = false;
    let session = SyncSession::start(owner(), store.clone(), &config)
        .await
        .unwrap();

    store.seed(&owner(), CollectionKind::Cart, &[("c1", "p1", Some(3))]);
    store.seed(&owner(), CollectionKind::Wishlist, &[("w1", "p2", None)]);

    session.refresh_all().await.unwrap();

    assert_eq!(session.cart().quantity_of(&subject("p1")), 3);
    assert!(session.wishlist().is_member(&subject("p2")));
}
