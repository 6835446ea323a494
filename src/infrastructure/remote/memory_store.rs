use crate::application::ports::{RemoteCollectionStore, RemoteEntry};
use crate::domain::value_objects::{CollectionKind, OwnerId, Quantity, RemoteEntryId, SubjectId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

/// In-process implementation of the remote store. Serves as an
/// offline stub and as the test double for the mutation executor:
/// per-operation failure injection, call recording, and an optional
/// gate that holds `create` open so tests can observe the in-flight
/// window.
#[derive(Default)]
pub struct MemoryCollectionStore {
    rows: Mutex<HashMap<(OwnerId, CollectionKind), Vec<RemoteEntry>>>,
    next_id: AtomicU64,
    staged_ids: Mutex<VecDeque<String>>,
    fail_create: AtomicBool,
    fail_delete: AtomicBool,
    fail_update: AtomicBool,
    fail_list: AtomicBool,
    hold_create: AtomicBool,
    release: Notify,
    create_calls: Mutex<Vec<SubjectId>>,
    delete_calls: Mutex<Vec<RemoteEntryId>>,
    update_calls: Mutex<Vec<(RemoteEntryId, Quantity)>>,
}

impl MemoryCollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the store with server-side rows.
    pub fn seed(
        &self,
        owner: &OwnerId,
        kind: CollectionKind,
        rows: &[(&str, &str, Option<u32>)],
    ) {
        let mut all = self.rows.lock().unwrap();
        let entries = all.entry((owner.clone(), kind)).or_default();
        for (id, subject, quantity) in rows {
            entries.push(RemoteEntry {
                id: RemoteEntryId::new((*id).to_string()).expect("seed id"),
                subject_id: SubjectId::new((*subject).to_string()).expect("seed subject"),
                quantity: quantity.map(|q| Quantity::new(q).expect("seed quantity")),
            });
        }
    }

    /// Queue the id the next `create` call will hand back.
    pub fn stage_remote_id(&self, id: &str) {
        self.staged_ids.lock().unwrap().push_back(id.to_string());
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_update(&self, fail: bool) {
        self.fail_update.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    /// Make `create` block until `release_create` is called.
    pub fn set_hold_create(&self, hold: bool) {
        self.hold_create.store(hold, Ordering::SeqCst);
    }

    pub fn release_create(&self) {
        self.hold_create.store(false, Ordering::SeqCst);
        self.release.notify_one();
    }

    pub fn create_calls(&self) -> Vec<SubjectId> {
        self.create_calls.lock().unwrap().clone()
    }

    pub fn delete_calls(&self) -> Vec<RemoteEntryId> {
        self.delete_calls.lock().unwrap().clone()
    }

    pub fn update_calls(&self) -> Vec<(RemoteEntryId, Quantity)> {
        self.update_calls.lock().unwrap().clone()
    }

    fn next_remote_id(&self) -> RemoteEntryId {
        let staged = self.staged_ids.lock().unwrap().pop_front();
        let value = staged
            .unwrap_or_else(|| format!("m{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1));
        RemoteEntryId::new(value).expect("generated remote id")
    }
}

#[async_trait]
impl RemoteCollectionStore for MemoryCollectionStore {
    async fn create(
        &self,
        owner: &OwnerId,
        kind: CollectionKind,
        subject_id: &SubjectId,
        quantity: Option<Quantity>,
    ) -> Result<RemoteEntryId, AppError> {
        self.create_calls.lock().unwrap().push(subject_id.clone());
        if self.hold_create.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(AppError::Network("injected create failure".to_string()));
        }
        let id = self.next_remote_id();
        let mut rows = self.rows.lock().unwrap();
        rows.entry((owner.clone(), kind)).or_default().push(RemoteEntry {
            id: id.clone(),
            subject_id: subject_id.clone(),
            quantity,
        });
        Ok(id)
    }

    async fn delete(
        &self,
        owner: &OwnerId,
        kind: CollectionKind,
        entry_id: &RemoteEntryId,
    ) -> Result<(), AppError> {
        self.delete_calls.lock().unwrap().push(entry_id.clone());
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(AppError::Network("injected delete failure".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        let entries = rows
            .get_mut(&(owner.clone(), kind))
            .ok_or_else(|| AppError::NotFound(format!("collection {kind} for {owner}")))?;
        let index = entries
            .iter()
            .position(|e| &e.id == entry_id)
            .ok_or_else(|| AppError::NotFound(format!("entry {entry_id}")))?;
        entries.remove(index);
        Ok(())
    }

    async fn update_quantity(
        &self,
        owner: &OwnerId,
        kind: CollectionKind,
        entry_id: &RemoteEntryId,
        quantity: Quantity,
    ) -> Result<(), AppError> {
        self.update_calls
            .lock()
            .unwrap()
            .push((entry_id.clone(), quantity));
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(AppError::Network("injected update failure".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        let entries = rows
            .get_mut(&(owner.clone(), kind))
            .ok_or_else(|| AppError::NotFound(format!("collection {kind} for {owner}")))?;
        let entry = entries
            .iter_mut()
            .find(|e| &e.id == entry_id)
            .ok_or_else(|| AppError::NotFound(format!("entry {entry_id}")))?;
        entry.quantity = Some(quantity);
        Ok(())
    }

    async fn list_by_owner(
        &self,
        owner: &OwnerId,
        kind: CollectionKind,
    ) -> Result<Vec<RemoteEntry>, AppError> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(AppError::Network("injected list failure".to_string()));
        }
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .get(&(owner.clone(), kind))
            .cloned()
            .unwrap_or_default())
    }
}
