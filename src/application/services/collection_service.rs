use crate::application::ports::RemoteCollectionStore;
use crate::domain::entities::{CollectionSnapshot, Entry};
use crate::domain::mirror::CollectionMirror;
use crate::domain::value_objects::{CollectionKind, OwnerId, Quantity, RemoteEntryId, SubjectId};
use crate::shared::error::AppError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

/// Mutation executor and read facade for one mirrored collection.
///
/// Every mutation runs a single optimistic-apply, remote-call,
/// reconcile-or-rollback cycle and reports its outcome as a bool:
/// `true` when the mirror matches a server-acknowledged state (or the
/// call was an idempotent no-op), `false` when the request was
/// rejected or rolled back. Remote errors never escape the mutation
/// boundary; they are logged and folded into the bool.
///
/// Mutations targeting the same subject are serialized: the second
/// caller waits until the first cycle has settled. Mutations on
/// distinct subjects proceed independently.
pub struct CollectionService {
    owner: OwnerId,
    kind: CollectionKind,
    store: Arc<dyn RemoteCollectionStore>,
    mirror: RwLock<CollectionMirror>,
    subject_locks: Mutex<HashMap<SubjectId, Arc<Mutex<()>>>>,
    changes: watch::Sender<CollectionSnapshot>,
    torn_down: AtomicBool,
}

impl CollectionService {
    pub fn new(
        owner: OwnerId,
        kind: CollectionKind,
        store: Arc<dyn RemoteCollectionStore>,
    ) -> Self {
        let (changes, _) = watch::channel(CollectionSnapshot::empty(kind));
        Self {
            owner,
            kind,
            store,
            mirror: RwLock::new(CollectionMirror::new(kind)),
            subject_locks: Mutex::new(HashMap::new()),
            changes,
            torn_down: AtomicBool::new(false),
        }
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// Add a subject to the collection. Duplicate adds are idempotent
    /// successes and issue no remote call. Counted collections default
    /// the quantity to 1; membership collections ignore it.
    pub async fn add(&self, subject_id: SubjectId, quantity: Option<Quantity>) -> bool {
        if self.is_torn_down() {
            return false;
        }
        let lock = self.subject_lock(&subject_id).await;
        let outcome = {
            let _guard = lock.lock().await;
            self.add_under_lock(&subject_id, quantity).await
        };
        self.release_subject(&subject_id, lock).await;
        outcome
    }

    /// Remove a subject from the collection. An absent subject returns
    /// `false` without touching the network; a pending entry is
    /// removed locally only.
    pub async fn remove(&self, subject_id: SubjectId) -> bool {
        if self.is_torn_down() {
            return false;
        }
        let lock = self.subject_lock(&subject_id).await;
        let outcome = {
            let _guard = lock.lock().await;
            self.remove_under_lock(&subject_id).await
        };
        self.release_subject(&subject_id, lock).await;
        outcome
    }

    /// Set the quantity of an existing cart line. Rejected on
    /// membership collections and for subjects that are absent or
    /// still pending confirmation.
    pub async fn update_quantity(&self, subject_id: SubjectId, quantity: Quantity) -> bool {
        if self.is_torn_down() {
            return false;
        }
        if !self.kind.is_counted() {
            debug!(kind = %self.kind, subject = %subject_id, "quantity update on membership collection refused");
            return false;
        }
        let lock = self.subject_lock(&subject_id).await;
        let outcome = {
            let _guard = lock.lock().await;
            self.update_quantity_under_lock(&subject_id, quantity).await
        };
        self.release_subject(&subject_id, lock).await;
        outcome
    }

    /// Raw-integer entry point for UI layers; enforces the >= 1 floor
    /// before any optimistic change or network call.
    pub async fn update_quantity_raw(&self, subject_id: SubjectId, quantity: u32) -> bool {
        match Quantity::new(quantity) {
            Ok(quantity) => self.update_quantity(subject_id, quantity).await,
            Err(err) => {
                debug!(subject = %subject_id, quantity, "quantity update rejected: {err}");
                false
            }
        }
    }

    /// Full reconciliation: fetch the server's rows and replace the
    /// mirror wholesale. Pending entries are discarded. Returns the
    /// installed entry count.
    pub async fn refresh(&self) -> Result<usize, AppError> {
        if self.is_torn_down() {
            return Err(AppError::ValidationError(
                "refresh on a torn-down session".to_string(),
            ));
        }
        let remote = self.store.list_by_owner(&self.owner, self.kind).await?;
        let entries: Vec<Entry> = remote
            .into_iter()
            .map(|record| Entry::confirmed(record.id, record.subject_id, record.quantity))
            .collect();
        let count = entries.len();
        self.mirror_write().replace_all(entries);
        self.publish();
        debug!(kind = %self.kind, count, "mirror refreshed from remote");
        Ok(count)
    }

    /// Clear the mirror and refuse all further mutations. Called by
    /// the owning session on logout.
    pub fn teardown(&self) {
        self.torn_down.store(true, Ordering::SeqCst);
        self.mirror_write().clear();
        self.publish();
        info!(kind = %self.kind, owner = %self.owner, "collection torn down");
    }

    // Read facade: synchronous projections over the current mirror,
    // pending entries included.

    pub fn is_member(&self, subject_id: &SubjectId) -> bool {
        self.mirror_read().contains(subject_id)
    }

    pub fn quantity_of(&self, subject_id: &SubjectId) -> u32 {
        self.mirror_read().quantity_of(subject_id)
    }

    pub fn entry_id_of(&self, subject_id: &SubjectId) -> Option<RemoteEntryId> {
        self.mirror_read().remote_id_of(subject_id)
    }

    pub fn len(&self) -> usize {
        self.mirror_read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.mirror_read().is_empty()
    }

    pub fn snapshot(&self) -> CollectionSnapshot {
        self.mirror_read().snapshot()
    }

    /// Observe the mirror; a fresh snapshot is published after every
    /// mirror change, optimistic applies included.
    pub fn subscribe(&self) -> watch::Receiver<CollectionSnapshot> {
        self.changes.subscribe()
    }

    async fn add_under_lock(&self, subject_id: &SubjectId, quantity: Option<Quantity>) -> bool {
        let quantity = if self.kind.is_counted() {
            Some(quantity.unwrap_or_default())
        } else {
            None
        };

        {
            let mut mirror = self.mirror_write();
            if !mirror.upsert_optimistic(Entry::optimistic(subject_id.clone(), quantity)) {
                debug!(kind = %self.kind, subject = %subject_id, "duplicate add treated as success");
                return true;
            }
        }
        self.publish();

        match self
            .store
            .create(&self.owner, self.kind, subject_id, quantity)
            .await
        {
            Ok(remote_id) => {
                let confirmed = self.mirror_write().confirm(subject_id, remote_id);
                if !confirmed {
                    warn!(kind = %self.kind, subject = %subject_id, "stale confirmation ignored");
                }
                self.publish();
                true
            }
            Err(err) => {
                warn!(kind = %self.kind, subject = %subject_id, error = %err, "create failed; optimistic entry rolled back");
                self.mirror_write().revert(subject_id);
                self.publish();
                false
            }
        }
    }

    async fn remove_under_lock(&self, subject_id: &SubjectId) -> bool {
        let removed = self.mirror_write().remove(subject_id);
        let Some(entry) = removed else {
            return false;
        };
        self.publish();

        let Some(remote_id) = entry.remote_id.clone() else {
            // Never reached the server; nothing to delete remotely.
            debug!(kind = %self.kind, subject = %subject_id, "pending entry removed locally");
            return true;
        };

        match self
            .store
            .delete(&self.owner, self.kind, &remote_id)
            .await
        {
            Ok(()) => true,
            Err(err) => {
                warn!(kind = %self.kind, subject = %subject_id, error = %err, "delete failed; entry restored");
                if !self.mirror_write().restore(entry) {
                    warn!(kind = %self.kind, subject = %subject_id, "restore skipped, subject re-added meanwhile");
                }
                self.publish();
                false
            }
        }
    }

    async fn update_quantity_under_lock(&self, subject_id: &SubjectId, quantity: Quantity) -> bool {
        let staged = {
            let mut mirror = self.mirror_write();
            match mirror.remote_id_of(subject_id) {
                Some(remote_id) => mirror
                    .set_quantity(subject_id, quantity)
                    .map(|previous| (remote_id, previous)),
                None => None,
            }
        };
        let Some((remote_id, previous)) = staged else {
            return false;
        };
        self.publish();

        match self
            .store
            .update_quantity(&self.owner, self.kind, &remote_id, quantity)
            .await
        {
            Ok(()) => true,
            Err(err) => {
                warn!(kind = %self.kind, subject = %subject_id, error = %err, "quantity update failed; previous value restored");
                self.mirror_write().set_quantity(subject_id, previous);
                self.publish();
                false
            }
        }
    }

    fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    fn publish(&self) {
        self.changes.send_replace(self.mirror_read().snapshot());
    }

    async fn subject_lock(&self, subject_id: &SubjectId) -> Arc<Mutex<()>> {
        let mut locks = self.subject_locks.lock().await;
        locks.entry(subject_id.clone()).or_default().clone()
    }

    async fn release_subject(&self, subject_id: &SubjectId, lock: Arc<Mutex<()>>) {
        let mut locks = self.subject_locks.lock().await;
        // Map's reference plus ours means no other caller is waiting.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(subject_id);
        }
    }

    // Guards are never held across an await point, so a poisoned lock
    // only means a panicked reader; the data is still coherent.
    fn mirror_read(&self) -> RwLockReadGuard<'_, CollectionMirror> {
        self.mirror.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn mirror_write(&self) -> RwLockWriteGuard<'_, CollectionMirror> {
        self.mirror.write().unwrap_or_else(PoisonError::into_inner)
    }
}
