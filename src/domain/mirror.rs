use crate::domain::entities::{CollectionSnapshot, Entry};
use crate::domain::value_objects::{CollectionKind, Quantity, RemoteEntryId, SubjectId};

/// In-memory ordered snapshot of one remote collection, keyed by
/// subject. The mirror is purely synchronous; every mutation either
/// succeeds in place or reports a no-op to the caller. Network
/// reconciliation is the executor's job, not the mirror's.
///
/// Invariant: at most one entry per subject.
#[derive(Debug)]
pub struct CollectionMirror {
    kind: CollectionKind,
    entries: Vec<Entry>,
}

impl CollectionMirror {
    pub fn new(kind: CollectionKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    /// Discard the current snapshot and install a new one, server
    /// order preserved. Pending entries are dropped wholesale.
    pub fn replace_all(&mut self, entries: Vec<Entry>) {
        self.entries = entries;
    }

    /// Insert a pending entry. Refuses (returns false) when the
    /// subject already has an entry, confirmed or not.
    pub fn upsert_optimistic(&mut self, entry: Entry) -> bool {
        if self.contains(&entry.subject_id) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Assign the server id to the pending entry for `subject_id`.
    /// Returns false for a stale confirmation (subject no longer
    /// present), which the caller treats as non-fatal.
    pub fn confirm(&mut self, subject_id: &SubjectId, remote_id: RemoteEntryId) -> bool {
        match self.find_mut(subject_id) {
            Some(entry) => {
                entry.remote_id = Some(remote_id);
                true
            }
            None => false,
        }
    }

    /// Remove the entry for `subject_id` after a failed create.
    pub fn revert(&mut self, subject_id: &SubjectId) -> Option<Entry> {
        self.take(subject_id)
    }

    /// Remove the entry for `subject_id`, returning it so a failed
    /// remote delete can restore it.
    pub fn remove(&mut self, subject_id: &SubjectId) -> Option<Entry> {
        self.take(subject_id)
    }

    /// Reinstate a previously removed entry at the tail. Refuses when
    /// the subject has been re-added in the meantime.
    pub fn restore(&mut self, entry: Entry) -> bool {
        if self.contains(&entry.subject_id) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Set the quantity for `subject_id`, returning the previous value
    /// so a failed remote update can roll it back. `None` when the
    /// subject is absent or the entry carries no quantity.
    pub fn set_quantity(
        &mut self,
        subject_id: &SubjectId,
        quantity: Quantity,
    ) -> Option<Quantity> {
        let entry = self.find_mut(subject_id)?;
        let previous = entry.quantity?;
        entry.quantity = Some(quantity);
        Some(previous)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, subject_id: &SubjectId) -> bool {
        self.entries.iter().any(|e| &e.subject_id == subject_id)
    }

    pub fn quantity_of(&self, subject_id: &SubjectId) -> u32 {
        self.find(subject_id)
            .and_then(|e| e.quantity)
            .map(|q| q.get())
            .unwrap_or(0)
    }

    pub fn remote_id_of(&self, subject_id: &SubjectId) -> Option<RemoteEntryId> {
        self.find(subject_id).and_then(|e| e.remote_id.clone())
    }

    pub fn get(&self, subject_id: &SubjectId) -> Option<&Entry> {
        self.find(subject_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn snapshot(&self) -> CollectionSnapshot {
        CollectionSnapshot {
            kind: self.kind,
            entries: self.entries.clone(),
        }
    }

    fn find(&self, subject_id: &SubjectId) -> Option<&Entry> {
        self.entries.iter().find(|e| &e.subject_id == subject_id)
    }

    fn find_mut(&mut self, subject_id: &SubjectId) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| &e.subject_id == subject_id)
    }

    fn take(&mut self, subject_id: &SubjectId) -> Option<Entry> {
        let index = self
            .entries
            .iter()
            .position(|e| &e.subject_id == subject_id)?;
        Some(self.entries.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(id: &str) -> SubjectId {
        SubjectId::new(id.to_string()).unwrap()
    }

    fn remote(id: &str) -> RemoteEntryId {
        RemoteEntryId::new(id.to_string()).unwrap()
    }

    fn cart_mirror() -> CollectionMirror {
        CollectionMirror::new(CollectionKind::Cart)
    }

    #[test]
    fn test_upsert_optimistic_rejects_duplicate_subject() {
        let mut mirror = cart_mirror();
        assert!(mirror.upsert_optimistic(Entry::optimistic(subject("p1"), None)));
        assert!(!mirror.upsert_optimistic(Entry::optimistic(subject("p1"), None)));
        assert_eq!(mirror.len(), 1);
    }

    #[test]
    fn test_confirm_assigns_remote_id() {
        let mut mirror = cart_mirror();
        mirror.upsert_optimistic(Entry::optimistic(subject("p1"), None));
        assert!(mirror.confirm(&subject("p1"), remote("r1")));
        assert_eq!(mirror.remote_id_of(&subject("p1")), Some(remote("r1")));
    }

    #[test]
    fn test_stale_confirm_is_a_noop() {
        let mut mirror = cart_mirror();
        assert!(!mirror.confirm(&subject("gone"), remote("r1")));
        assert!(mirror.is_empty());
    }

    #[test]
    fn test_revert_removes_pending_entry() {
        let mut mirror = cart_mirror();
        mirror.upsert_optimistic(Entry::optimistic(subject("p1"), None));
        assert!(mirror.revert(&subject("p1")).is_some());
        assert!(!mirror.contains(&subject("p1")));
    }

    #[test]
    fn test_remove_returns_entry_and_restore_reinstates_it() {
        let mut mirror = cart_mirror();
        mirror.upsert_optimistic(Entry::optimistic(
            subject("p1"),
            Some(Quantity::new(2).unwrap()),
        ));
        mirror.confirm(&subject("p1"), remote("r1"));

        let removed = mirror.remove(&subject("p1")).unwrap();
        assert!(mirror.is_empty());

        assert!(mirror.restore(removed));
        assert_eq!(mirror.remote_id_of(&subject("p1")), Some(remote("r1")));
        assert_eq!(mirror.quantity_of(&subject("p1")), 2);
    }

    #[test]
    fn test_restore_refuses_when_subject_readded() {
        let mut mirror = cart_mirror();
        mirror.upsert_optimistic(Entry::optimistic(subject("p1"), None));
        let removed = mirror.remove(&subject("p1")).unwrap();
        mirror.upsert_optimistic(Entry::optimistic(subject("p1"), None));
        assert!(!mirror.restore(removed));
        assert_eq!(mirror.len(), 1);
    }

    #[test]
    fn test_set_quantity_returns_previous_value() {
        let mut mirror = cart_mirror();
        mirror.upsert_optimistic(Entry::optimistic(
            subject("p1"),
            Some(Quantity::new(1).unwrap()),
        ));
        let previous = mirror.set_quantity(&subject("p1"), Quantity::new(4).unwrap());
        assert_eq!(previous, Some(Quantity::new(1).unwrap()));
        assert_eq!(mirror.quantity_of(&subject("p1")), 4);
    }

    #[test]
    fn test_set_quantity_on_membership_entry_is_refused() {
        let mut mirror = CollectionMirror::new(CollectionKind::Wishlist);
        mirror.upsert_optimistic(Entry::optimistic(subject("p1"), None));
        assert!(mirror
            .set_quantity(&subject("p1"), Quantity::new(2).unwrap())
            .is_none());
    }

    #[test]
    fn test_replace_all_discards_pending_entries() {
        let mut mirror = cart_mirror();
        mirror.upsert_optimistic(Entry::optimistic(subject("pending"), None));
        mirror.upsert_optimistic(Entry::optimistic(subject("other"), None));

        let fresh = vec![
            Entry::confirmed(remote("r1"), subject("a"), Some(Quantity::default())),
            Entry::confirmed(remote("r2"), subject("b"), Some(Quantity::default())),
            Entry::confirmed(remote("r3"), subject("c"), Some(Quantity::default())),
        ];
        mirror.replace_all(fresh);

        assert_eq!(mirror.len(), 3);
        assert!(!mirror.contains(&subject("pending")));
        assert_eq!(mirror.remote_id_of(&subject("b")), Some(remote("r2")));
    }

    #[test]
    fn test_quantity_of_absent_subject_is_zero() {
        let mirror = cart_mirror();
        assert_eq!(mirror.quantity_of(&subject("nope")), 0);
    }

    #[test]
    fn test_insertion_order_preserved_in_snapshot() {
        let mut mirror = cart_mirror();
        for id in ["p1", "p2", "p3"] {
            mirror.upsert_optimistic(Entry::optimistic(subject(id), None));
        }
        let snapshot = mirror.snapshot();
        let order: Vec<&str> = snapshot
            .entries
            .iter()
            .map(|e| e.subject_id.as_str())
            .collect();
        assert_eq!(order, vec!["p1", "p2", "p3"]);
    }
}
