//! Per-collection side table of item identifiers.
//!
//! An [`ItemIdentifierMap`] maps the current keys of one live collection
//! (dictionary keys, or positional indices for sequences) to their
//! [`ItemId`], and remembers the identifiers of items that were removed.
//! Those tombstones let merge tooling tell a deleted item apart from one
//! that never existed.
//!
//! # Invariants
//!
//! - every mapped key has exactly one id, and every live id has one key;
//! - an id in the deleted set is never live at the same time;
//! - [`ItemId::EMPTY`] is never stored.

use std::borrow::Borrow;
use std::collections::{BTreeSet, HashSet};
use std::hash::Hash;

use indexmap::IndexMap;

use crate::error::ItemIdError;
use crate::id::ItemId;

/// Key → [`ItemId`] mapping for one collection, plus its deleted ids.
///
/// Keys keep their insertion order, which for deserialized collections is
/// the document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemIdentifierMap<K: Eq + Hash> {
    keyed: IndexMap<K, ItemId>,
    live: HashSet<ItemId>,
    deleted: BTreeSet<ItemId>,
}

impl<K: Eq + Hash> ItemIdentifierMap<K> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            keyed: IndexMap::new(),
            live: HashSet::new(),
            deleted: BTreeSet::new(),
        }
    }

    /// Number of keys with an identifier.
    pub fn len(&self) -> usize {
        self.keyed.len()
    }

    /// Number of tombstoned identifiers.
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    /// Whether the map holds neither keys nor tombstones.
    pub fn is_empty(&self) -> bool {
        self.keyed.is_empty() && self.deleted.is_empty()
    }

    /// Associate `key` with `id`.
    ///
    /// If `id` was tombstoned it is restored (removed from the deleted set),
    /// which is what undoing a deletion needs.
    pub fn add(&mut self, key: K, id: ItemId) -> Result<(), ItemIdError> {
        if id.is_empty() {
            return Err(ItemIdError::EmptyId);
        }
        if let Some(&existing) = self.keyed.get(&key) {
            return Err(ItemIdError::KeyAlreadyMapped { existing });
        }
        if self.live.contains(&id) {
            return Err(ItemIdError::IdInUse { id });
        }
        self.deleted.remove(&id);
        self.live.insert(id);
        self.keyed.insert(key, id);
        Ok(())
    }

    /// Associate `key` with `id`, replacing the key's previous id.
    ///
    /// The replaced id is forgotten, not tombstoned. Fails if `id` is live
    /// under another key.
    pub fn insert(&mut self, key: K, id: ItemId) -> Result<Option<ItemId>, ItemIdError> {
        if id.is_empty() {
            return Err(ItemIdError::EmptyId);
        }
        let previous = self.keyed.get(&key).copied();
        if previous != Some(id) && self.live.contains(&id) {
            return Err(ItemIdError::IdInUse { id });
        }
        if let Some(previous) = previous {
            self.live.remove(&previous);
        }
        self.deleted.remove(&id);
        self.live.insert(id);
        self.keyed.insert(key, id);
        Ok(previous)
    }

    /// Identifier of `key`, if any.
    pub fn get<Q>(&self, key: &Q) -> Option<ItemId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.keyed.get(key).copied()
    }

    /// Whether `key` has an identifier.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.keyed.contains_key(key)
    }

    /// Whether `id` belongs to a live key.
    pub fn contains_id(&self, id: ItemId) -> bool {
        self.live.contains(&id)
    }

    /// The key currently holding `id`.
    pub fn key_of(&self, id: ItemId) -> Option<&K> {
        if !self.live.contains(&id) {
            return None;
        }
        self.keyed
            .iter()
            .find_map(|(key, &item)| (item == id).then_some(key))
    }

    /// Remove `key`, returning its id.
    ///
    /// With `mark_as_deleted` the id becomes a tombstone; otherwise it is
    /// forgotten, as if the item never existed.
    pub fn delete<Q>(&mut self, key: &Q, mark_as_deleted: bool) -> Option<ItemId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.keyed.shift_remove(key)?;
        self.live.remove(&id);
        if mark_as_deleted {
            self.deleted.insert(id);
        }
        Some(id)
    }

    /// Record `id` as deleted.
    ///
    /// Returns `false` if the id is currently live (delete its key instead)
    /// or is the empty id.
    pub fn mark_as_deleted(&mut self, id: ItemId) -> bool {
        if id.is_empty() || self.live.contains(&id) {
            return false;
        }
        self.deleted.insert(id);
        true
    }

    /// Forget a tombstone. Returns whether it was present.
    pub fn unmark_as_deleted(&mut self, id: ItemId) -> bool {
        self.deleted.remove(&id)
    }

    /// Whether `id` is tombstoned.
    pub fn is_deleted(&self, id: ItemId) -> bool {
        self.deleted.contains(&id)
    }

    /// Tombstoned ids in ascending order.
    pub fn deleted_items(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.deleted.iter().copied()
    }

    /// Drop all keys and tombstones.
    pub fn clear(&mut self) {
        self.keyed.clear();
        self.live.clear();
        self.deleted.clear();
    }

    /// Iterate `(key, id)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, ItemId)> + '_ {
        self.keyed.iter().map(|(key, &id)| (key, id))
    }

    /// Iterate mapped keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.keyed.keys()
    }

    /// Generate an id that is neither live nor tombstoned in this map.
    pub fn new_id(&self) -> ItemId {
        loop {
            let id = ItemId::new();
            if !self.live.contains(&id) && !self.deleted.contains(&id) {
                return id;
            }
        }
    }

    /// Identifier of `key`, assigning a fresh one if the key has none yet.
    pub fn get_or_assign<Q>(&mut self, key: &Q) -> ItemId
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        if let Some(&id) = self.keyed.get(key) {
            return id;
        }
        let id = self.new_id();
        self.live.insert(id);
        self.keyed.insert(key.to_owned(), id);
        id
    }

    /// Tombstone every key for which `keep` returns `false`.
    ///
    /// Returns the number of ids moved to the deleted set.
    pub fn retain_keys(&mut self, mut keep: impl FnMut(&K) -> bool) -> usize {
        let mut removed = 0;
        let live = &mut self.live;
        let deleted = &mut self.deleted;
        self.keyed.retain(|key, id| {
            if keep(key) {
                return true;
            }
            live.remove(&*id);
            deleted.insert(*id);
            removed += 1;
            false
        });
        removed
    }
}

impl<K: Eq + Hash> Default for ItemIdentifierMap<K> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Positional keys (sequences)
// ---------------------------------------------------------------------------

impl ItemIdentifierMap<usize> {
    /// Insert `id` at `index`, shifting ids at `index` and after by one.
    pub fn insert_and_shift(&mut self, index: usize, id: ItemId) -> Result<(), ItemIdError> {
        if id.is_empty() {
            return Err(ItemIdError::EmptyId);
        }
        if self.live.contains(&id) {
            return Err(ItemIdError::IdInUse { id });
        }
        self.reindex(|position| if position >= index { position + 1 } else { position });
        self.deleted.remove(&id);
        self.live.insert(id);
        self.keyed.insert(index, id);
        self.keyed.sort_keys();
        Ok(())
    }

    /// Remove the id at `index`, shifting later ids down by one.
    pub fn delete_and_shift(&mut self, index: usize, mark_as_deleted: bool) -> Option<ItemId> {
        let id = self.delete(&index, mark_as_deleted)?;
        self.reindex(|position| if position > index { position - 1 } else { position });
        Some(id)
    }

    /// Tombstone ids at positions `len` and beyond.
    pub fn truncate_to(&mut self, len: usize) -> usize {
        self.retain_keys(|&position| position < len)
    }

    fn reindex(&mut self, shift: impl Fn(usize) -> usize) {
        self.keyed = self
            .keyed
            .drain(..)
            .map(|(position, id)| (shift(position), id))
            .collect();
    }
}
