//! Side table attaching identifier maps to live collections.
//!
//! Each identity-tracked collection owns a [`CollectionHandle`], an opaque
//! token whose allocation address identifies the collection. The
//! [`ItemIdRegistry`] maps handles to their [`ItemIdentifierMap`] without
//! extending the collection's lifetime: entries hold only a [`Weak`]
//! back-reference and are dropped by [`ItemIdRegistry::prune`] once the
//! collection is gone. Because the weak reference keeps the token's
//! allocation alive, an address cannot be reused while its entry exists.
//!
//! The registry is passed explicitly to serialization contexts. There is no
//! global state.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Weak};

use crate::identifier_map::ItemIdentifierMap;

struct HandleToken;

/// Identity token of one live collection.
///
/// Not `Clone`: a copy of a collection is a different collection.
pub struct CollectionHandle(Arc<HandleToken>);

impl CollectionHandle {
    /// Create a token with a fresh identity.
    pub fn new() -> Self {
        Self(Arc::new(HandleToken))
    }

    fn address(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl Default for CollectionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CollectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CollectionHandle({:#x})", self.address())
    }
}

impl PartialEq for CollectionHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for CollectionHandle {}

struct Entry {
    owner: Weak<HandleToken>,
    ids: Box<dyn Any + Send + Sync>,
}

impl Entry {
    fn new<K>(handle: &CollectionHandle, ids: ItemIdentifierMap<K>) -> Self
    where
        K: Eq + Hash + Send + Sync + 'static,
    {
        Self {
            owner: Arc::downgrade(&handle.0),
            ids: Box::new(ids),
        }
    }
}

/// Maps live collections to their identifier maps.
///
/// Lifetime is scoped to the enclosing document or object graph; the
/// caller owns the registry and hands it to each save or load.
#[derive(Default)]
pub struct ItemIdRegistry {
    entries: HashMap<usize, Entry>,
}

impl ItemIdRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered collections (including ones not yet pruned).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no collection is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `handle` has an identifier map.
    pub fn contains(&self, handle: &CollectionHandle) -> bool {
        self.entries.contains_key(&handle.address())
    }

    /// Identifier map of `handle`, if one exists with key type `K`.
    pub fn get<K>(&self, handle: &CollectionHandle) -> Option<&ItemIdentifierMap<K>>
    where
        K: Eq + Hash + Send + Sync + 'static,
    {
        self.entries
            .get(&handle.address())
            .and_then(|entry| entry.ids.downcast_ref())
    }

    /// Identifier map of `handle`, created empty if absent.
    pub fn get_or_create<K>(&mut self, handle: &CollectionHandle) -> &mut ItemIdentifierMap<K>
    where
        K: Eq + Hash + Send + Sync + 'static,
    {
        let entry = self
            .entries
            .entry(handle.address())
            .or_insert_with(|| Entry::new(handle, ItemIdentifierMap::<K>::new()));
        if !entry.ids.is::<ItemIdentifierMap<K>>() {
            log::warn!(
                "{handle:?}: identifier map has a different key type than {}, replacing it",
                std::any::type_name::<K>()
            );
            entry.ids = Box::new(ItemIdentifierMap::<K>::new());
        }
        match entry.ids.downcast_mut() {
            Some(ids) => ids,
            None => unreachable!("identifier map was just replaced with key type K"),
        }
    }

    /// Detach the identifier map of `handle` for the duration of one transform.
    ///
    /// An absent map is not an error: an empty one is returned. Pair with
    /// [`restore`](Self::restore).
    pub fn take<K>(&mut self, handle: &CollectionHandle) -> ItemIdentifierMap<K>
    where
        K: Eq + Hash + Send + Sync + 'static,
    {
        let Some(entry) = self.entries.remove(&handle.address()) else {
            return ItemIdentifierMap::new();
        };
        match entry.ids.downcast::<ItemIdentifierMap<K>>() {
            Ok(ids) => *ids,
            Err(_) => {
                log::warn!(
                    "{handle:?}: identifier map has a different key type than {}, starting fresh",
                    std::any::type_name::<K>()
                );
                ItemIdentifierMap::new()
            }
        }
    }

    /// Attach `ids` to `handle`, replacing any existing map.
    pub fn restore<K>(&mut self, handle: &CollectionHandle, ids: ItemIdentifierMap<K>)
    where
        K: Eq + Hash + Send + Sync + 'static,
    {
        self.entries
            .insert(handle.address(), Entry::new(handle, ids));
    }

    /// Forget the identifier map of `handle`. Returns whether one existed.
    pub fn remove(&mut self, handle: &CollectionHandle) -> bool {
        self.entries.remove(&handle.address()).is_some()
    }

    /// Give `to` a copy of the identifier map of `from` (used when cloning assets).
    ///
    /// Returns `false` if `from` has no map with key type `K`.
    pub fn copy_ids<K>(&mut self, from: &CollectionHandle, to: &CollectionHandle) -> bool
    where
        K: Clone + Eq + Hash + Send + Sync + 'static,
    {
        let Some(ids) = self.get::<K>(from).cloned() else {
            return false;
        };
        self.restore(to, ids);
        true
    }

    /// Drop entries whose collection no longer exists.
    ///
    /// Returns the number of entries removed.
    pub fn prune(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.owner.strong_count() > 0);
        let removed = before - self.entries.len();
        if removed > 0 {
            log::debug!("pruned {removed} identifier maps of dropped collections");
        }
        removed
    }
}

impl fmt::Debug for ItemIdRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemIdRegistry")
            .field("entries", &self.entries.len())
            .finish()
    }
}
