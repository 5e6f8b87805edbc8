//! Type introspection for collections.
//!
//! The identity serializers never touch a concrete collection type; they go
//! through [`DictionaryDescriptor`] or [`ListDescriptor`], which expose the
//! enumerate / construct / clear / insert primitives for one collection type.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::BuildHasher;

use indexmap::IndexMap;

use crate::attributes::CollectionAttributes;
use crate::key::ItemKey;

/// Introspection for keyed collections.
pub trait DictionaryDescriptor: CollectionAttributes {
    type Key: ItemKey;
    type Value;
    type Iter<'a>: Iterator<Item = (&'a Self::Key, &'a Self::Value)>
    where
        Self: 'a;

    /// Entries in the collection's natural enumeration order.
    fn enumerate(&self) -> Self::Iter<'_>;

    /// An empty instance, or `None` if the type cannot be built without
    /// arguments.
    fn construct_empty() -> Option<Self>
    where
        Self: Sized;

    fn clear(&mut self);

    fn insert(&mut self, key: Self::Key, value: Self::Value);

    fn contains_key(&self, key: &Self::Key) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Introspection for ordered collections. The position is the item key.
pub trait ListDescriptor: CollectionAttributes {
    type Item;
    type Iter<'a>: Iterator<Item = &'a Self::Item>
    where
        Self: 'a;

    fn enumerate(&self) -> Self::Iter<'_>;

    fn construct_empty() -> Option<Self>
    where
        Self: Sized;

    fn clear(&mut self);

    fn push(&mut self, item: Self::Item);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: ItemKey, V, S: BuildHasher + Default> DictionaryDescriptor for HashMap<K, V, S> {
    type Key = K;
    type Value = V;
    type Iter<'a>
        = std::collections::hash_map::Iter<'a, K, V>
    where
        Self: 'a;

    fn enumerate(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn construct_empty() -> Option<Self> {
        Some(HashMap::default())
    }

    fn clear(&mut self) {
        HashMap::clear(self);
    }

    fn insert(&mut self, key: K, value: V) {
        HashMap::insert(self, key, value);
    }

    fn contains_key(&self, key: &K) -> bool {
        HashMap::contains_key(self, key)
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }
}

impl<K: ItemKey + Ord, V> DictionaryDescriptor for BTreeMap<K, V> {
    type Key = K;
    type Value = V;
    type Iter<'a>
        = std::collections::btree_map::Iter<'a, K, V>
    where
        Self: 'a;

    fn enumerate(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn construct_empty() -> Option<Self> {
        Some(BTreeMap::new())
    }

    fn clear(&mut self) {
        BTreeMap::clear(self);
    }

    fn insert(&mut self, key: K, value: V) {
        BTreeMap::insert(self, key, value);
    }

    fn contains_key(&self, key: &K) -> bool {
        BTreeMap::contains_key(self, key)
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }
}

impl<K: ItemKey, V, S: BuildHasher + Default> DictionaryDescriptor for IndexMap<K, V, S> {
    type Key = K;
    type Value = V;
    type Iter<'a>
        = indexmap::map::Iter<'a, K, V>
    where
        Self: 'a;

    fn enumerate(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn construct_empty() -> Option<Self> {
        Some(IndexMap::default())
    }

    fn clear(&mut self) {
        IndexMap::clear(self);
    }

    fn insert(&mut self, key: K, value: V) {
        IndexMap::insert(self, key, value);
    }

    fn contains_key(&self, key: &K) -> bool {
        IndexMap::contains_key(self, key)
    }

    fn len(&self) -> usize {
        IndexMap::len(self)
    }
}

impl<T> ListDescriptor for Vec<T> {
    type Item = T;
    type Iter<'a>
        = std::slice::Iter<'a, T>
    where
        Self: 'a;

    fn enumerate(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn construct_empty() -> Option<Self> {
        Some(Vec::new())
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn push(&mut self, item: T) {
        Vec::push(self, item);
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }
}

impl<T> ListDescriptor for VecDeque<T> {
    type Item = T;
    type Iter<'a>
        = std::collections::vec_deque::Iter<'a, T>
    where
        Self: 'a;

    fn enumerate(&self) -> Self::Iter<'_> {
        self.iter()
    }

    fn construct_empty() -> Option<Self> {
        Some(VecDeque::new())
    }

    fn clear(&mut self) {
        VecDeque::clear(self);
    }

    fn push(&mut self, item: T) {
        self.push_back(item);
    }

    fn len(&self) -> usize {
        VecDeque::len(self)
    }
}
