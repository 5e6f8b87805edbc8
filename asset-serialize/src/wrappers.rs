//! Identity wrappers and wire-shape containers.
//!
//! These types only exist while one collection is being written or read.
//! On the wire an identity-tracked collection is a single mapping:
//!
//! | entry                | key                 | value            |
//! |----------------------|---------------------|------------------|
//! | dictionary item      | `"<id>~<key text>"` | item value       |
//! | list item            | `"<id>"`            | item value       |
//! | deleted item (both)  | `"~<id>"`           | [`Value::Deleted`] |
//!
//! `<id>` is the 32-digit hex form of an [`ItemId`].

use redlilium_item_ids::ItemId;

use crate::key::ItemKey;
use crate::value::Value;

/// Separator between the id and the key text, and prefix of deleted keys.
pub const ID_SEPARATOR: char = '~';

/// Name of the per-item member that carried the id in legacy documents.
pub const LEGACY_ID_MEMBER: &str = "~Id";

/// Textual tombstone sentinel written by legacy documents.
pub const LEGACY_DELETED_SENTINEL: &str = "~(Deleted)";

/// A real key paired with its item id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyWithId<K> {
    pub id: ItemId,
    pub key: K,
}

impl<K> KeyWithId<K> {
    pub fn new(id: ItemId, key: K) -> Self {
        Self { id, key }
    }
}

impl<K: ItemKey> KeyWithId<&K> {
    /// `"<id>~<key text>"`.
    pub fn to_wire_key(&self) -> String {
        live_wire_key(self.id, Some(&self.key.to_key_string()))
    }
}

impl<K: ItemKey> KeyWithId<K> {
    /// Decode the key text of a live dictionary entry.
    pub fn from_key_text(id: ItemId, text: &str) -> Option<Self> {
        K::from_key_string(text).map(|key| Self { id, key })
    }
}

/// Wire key of a live entry: `"<id>~<key text>"`, or `"<id>"` without a key.
pub(crate) fn live_wire_key(id: ItemId, key_text: Option<&str>) -> String {
    match key_text {
        Some(text) => format!("{id}{ID_SEPARATOR}{text}"),
        None => id.to_string(),
    }
}

/// Key of a tombstone entry. Only the id of a deleted item survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletedKeyWithId {
    pub id: ItemId,
}

impl DeletedKeyWithId {
    pub fn new(id: ItemId) -> Self {
        Self { id }
    }

    /// `"~<id>"`.
    pub fn to_wire_key(&self) -> String {
        format!("{ID_SEPARATOR}{}", self.id)
    }

    /// The value every tombstone entry carries.
    pub fn sentinel() -> Value {
        Value::Deleted
    }

    /// Check a tombstone value, returning the kind of value found if it is
    /// not a sentinel.
    pub fn check_sentinel(value: &Value) -> Result<(), &'static str> {
        match value {
            Value::Deleted => Ok(()),
            Value::String(text) if text == LEGACY_DELETED_SENTINEL => Ok(()),
            other => Err(other.kind()),
        }
    }
}

/// Classified key of one wire mapping entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireKey<'a> {
    /// A live item. `key` is the key text of a dictionary entry and `None`
    /// for list entries.
    Live { id: ItemId, key: Option<&'a str> },
    /// A tombstone.
    Deleted(ItemId),
    /// Not an identity-augmented key.
    Unrecognized,
}

impl<'a> WireKey<'a> {
    pub fn classify(text: &'a str) -> Self {
        if let Some(rest) = text.strip_prefix(ID_SEPARATOR) {
            return match ItemId::parse_compact(rest) {
                Some(id) => Self::Deleted(id),
                None => Self::Unrecognized,
            };
        }
        let Some(id) = text.get(..ItemId::TEXT_LEN).and_then(ItemId::parse_compact) else {
            return Self::Unrecognized;
        };
        match text.get(ItemId::TEXT_LEN..) {
            Some("") => Self::Live { id, key: None },
            Some(rest) => match rest.strip_prefix(ID_SEPARATOR) {
                Some(key) => Self::Live {
                    id,
                    key: Some(key),
                },
                None => Self::Unrecognized,
            },
            None => Self::Unrecognized,
        }
    }
}

/// Wire shape of a dictionary: live entries in enumeration order plus
/// tombstones.
#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryWithItemIds<K, V> {
    entries: Vec<(KeyWithId<K>, V)>,
    deleted: Vec<DeletedKeyWithId>,
}

impl<K, V> DictionaryWithItemIds<K, V> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            deleted: Vec::new(),
        }
    }

    pub fn push(&mut self, key: KeyWithId<K>, value: V) {
        self.entries.push((key, value));
    }

    pub fn push_deleted(&mut self, id: ItemId) {
        self.deleted.push(DeletedKeyWithId::new(id));
    }

    pub fn entries(&self) -> &[(KeyWithId<K>, V)] {
        &self.entries
    }

    pub fn deleted(&self) -> &[DeletedKeyWithId] {
        &self.deleted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.deleted.is_empty()
    }

    pub fn into_parts(self) -> (Vec<(KeyWithId<K>, V)>, Vec<DeletedKeyWithId>) {
        (self.entries, self.deleted)
    }
}

impl<K, V> Default for DictionaryWithItemIds<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Wire shape of a list: `(id, item)` pairs in order plus tombstones.
#[derive(Debug, Clone, PartialEq)]
pub struct ListWithItemIds<T> {
    items: Vec<(ItemId, T)>,
    deleted: Vec<DeletedKeyWithId>,
}

impl<T> ListWithItemIds<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            deleted: Vec::new(),
        }
    }

    pub fn push(&mut self, id: ItemId, item: T) {
        self.items.push((id, item));
    }

    pub fn push_deleted(&mut self, id: ItemId) {
        self.deleted.push(DeletedKeyWithId::new(id));
    }

    pub fn items(&self) -> &[(ItemId, T)] {
        &self.items
    }

    pub fn deleted(&self) -> &[DeletedKeyWithId] {
        &self.deleted
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.deleted.is_empty()
    }

    pub fn into_parts(self) -> (Vec<(ItemId, T)>, Vec<DeletedKeyWithId>) {
        (self.items, self.deleted)
    }
}

impl<T> Default for ListWithItemIds<T> {
    fn default() -> Self {
        Self::new()
    }
}
