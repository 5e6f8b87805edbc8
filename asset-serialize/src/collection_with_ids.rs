//! Identity-augmented collection serialization.
//!
//! [`serialize_collection`] and [`deserialize_collection_into`] drive the
//! whole transform for one collection; a [`CollectionWithIdsSerializer`]
//! supplies the per-shape policy (dictionary or list).
//!
//! Serialize: check eligibility, detach the collection's identifier map
//! from the registry, assign ids to new items, turn stale ids into
//! tombstones, write live entries and tombstones, reattach the map.
//!
//! Deserialize: check eligibility, resolve the identity source (wrapped keys
//! or legacy `~Id` members), read every entry into the wire shape, then
//! clear the live collection and its identifier map and rebuild both from
//! the wire shape. A structural error leaves the collection and its map
//! untouched.

use std::hash::Hash;

use redlilium_item_ids::{CollectionHandle, ItemId, ItemIdentifierMap};

use crate::attributes::{CollectionAttributes, Eligibility};
use crate::context::{DeserializeContext, SerializeContext};
use crate::error::{DeserializeError, SerializeError};
use crate::identity::IdentitySource;
use crate::tree::{MappingReader, MappingWriter};
use crate::value::Value;
use crate::wrappers::{DeletedKeyWithId, WireKey};

/// Shape of an identity-tracked collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Dictionary,
    List,
}

impl CollectionKind {
    /// Description of the expected wire mapping, for error messages.
    pub fn wire_form(self) -> &'static str {
        match self {
            Self::Dictionary => "map of \"<id>~<key>\" and \"~<id>\" entries",
            Self::List => "map of \"<id>\" and \"~<id>\" entries",
        }
    }
}

/// A collection type with an identity serializer.
///
/// The standard maps and sequences implement this; a custom collection
/// picks [`DictionaryWithIdsSerializer`](crate::DictionaryWithIdsSerializer)
/// or [`ListWithIdsSerializer`](crate::ListWithIdsSerializer).
pub trait ItemCollection: Sized {
    type Serializer: CollectionWithIdsSerializer<Collection = Self>;
}

/// Per-shape policy of identity-augmented serialization.
pub trait CollectionWithIdsSerializer {
    type Collection: CollectionAttributes;
    /// Key of the identifier map: the dictionary key, or the position.
    type IdKey: Clone + Eq + Hash + Send + Sync + 'static;
    /// Wire shape collected while reading.
    type ReadShape: Default;
    const KIND: CollectionKind;

    /// An empty collection to deserialize into.
    fn construct_empty() -> Result<Self::Collection, DeserializeError>;

    /// Tombstone ids whose keys are no longer in `collection`.
    fn reconcile_ids(collection: &Self::Collection, ids: &mut ItemIdentifierMap<Self::IdKey>)
    -> usize;

    /// Write live entries and tombstones, assigning ids to new items.
    fn write_items(
        collection: &Self::Collection,
        ids: &mut ItemIdentifierMap<Self::IdKey>,
        writer: &mut MappingWriter,
        ctx: &mut SerializeContext<'_>,
    ) -> Result<(), SerializeError>;

    /// Write the tombstone section.
    fn write_deleted_items(deleted: &[DeletedKeyWithId], writer: &mut MappingWriter) {
        for entry in deleted {
            writer.write_mapping_entry(entry.to_wire_key(), DeletedKeyWithId::sentinel());
        }
    }

    /// Plain encoding, used when identity does not apply.
    fn write_plain(
        collection: &Self::Collection,
        ctx: &mut SerializeContext<'_>,
    ) -> Result<Value, SerializeError>;

    /// Read the plain encoding into `target`, replacing its contents.
    fn read_plain(
        target: &mut Self::Collection,
        value: Value,
        ctx: &mut DeserializeContext<'_>,
    ) -> Result<(), DeserializeError>;

    /// Rewrite a legacy collection into wrapped entries.
    fn synthesize_wrapped_entries(
        legacy: Value,
        ctx: &mut DeserializeContext<'_>,
    ) -> Result<Vec<(String, Value)>, DeserializeError>;

    /// Decode one live entry into the wire shape.
    fn read_item(
        shape: &mut Self::ReadShape,
        id: ItemId,
        key_text: Option<&str>,
        value: Value,
        ctx: &mut DeserializeContext<'_>,
    ) -> Result<(), DeserializeError>;

    fn read_deleted_item(shape: &mut Self::ReadShape, id: ItemId);

    /// Rebuild `target` and `ids` from the wire shape. Both arrive cleared
    /// of identity; `target` may still hold default contents.
    fn transform_after_deserialization(
        shape: Self::ReadShape,
        target: &mut Self::Collection,
        ids: &mut ItemIdentifierMap<Self::IdKey>,
        ctx: &mut DeserializeContext<'_>,
    );
}

/// Serialize `collection`, whose identity is `handle`.
pub fn serialize_collection<S: CollectionWithIdsSerializer>(
    collection: &S::Collection,
    handle: &CollectionHandle,
    ctx: &mut SerializeContext<'_>,
) -> Result<Value, SerializeError> {
    let type_name = std::any::type_name::<S::Collection>();
    let eligibility = Eligibility::of::<S::Collection>();
    if !eligibility.is_applicable() {
        log::trace!("{type_name}: plain encoding ({eligibility:?})");
        return S::write_plain(collection, ctx);
    }

    let mut ids = ctx.registry_mut().take::<S::IdKey>(handle);
    if ctx.settings().reconcile_stale_ids {
        let stale = S::reconcile_ids(collection, &mut ids);
        if stale > 0 {
            log::debug!("{type_name}: {stale} removed items became tombstones");
        }
    }

    let mut writer = MappingWriter::begin_mapping(ids.len() + ids.deleted_count());
    let written = S::write_items(collection, &mut ids, &mut writer, ctx);
    log::debug!(
        "{type_name}: wrote {} entries ({} tombstones)",
        writer.len(),
        ids.deleted_count()
    );
    ctx.registry_mut().restore(handle, ids);
    written?;
    Ok(writer.end_mapping())
}

/// Deserialize `value` into `target`, whose identity is `handle`.
pub fn deserialize_collection_into<S: CollectionWithIdsSerializer>(
    target: &mut S::Collection,
    handle: &CollectionHandle,
    value: Value,
    ctx: &mut DeserializeContext<'_>,
) -> Result<(), DeserializeError> {
    let type_name = std::any::type_name::<S::Collection>();
    if !Eligibility::of::<S::Collection>().is_applicable() {
        return S::read_plain(target, value, ctx);
    }

    let accept_legacy = ctx.settings().accept_legacy_ids;
    let value = match IdentitySource::resolve(value, S::KIND, accept_legacy, type_name)? {
        IdentitySource::WrappedKey(value) => value,
        IdentitySource::SideMemberLegacy(legacy) => {
            log::debug!("{type_name}: converting legacy ~Id members");
            Value::Map(S::synthesize_wrapped_entries(legacy, ctx)?)
        }
    };

    let mut shape = S::ReadShape::default();
    let mut reader = MappingReader::begin_mapping(value, type_name)?;
    while let Some(key) = reader.read_next_key() {
        let item = reader.read_value_for_key()?;
        match WireKey::classify(&key) {
            WireKey::Live { id, key: key_text } => {
                S::read_item(&mut shape, id, key_text, item, ctx)?;
            }
            WireKey::Deleted(id) => match DeletedKeyWithId::check_sentinel(&item) {
                Ok(()) => S::read_deleted_item(&mut shape, id),
                Err(found) => ctx.report(DeserializeError::CorruptTombstone {
                    id,
                    found: found.into(),
                }),
            },
            WireKey::Unrecognized => {
                return Err(DeserializeError::InvalidKey {
                    key: key.clone(),
                    expected: S::KIND.wire_form().into(),
                });
            }
        }
    }
    reader.end_mapping();

    let mut ids = ctx.registry_mut().take::<S::IdKey>(handle);
    ids.clear();
    S::transform_after_deserialization(shape, target, &mut ids, ctx);
    log::debug!(
        "{type_name}: loaded {} items ({} tombstones)",
        ids.len(),
        ids.deleted_count()
    );
    ctx.registry_mut().restore(handle, ids);
    Ok(())
}

/// Record the id of a loaded item. An empty or duplicate id is reported and
/// replaced with a fresh one.
pub(crate) fn claim_loaded_id<K: Eq + Hash>(
    ids: &mut ItemIdentifierMap<K>,
    key: K,
    id: ItemId,
    ctx: &mut DeserializeContext<'_>,
) {
    let id = if id.is_empty() {
        ctx.report(DeserializeError::InvalidItemId {
            text: id.to_string(),
        });
        ids.new_id()
    } else if ids.contains_id(id) {
        ctx.report(DeserializeError::DuplicateItemId { id });
        ids.new_id()
    } else {
        id
    };
    if let Err(e) = ids.add(key, id) {
        log::warn!("item id {id} was not recorded: {e}");
    }
}

/// Record tombstones. One naming a live item or the empty id is reported
/// and ignored.
pub(crate) fn apply_tombstones<K: Eq + Hash>(
    ids: &mut ItemIdentifierMap<K>,
    deleted: &[DeletedKeyWithId],
    ctx: &mut DeserializeContext<'_>,
) {
    for entry in deleted {
        if entry.id.is_empty() {
            ctx.report(DeserializeError::InvalidItemId {
                text: entry.id.to_string(),
            });
        } else if !ids.mark_as_deleted(entry.id) {
            ctx.report(DeserializeError::DuplicateItemId { id: entry.id });
        }
    }
}

#[cfg(test)]
mod tests {
    use redlilium_item_ids::ItemIdRegistry;

    use super::*;

    #[test]
    fn duplicate_ids_get_fresh_ones() {
        let mut registry = ItemIdRegistry::new();
        let mut ctx = DeserializeContext::new(&mut registry);
        let mut ids = ItemIdentifierMap::new();
        let id = ItemId::new();

        claim_loaded_id(&mut ids, "a", id, &mut ctx);
        claim_loaded_id(&mut ids, "b", id, &mut ctx);

        assert_eq!(ids.get("a"), Some(id));
        let replacement = ids.get("b").unwrap();
        assert_ne!(replacement, id);
        assert_eq!(ctx.reports(), &[DeserializeError::DuplicateItemId { id }]);
    }

    #[test]
    fn tombstone_of_live_item_is_reported() {
        let mut registry = ItemIdRegistry::new();
        let mut ctx = DeserializeContext::new(&mut registry);
        let mut ids = ItemIdentifierMap::new();
        let live = ItemId::new();
        let gone = ItemId::new();
        ids.add(0usize, live).unwrap();

        apply_tombstones(
            &mut ids,
            &[DeletedKeyWithId::new(live), DeletedKeyWithId::new(gone)],
            &mut ctx,
        );

        assert!(ids.is_deleted(gone));
        assert!(!ids.is_deleted(live));
        assert_eq!(ctx.reports().len(), 1);
    }

    #[test]
    fn empty_ids_are_reported_and_replaced() {
        let mut registry = ItemIdRegistry::new();
        let mut ctx = DeserializeContext::new(&mut registry);
        let mut ids = ItemIdentifierMap::new();
        let empty_text = ItemId::EMPTY.to_string();

        claim_loaded_id(&mut ids, "a", ItemId::EMPTY, &mut ctx);
        apply_tombstones(&mut ids, &[DeletedKeyWithId::new(ItemId::EMPTY)], &mut ctx);

        let id = ids.get("a").unwrap();
        assert!(!id.is_empty());
        assert_eq!(ids.deleted_count(), 0);
        assert_eq!(
            ctx.reports(),
            &[
                DeserializeError::InvalidItemId {
                    text: empty_text.clone()
                },
                DeserializeError::InvalidItemId { text: empty_text },
            ]
        );
    }

    #[test]
    fn wire_forms_name_the_key_layout() {
        assert!(CollectionKind::Dictionary.wire_form().contains("<id>~<key>"));
        assert!(!CollectionKind::List.wire_form().contains("<key>"));
    }
}
