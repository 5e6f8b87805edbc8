//! Identity serializer for ordered collections.
//!
//! Positions play the role of keys in the identifier map. Ids stay attached
//! to positions, so an editor that inserts or removes in the middle of a
//! tracked list shifts the ids along with the items
//! ([`Tracked::insert_with_id`], [`Tracked::remove_with_id`]). Ids of
//! positions past the end of the list become tombstones when it is saved.

use std::collections::VecDeque;
use std::marker::PhantomData;

use redlilium_item_ids::{ItemId, ItemIdRegistry, ItemIdentifierMap};

use crate::asset::{AssetDeserialize, AssetSerialize};
use crate::collection_with_ids::{
    CollectionKind, CollectionWithIdsSerializer, ItemCollection, apply_tombstones,
    claim_loaded_id,
};
use crate::context::{DeserializeContext, SerializeContext};
use crate::descriptor::ListDescriptor;
use crate::error::{DeserializeError, SerializeError};
use crate::identity;
use crate::tracked::Tracked;
use crate::tree::MappingWriter;
use crate::value::Value;
use crate::wrappers::{ListWithItemIds, live_wire_key};

/// Identity serializer for a [`ListDescriptor`] collection `L`.
pub struct ListWithIdsSerializer<L>(PhantomData<fn() -> L>);

impl<L: ListDescriptor> ListWithIdsSerializer<L> {
    /// Pair every item of `collection` with the id of its position,
    /// assigning fresh ids to new positions, and collect the tombstones.
    pub fn transform_for_serialization<'a>(
        collection: &'a L,
        ids: &mut ItemIdentifierMap<usize>,
    ) -> ListWithItemIds<&'a L::Item> {
        let mut wire = ListWithItemIds::with_capacity(collection.len());
        for (index, item) in collection.enumerate().enumerate() {
            wire.push(ids.get_or_assign(&index), item);
        }
        for id in ids.deleted_items() {
            wire.push_deleted(id);
        }
        wire
    }
}

impl<L> CollectionWithIdsSerializer for ListWithIdsSerializer<L>
where
    L: ListDescriptor,
    L::Item: AssetSerialize + AssetDeserialize,
{
    type Collection = L;
    type IdKey = usize;
    type ReadShape = ListWithItemIds<L::Item>;
    const KIND: CollectionKind = CollectionKind::List;

    fn construct_empty() -> Result<L, DeserializeError> {
        L::construct_empty().ok_or_else(|| DeserializeError::Configuration {
            type_name: std::any::type_name::<L>(),
            message: "list type cannot be constructed empty".into(),
        })
    }

    fn reconcile_ids(collection: &L, ids: &mut ItemIdentifierMap<usize>) -> usize {
        ids.truncate_to(collection.len())
    }

    fn write_items(
        collection: &L,
        ids: &mut ItemIdentifierMap<usize>,
        writer: &mut MappingWriter,
        ctx: &mut SerializeContext<'_>,
    ) -> Result<(), SerializeError> {
        let wire = Self::transform_for_serialization(collection, ids);
        for (id, item) in wire.items() {
            let value = <L::Item as AssetSerialize>::serialize_asset(item, ctx)?;
            writer.write_mapping_entry(live_wire_key(*id, None), value);
        }
        Self::write_deleted_items(wire.deleted(), writer);
        Ok(())
    }

    fn write_plain(
        collection: &L,
        ctx: &mut SerializeContext<'_>,
    ) -> Result<Value, SerializeError> {
        let items = collection
            .enumerate()
            .map(|item| <L::Item as AssetSerialize>::serialize_asset(item, ctx))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::List(items))
    }

    fn read_plain(
        target: &mut L,
        value: Value,
        ctx: &mut DeserializeContext<'_>,
    ) -> Result<(), DeserializeError> {
        let values = match value {
            Value::List(values) => values,
            other => {
                return Err(DeserializeError::TypeMismatch {
                    context: std::any::type_name::<L>().into(),
                    expected: "list".into(),
                    found: other.kind().into(),
                });
            }
        };
        let items = values
            .into_iter()
            .map(|item| L::Item::deserialize_asset(item, ctx))
            .collect::<Result<Vec<_>, _>>()?;

        target.clear();
        for item in items {
            target.push(item);
        }
        Ok(())
    }

    fn synthesize_wrapped_entries(
        legacy: Value,
        ctx: &mut DeserializeContext<'_>,
    ) -> Result<Vec<(String, Value)>, DeserializeError> {
        match legacy {
            Value::List(items) => Ok(identity::synthesize_wrapped_entries(
                items.into_iter().map(|item| (None, item)),
                ctx,
            )),
            other => Err(DeserializeError::TypeMismatch {
                context: std::any::type_name::<L>().into(),
                expected: "list".into(),
                found: other.kind().into(),
            }),
        }
    }

    fn read_item(
        shape: &mut Self::ReadShape,
        id: ItemId,
        key_text: Option<&str>,
        value: Value,
        ctx: &mut DeserializeContext<'_>,
    ) -> Result<(), DeserializeError> {
        if let Some(key_text) = key_text {
            return Err(DeserializeError::InvalidKey {
                key: live_wire_key(id, Some(key_text)),
                expected: "item id".into(),
            });
        }
        shape.push(id, L::Item::deserialize_asset(value, ctx)?);
        Ok(())
    }

    fn read_deleted_item(shape: &mut Self::ReadShape, id: ItemId) {
        shape.push_deleted(id);
    }

    fn transform_after_deserialization(
        shape: Self::ReadShape,
        target: &mut L,
        ids: &mut ItemIdentifierMap<usize>,
        ctx: &mut DeserializeContext<'_>,
    ) {
        target.clear();
        let (items, deleted) = shape.into_parts();
        for (index, (id, item)) in items.into_iter().enumerate() {
            claim_loaded_id(ids, index, id, ctx);
            target.push(item);
        }
        apply_tombstones(ids, &deleted, ctx);
    }
}

impl<T: AssetSerialize + AssetDeserialize> ItemCollection for Vec<T> {
    type Serializer = ListWithIdsSerializer<Self>;
}

impl<T: AssetSerialize + AssetDeserialize> ItemCollection for VecDeque<T> {
    type Serializer = ListWithIdsSerializer<Self>;
}

impl<T: AssetSerialize + AssetDeserialize> Tracked<Vec<T>> {
    /// Insert `item` at `index` with a fresh id, shifting the ids of later
    /// items along with them.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_with_id(
        &mut self,
        index: usize,
        item: T,
        registry: &mut ItemIdRegistry,
    ) -> ItemId {
        self.inner_mut().insert(index, item);
        let ids = self.ids_mut(registry);
        let id = ids.new_id();
        if let Err(e) = ids.insert_and_shift(index, id) {
            log::warn!("item id {id} was not recorded: {e}");
        }
        id
    }

    /// Remove the item at `index`, turning its id into a tombstone and
    /// shifting the ids of later items.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn remove_with_id(&mut self, index: usize, registry: &mut ItemIdRegistry) -> T {
        let item = self.inner_mut().remove(index);
        self.ids_mut(registry).delete_and_shift(index, true);
        item
    }
}
