//! Identity serializer for keyed collections.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::marker::PhantomData;

use indexmap::IndexMap;
use redlilium_item_ids::{ItemId, ItemIdentifierMap};

use crate::asset::{AssetDeserialize, AssetSerialize};
use crate::collection_with_ids::{
    CollectionKind, CollectionWithIdsSerializer, ItemCollection, apply_tombstones,
    claim_loaded_id,
};
use crate::context::{DeserializeContext, SerializeContext};
use crate::descriptor::DictionaryDescriptor;
use crate::error::{DeserializeError, SerializeError};
use crate::identity;
use crate::key::ItemKey;
use crate::tree::{MappingReader, MappingWriter};
use crate::value::Value;
use crate::wrappers::{DictionaryWithItemIds, KeyWithId};

/// Identity serializer for a [`DictionaryDescriptor`] collection `D`.
pub struct DictionaryWithIdsSerializer<D>(PhantomData<fn() -> D>);

impl<D: DictionaryDescriptor> DictionaryWithIdsSerializer<D> {
    /// Pair every entry of `collection` with its id, assigning fresh ids to
    /// keys the map does not know yet, and collect the tombstones.
    pub fn transform_for_serialization<'a>(
        collection: &'a D,
        ids: &mut ItemIdentifierMap<D::Key>,
    ) -> DictionaryWithItemIds<&'a D::Key, &'a D::Value> {
        let mut wire = DictionaryWithItemIds::with_capacity(collection.len());
        for (key, value) in collection.enumerate() {
            let id = ids.get_or_assign(key);
            wire.push(KeyWithId::new(id, key), value);
        }
        for id in ids.deleted_items() {
            wire.push_deleted(id);
        }
        wire
    }

    fn invalid_key(key: String) -> DeserializeError {
        DeserializeError::InvalidKey {
            key,
            expected: std::any::type_name::<D::Key>().into(),
        }
    }
}

impl<D> CollectionWithIdsSerializer for DictionaryWithIdsSerializer<D>
where
    D: DictionaryDescriptor,
    D::Value: AssetSerialize + AssetDeserialize,
{
    type Collection = D;
    type IdKey = D::Key;
    type ReadShape = DictionaryWithItemIds<D::Key, D::Value>;
    const KIND: CollectionKind = CollectionKind::Dictionary;

    fn construct_empty() -> Result<D, DeserializeError> {
        D::construct_empty().ok_or_else(|| DeserializeError::Configuration {
            type_name: std::any::type_name::<D>(),
            message: "dictionary type cannot be constructed empty".into(),
        })
    }

    fn reconcile_ids(collection: &D, ids: &mut ItemIdentifierMap<D::Key>) -> usize {
        ids.retain_keys(|key| collection.contains_key(key))
    }

    fn write_items(
        collection: &D,
        ids: &mut ItemIdentifierMap<D::Key>,
        writer: &mut MappingWriter,
        ctx: &mut SerializeContext<'_>,
    ) -> Result<(), SerializeError> {
        let wire = Self::transform_for_serialization(collection, ids);
        for (key, value) in wire.entries() {
            let value = <D::Value as AssetSerialize>::serialize_asset(value, ctx)?;
            writer.write_mapping_entry(key.to_wire_key(), value);
        }
        Self::write_deleted_items(wire.deleted(), writer);
        Ok(())
    }

    fn write_plain(
        collection: &D,
        ctx: &mut SerializeContext<'_>,
    ) -> Result<Value, SerializeError> {
        let mut writer = MappingWriter::begin_mapping(collection.len());
        for (key, value) in collection.enumerate() {
            let value = <D::Value as AssetSerialize>::serialize_asset(value, ctx)?;
            writer.write_mapping_entry(key.to_key_string(), value);
        }
        Ok(writer.end_mapping())
    }

    fn read_plain(
        target: &mut D,
        value: Value,
        ctx: &mut DeserializeContext<'_>,
    ) -> Result<(), DeserializeError> {
        let mut reader = MappingReader::begin_mapping(value, std::any::type_name::<D>())?;
        let mut entries = Vec::with_capacity(reader.remaining());
        while let Some(key_text) = reader.read_next_key() {
            let item = reader.read_value_for_key()?;
            let key =
                D::Key::from_key_string(&key_text).ok_or_else(|| Self::invalid_key(key_text))?;
            entries.push((key, D::Value::deserialize_asset(item, ctx)?));
        }
        reader.end_mapping();

        target.clear();
        for (key, value) in entries {
            target.insert(key, value);
        }
        Ok(())
    }

    fn synthesize_wrapped_entries(
        legacy: Value,
        ctx: &mut DeserializeContext<'_>,
    ) -> Result<Vec<(String, Value)>, DeserializeError> {
        match legacy {
            Value::Map(entries) => Ok(identity::synthesize_wrapped_entries(
                entries.into_iter().map(|(key, item)| (Some(key), item)),
                ctx,
            )),
            other => Err(DeserializeError::TypeMismatch {
                context: std::any::type_name::<D>().into(),
                expected: "map".into(),
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
        let Some(key_text) = key_text else {
            return Err(Self::invalid_key(id.to_string()));
        };
        let key = KeyWithId::<D::Key>::from_key_text(id, key_text)
            .ok_or_else(|| Self::invalid_key(key_text.to_owned()))?;
        let value = D::Value::deserialize_asset(value, ctx)?;
        shape.push(key, value);
        Ok(())
    }

    fn read_deleted_item(shape: &mut Self::ReadShape, id: ItemId) {
        shape.push_deleted(id);
    }

    fn transform_after_deserialization(
        shape: Self::ReadShape,
        target: &mut D,
        ids: &mut ItemIdentifierMap<D::Key>,
        ctx: &mut DeserializeContext<'_>,
    ) {
        target.clear();
        let (entries, deleted) = shape.into_parts();
        for (KeyWithId { id, key }, value) in entries {
            if target.contains_key(&key) {
                ctx.report(DeserializeError::DuplicateKey {
                    key: key.to_key_string(),
                });
                continue;
            }
            claim_loaded_id(ids, key.clone(), id, ctx);
            target.insert(key, value);
        }
        apply_tombstones(ids, &deleted, ctx);
    }
}

impl<K, V, S> ItemCollection for HashMap<K, V, S>
where
    K: ItemKey,
    V: AssetSerialize + AssetDeserialize,
    S: BuildHasher + Default,
{
    type Serializer = DictionaryWithIdsSerializer<Self>;
}

impl<K, V> ItemCollection for BTreeMap<K, V>
where
    K: ItemKey + Ord,
    V: AssetSerialize + AssetDeserialize,
{
    type Serializer = DictionaryWithIdsSerializer<Self>;
}

impl<K, V, S> ItemCollection for IndexMap<K, V, S>
where
    K: ItemKey,
    V: AssetSerialize + AssetDeserialize,
    S: BuildHasher + Default,
{
    type Serializer = DictionaryWithIdsSerializer<Self>;
}

#[cfg(test)]
mod tests {
    use redlilium_item_ids::{CollectionHandle, ItemIdRegistry};

    use super::*;
    use crate::collection_with_ids::{deserialize_collection_into, serialize_collection};

    type Dict = IndexMap<String, i32>;
    type Ser = DictionaryWithIdsSerializer<Dict>;

    fn dict(entries: &[(&str, i32)]) -> Dict {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn transform_assigns_and_reuses_ids() {
        let collection = dict(&[("a", 1), ("b", 2)]);
        let mut ids = ItemIdentifierMap::new();
        let first = Ser::transform_for_serialization(&collection, &mut ids);
        assert_eq!(first.len(), 2);
        let a = first.entries()[0].0.id;

        let second = Ser::transform_for_serialization(&collection, &mut ids);
        assert_eq!(second.entries()[0].0.id, a);
        assert_eq!(ids.get("a"), Some(a));
    }

    #[test]
    fn wire_entries_follow_enumeration_order() {
        let mut registry = ItemIdRegistry::new();
        let handle = CollectionHandle::new();
        let collection = dict(&[("z", 26), ("a", 1)]);

        let mut ctx = SerializeContext::new(&mut registry);
        let value = serialize_collection::<Ser>(&collection, &handle, &mut ctx).unwrap();

        let ids = registry.get::<String>(&handle).unwrap();
        let keys: Vec<_> = value.as_map().unwrap().iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(
            keys,
            vec![
                format!("{}~z", ids.get("z").unwrap()),
                format!("{}~a", ids.get("a").unwrap()),
            ]
        );
    }

    #[test]
    fn round_trip_restores_content_and_ids() {
        let mut registry = ItemIdRegistry::new();
        let handle = CollectionHandle::new();
        let collection = dict(&[("a", 1), ("b", 2)]);
        let mut ctx = SerializeContext::new(&mut registry);
        let value = serialize_collection::<Ser>(&collection, &handle, &mut ctx).unwrap();
        let before = registry.get::<String>(&handle).unwrap().clone();

        let loaded_handle = CollectionHandle::new();
        let mut loaded = dict(&[("stale default", 0)]);
        let mut ctx = DeserializeContext::new(&mut registry);
        deserialize_collection_into::<Ser>(&mut loaded, &loaded_handle, value, &mut ctx).unwrap();
        assert!(ctx.reports().is_empty());

        assert_eq!(loaded, collection);
        assert_eq!(registry.get::<String>(&loaded_handle), Some(&before));
    }

    #[test]
    fn unparsable_key_aborts_without_touching_target() {
        let mut registry = ItemIdRegistry::new();
        let handle = CollectionHandle::new();
        let id = ItemId::new();
        let value = Value::Map(vec![(format!("{id}~not a number"), Value::I64(1))]);

        let mut target: IndexMap<u32, i32> = IndexMap::new();
        target.insert(7, 7);
        let mut ctx = DeserializeContext::new(&mut registry);
        let result = deserialize_collection_into::<DictionaryWithIdsSerializer<IndexMap<u32, i32>>>(
            &mut target,
            &handle,
            value,
            &mut ctx,
        );

        assert!(matches!(result, Err(DeserializeError::InvalidKey { .. })));
        assert_eq!(target.get(&7), Some(&7));
    }

    #[test]
    fn duplicate_keys_are_reported() {
        let mut registry = ItemIdRegistry::new();
        let handle = CollectionHandle::new();
        let value = Value::Map(vec![
            (format!("{}~a", ItemId::new()), Value::I64(1)),
            (format!("{}~a", ItemId::new()), Value::I64(2)),
        ]);
        let mut target = Dict::new();
        let mut ctx = DeserializeContext::new(&mut registry);
        deserialize_collection_into::<Ser>(&mut target, &handle, value, &mut ctx).unwrap();

        assert_eq!(target, dict(&[("a", 1)]));
        assert_eq!(
            ctx.reports(),
            &[DeserializeError::DuplicateKey { key: "a".into() }]
        );
    }

    #[test]
    fn plain_encoding_round_trip() {
        let mut registry = ItemIdRegistry::new();
        let collection = dict(&[("x", 5)]);
        let mut ctx = SerializeContext::new(&mut registry);
        let value = Ser::write_plain(&collection, &mut ctx).unwrap();
        assert_eq!(value, Value::Map(vec![("x".into(), Value::I64(5))]));

        let mut target = dict(&[("y", 6)]);
        Ser::read_plain(&mut target, value, &mut DeserializeContext::new(&mut registry)).unwrap();
        assert_eq!(target, collection);
    }
}
