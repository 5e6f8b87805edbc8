//! Identity-tracked collections.

use std::ops::{Deref, DerefMut};

use redlilium_item_ids::{CollectionHandle, ItemIdRegistry, ItemIdentifierMap};

use crate::asset::{AssetDeserialize, AssetSerialize};
use crate::collection_with_ids::{
    CollectionWithIdsSerializer, ItemCollection, deserialize_collection_into,
    serialize_collection,
};
use crate::context::{DeserializeContext, SerializeContext};
use crate::error::{DeserializeError, SerializeError};
use crate::value::Value;

/// Identifier-map key type of collection `C`.
pub type IdKeyOf<C> = <<C as ItemCollection>::Serializer as CollectionWithIdsSerializer>::IdKey;

/// A collection whose items keep stable ids across saves and loads.
///
/// The ids live in an [`ItemIdRegistry`] under this collection's
/// [`CollectionHandle`], not in the collection itself. A clone is a new
/// collection with a fresh handle and no ids; use
/// [`clone_with_ids`](Self::clone_with_ids) to carry them over.
#[derive(Debug)]
pub struct Tracked<C> {
    collection: C,
    handle: CollectionHandle,
}

impl<C> Tracked<C> {
    pub fn new(collection: C) -> Self {
        Self {
            collection,
            handle: CollectionHandle::new(),
        }
    }

    /// Identity of this collection in the registry.
    pub fn handle(&self) -> &CollectionHandle {
        &self.handle
    }

    pub fn inner(&self) -> &C {
        &self.collection
    }

    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.collection
    }

    /// Unwrap the collection. Its ids stay in the registry until pruned.
    pub fn into_inner(self) -> C {
        self.collection
    }
}

impl<C: ItemCollection> Tracked<C> {
    /// Identifier map of this collection, if it was saved or loaded.
    pub fn ids<'r>(
        &self,
        registry: &'r ItemIdRegistry,
    ) -> Option<&'r ItemIdentifierMap<IdKeyOf<C>>> {
        registry.get(&self.handle)
    }

    /// Identifier map of this collection, created empty if absent.
    pub fn ids_mut<'r>(
        &self,
        registry: &'r mut ItemIdRegistry,
    ) -> &'r mut ItemIdentifierMap<IdKeyOf<C>> {
        registry.get_or_create(&self.handle)
    }

    /// Clone the collection together with its ids.
    pub fn clone_with_ids(&self, registry: &mut ItemIdRegistry) -> Self
    where
        C: Clone,
    {
        let copy = self.clone();
        registry.copy_ids::<IdKeyOf<C>>(&self.handle, &copy.handle);
        copy
    }
}

impl<C> Deref for Tracked<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.collection
    }
}

impl<C> DerefMut for Tracked<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.collection
    }
}

impl<C: Default> Default for Tracked<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<C> From<C> for Tracked<C> {
    fn from(collection: C) -> Self {
        Self::new(collection)
    }
}

impl<C: Clone> Clone for Tracked<C> {
    fn clone(&self) -> Self {
        Self::new(self.collection.clone())
    }
}

impl<C: PartialEq> PartialEq for Tracked<C> {
    fn eq(&self, other: &Self) -> bool {
        self.collection == other.collection
    }
}

impl<C: ItemCollection> AssetSerialize for Tracked<C> {
    fn serialize_asset(&self, ctx: &mut SerializeContext<'_>) -> Result<Value, SerializeError> {
        serialize_collection::<C::Serializer>(&self.collection, &self.handle, ctx)
    }
}

impl<C: ItemCollection> AssetDeserialize for Tracked<C> {
    fn deserialize_asset(
        value: Value,
        ctx: &mut DeserializeContext<'_>,
    ) -> Result<Self, DeserializeError> {
        let mut tracked = Self::new(C::Serializer::construct_empty()?);
        tracked.deserialize_asset_in_place(value, ctx)?;
        Ok(tracked)
    }

    fn deserialize_asset_in_place(
        &mut self,
        value: Value,
        ctx: &mut DeserializeContext<'_>,
    ) -> Result<(), DeserializeError> {
        deserialize_collection_into::<C::Serializer>(&mut self.collection, &self.handle, value, ctx)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn clones_get_a_fresh_identity() {
        let original = Tracked::new(vec![1, 2, 3]);
        let copy = original.clone();
        assert_eq!(copy, original);
        assert_ne!(copy.handle(), original.handle());
    }

    #[test]
    fn clone_with_ids_copies_the_map() {
        let mut registry = ItemIdRegistry::new();
        let mut original: Tracked<BTreeMap<String, u8>> = Tracked::default();
        original.insert("a".into(), 1);
        let id = original.ids_mut(&mut registry).get_or_assign("a");

        let copy = original.clone_with_ids(&mut registry);
        assert_eq!(copy.ids(&registry).and_then(|ids| ids.get("a")), Some(id));
    }

    #[test]
    fn in_place_load_keeps_the_handle() {
        let mut registry = ItemIdRegistry::new();
        let source = Tracked::new(vec!["x".to_string()]);
        let value = source
            .serialize_asset(&mut SerializeContext::new(&mut registry))
            .unwrap();
        let id = source.ids(&registry).unwrap().get(&0).unwrap();

        let mut target = Tracked::new(Vec::<String>::new());
        let handle_before = format!("{:?}", target.handle());
        target
            .deserialize_asset_in_place(value, &mut DeserializeContext::new(&mut registry))
            .unwrap();
        assert_eq!(format!("{:?}", target.handle()), handle_before);
        assert_eq!(*target, vec!["x".to_string()]);
        assert_eq!(target.ids(&registry).unwrap().get(&0), Some(id));
    }

    #[test]
    fn deref_reaches_the_collection() {
        let mut list: Tracked<Vec<i32>> = vec![1].into();
        list.push(2);
        assert_eq!(list.len(), 2);
        assert_eq!(list.into_inner(), vec![1, 2]);
    }
}
