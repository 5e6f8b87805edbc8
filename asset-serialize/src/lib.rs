//! # RedLilium Asset Serialize
//!
//! Identity-preserving serialization of asset collections.
//!
//! Every item of a tracked dictionary or list carries a stable [`ItemId`]
//! in the document. Ids survive edits, reorderings and round trips, and ids
//! of deleted items are kept as tombstones so merge tooling can tell
//! "deleted" from "never existed".
//!
//! ## Core Types
//!
//! - [`Tracked`] — a collection plus its identity in the [`ItemIdRegistry`]
//! - [`AssetSerialize`] / [`AssetDeserialize`] — asset-level conversion to
//!   and from the [`Value`] tree; blanket impls cover serde types
//! - [`SerializeContext`] / [`DeserializeContext`] — per-document state
//! - [`save_asset`] / [`load_asset`] — whole-document entry points
//!
//! ## Extension Points
//!
//! - [`DictionaryDescriptor`] / [`ListDescriptor`] — introspection of
//!   custom collection types
//! - [`CollectionAttributes`] — opt a type out (non-identifiable items or
//!   the compact style)
//! - [`ItemKey`] — textual form of custom dictionary keys
//! - [`ItemCollection`] — picks the identity serializer of a collection
//!
//! ## Document Layout
//!
//! See [`wrappers`] for the wire keys and [`identity`] for legacy `~Id`
//! documents.

mod asset;
mod attributes;
mod collection_with_ids;
mod context;
mod descriptor;
mod dictionary;
mod document;
mod error;
mod format;
pub mod identity;
mod key;
mod list;
mod settings;
mod tracked;
mod tree;
mod value;
pub mod wrappers;

pub use asset::{AssetDeserialize, AssetSerialize};
pub use attributes::{CollectionAttributes, DataStyle, Eligibility};
pub use collection_with_ids::{
    CollectionKind, CollectionWithIdsSerializer, ItemCollection, deserialize_collection_into,
    serialize_collection,
};
pub use context::{DeserializeContext, SerializeContext};
pub use descriptor::{DictionaryDescriptor, ListDescriptor};
pub use dictionary::DictionaryWithIdsSerializer;
pub use document::{
    DOCUMENT_VERSION, LoadedAsset, SerializedAsset, load_asset, load_asset_into, save_asset,
};
pub use error::{DeserializeError, SerializeError, SettingsError};
pub use format::{Format, decode, encode};
pub use key::ItemKey;
pub use list::ListWithIdsSerializer;
pub use settings::{SerializerSettings, load_or_default, load_settings, parse_settings};
pub use tracked::{IdKeyOf, Tracked};
pub use tree::{MappingReader, MappingWriter};
pub use value::{Value, from_value, to_value};

pub use redlilium_item_ids::{CollectionHandle, ItemId, ItemIdRegistry, ItemIdentifierMap};
