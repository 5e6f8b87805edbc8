//! # RedLilium Item Ids
//!
//! Stable identifiers for the items of asset collections.
//!
//! - [`ItemId`] — opaque 128-bit identifier assigned once per logical item
//! - [`ItemIdentifierMap`] — per-collection key → id table plus tombstones
//!   of deleted items
//! - [`CollectionHandle`] — identity token owned by a live collection
//! - [`ItemIdRegistry`] — side table from handles to identifier maps
//!
//! Identifiers survive edits, reorderings, key renames and document round
//! trips. Deleted items leave a tombstone so merge tooling can distinguish
//! "deleted" from "never existed".

mod error;
mod id;
mod identifier_map;
mod registry;

pub use error::ItemIdError;
pub use id::ItemId;
pub use identifier_map::ItemIdentifierMap;
pub use registry::{CollectionHandle, ItemIdRegistry};
