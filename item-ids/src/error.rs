//! Errors raised by identifier map bookkeeping.

use thiserror::Error;

use crate::id::ItemId;

/// Errors that can occur while editing an [`ItemIdentifierMap`](crate::ItemIdentifierMap).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemIdError {
    /// The text is not a valid item identifier.
    #[error("invalid item id '{text}'")]
    InvalidText { text: String },
    /// [`ItemId::EMPTY`] cannot be assigned to an item.
    #[error("the empty item id cannot be assigned to an item")]
    EmptyId,
    /// The key already has an identifier.
    #[error("key is already mapped to item id {existing}")]
    KeyAlreadyMapped { existing: ItemId },
    /// The identifier is already used by another live item.
    #[error("item id {id} is already used by another item")]
    IdInUse { id: ItemId },
}
