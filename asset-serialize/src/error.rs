//! Error types for asset serialization and deserialization.

use redlilium_item_ids::ItemId;
use thiserror::Error;

/// Errors that can occur during asset serialization.
#[derive(Debug, Error)]
pub enum SerializeError {
    /// A field could not be converted to a [`Value`](crate::Value).
    #[error("failed to serialize field '{field}': {message}")]
    FieldError { field: String, message: String },
    /// Format encoding error (RON/bincode).
    #[error("format error: {0}")]
    FormatError(String),
}

/// Errors that can occur during asset deserialization.
///
/// Structural errors abort the collection being read and are returned to the
/// caller. Per-entry problems ([`CorruptTombstone`](Self::CorruptTombstone),
/// [`DuplicateItemId`](Self::DuplicateItemId), ...) are reported through
/// [`DeserializeContext::report`](crate::DeserializeContext::report) and
/// processing continues.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeserializeError {
    /// A type lacks support the deserializer requires, such as constructing
    /// an empty collection. Writing never needs that support, so this only
    /// occurs on load.
    #[error("configuration error for '{type_name}': {message}")]
    Configuration {
        type_name: &'static str,
        message: String,
    },
    /// A required field was missing from the serialized data.
    #[error("missing field '{field}'")]
    MissingField { field: String },
    /// The document shape disagrees with the declared type.
    #[error("type mismatch for '{context}': expected {expected}, found {found}")]
    TypeMismatch {
        context: String,
        expected: String,
        found: String,
    },
    /// A mapping key could not be decoded as the declared key type.
    #[error("invalid key '{key}', expected {expected}")]
    InvalidKey { key: String, expected: String },
    /// An item id could not be parsed.
    #[error("invalid item id '{text}'")]
    InvalidItemId { text: String },
    /// The same item id appears on more than one live item.
    #[error("item id {id} is used by more than one item")]
    DuplicateItemId { id: ItemId },
    /// The same key appears more than once in one collection.
    #[error("key '{key}' appears more than once")]
    DuplicateKey { key: String },
    /// The sentinel of a tombstone entry did not decode.
    #[error("corrupt tombstone for item id {id}: found {found}")]
    CorruptTombstone { id: ItemId, found: String },
    /// Format decoding error.
    #[error("format error: {0}")]
    FormatError(String),
}

/// Errors that can occur while loading [`SerializerSettings`](crate::SerializerSettings).
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    /// The settings file is not valid TOML for the settings schema.
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
}
