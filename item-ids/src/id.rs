//! Opaque identifier assigned to a single collection item.
//!
//! An [`ItemId`] is a 128-bit value backed by [`Uuid`]. It is generated once
//! when an item first gains identity and then preserved verbatim across
//! load → edit → save cycles, independently of the item's key or position.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::ItemIdError;

/// Identifier of one collection item.
///
/// The text form is 32 lowercase hex digits without dashes, e.g.
/// `"6f1c0b7a2d3e4f5a8b9c0d1e2f3a4b5c"`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ItemId(Uuid);

impl ItemId {
    /// The nil identifier. Never assigned to an item.
    pub const EMPTY: Self = Self(Uuid::nil());

    /// Number of characters in the text form.
    pub const TEXT_LEN: usize = 32;

    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Build an identifier from its raw bytes.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Raw bytes of this identifier.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Whether this is [`ItemId::EMPTY`].
    pub fn is_empty(&self) -> bool {
        self.0.is_nil()
    }

    /// Parse the strict 32-hex-digit text form used in documents.
    ///
    /// Unlike [`FromStr`], this rejects hyphenated UUID text, so it can be
    /// used to recognize identifiers embedded in larger keys.
    pub fn parse_compact(text: &str) -> Option<Self> {
        if text.len() != Self::TEXT_LEN || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        Uuid::parse_str(text).ok().map(Self)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.0.simple())
    }
}

impl FromStr for ItemId {
    type Err = ItemIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ItemIdError::InvalidText { text: s.to_owned() })
    }
}

impl From<Uuid> for ItemId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Serialize for ItemId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ItemIdVisitor;

        impl Visitor<'_> for ItemIdVisitor {
            type Value = ItemId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an item id as 32 hex digits")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ItemId, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(ItemIdVisitor)
    }
}
