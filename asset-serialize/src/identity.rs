//! Where a document keeps the ids of a collection's items.
//!
//! Current documents wrap every key with its id (see
//! [`wrappers`](crate::wrappers)). Older documents stored the id as a `~Id`
//! member inside each item value instead. [`IdentitySource::resolve`] tells
//! the two apart once per collection, and [`synthesize_wrapped_entries`]
//! rewrites a legacy collection into wrapped entries so that both go through
//! the same insertion path.

use std::str::FromStr;

use redlilium_item_ids::ItemId;

use crate::collection_with_ids::CollectionKind;
use crate::context::DeserializeContext;
use crate::error::DeserializeError;
use crate::value::Value;
use crate::wrappers::{LEGACY_ID_MEMBER, WireKey, live_wire_key};

/// Identity encoding found in a document.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentitySource {
    /// A mapping of wrapped keys and tombstones.
    WrappedKey(Value),
    /// A plain collection whose items may carry a `~Id` member.
    SideMemberLegacy(Value),
}

impl IdentitySource {
    /// Decide how `value` encodes item identity.
    ///
    /// A mapping whose keys all have the wrapped form of `kind` (tombstones
    /// included) is [`WrappedKey`](Self::WrappedKey); an empty mapping
    /// counts as one. A mapping where no key has that form is a legacy
    /// dictionary, and a sequence is a legacy list. A mapping that mixes
    /// both is rejected with [`DeserializeError::InvalidKey`] naming the
    /// first key out of place.
    pub fn resolve(
        value: Value,
        kind: CollectionKind,
        accept_legacy: bool,
        context: &str,
    ) -> Result<Self, DeserializeError> {
        if let Some(entries) = value.as_map() {
            let stray = entries
                .iter()
                .find(|(key, _)| !fits(key, kind))
                .map(|(key, _)| key.clone());
            let mixed = entries.iter().any(|(key, _)| fits(key, kind));
            match stray {
                None => return Ok(Self::WrappedKey(value)),
                Some(key) if mixed => {
                    return Err(DeserializeError::InvalidKey {
                        key,
                        expected: kind.wire_form().into(),
                    });
                }
                Some(_) => {}
            }
        }
        let legacy = match (&value, kind) {
            (Value::Map(_), CollectionKind::Dictionary) => true,
            (Value::List(_), CollectionKind::List) => true,
            _ => false,
        };
        if legacy && accept_legacy {
            return Ok(Self::SideMemberLegacy(value));
        }
        let found = if legacy {
            "legacy collection with ~Id members"
        } else {
            value.kind()
        };
        Err(DeserializeError::TypeMismatch {
            context: context.to_owned(),
            expected: kind.wire_form().into(),
            found: found.into(),
        })
    }
}

/// Whether `key` is a wrapped key of a `kind` collection.
fn fits(key: &str, kind: CollectionKind) -> bool {
    match (WireKey::classify(key), kind) {
        (WireKey::Deleted(_), _) => true,
        (WireKey::Live { key: Some(_), .. }, CollectionKind::Dictionary) => true,
        (WireKey::Live { key: None, .. }, CollectionKind::List) => true,
        _ => false,
    }
}

/// Remove the `~Id` member of a legacy item value.
///
/// `Ok(None)` if the item has no such member.
pub fn take_legacy_id(item: &mut Value) -> Result<Option<ItemId>, DeserializeError> {
    let Value::Map(members) = item else {
        return Ok(None);
    };
    let Some(position) = members.iter().position(|(name, _)| name == LEGACY_ID_MEMBER) else {
        return Ok(None);
    };
    let (_, raw) = members.remove(position);
    match raw {
        Value::String(text) => ItemId::from_str(&text)
            .map(Some)
            .map_err(|_| DeserializeError::InvalidItemId { text }),
        other => Err(DeserializeError::InvalidItemId {
            text: format!("{other:?}"),
        }),
    }
}

/// Turn legacy items into wrapped `(wire key, value)` entries.
///
/// `key_text` is the dictionary key of each item, `None` for list items.
/// Items without a usable `~Id` get a fresh id; an unparsable one is
/// reported.
pub fn synthesize_wrapped_entries(
    items: impl IntoIterator<Item = (Option<String>, Value)>,
    ctx: &mut DeserializeContext<'_>,
) -> Vec<(String, Value)> {
    items
        .into_iter()
        .map(|(key_text, mut item)| {
            let id = match take_legacy_id(&mut item) {
                Ok(Some(id)) if !id.is_empty() => id,
                Ok(_) => ItemId::new(),
                Err(error) => {
                    ctx.report(error);
                    ItemId::new()
                }
            };
            (live_wire_key(id, key_text.as_deref()), item)
        })
        .collect()
}
