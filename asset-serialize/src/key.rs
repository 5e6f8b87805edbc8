//! Textual form of dictionary keys.

use std::hash::Hash;

use redlilium_item_ids::ItemId;
use uuid::Uuid;

/// A dictionary key type that can appear in a document.
///
/// Document mappings are keyed by strings, so every key type needs a
/// lossless textual form. Custom key types implement this trait directly.
pub trait ItemKey: Clone + Eq + Hash + Send + Sync + 'static {
    /// Textual form written to the document.
    fn to_key_string(&self) -> String;

    /// Parse the textual form. `None` if `text` is not a valid key.
    fn from_key_string(text: &str) -> Option<Self>;
}

impl ItemKey for String {
    fn to_key_string(&self) -> String {
        self.clone()
    }

    fn from_key_string(text: &str) -> Option<Self> {
        Some(text.to_owned())
    }
}

macro_rules! impl_item_key_via_from_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ItemKey for $ty {
                fn to_key_string(&self) -> String {
                    self.to_string()
                }

                fn from_key_string(text: &str) -> Option<Self> {
                    text.parse().ok()
                }
            }
        )*
    };
}

impl_item_key_via_from_str!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, char, ItemId, Uuid,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_are_verbatim() {
        let key = "with~tilde and spaces".to_string();
        assert_eq!(key.to_key_string(), key);
        assert_eq!(String::from_key_string(&key), Some(key));
    }

    #[test]
    fn integers_parse_back() {
        assert_eq!((-42i32).to_key_string(), "-42");
        assert_eq!(i32::from_key_string("-42"), Some(-42));
        assert_eq!(u8::from_key_string("256"), None);
    }

    #[test]
    fn ids_use_compact_text() {
        let id = ItemId::new();
        assert_eq!(ItemId::from_key_string(&id.to_key_string()), Some(id));
        assert_eq!(ItemId::from_key_string("nope"), None);
    }
}
