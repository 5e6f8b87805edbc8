//! Per-type annotations that opt collections in or out of item identity.

use std::collections::{BTreeMap, HashMap, VecDeque};

use indexmap::IndexMap;

/// How a collection is laid out in a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DataStyle {
    /// One entry per line, with room for item ids.
    #[default]
    Normal,
    /// Inline layout. Has no room for item ids.
    Compact,
}

/// Annotations a collection type declares about itself.
///
/// The standard collections use the defaults. A collection newtype overrides
/// the constants to opt out of identity tracking:
///
/// ```
/// use redlilium_asset_serialize::{CollectionAttributes, DataStyle};
///
/// struct Color(Vec<f32>);
///
/// impl CollectionAttributes for Color {
///     const STYLE: DataStyle = DataStyle::Compact;
/// }
/// ```
pub trait CollectionAttributes {
    /// Items are not individually identifiable (e.g. the components of a
    /// vector), so they never get ids.
    const NON_IDENTIFIABLE: bool = false;
    /// Declared document style.
    const STYLE: DataStyle = DataStyle::Normal;
}

/// Whether identity-augmented encoding applies to a collection type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Applicable,
    /// The type is annotated as not individually identifiable.
    NonIdentifiable,
    /// The type requests the compact style.
    Compact,
}

impl Eligibility {
    /// Decide from raw annotations. The non-identifiable marker wins over
    /// the style.
    pub const fn decide(non_identifiable: bool, style: DataStyle) -> Self {
        if non_identifiable {
            return Self::NonIdentifiable;
        }
        match style {
            DataStyle::Compact => Self::Compact,
            DataStyle::Normal => Self::Applicable,
        }
    }

    /// Decide for collection type `C`.
    pub const fn of<C: CollectionAttributes + ?Sized>() -> Self {
        Self::decide(C::NON_IDENTIFIABLE, C::STYLE)
    }

    pub const fn is_applicable(self) -> bool {
        matches!(self, Self::Applicable)
    }
}

impl<K, V, S> CollectionAttributes for HashMap<K, V, S> {}
impl<K, V> CollectionAttributes for BTreeMap<K, V> {}
impl<K, V, S> CollectionAttributes for IndexMap<K, V, S> {}
impl<T> CollectionAttributes for Vec<T> {}
impl<T> CollectionAttributes for VecDeque<T> {}
