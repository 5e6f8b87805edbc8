//! Asset-level serialization traits.
//!
//! Any serde type is an asset through the blanket impls below. Types that
//! hold identity-tracked collections ([`Tracked`](crate::Tracked)) implement
//! the traits by hand with the struct helpers of the contexts:
//!
//! ```
//! use std::collections::HashMap;
//! use redlilium_asset_serialize::*;
//!
//! struct Material {
//!     name: String,
//!     params: Tracked<HashMap<String, f32>>,
//! }
//!
//! impl AssetSerialize for Material {
//!     fn serialize_asset(&self, ctx: &mut SerializeContext<'_>) -> Result<Value, SerializeError> {
//!         ctx.begin_struct("Material")?;
//!         ctx.write_serde("name", &self.name)?;
//!         ctx.write_asset("params", &self.params)?;
//!         ctx.end_struct()
//!     }
//! }
//!
//! impl AssetDeserialize for Material {
//!     fn deserialize_asset(
//!         value: Value,
//!         ctx: &mut DeserializeContext<'_>,
//!     ) -> Result<Self, DeserializeError> {
//!         ctx.load_data(value)?;
//!         ctx.begin_struct("Material")?;
//!         let name = ctx.read_serde("name")?;
//!         let params = ctx.read_asset("params")?;
//!         ctx.end_struct()?;
//!         Ok(Self { name, params })
//!     }
//! }
//! ```

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::context::{DeserializeContext, SerializeContext};
use crate::error::{DeserializeError, SerializeError};
use crate::value::{self, Value};

/// Convert a value into a document [`Value`].
pub trait AssetSerialize {
    fn serialize_asset(&self, ctx: &mut SerializeContext<'_>) -> Result<Value, SerializeError>;
}

/// Rebuild a value from a document [`Value`].
pub trait AssetDeserialize: Sized {
    fn deserialize_asset(
        value: Value,
        ctx: &mut DeserializeContext<'_>,
    ) -> Result<Self, DeserializeError>;

    /// Load into an existing value.
    ///
    /// The default replaces `self`. Identity-tracked collections override it
    /// to keep their handle.
    fn deserialize_asset_in_place(
        &mut self,
        value: Value,
        ctx: &mut DeserializeContext<'_>,
    ) -> Result<(), DeserializeError> {
        *self = Self::deserialize_asset(value, ctx)?;
        Ok(())
    }
}

impl<T: Serialize> AssetSerialize for T {
    fn serialize_asset(&self, _ctx: &mut SerializeContext<'_>) -> Result<Value, SerializeError> {
        value::to_value(self)
    }
}

impl<T: DeserializeOwned> AssetDeserialize for T {
    fn deserialize_asset(
        value: Value,
        _ctx: &mut DeserializeContext<'_>,
    ) -> Result<Self, DeserializeError> {
        value::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use redlilium_item_ids::ItemIdRegistry;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Point {
        x: f32,
        y: f32,
    }

    #[test]
    fn serde_types_are_assets() {
        let mut registry = ItemIdRegistry::new();
        let point = Point { x: 1.5, y: -2.0 };
        let value = point
            .serialize_asset(&mut SerializeContext::new(&mut registry))
            .unwrap();
        assert_eq!(value.get("x"), Some(&Value::F32(1.5)));

        let back =
            Point::deserialize_asset(value, &mut DeserializeContext::new(&mut registry)).unwrap();
        assert_eq!(back, point);
    }

    #[test]
    fn in_place_default_replaces_the_value() {
        let mut registry = ItemIdRegistry::new();
        let mut ctx = DeserializeContext::new(&mut registry);
        let mut names = vec!["old".to_string()];
        names
            .deserialize_asset_in_place(Value::List(vec![Value::String("new".into())]), &mut ctx)
            .unwrap();
        assert_eq!(names, vec!["new".to_string()]);
    }
}
