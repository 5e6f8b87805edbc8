//! Serialization and deserialization contexts.
//!
//! Both contexts borrow the caller's [`ItemIdRegistry`], which is where
//! identity-tracked collections keep their identifier maps between saves
//! and loads. [`SerializeContext`] accumulates struct fields;
//! [`DeserializeContext`] hands them out and collects non-fatal reports.
//!
//! Struct helpers nest: every `begin_struct`/`load_data` opens a frame that
//! the matching `end_struct` closes, so a field value may itself be a
//! struct written through the same context.

use std::collections::HashMap;

use redlilium_item_ids::ItemIdRegistry;

use crate::asset::{AssetDeserialize, AssetSerialize};
use crate::error::{DeserializeError, SerializeError};
use crate::settings::SerializerSettings;
use crate::value::{self, Value};

// ---------------------------------------------------------------------------
// SerializeContext
// ---------------------------------------------------------------------------

/// Context for serializing one asset.
pub struct SerializeContext<'r> {
    registry: &'r mut ItemIdRegistry,
    settings: SerializerSettings,
    frames: Vec<Vec<(String, Value)>>,
}

impl<'r> SerializeContext<'r> {
    /// Create a context with default settings.
    pub fn new(registry: &'r mut ItemIdRegistry) -> Self {
        Self::with_settings(registry, SerializerSettings::default())
    }

    pub fn with_settings(registry: &'r mut ItemIdRegistry, settings: SerializerSettings) -> Self {
        Self {
            registry,
            settings,
            frames: Vec::new(),
        }
    }

    pub fn registry(&self) -> &ItemIdRegistry {
        self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ItemIdRegistry {
        self.registry
    }

    pub fn settings(&self) -> &SerializerSettings {
        &self.settings
    }

    /// Begin serializing a struct.
    pub fn begin_struct(&mut self, name: &str) -> Result<(), SerializeError> {
        log::trace!("begin struct {name} (depth {})", self.frames.len());
        self.frames.push(Vec::new());
        Ok(())
    }

    /// Write a pre-built Value for a field.
    pub fn write_field(&mut self, name: &str, value: Value) -> Result<(), SerializeError> {
        let frame = self
            .frames
            .last_mut()
            .ok_or_else(|| SerializeError::FieldError {
                field: name.to_owned(),
                message: "write_field called outside begin_struct/end_struct".into(),
            })?;
        frame.push((name.to_owned(), value));
        Ok(())
    }

    /// Write a serde-serializable value as a field.
    pub fn write_serde<T: serde::Serialize>(
        &mut self,
        name: &str,
        val: &T,
    ) -> Result<(), SerializeError> {
        let value = value::to_value(val).map_err(|e| SerializeError::FieldError {
            field: name.to_owned(),
            message: e.to_string(),
        })?;
        self.write_field(name, value)
    }

    /// Write a field through [`AssetSerialize`], so identity-tracked
    /// collections keep their item ids.
    pub fn write_asset<T: AssetSerialize + ?Sized>(
        &mut self,
        name: &str,
        val: &T,
    ) -> Result<(), SerializeError> {
        let value = val.serialize_asset(self)?;
        self.write_field(name, value)
    }

    /// Finish struct serialization and return the accumulated fields as a Value.
    pub fn end_struct(&mut self) -> Result<Value, SerializeError> {
        let fields = self.frames.pop().ok_or_else(|| SerializeError::FieldError {
            field: String::new(),
            message: "end_struct called without begin_struct".into(),
        })?;
        Ok(Value::Map(fields))
    }
}

// ---------------------------------------------------------------------------
// DeserializeContext
// ---------------------------------------------------------------------------

/// Context for deserializing one asset.
///
/// Problems that only affect a single entry (a corrupt tombstone, a
/// duplicated id) do not abort the load; they are logged and collected in
/// [`reports`](Self::reports).
pub struct DeserializeContext<'r> {
    registry: &'r mut ItemIdRegistry,
    settings: SerializerSettings,
    frames: Vec<HashMap<String, Value>>,
    reports: Vec<DeserializeError>,
}

impl<'r> DeserializeContext<'r> {
    /// Create a context with default settings.
    pub fn new(registry: &'r mut ItemIdRegistry) -> Self {
        Self::with_settings(registry, SerializerSettings::default())
    }

    pub fn with_settings(registry: &'r mut ItemIdRegistry, settings: SerializerSettings) -> Self {
        Self {
            registry,
            settings,
            frames: Vec::new(),
            reports: Vec::new(),
        }
    }

    pub fn registry(&self) -> &ItemIdRegistry {
        self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ItemIdRegistry {
        self.registry
    }

    pub fn settings(&self) -> &SerializerSettings {
        &self.settings
    }

    /// Load serialized struct data into the context.
    ///
    /// Call this before [`begin_struct`](Self::begin_struct) and the field
    /// reads; [`end_struct`](Self::end_struct) releases it.
    pub fn load_data(&mut self, data: Value) -> Result<(), DeserializeError> {
        match data {
            Value::Map(entries) => {
                self.frames.push(entries.into_iter().collect());
                Ok(())
            }
            other => Err(DeserializeError::TypeMismatch {
                context: "struct".into(),
                expected: "map".into(),
                found: other.kind().into(),
            }),
        }
    }

    /// Begin deserializing a struct.
    ///
    /// Fields should already be loaded via [`load_data`](Self::load_data).
    pub fn begin_struct(&mut self, name: &str) -> Result<(), DeserializeError> {
        if self.frames.is_empty() {
            return Err(DeserializeError::FormatError(format!(
                "begin_struct({name}) called before load_data"
            )));
        }
        Ok(())
    }

    /// Read a raw Value for a field.
    pub fn read_field(&mut self, name: &str) -> Result<Value, DeserializeError> {
        self.read_optional_field(name)
            .ok_or_else(|| DeserializeError::MissingField {
                field: name.to_owned(),
            })
    }

    /// Read a field that may be absent.
    pub fn read_optional_field(&mut self, name: &str) -> Option<Value> {
        self.frames.last_mut()?.remove(name)
    }

    /// Read a serde-deserializable value from a field.
    pub fn read_serde<T: serde::de::DeserializeOwned>(
        &mut self,
        name: &str,
    ) -> Result<T, DeserializeError> {
        let val = self.read_field(name)?;
        value::from_value(val)
    }

    /// Read a field through [`AssetDeserialize`].
    pub fn read_asset<T: AssetDeserialize>(&mut self, name: &str) -> Result<T, DeserializeError> {
        let val = self.read_field(name)?;
        T::deserialize_asset(val, self)
    }

    /// Read a field into an existing value.
    ///
    /// Identity-tracked collections keep their handle, so identifier maps
    /// fetched before the load see the loaded ids.
    pub fn read_asset_into<T: AssetDeserialize>(
        &mut self,
        name: &str,
        target: &mut T,
    ) -> Result<(), DeserializeError> {
        let val = self.read_field(name)?;
        target.deserialize_asset_in_place(val, self)
    }

    /// Finish struct deserialization.
    pub fn end_struct(&mut self) -> Result<(), DeserializeError> {
        let fields = self.frames.pop().ok_or_else(|| {
            DeserializeError::FormatError("end_struct called without load_data".into())
        })?;
        if !fields.is_empty() {
            let mut unknown: Vec<_> = fields.keys().map(String::as_str).collect();
            unknown.sort_unstable();
            log::debug!("ignoring unknown fields: {}", unknown.join(", "));
        }
        Ok(())
    }

    /// Record a non-fatal problem.
    pub fn report(&mut self, error: DeserializeError) {
        log::warn!("{error}");
        self.reports.push(error);
    }

    /// Problems reported so far.
    pub fn reports(&self) -> &[DeserializeError] {
        &self.reports
    }

    /// Take the reported problems, leaving the list empty.
    pub fn take_reports(&mut self) -> Vec<DeserializeError> {
        std::mem::take(&mut self.reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_structs_use_separate_frames() {
        let mut registry = ItemIdRegistry::new();
        let mut ctx = SerializeContext::new(&mut registry);
        ctx.begin_struct("Outer").unwrap();
        ctx.write_serde("a", &1u32).unwrap();
        ctx.begin_struct("Inner").unwrap();
        ctx.write_serde("b", &true).unwrap();
        let inner = ctx.end_struct().unwrap();
        ctx.write_field("inner", inner).unwrap();
        let outer = ctx.end_struct().unwrap();

        assert_eq!(
            outer,
            Value::Map(vec![
                ("a".into(), Value::U64(1)),
                (
                    "inner".into(),
                    Value::Map(vec![("b".into(), Value::Bool(true))])
                ),
            ])
        );
    }

    #[test]
    fn write_outside_struct_is_an_error() {
        let mut registry = ItemIdRegistry::new();
        let mut ctx = SerializeContext::new(&mut registry);
        assert!(ctx.write_field("x", Value::Null).is_err());
        assert!(ctx.end_struct().is_err());
    }

    #[test]
    fn read_fields_and_missing_field() {
        let mut registry = ItemIdRegistry::new();
        let mut ctx = DeserializeContext::new(&mut registry);
        ctx.load_data(Value::Map(vec![
            ("name".into(), Value::String("rock".into())),
            ("count".into(), Value::U64(4)),
        ]))
        .unwrap();
        ctx.begin_struct("Thing").unwrap();

        assert_eq!(ctx.read_serde::<String>("name").unwrap(), "rock");
        assert_eq!(ctx.read_serde::<u32>("count").unwrap(), 4);
        assert_eq!(ctx.read_optional_field("flag"), None);
        assert_eq!(
            ctx.read_field("count"),
            Err(DeserializeError::MissingField {
                field: "count".into()
            })
        );
        ctx.end_struct().unwrap();
    }

    #[test]
    fn load_data_requires_a_map() {
        let mut registry = ItemIdRegistry::new();
        let mut ctx = DeserializeContext::new(&mut registry);
        assert!(matches!(
            ctx.load_data(Value::I64(3)),
            Err(DeserializeError::TypeMismatch { .. })
        ));
        assert!(ctx.begin_struct("Thing").is_err());
    }

    #[test]
    fn reports_are_collected() {
        let mut registry = ItemIdRegistry::new();
        let mut ctx = DeserializeContext::new(&mut registry);
        ctx.report(DeserializeError::DuplicateKey { key: "a".into() });
        assert_eq!(ctx.reports().len(), 1);
        assert_eq!(ctx.take_reports().len(), 1);
        assert!(ctx.reports().is_empty());
    }
}
