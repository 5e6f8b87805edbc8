//! Format-agnostic document tree.
//!
//! [`Value`] is the tree that asset documents are built from before being
//! encoded with a concrete [`Format`](crate::Format). Besides plain data it
//! carries [`Value::Deleted`], the sentinel stored in tombstone entries of
//! identity-tracked collections.
//!
//! Use [`to_value`] and [`from_value`] to convert between arbitrary serde
//! types and `Value`.

use std::fmt;

use serde::de::value::{
    MapAccessDeserializer, MapDeserializer, SeqDeserializer, StringDeserializer,
};
use serde::de::{self, Deserializer as _, IntoDeserializer, Visitor};
use serde::{Deserialize, Serialize, forward_to_deserialize_any, ser};
use thiserror::Error;

use crate::error::{DeserializeError, SerializeError};

/// Format-agnostic value representation for asset data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(Vec<(String, Value)>),
    /// Tombstone sentinel: "this item existed and was deleted".
    ///
    /// Only valid as the value of a deleted-item entry; it never encodes a
    /// payload.
    Deleted,
}

impl Value {
    /// Short name of the variant, used in type mismatch reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I64(_) => "i64",
            Value::U64(_) => "u64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Deleted => "deleted marker",
        }
    }

    /// The string payload, if this is a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The entries, if this is a [`Value::Map`].
    pub fn as_map(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a map entry by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }
}

/// Convert any `T: Serialize` into a [`Value`].
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, SerializeError> {
    value
        .serialize(ValueSerializer)
        .map_err(|e| SerializeError::FieldError {
            field: String::new(),
            message: e.to_string(),
        })
}

/// Convert a [`Value`] back into any `T: DeserializeOwned`.
pub fn from_value<T: de::DeserializeOwned>(value: Value) -> Result<T, DeserializeError> {
    T::deserialize(ValueDeserializer(value)).map_err(|e| DeserializeError::FormatError(e.0))
}

#[derive(Debug, Error)]
#[error("{0}")]
struct ValueError(String);

impl ser::Error for ValueError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        ValueError(msg.to_string())
    }
}

impl de::Error for ValueError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        ValueError(msg.to_string())
    }
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

struct ValueSerializer;

macro_rules! serialize_scalars {
    ($($method:ident: $ty:ty => $variant:ident),* $(,)?) => {
        $(
            fn $method(self, v: $ty) -> Result<Value, ValueError> {
                Ok(Value::$variant(v.into()))
            }
        )*
    };
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = ValueError;
    type SerializeSeq = Compound;
    type SerializeTuple = Compound;
    type SerializeTupleStruct = Compound;
    type SerializeTupleVariant = Compound;
    type SerializeMap = Compound;
    type SerializeStruct = Compound;
    type SerializeStructVariant = Compound;

    serialize_scalars! {
        serialize_bool: bool => Bool,
        serialize_i8: i8 => I64,
        serialize_i16: i16 => I64,
        serialize_i32: i32 => I64,
        serialize_i64: i64 => I64,
        serialize_u8: u8 => U64,
        serialize_u16: u16 => U64,
        serialize_u32: u32 => U64,
        serialize_u64: u64 => U64,
        serialize_f32: f32 => F32,
        serialize_f64: f64 => F64,
        serialize_char: char => String,
        serialize_str: &str => String,
        serialize_bytes: &[u8] => Bytes,
    }

    fn serialize_none(self) -> Result<Value, ValueError> {
        Ok(Value::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value, ValueError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, ValueError> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, ValueError> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<Value, ValueError> {
        Ok(Value::String(variant.to_owned()))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, ValueError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, ValueError> {
        Ok(tagged(variant, value.serialize(self)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Compound, ValueError> {
        Ok(Compound::list(None, len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<Compound, ValueError> {
        Ok(Compound::list(None, len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Compound, ValueError> {
        Ok(Compound::list(None, len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Compound, ValueError> {
        Ok(Compound::list(Some(variant), len))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Compound, ValueError> {
        Ok(Compound::map(None, len.unwrap_or(0)))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Compound, ValueError> {
        Ok(Compound::map(None, len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Compound, ValueError> {
        Ok(Compound::map(Some(variant), len))
    }
}

/// Enum variants with data become a single-entry map keyed by the variant.
fn tagged(variant: &str, value: Value) -> Value {
    Value::Map(vec![(variant.to_owned(), value)])
}

/// Text form of a map key. Numeric and boolean keys are written as text and
/// parsed back by [`KeyDeserializer`].
fn key_text(key: Value) -> Result<String, ValueError> {
    match key {
        Value::String(text) => Ok(text),
        Value::I64(n) => Ok(n.to_string()),
        Value::U64(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(ValueError(format!(
            "map keys must be strings, numbers or booleans, found {}",
            other.kind()
        ))),
    }
}

/// Builder shared by every compound serde shape.
struct Compound {
    variant: Option<&'static str>,
    body: Body,
}

enum Body {
    List(Vec<Value>),
    Map {
        entries: Vec<(String, Value)>,
        key: Option<String>,
    },
}

impl Compound {
    fn list(variant: Option<&'static str>, capacity: usize) -> Self {
        Self {
            variant,
            body: Body::List(Vec::with_capacity(capacity)),
        }
    }

    fn map(variant: Option<&'static str>, capacity: usize) -> Self {
        Self {
            variant,
            body: Body::Map {
                entries: Vec::with_capacity(capacity),
                key: None,
            },
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ValueError> {
        let value = value.serialize(ValueSerializer)?;
        match &mut self.body {
            Body::List(items) => items.push(value),
            Body::Map { entries, key } => {
                let key = key
                    .take()
                    .ok_or_else(|| ValueError("map value written without a key".into()))?;
                entries.push((key, value));
            }
        }
        Ok(())
    }

    fn push_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), ValueError> {
        let text = key_text(key.serialize(ValueSerializer)?)?;
        match &mut self.body {
            Body::Map { key, .. } => {
                *key = Some(text);
                Ok(())
            }
            Body::List(_) => Err(ValueError("key written into a sequence".into())),
        }
    }

    fn push_field<T: ?Sized + Serialize>(
        &mut self,
        name: &'static str,
        value: &T,
    ) -> Result<(), ValueError> {
        if let Body::Map { key, .. } = &mut self.body {
            *key = Some(name.to_owned());
        }
        self.push(value)
    }

    fn finish(self) -> Value {
        let value = match self.body {
            Body::List(items) => Value::List(items),
            Body::Map { entries, .. } => Value::Map(entries),
        };
        match self.variant {
            Some(variant) => tagged(variant, value),
            None => value,
        }
    }
}

macro_rules! impl_sequence_compound {
    ($($trait:ident :: $method:ident),* $(,)?) => {
        $(
            impl ser::$trait for Compound {
                type Ok = Value;
                type Error = ValueError;

                fn $method<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ValueError> {
                    self.push(value)
                }

                fn end(self) -> Result<Value, ValueError> {
                    Ok(self.finish())
                }
            }
        )*
    };
}

impl_sequence_compound!(
    SerializeSeq::serialize_element,
    SerializeTuple::serialize_element,
    SerializeTupleStruct::serialize_field,
    SerializeTupleVariant::serialize_field,
);

impl ser::SerializeMap for Compound {
    type Ok = Value;
    type Error = ValueError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), ValueError> {
        self.push_key(key)
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ValueError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, ValueError> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for Compound {
    type Ok = Value;
    type Error = ValueError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        name: &'static str,
        value: &T,
    ) -> Result<(), ValueError> {
        self.push_field(name, value)
    }

    fn end(self) -> Result<Value, ValueError> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for Compound {
    type Ok = Value;
    type Error = ValueError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        name: &'static str,
        value: &T,
    ) -> Result<(), ValueError> {
        self.push_field(name, value)
    }

    fn end(self) -> Result<Value, ValueError> {
        Ok(self.finish())
    }
}

// ---------------------------------------------------------------------------
// Deserialization
// ---------------------------------------------------------------------------

struct ValueDeserializer(Value);

impl<'de> IntoDeserializer<'de, ValueError> for ValueDeserializer {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

fn entry_deserializers(
    entries: Vec<(String, Value)>,
) -> impl Iterator<Item = (KeyDeserializer, ValueDeserializer)> {
    entries
        .into_iter()
        .map(|(key, value)| (KeyDeserializer(key), ValueDeserializer(value)))
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = ValueError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ValueError> {
        match self.0 {
            Value::Null => visitor.visit_unit(),
            Value::Bool(v) => visitor.visit_bool(v),
            Value::I64(v) => visitor.visit_i64(v),
            Value::U64(v) => visitor.visit_u64(v),
            Value::F32(v) => visitor.visit_f32(v),
            Value::F64(v) => visitor.visit_f64(v),
            Value::String(v) => visitor.visit_string(v),
            Value::Bytes(v) => visitor.visit_byte_buf(v),
            Value::List(items) => {
                SeqDeserializer::<_, ValueError>::new(items.into_iter().map(ValueDeserializer))
                    .deserialize_any(visitor)
            }
            Value::Map(entries) => {
                MapDeserializer::<_, ValueError>::new(entry_deserializers(entries))
                    .deserialize_any(visitor)
            }
            Value::Deleted => Err(ValueError(
                "a deleted-item marker cannot be read as a payload value".into(),
            )),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ValueError> {
        match self.0 {
            Value::Null => visitor.visit_none(),
            other => visitor.visit_some(ValueDeserializer(other)),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, ValueError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, ValueError> {
        match self.0 {
            Value::String(variant) => {
                visitor.visit_enum(StringDeserializer::<ValueError>::new(variant))
            }
            Value::Map(entries) if entries.len() == 1 => {
                let map = MapDeserializer::<_, ValueError>::new(entry_deserializers(entries));
                visitor.visit_enum(MapAccessDeserializer::new(map))
            }
            other => Err(ValueError(format!(
                "expected a variant name or a single-entry map, found {}",
                other.kind()
            ))),
        }
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ValueError> {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct identifier
    }
}

/// Deserializer for map keys, which are always stored as text.
struct KeyDeserializer(String);

impl<'de> IntoDeserializer<'de, ValueError> for KeyDeserializer {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

macro_rules! deserialize_parsed_key {
    ($($method:ident => $visit:ident($ty:ty)),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ValueError> {
                match self.0.parse::<$ty>() {
                    Ok(parsed) => visitor.$visit(parsed),
                    Err(_) => visitor.visit_string(self.0),
                }
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for KeyDeserializer {
    type Error = ValueError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ValueError> {
        visitor.visit_string(self.0)
    }

    deserialize_parsed_key! {
        deserialize_bool => visit_bool(bool),
        deserialize_i8 => visit_i8(i8),
        deserialize_i16 => visit_i16(i16),
        deserialize_i32 => visit_i32(i32),
        deserialize_i64 => visit_i64(i64),
        deserialize_u8 => visit_u8(u8),
        deserialize_u16 => visit_u16(u16),
        deserialize_u32 => visit_u32(u32),
        deserialize_u64 => visit_u64(u64),
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ValueError> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, ValueError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, ValueError> {
        visitor.visit_enum(StringDeserializer::<ValueError>::new(self.0))
    }

    forward_to_deserialize_any! {
        i128 u128 f32 f64 char str string bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}
