//! Mapping-level read/write primitives over the [`Value`] tree.
//!
//! Collection serializers never build document text themselves; they emit
//! and consume mapping entries through [`MappingWriter`] and
//! [`MappingReader`], the same way serde's `SerializeMap`/`MapAccess` pair
//! drives [`Value`] conversion.

use crate::error::DeserializeError;
use crate::value::Value;

/// Accumulates the entries of one mapping.
#[derive(Debug, Default)]
pub struct MappingWriter {
    entries: Vec<(String, Value)>,
}

impl MappingWriter {
    /// Start a mapping, reserving room for `len_hint` entries.
    pub fn begin_mapping(len_hint: usize) -> Self {
        Self {
            entries: Vec::with_capacity(len_hint),
        }
    }

    /// Append one `key: value` entry.
    pub fn write_mapping_entry(&mut self, key: impl Into<String>, value: Value) {
        self.entries.push((key.into(), value));
    }

    /// Number of entries written so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finish the mapping.
    pub fn end_mapping(self) -> Value {
        Value::Map(self.entries)
    }
}

/// Walks the entries of one mapping in document order.
#[derive(Debug)]
pub struct MappingReader {
    entries: std::vec::IntoIter<(String, Value)>,
    pending_value: Option<Value>,
}

impl MappingReader {
    /// Start reading `value`, which must be a [`Value::Map`].
    ///
    /// `context` names what is being read, for error messages.
    pub fn begin_mapping(value: Value, context: &str) -> Result<Self, DeserializeError> {
        match value {
            Value::Map(entries) => Ok(Self::from_entries(entries)),
            other => Err(DeserializeError::TypeMismatch {
                context: context.to_owned(),
                expected: "map".into(),
                found: other.kind().into(),
            }),
        }
    }

    /// Read already-extracted mapping entries.
    pub fn from_entries(entries: Vec<(String, Value)>) -> Self {
        Self {
            entries: entries.into_iter(),
            pending_value: None,
        }
    }

    /// Advance to the next entry and return its key.
    ///
    /// An unread value of the previous entry is skipped.
    pub fn read_next_key(&mut self) -> Option<String> {
        let (key, value) = self.entries.next()?;
        self.pending_value = Some(value);
        Some(key)
    }

    /// Take the value of the entry whose key was just read.
    pub fn read_value_for_key(&mut self) -> Result<Value, DeserializeError> {
        self.pending_value.take().ok_or_else(|| {
            DeserializeError::FormatError("read_value_for_key called before read_next_key".into())
        })
    }

    /// Number of entries not yet visited.
    pub fn remaining(&self) -> usize {
        self.entries.len()
    }

    /// Finish reading. Unvisited entries are discarded.
    pub fn end_mapping(self) {
        let skipped = self.entries.len();
        if skipped > 0 {
            log::debug!("mapping closed with {skipped} unread entries");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_preserves_order() {
        let mut writer = MappingWriter::begin_mapping(2);
        writer.write_mapping_entry("b", Value::I64(2));
        writer.write_mapping_entry("a", Value::I64(1));
        assert_eq!(writer.len(), 2);
        assert_eq!(
            writer.end_mapping(),
            Value::Map(vec![
                ("b".into(), Value::I64(2)),
                ("a".into(), Value::I64(1)),
            ])
        );
    }

    #[test]
    fn reader_walks_entries() {
        let value = Value::Map(vec![
            ("x".into(), Value::Bool(true)),
            ("y".into(), Value::Null),
        ]);
        let mut reader = MappingReader::begin_mapping(value, "test").unwrap();
        assert_eq!(reader.read_next_key().as_deref(), Some("x"));
        assert_eq!(reader.read_value_for_key().unwrap(), Value::Bool(true));
        assert_eq!(reader.remaining(), 1);
        assert_eq!(reader.read_next_key().as_deref(), Some("y"));
        assert_eq!(reader.read_value_for_key().unwrap(), Value::Null);
        assert_eq!(reader.read_next_key(), None);
        reader.end_mapping();
    }

    #[test]
    fn value_without_key_is_an_error() {
        let mut reader = MappingReader::from_entries(Vec::new());
        assert!(reader.read_value_for_key().is_err());
    }

    #[test]
    fn non_map_is_a_type_mismatch() {
        let err = MappingReader::begin_mapping(Value::List(vec![]), "items").unwrap_err();
        assert_eq!(
            err,
            DeserializeError::TypeMismatch {
                context: "items".into(),
                expected: "map".into(),
                found: "list".into(),
            }
        );
    }
}
