//! Byte encodings of asset documents.
//!
//! Each [`Format`] is backed by a codec module compiled in by its cargo
//! feature (`serialize-ron`, `serialize-bincode`). Asking for a format that
//! was not compiled in fails with a format error instead of panicking.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{DeserializeError, SerializeError};

/// Document encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Pretty-printed RON text; the format for files kept under version control.
    #[default]
    Ron,
    /// Bincode bytes.
    Bincode,
}

impl Format {
    /// Whether support for this format is compiled in.
    pub fn is_available(self) -> bool {
        match self {
            Format::Ron => cfg!(feature = "serialize-ron"),
            Format::Bincode => cfg!(feature = "serialize-bincode"),
        }
    }

    fn missing(self) -> String {
        format!("{self:?} support is not enabled in this build")
    }
}

#[cfg(feature = "serialize-ron")]
mod ron_codec {
    pub fn encode<T: serde::Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, String> {
        ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
            .map(String::into_bytes)
            .map_err(|e| e.to_string())
    }

    pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, String> {
        let text =
            std::str::from_utf8(bytes).map_err(|e| format!("document is not UTF-8: {e}"))?;
        ron::from_str(text).map_err(|e| e.to_string())
    }
}

#[cfg(feature = "serialize-bincode")]
mod bincode_codec {
    pub fn encode<T: serde::Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, String> {
        bincode::serialize(value).map_err(|e| e.to_string())
    }

    pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, String> {
        bincode::deserialize(bytes).map_err(|e| e.to_string())
    }
}

/// Encode `value` as `format`.
pub fn encode<T: Serialize + ?Sized>(
    value: &T,
    format: Format,
) -> Result<Vec<u8>, SerializeError> {
    let encoded = match format {
        #[cfg(feature = "serialize-ron")]
        Format::Ron => ron_codec::encode(value),
        #[cfg(feature = "serialize-bincode")]
        Format::Bincode => bincode_codec::encode(value),
        #[allow(unreachable_patterns)]
        other => Err(other.missing()),
    };
    encoded.map_err(SerializeError::FormatError)
}

/// Decode a `T` from bytes written as `format`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8], format: Format) -> Result<T, DeserializeError> {
    let decoded = match format {
        #[cfg(feature = "serialize-ron")]
        Format::Ron => ron_codec::decode(bytes),
        #[cfg(feature = "serialize-bincode")]
        Format::Bincode => bincode_codec::decode(bytes),
        #[allow(unreachable_patterns)]
        other => Err(other.missing()),
    };
    decoded.map_err(DeserializeError::FormatError)
}
