//! Whole-document save and load.
//!
//! A [`SerializedAsset`] is the on-disk representation of one asset: a
//! version number and the asset's [`Value`] tree. It is encoded with the
//! [`Format`](crate::Format) selected in [`SerializerSettings`].

use redlilium_item_ids::ItemIdRegistry;
use serde::{Deserialize, Serialize};

use crate::asset::{AssetDeserialize, AssetSerialize};
use crate::context::{DeserializeContext, SerializeContext};
use crate::error::{DeserializeError, SerializeError};
use crate::format;
use crate::settings::SerializerSettings;
use crate::value::Value;

/// Document layout version written by [`save_asset`].
pub const DOCUMENT_VERSION: u32 = 1;

/// A fully serialized asset, suitable for file I/O.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializedAsset {
    /// Document layout version.
    pub version: u32,
    /// The asset tree.
    pub data: Value,
}

/// An asset read by [`load_asset`], with the problems that did not abort
/// the load.
#[derive(Debug)]
pub struct LoadedAsset<T> {
    pub asset: T,
    pub reports: Vec<DeserializeError>,
}

/// Serialize `asset` into a document.
///
/// Ids assigned to new items are recorded in `registry`, so saving the same
/// in-memory asset again reuses them.
pub fn save_asset<T: AssetSerialize + ?Sized>(
    asset: &T,
    registry: &mut ItemIdRegistry,
    settings: &SerializerSettings,
) -> Result<Vec<u8>, SerializeError> {
    if settings.prune_registry {
        registry.prune();
    }
    let mut ctx = SerializeContext::with_settings(registry, settings.clone());
    let data = asset.serialize_asset(&mut ctx)?;
    let document = SerializedAsset {
        version: DOCUMENT_VERSION,
        data,
    };
    let bytes = format::encode(&document, settings.format)?;
    log::info!(
        "Saved asset document ({} bytes, {:?})",
        bytes.len(),
        settings.format
    );
    Ok(bytes)
}

/// Deserialize a document into a new asset.
pub fn load_asset<T: AssetDeserialize>(
    bytes: &[u8],
    registry: &mut ItemIdRegistry,
    settings: &SerializerSettings,
) -> Result<LoadedAsset<T>, DeserializeError> {
    let data = read_document(bytes, registry, settings)?;
    let mut ctx = DeserializeContext::with_settings(registry, settings.clone());
    let asset = T::deserialize_asset(data, &mut ctx)?;
    let reports = ctx.take_reports();
    log_loaded(bytes.len(), reports.len());
    Ok(LoadedAsset { asset, reports })
}

/// Deserialize a document into an existing asset.
///
/// Identity-tracked collections inside `target` keep their handles. Returns
/// the problems that did not abort the load.
pub fn load_asset_into<T: AssetDeserialize>(
    target: &mut T,
    bytes: &[u8],
    registry: &mut ItemIdRegistry,
    settings: &SerializerSettings,
) -> Result<Vec<DeserializeError>, DeserializeError> {
    let data = read_document(bytes, registry, settings)?;
    let mut ctx = DeserializeContext::with_settings(registry, settings.clone());
    target.deserialize_asset_in_place(data, &mut ctx)?;
    let reports = ctx.take_reports();
    log_loaded(bytes.len(), reports.len());
    Ok(reports)
}

fn read_document(
    bytes: &[u8],
    registry: &mut ItemIdRegistry,
    settings: &SerializerSettings,
) -> Result<Value, DeserializeError> {
    if settings.prune_registry {
        registry.prune();
    }
    let document: SerializedAsset = format::decode(bytes, settings.format)?;
    if document.version > DOCUMENT_VERSION {
        return Err(DeserializeError::FormatError(format!(
            "document version {} is newer than supported version {DOCUMENT_VERSION}",
            document.version
        )));
    }
    Ok(document.data)
}

fn log_loaded(len: usize, reports: usize) {
    if reports > 0 {
        log::info!("Loaded asset document ({len} bytes) with {reports} reported problems");
    } else {
        log::info!("Loaded asset document ({len} bytes)");
    }
}
