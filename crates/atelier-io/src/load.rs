//! Open any supported document file.

use crate::archive;
use crate::error::IoError;
use crate::filetype::{FileType, detect};
use crate::snapshot;
use atelier_core::Document;
use std::collections::BTreeMap;

/// A loaded document with the image bytes that came with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub version: String,
    pub document: Document,
    /// Empty for plain JSON snapshots.
    pub images: BTreeMap<String, Vec<u8>>,
}

/// Load an archive or a JSON snapshot. `name` only breaks ties when the
/// content doesn't identify itself.
///
/// # Errors
/// - `UnsupportedFileType` for anything that isn't a document.
/// - Archive or snapshot decoding failures.
pub fn load(bytes: &[u8], name: Option<&str>) -> Result<Loaded, IoError> {
    match detect(bytes, name) {
        FileType::Archive => {
            let unpacked = archive::unpack(bytes)?;
            log::debug!(
                "loaded archive v{} ({} images, {} bitmaps)",
                unpacked.version,
                unpacked.images.len(),
                unpacked.bitmaps.len()
            );
            Ok(Loaded {
                version: unpacked.version,
                document: unpacked.document,
                images: unpacked.images,
            })
        }
        FileType::Json => {
            let text = std::str::from_utf8(bytes)
                .map_err(|_| IoError::UnsupportedFileType("json (not utf-8)".to_string()))?;
            let snapshot = snapshot::from_json(text)?;
            Ok(Loaded {
                version: snapshot.version,
                document: snapshot.document,
                images: BTreeMap::new(),
            })
        }
        other => Err(IoError::UnsupportedFileType(
            name.map_or_else(|| format!("{other:?}"), str::to_string),
        )),
    }
}
