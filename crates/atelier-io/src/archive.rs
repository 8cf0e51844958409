//! The `.atelier` archive: a zip container holding the encoded document
//! and its binary assets.
//!
//! ```text
//! manifest.json         {version, document_file, images, bitmaps, bitmap_versions}
//! document.atelier      MessagePack {version, document}, bitmaps stripped
//! document.json         optional JSON snapshot of the same document
//! images/<key>          raw image bytes
//! bitmaps/<key>.png     RGBA8 rasters, PNG-encoded
//! ```
//!
//! Bitmap pixels only live in `bitmaps/`; the document's own `bitmaps` map
//! is emptied before encoding and refilled on unpack.

use crate::error::IoError;
use crate::snapshot::{self, Snapshot};
use atelier_core::{DOCUMENT_VERSION, Document, RasterBitmap};
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const DOCUMENT_FILE: &str = "document.atelier";
pub const SNAPSHOT_FILE: &str = "document.json";
pub const IMAGES_DIR: &str = "images/";
pub const BITMAPS_DIR: &str = "bitmaps/";

/// Zip local-file-header signature, the first four bytes of any archive.
pub const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<String>,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub document_file: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub images: BTreeMap<String, ManifestImage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bitmaps: Vec<String>,
    /// Non-zero `RasterBitmap::version`s; PNG has nowhere to keep them.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bitmap_versions: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchiveOptions<'a> {
    pub version: &'a str,
    /// Also write `document.json`.
    pub include_snapshot: bool,
    pub compression: CompressionMethod,
}

impl Default for ArchiveOptions<'_> {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            include_snapshot: true,
            compression: CompressionMethod::Deflated,
        }
    }
}

/// An unpacked archive.
#[derive(Debug, Clone, PartialEq)]
pub struct Archive {
    pub version: String,
    pub manifest: Manifest,
    /// Bitmaps already reattached.
    pub document: Document,
    pub images: BTreeMap<String, Vec<u8>>,
    pub bitmaps: BTreeMap<String, RasterBitmap>,
}

// ─── Document entry ──────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct Envelope {
    version: String,
    document: Document,
}

/// Canonical binary form of `document`, without bitmap pixels.
///
/// # Errors
/// MessagePack encoding failure.
pub fn encode_document(document: &Document, version: &str) -> Result<Vec<u8>, IoError> {
    let mut document = document.clone();
    document.bitmaps.clear();
    let envelope = Envelope {
        version: version.to_string(),
        document,
    };
    Ok(rmp_serde::to_vec_named(&envelope)?)
}

/// Inverse of [`encode_document`]: `(version, document)`, bitmaps empty.
///
/// # Errors
/// Malformed MessagePack.
pub fn decode_document(bytes: &[u8]) -> Result<(String, Document), IoError> {
    let envelope: Envelope = rmp_serde::from_slice(bytes)?;
    Ok((envelope.version, envelope.document))
}

// ─── Bitmaps ─────────────────────────────────────────────────────────────

fn encode_png(key: &str, bitmap: &RasterBitmap) -> Result<Vec<u8>, IoError> {
    if !bitmap.is_well_formed() || bitmap.width == 0 || bitmap.height == 0 {
        return Err(IoError::MalformedBitmap(key.to_string()));
    }
    let mut out = Vec::new();
    PngEncoder::new(&mut out).write_image(
        &bitmap.data,
        bitmap.width,
        bitmap.height,
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(out)
}

fn decode_png(bytes: &[u8]) -> Result<RasterBitmap, IoError> {
    let rgba = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)?.into_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(RasterBitmap::new(width, height, rgba.into_raw()))
}

// ─── Pack ────────────────────────────────────────────────────────────────

fn image_ext(key: &str) -> Option<String> {
    let name = key.rsplit('/').next().unwrap_or(key);
    name.rsplit_once('.').map(|(_, ext)| ext.to_string())
}

/// Pack with [`ArchiveOptions::default`]. `bitmaps = None` takes the
/// document's own.
///
/// # Errors
/// See [`pack_with`].
pub fn pack(
    document: &Document,
    images: &BTreeMap<String, Vec<u8>>,
    bitmaps: Option<&BTreeMap<String, RasterBitmap>>,
) -> Result<Vec<u8>, IoError> {
    pack_with(document, images, bitmaps, &ArchiveOptions::default())
}

/// # Errors
/// - `MalformedBitmap` for a bitmap whose buffer doesn't match its size.
/// - Encoding and zip failures.
pub fn pack_with(
    document: &Document,
    images: &BTreeMap<String, Vec<u8>>,
    bitmaps: Option<&BTreeMap<String, RasterBitmap>>,
    options: &ArchiveOptions<'_>,
) -> Result<Vec<u8>, IoError> {
    let bitmaps = bitmaps.unwrap_or(&document.bitmaps);

    let manifest = Manifest {
        version: options.version.to_string(),
        document_file: DOCUMENT_FILE.to_string(),
        images: images
            .iter()
            .map(|(key, bytes)| {
                let entry = ManifestImage {
                    ext: image_ext(key),
                    bytes: bytes.len() as u64,
                };
                (key.clone(), entry)
            })
            .collect(),
        bitmaps: bitmaps.keys().cloned().collect(),
        bitmap_versions: bitmaps
            .iter()
            .filter(|(_, bitmap)| bitmap.version != 0)
            .map(|(key, bitmap)| (key.clone(), bitmap.version))
            .collect(),
    };

    let deflated = SimpleFileOptions::default().compression_method(options.compression);
    // PNG and most image formats are already compressed
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    zip.start_file(MANIFEST_FILE, deflated)?;
    zip.write_all(&serde_json::to_vec(&manifest)?)?;

    zip.start_file(DOCUMENT_FILE, deflated)?;
    zip.write_all(&encode_document(document, options.version)?)?;

    if options.include_snapshot {
        let mut persisted = document.clone();
        persisted.bitmaps.clear();
        let snapshot = Snapshot {
            version: options.version.to_string(),
            document: persisted,
        };
        zip.start_file(SNAPSHOT_FILE, deflated)?;
        zip.write_all(snapshot::to_json(&snapshot)?.as_bytes())?;
    }

    if !images.is_empty() {
        zip.add_directory(IMAGES_DIR, stored)?;
        for (key, bytes) in images {
            zip.start_file(format!("{IMAGES_DIR}{key}"), stored)?;
            zip.write_all(bytes)?;
        }
    }

    if !bitmaps.is_empty() {
        zip.add_directory(BITMAPS_DIR, stored)?;
        for (key, bitmap) in bitmaps {
            let png = encode_png(key, bitmap)?;
            zip.start_file(format!("{BITMAPS_DIR}{key}.png"), stored)?;
            zip.write_all(&png)?;
        }
    }

    let bytes = zip.finish()?.into_inner();
    log::debug!(
        "packed archive: {} image(s), {} bitmap(s), {} bytes",
        images.len(),
        bitmaps.len(),
        bytes.len()
    );
    Ok(bytes)
}

// ─── Unpack ──────────────────────────────────────────────────────────────

pub fn is_archive(bytes: &[u8]) -> bool {
    bytes.starts_with(&ZIP_MAGIC)
}

/// # Errors
/// - `MissingEntry` when the manifest or the document entry is absent.
/// - Zip, MessagePack, JSON and PNG decoding failures.
pub fn unpack(bytes: &[u8]) -> Result<Archive, IoError> {
    let mut zip = ZipArchive::new(Cursor::new(bytes))?;

    let mut manifest_bytes = None;
    let mut document_bytes = None;
    let mut images = BTreeMap::new();
    let mut bitmaps = BTreeMap::new();

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let mut data = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        entry.read_to_end(&mut data)?;

        if name == MANIFEST_FILE {
            manifest_bytes = Some(data);
        } else if name == DOCUMENT_FILE {
            document_bytes = Some(data);
        } else if let Some(key) = name.strip_prefix(IMAGES_DIR) {
            images.insert(key.to_string(), data);
        } else if let Some(key) = name
            .strip_prefix(BITMAPS_DIR)
            .and_then(|rest| rest.strip_suffix(".png"))
        {
            bitmaps.insert(key.to_string(), decode_png(&data)?);
        } else {
            log::trace!("unpack: ignored entry {name}");
        }
    }

    let manifest: Manifest = serde_json::from_slice(
        &manifest_bytes.ok_or_else(|| IoError::MissingEntry(MANIFEST_FILE.to_string()))?,
    )?;
    let document_bytes =
        document_bytes.ok_or_else(|| IoError::MissingEntry(manifest.document_file.clone()))?;
    for (key, bitmap) in &mut bitmaps {
        if let Some(version) = manifest.bitmap_versions.get(key) {
            bitmap.version = *version;
        }
    }
    let (version, mut document) = decode_document(&document_bytes)?;
    document.bitmaps = bitmaps.clone();

    Ok(Archive {
        version,
        manifest,
        document,
        images,
        bitmaps,
    })
}

// ─── Snapshot conversions ────────────────────────────────────────────────

/// The JSON snapshot view of an archive. Image bytes are dropped.
pub fn archive_to_snapshot(archive: Archive) -> Snapshot {
    Snapshot {
        version: archive.version,
        document: archive.document,
    }
}

/// Pack a snapshot, moving its inline bitmaps into the bitmap section.
///
/// # Errors
/// See [`pack_with`].
pub fn snapshot_to_archive(
    snapshot: &Snapshot,
    images: &BTreeMap<String, Vec<u8>>,
) -> Result<Vec<u8>, IoError> {
    let options = ArchiveOptions {
        version: &snapshot.version,
        ..ArchiveOptions::default()
    };
    pack_with(&snapshot.document, images, None, &options)
}
