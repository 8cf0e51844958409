//! File-type sniffing for loads, drops and pasted files.

use crate::archive::is_archive;
use crate::error::IoError;
use image::ImageFormat;

/// Image types the canvas accepts directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageType {
    Svg,
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageType {
    pub fn mime(self) -> &'static str {
        match self {
            ImageType::Svg => "image/svg+xml",
            ImageType::Png => "image/png",
            ImageType::Jpeg => "image/jpeg",
            ImageType::Gif => "image/gif",
            ImageType::Webp => "image/webp",
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        // drop parameters such as "; charset=utf-8"
        let essence = mime.split(';').next().unwrap_or(mime).trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/svg+xml" => Some(ImageType::Svg),
            "image/png" => Some(ImageType::Png),
            "image/jpeg" => Some(ImageType::Jpeg),
            "image/gif" => Some(ImageType::Gif),
            "image/webp" => Some(ImageType::Webp),
            _ => None,
        }
    }

    pub fn from_extension(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "svg" => Some(ImageType::Svg),
            "png" => Some(ImageType::Png),
            "jpg" | "jpeg" => Some(ImageType::Jpeg),
            "gif" => Some(ImageType::Gif),
            "webp" => Some(ImageType::Webp),
            _ => None,
        }
    }

    fn from_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(ImageType::Png),
            ImageFormat::Jpeg => Some(ImageType::Jpeg),
            ImageFormat::Gif => Some(ImageType::Gif),
            ImageFormat::WebP => Some(ImageType::Webp),
            _ => None,
        }
    }
}

/// Validate a MIME type as one of the insertable image types.
///
/// # Errors
/// `UnsupportedImageType` carrying the rejected type.
pub fn image_mime(mime: &str) -> Result<ImageType, IoError> {
    ImageType::from_mime(mime).ok_or_else(|| IoError::UnsupportedImageType(mime.to_string()))
}

/// Resolve a dropped or pasted file: the MIME type first, then the
/// file-name extension.
///
/// # Errors
/// `UnsupportedImageType` with whatever type was reported (or the name).
pub fn file_image_type(mime: Option<&str>, name: &str) -> Result<ImageType, IoError> {
    mime.filter(|m| !m.is_empty())
        .and_then(ImageType::from_mime)
        .or_else(|| ImageType::from_extension(name))
        .ok_or_else(|| IoError::UnsupportedImageType(mime.unwrap_or(name).to_string()))
}

/// True for text that is a standalone SVG document.
pub fn is_svg_text(text: &str) -> bool {
    let text = text.trim();
    text.contains(r#"xmlns="http://www.w3.org/2000/svg""#)
        && text.contains("<svg")
        && text.contains("</svg>")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Archive,
    Json,
    Svg,
    Image(ImageType),
    Unknown,
}

/// Sniff `bytes`, falling back to the extension of `name` when the
/// content is inconclusive.
pub fn detect(bytes: &[u8], name: Option<&str>) -> FileType {
    if is_archive(bytes) {
        return FileType::Archive;
    }
    if bytes.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'{') {
        return FileType::Json;
    }
    if let Ok(text) = std::str::from_utf8(bytes)
        && is_svg_text(text)
    {
        return FileType::Svg;
    }
    if let Some(kind) = image::guess_format(bytes).ok().and_then(ImageType::from_format) {
        return FileType::Image(kind);
    }

    let Some(name) = name else {
        return FileType::Unknown;
    };
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".atelier") || lower.ends_with(".zip") {
        FileType::Archive
    } else if lower.ends_with(".json") {
        FileType::Json
    } else {
        match ImageType::from_extension(&lower) {
            Some(ImageType::Svg) => FileType::Svg,
            Some(kind) => FileType::Image(kind),
            None => FileType::Unknown,
        }
    }
}
