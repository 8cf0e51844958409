use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("unsupported image type: {0}")]
    UnsupportedImageType(String),

    #[error("archive entry missing: {0}")]
    MissingEntry(String),

    /// Pixel buffer length doesn't match `width * height * 4`.
    #[error("bitmap {0} is malformed")]
    MalformedBitmap(String),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Encode(#[from] rmp_serde::encode::Error),

    #[error(transparent)]
    Decode(#[from] rmp_serde::decode::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
