pub mod archive;
pub mod clipboard;
pub mod error;
pub mod filetype;
pub mod html;
pub mod load;
pub mod snapshot;

pub use archive::{Archive, ArchiveOptions, Manifest, pack, pack_with, unpack};
pub use clipboard::{ClipboardContent, ClipboardItem, ClipboardPayload, ForeignVendor};
pub use error::IoError;
pub use filetype::{FileType, ImageType};
pub use load::{Loaded, load};
pub use snapshot::Snapshot;
