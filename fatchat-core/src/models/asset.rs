use std::fmt;

use image::{ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::assets::AssetLocator;
use crate::error::AssetLoadError;

/// What kind of attachment a message carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    #[default]
    None,
    Photo,
    File,
}

impl AssetKind {
    pub fn expects_asset(self) -> bool {
        !matches!(self, AssetKind::None)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssetKind::None => "none",
            AssetKind::Photo => "photo",
            AssetKind::File => "file",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded photo, kept as RGBA8 so the UI can upload it without converting
#[derive(Clone)]
pub struct PhotoAsset {
    source: AssetLocator,
    format: ImageFormat,
    pixels: RgbaImage,
}

impl PhotoAsset {
    pub fn new(source: AssetLocator, format: ImageFormat, pixels: RgbaImage) -> Self {
        Self {
            source,
            format,
            pixels,
        }
    }

    pub fn source(&self) -> &AssetLocator {
        &self.source
    }

    /// Encoding the photo arrived in
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

// Pixel buffers are too large to dump into logs
impl fmt::Debug for PhotoAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoAsset")
            .field("source", &self.source)
            .field("format", &self.format)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// Raw file attachment
#[derive(Clone, PartialEq, Eq)]
pub struct FileAsset {
    source: AssetLocator,
    file_name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

impl FileAsset {
    pub fn new(
        source: AssetLocator,
        file_name: impl Into<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            source,
            file_name: file_name.into(),
            content_type,
            bytes,
        }
    }

    pub fn source(&self) -> &AssetLocator {
        &self.source
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// MIME type reported by the server, if any
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for FileAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileAsset")
            .field("source", &self.source)
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A loaded attachment. The variant always matches the owning message's `AssetKind`.
#[derive(Debug, Clone)]
pub enum Asset {
    Photo(PhotoAsset),
    File(FileAsset),
}

impl Asset {
    pub fn kind(&self) -> AssetKind {
        match self {
            Asset::Photo(_) => AssetKind::Photo,
            Asset::File(_) => AssetKind::File,
        }
    }

    pub fn source(&self) -> &AssetLocator {
        match self {
            Asset::Photo(photo) => photo.source(),
            Asset::File(file) => file.source(),
        }
    }

    pub fn as_photo(&self) -> Option<&PhotoAsset> {
        match self {
            Asset::Photo(photo) => Some(photo),
            Asset::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileAsset> {
        match self {
            Asset::File(file) => Some(file),
            Asset::Photo(_) => None,
        }
    }
}

/// Lifecycle of a message's attachment.
///
/// `Unloaded -> Loading -> Loaded | Failed`. `Loaded` is terminal,
/// `Failed` may go back to `Loading` on retry.
#[derive(Debug, Clone, Default)]
pub enum AssetState {
    #[default]
    Unloaded,
    Loading,
    Loaded(Asset),
    Failed(AssetLoadError),
}

impl AssetState {
    pub fn is_loading(&self) -> bool {
        matches!(self, AssetState::Loading)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, AssetState::Loaded(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn local(path: &str) -> AssetLocator {
        AssetLocator::Local(PathBuf::from(path))
    }

    #[test]
    fn test_asset_kind_serialization() {
        let json = serde_json::to_string(&AssetKind::Photo).unwrap();
        assert_eq!(json, "\"photo\"");

        let kind: AssetKind = serde_json::from_str("\"file\"").unwrap();
        assert_eq!(kind, AssetKind::File);

        let kind: AssetKind = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(kind, AssetKind::None);
        assert_eq!(AssetKind::default(), AssetKind::None);
    }

    #[test]
    fn test_expects_asset() {
        assert!(!AssetKind::None.expects_asset());
        assert!(AssetKind::Photo.expects_asset());
        assert!(AssetKind::File.expects_asset());
    }

    #[test]
    fn test_asset_variant_accessors() {
        let photo = Asset::Photo(PhotoAsset::new(
            local("/tmp/cat.png"),
            ImageFormat::Png,
            RgbaImage::new(4, 3),
        ));
        assert_eq!(photo.kind(), AssetKind::Photo);
        assert!(photo.as_file().is_none());
        let inner = photo.as_photo().unwrap();
        assert_eq!((inner.width(), inner.height()), (4, 3));
        assert_eq!(inner.format(), ImageFormat::Png);

        let file = Asset::File(FileAsset::new(
            local("/tmp/notes.txt"),
            "notes.txt",
            Some("text/plain".to_string()),
            b"hello".to_vec(),
        ));
        assert_eq!(file.kind(), AssetKind::File);
        assert_eq!(file.source(), &local("/tmp/notes.txt"));
        let inner = file.as_file().unwrap();
        assert_eq!(inner.file_name(), "notes.txt");
        assert_eq!(inner.content_type(), Some("text/plain"));
        assert_eq!(inner.len(), 5);
    }

    #[test]
    fn test_photo_debug_omits_pixels() {
        let photo = PhotoAsset::new(local("/tmp/a.png"), ImageFormat::Png, RgbaImage::new(64, 64));
        let debug = format!("{:?}", photo);
        assert!(debug.contains("width: 64"));
        assert!(!debug.contains("data"));
    }
}
