//! The [`AssetStore`] trait and the [`Asset`] it returns.

use super::{data_uri, path_part};
use thiserror::Error;

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {status} fetching {url}")]
    Status { status: u16, url: String },
    #[error("asset is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },
    #[error("invalid data URI: {0}")]
    InvalidDataUri(String),
    #[error("unsupported asset reference: {0}")]
    Unsupported(String),
}

/// Raw asset bytes plus the media type the source declared, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub bytes: Vec<u8>,
    pub media_type: Option<String>,
}

impl Asset {
    pub fn new(bytes: Vec<u8>, media_type: Option<String>) -> Self {
        Self { bytes, media_type }
    }

    /// Media type for the data URI.
    ///
    /// First available wins: declared type → content sniffing → extension of
    /// `reference` → `application/octet-stream`.
    pub fn media_type_for(&self, reference: &str) -> String {
        if let Some(declared) = self
            .media_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
        {
            return declared.to_string();
        }
        if let Ok(format) = image::guess_format(&self.bytes) {
            return format.to_mime_type().to_string();
        }
        mime_guess::from_path(path_part(reference))
            .first()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_else(|| FALLBACK_MEDIA_TYPE.to_string())
    }

    /// Inline the asset as a base64 `data:` URI.
    pub fn to_data_uri(&self, reference: &str) -> String {
        data_uri::encode(&self.media_type_for(reference), &self.bytes)
    }
}

/// Source of asset bytes, keyed by reference.
///
/// `Sync` so the share codec can resolve artworks in parallel.
pub trait AssetStore: Sync {
    fn fetch(&self, reference: &str) -> Result<Asset, AssetError>;
}

impl<T: AssetStore + ?Sized> AssetStore for &T {
    fn fetch(&self, reference: &str) -> Result<Asset, AssetError> {
        (**self).fetch(reference)
    }
}
