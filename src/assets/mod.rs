//! Asset retrieval for share-link generation.
//!
//! An artwork's image and narration are references: a local path, a
//! `file://` or `http(s)://` URL, an inline `data:` URI, or a `blob:` handle
//! that only existed in the authoring browser session. Before a gallery can
//! be shared, each reference is fetched and re-encoded as a `data:` URI.
//!
//! | Reference | Store |
//! |---|---|
//! | `data:…` | parsed in place ([`data_uri::parse`]) |
//! | `http://…`, `https://…` | [`HttpAssetStore`] (blocking reqwest, per-request timeout) |
//! | `blob:…` | always [`AssetError::Unsupported`] |
//! | anything else | [`FsAssetStore`] |
//!
//! [`SchemeAssetStore`] does the dispatch. Everything goes through the
//! [`AssetStore`] trait so the share codec can be tested with a mock.

pub mod data_uri;
pub mod fs;
pub mod http;
pub mod scheme;
pub mod store;

pub use fs::FsAssetStore;
pub use http::HttpAssetStore;
pub use scheme::SchemeAssetStore;
pub use store::{Asset, AssetError, AssetStore};

/// What kind of location an asset reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Data,
    Http,
    Blob,
    File,
}

impl ReferenceKind {
    pub fn of(reference: &str) -> Self {
        let head: String = reference
            .trim_start()
            .chars()
            .take(8)
            .collect::<String>()
            .to_ascii_lowercase();
        if head.starts_with("data:") {
            Self::Data
        } else if head.starts_with("http://") || head.starts_with("https://") {
            Self::Http
        } else if head.starts_with("blob:") {
            Self::Blob
        } else {
            Self::File
        }
    }
}

/// Strip any query string or fragment so extension-based guessing sees the path.
pub(crate) fn path_part(reference: &str) -> &str {
    let end = reference.find(['?', '#']).unwrap_or(reference.len());
    &reference[..end]
}
