//! Reference-kind dispatch across the concrete stores.

use super::data_uri;
use super::fs::FsAssetStore;
use super::http::HttpAssetStore;
use super::store::{Asset, AssetError, AssetStore};
use super::ReferenceKind;
use crate::config::AssetsConfig;
use std::path::Path;
use std::time::Duration;

/// The store used for real share generation.
///
/// `http` is optional so offline callers (and tests) can share galleries
/// made of local files without building an HTTP client.
#[derive(Debug, Clone)]
pub struct SchemeAssetStore {
    fs: FsAssetStore,
    http: Option<HttpAssetStore>,
}

impl SchemeAssetStore {
    pub fn new(fs: FsAssetStore, http: Option<HttpAssetStore>) -> Self {
        Self { fs, http }
    }

    /// Build filesystem and HTTP stores from the `[assets]` config section.
    pub fn from_config(config: &AssetsConfig, base_dir: Option<&Path>) -> Result<Self, AssetError> {
        let mut fs = FsAssetStore::new(config.max_bytes);
        if let Some(dir) = base_dir {
            fs = fs.with_base_dir(dir);
        }
        let http = HttpAssetStore::new(Duration::from_secs(config.timeout_secs), config.max_bytes)?;
        Ok(Self::new(fs, Some(http)))
    }
}

impl AssetStore for SchemeAssetStore {
    fn fetch(&self, reference: &str) -> Result<Asset, AssetError> {
        match ReferenceKind::of(reference) {
            ReferenceKind::Data => data_uri::parse(reference),
            ReferenceKind::Http => match &self.http {
                Some(http) => http.fetch(reference),
                None => Err(AssetError::Unsupported(format!(
                    "{reference} (HTTP fetching disabled)"
                ))),
            },
            ReferenceKind::Blob => Err(AssetError::Unsupported(format!(
                "{reference} (browser blob handles cannot be read outside their session)"
            ))),
            ReferenceKind::File => self.fs.fetch(reference),
        }
    }
}
