//! Filesystem-backed asset store.

use super::store::{Asset, AssetError, AssetStore};
use std::path::{Path, PathBuf};

const FILE_SCHEME: &str = "file://";

/// Reads assets from local paths or `file://` URLs.
///
/// Relative paths resolve against `base_dir` when one is set (the directory
/// of the gallery file being shared), otherwise against the working
/// directory.
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    base_dir: Option<PathBuf>,
    max_bytes: u64,
}

impl FsAssetStore {
    pub fn new(max_bytes: u64) -> Self {
        Self {
            base_dir: None,
            max_bytes,
        }
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    /// Map a reference to the path it names.
    pub fn resolve_path(&self, reference: &str) -> PathBuf {
        let raw = match reference.strip_prefix(FILE_SCHEME) {
            Some(rest) => PathBuf::from(
                urlencoding::decode(rest)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| rest.to_string()),
            ),
            None => PathBuf::from(reference),
        };
        match &self.base_dir {
            Some(base) if raw.is_relative() => base.join(raw),
            _ => raw,
        }
    }

    fn check_size(&self, path: &Path) -> Result<(), AssetError> {
        let size = std::fs::metadata(path)?.len();
        if size > self.max_bytes {
            return Err(AssetError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

impl AssetStore for FsAssetStore {
    fn fetch(&self, reference: &str) -> Result<Asset, AssetError> {
        let path = self.resolve_path(reference);
        self.check_size(&path)?;
        let bytes = std::fs::read(&path)?;
        Ok(Asset::new(bytes, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn reads_relative_path_against_base_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("dawn.jpg"), b"\xff\xd8\xffjpeg").unwrap();

        let store = FsAssetStore::new(1024).with_base_dir(tmp.path());
        let asset = store.fetch("dawn.jpg").unwrap();
        assert_eq!(asset.bytes, b"\xff\xd8\xffjpeg");
        assert_eq!(asset.media_type_for("dawn.jpg"), "image/jpeg");
    }

    #[test]
    fn absolute_path_ignores_base_dir() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.txt");
        fs::write(&path, "text").unwrap();

        let store = FsAssetStore::new(1024).with_base_dir("/nonexistent");
        assert_eq!(store.fetch(path.to_str().unwrap()).unwrap().bytes, b"text");
    }

    #[test]
    fn reads_file_url_with_escapes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("my photo.png");
        fs::write(&path, "png").unwrap();

        let url = format!(
            "file://{}",
            path.to_str().unwrap().replace(' ', "%20")
        );
        let store = FsAssetStore::new(1024);
        assert_eq!(store.fetch(&url).unwrap().bytes, b"png");
    }

    #[test]
    fn missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let store = FsAssetStore::new(1024).with_base_dir(tmp.path());
        assert!(matches!(store.fetch("gone.jpg"), Err(AssetError::Io(_))));
    }

    #[test]
    fn oversized_file_is_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("big.bin"), vec![0u8; 64]).unwrap();

        let store = FsAssetStore::new(32).with_base_dir(tmp.path());
        assert!(matches!(
            store.fetch("big.bin"),
            Err(AssetError::TooLarge { size: 64, limit: 32 })
        ));
    }
}
