//! HTTP asset store.

use super::store::{Asset, AssetError, AssetStore};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::io::Read;
use std::time::Duration;

/// Fetches `http(s)://` references with a blocking client.
///
/// Each request is bounded by `timeout`; a request that runs out of time
/// fails like any other fetch, and the share codec falls back to the
/// original reference. Bodies are read at most `max_bytes + 1` bytes deep,
/// whatever `Content-Length` says or omits.
#[derive(Debug, Clone)]
pub struct HttpAssetStore {
    client: Client,
    max_bytes: u64,
}

impl HttpAssetStore {
    pub fn new(timeout: Duration, max_bytes: u64) -> Result<Self, AssetError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("memora/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, max_bytes })
    }

    fn too_large(&self, size: u64) -> Option<AssetError> {
        (size > self.max_bytes).then_some(AssetError::TooLarge {
            size,
            limit: self.max_bytes,
        })
    }
}

impl AssetStore for HttpAssetStore {
    fn fetch(&self, reference: &str) -> Result<Asset, AssetError> {
        let response = self.client.get(reference).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::Status {
                status: status.as_u16(),
                url: reference.to_string(),
            });
        }

        if let Some(err) = response.content_length().and_then(|len| self.too_large(len)) {
            return Err(err);
        }

        let media_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let mut bytes = Vec::new();
        response
            .take(self.max_bytes.saturating_add(1))
            .read_to_end(&mut bytes)?;
        if let Some(err) = self.too_large(bytes.len() as u64) {
            return Err(err);
        }

        Ok(Asset::new(bytes, media_type))
    }
}
