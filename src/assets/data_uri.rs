//! `data:` URI encoding and parsing (RFC 2397).

use super::store::{Asset, AssetError};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64";

/// Encode bytes as `data:<media_type>;base64,<payload>`.
pub fn encode(media_type: &str, bytes: &[u8]) -> String {
    format!("{PREFIX}{media_type}{BASE64_MARKER},{}", STANDARD.encode(bytes))
}

/// Parse a `data:` URI back into bytes and its declared media type.
///
/// Accepts both base64 and percent-encoded payloads. An empty media type
/// yields `None`.
pub fn parse(uri: &str) -> Result<Asset, AssetError> {
    let uri = uri.trim();
    let rest = uri
        .get(..PREFIX.len())
        .filter(|head| head.eq_ignore_ascii_case(PREFIX))
        .map(|_| &uri[PREFIX.len()..])
        .ok_or_else(|| AssetError::InvalidDataUri("missing data: prefix".into()))?;

    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| AssetError::InvalidDataUri("missing ',' separator".into()))?;

    let marker_at = meta
        .len()
        .checked_sub(BASE64_MARKER.len())
        .filter(|&split| {
            meta.get(split..)
                .is_some_and(|tail| tail.eq_ignore_ascii_case(BASE64_MARKER))
        });
    let (media_type, is_base64) = match marker_at {
        Some(split) => (&meta[..split], true),
        None => (meta, false),
    };

    let bytes = if is_base64 {
        STANDARD
            .decode(payload)
            .map_err(|e| AssetError::InvalidDataUri(format!("bad base64 payload: {e}")))?
    } else {
        urlencoding::decode_binary(payload.as_bytes()).into_owned()
    };

    let media_type = Some(media_type.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    Ok(Asset::new(bytes, media_type))
}
