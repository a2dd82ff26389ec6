//! Share codec: gallery ⇄ URL-safe token.
//!
//! A share token carries an entire gallery (names, text, images, audio) so a
//! recipient can open it without any server round-trip.
//!
//! ```text
//! encode:  Gallery → materialize assets → ShareData → JSON → LZ-string → token
//! decode:  token → LZ-string → JSON → ShareData → read-only Gallery
//! ```
//!
//! ## Materialization
//!
//! Every image and narration reference is fetched through an
//! [`AssetStore`] and inlined as a `data:` URI. Fetches run in parallel on
//! the rayon pool; `par_iter().collect()` keeps results in input order, so
//! artwork order never depends on which fetch finishes first.
//!
//! A failed fetch does not fail the share: the artwork keeps its original
//! reference and a warning is logged. The resulting link then depends on that
//! reference staying reachable. The token itself does not record which
//! assets fell back.
//!
//! ## Failure modes
//!
//! - [`ShareError`]: JSON serialization failed; no token is produced.
//! - [`DecodeError`]: any stage of decoding failed. Callers show
//!   [`DecodeError::user_message`]; the specific cause is logged.
//!
//! Neither path yields partial results.

use crate::assets::{AssetError, AssetStore};
use crate::lzstring::{self, LzError};
use crate::types::{Artwork, Gallery, ShareData, SharedArtwork};
use rayon::prelude::*;
use serde_json::error::Category;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ShareError {
    #[error("failed to serialize share data: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ShareError {
    /// Message shown to the person generating the link.
    pub fn user_message(&self) -> &'static str {
        "Failed to generate share link"
    }
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("token could not be decompressed: {0}")]
    Decompress(#[from] LzError),
    #[error("token decompressed to nothing")]
    Empty,
    #[error("share data is not valid JSON: {0}")]
    Json(serde_json::Error),
    #[error("share data has the wrong shape: {0}")]
    Shape(serde_json::Error),
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Data => DecodeError::Shape(err),
            Category::Io | Category::Syntax | Category::Eof => DecodeError::Json(err),
        }
    }
}

impl DecodeError {
    /// Message shown to the person opening the link, whatever the cause.
    pub fn user_message(&self) -> &'static str {
        "Failed to load gallery. The link may be invalid or corrupted."
    }
}

/// Encode a gallery into a share token, inlining every asset.
pub fn encode(gallery: &Gallery, store: &impl AssetStore) -> Result<String, ShareError> {
    let data = materialize(gallery, store);
    encode_share_data(&data)
}

/// Compress already-materialized share data into a token.
pub fn encode_share_data(data: &ShareData) -> Result<String, ShareError> {
    let json = serde_json::to_string(data)?;
    let token = lzstring::compress_to_encoded_uri_component(&json);
    debug!(
        artworks = data.artworks.len(),
        json_len = json.len(),
        token_len = token.len(),
        "encoded share token"
    );
    Ok(token)
}

/// Build the self-contained share form of `gallery`.
///
/// Never fails: assets that cannot be fetched keep their original reference.
pub fn materialize(gallery: &Gallery, store: &impl AssetStore) -> ShareData {
    let artworks = gallery
        .artworks
        .par_iter()
        .map(|artwork| materialize_artwork(artwork, store))
        .collect();

    ShareData {
        name: gallery.name.clone(),
        artworks,
    }
}

fn materialize_artwork(artwork: &Artwork, store: &impl AssetStore) -> SharedArtwork {
    SharedArtwork {
        title: artwork.title.clone(),
        description: artwork.description.clone(),
        img_data: inline_or_keep(&artwork.img_path, store),
        audio_data: artwork
            .audio_path
            .as_deref()
            .map(|reference| inline_or_keep(reference, store)),
    }
}

/// Fetch `reference` and inline it, or return it unchanged on failure.
fn inline_or_keep(reference: &str, store: &impl AssetStore) -> String {
    match resolve_data_uri(reference, store) {
        Ok(uri) => uri,
        Err(err) => {
            warn!(reference = %truncate_reference(reference), error = %err, "asset not inlined, keeping original reference");
            reference.to_string()
        }
    }
}

/// Fetch `reference` and return it as a `data:` URI.
pub fn resolve_data_uri(reference: &str, store: &impl AssetStore) -> Result<String, AssetError> {
    let asset = store.fetch(reference)?;
    debug!(reference = %truncate_reference(reference), bytes = asset.bytes.len(), "inlined asset");
    Ok(asset.to_data_uri(reference))
}

/// Keep log lines readable when the reference is itself a data URI.
fn truncate_reference(reference: &str) -> &str {
    match reference.char_indices().nth(80) {
        Some((end, _)) => &reference[..end],
        None => reference,
    }
}

/// Decode a share token into a read-only gallery.
///
/// The result has id [`SHARED_GALLERY_ID`](crate::types::SHARED_GALLERY_ID)
/// and positional artwork ids `shared-0`, `shared-1`, ….
pub fn decode(token: &str) -> Result<Gallery, DecodeError> {
    decode_share_data(token).map(ShareData::into_gallery)
}

/// Decode a share token into its wire form.
pub fn decode_share_data(token: &str) -> Result<ShareData, DecodeError> {
    let result = decompress_and_parse(token);
    if let Err(err) = &result {
        debug!(error = %err, token_len = token.len(), "share token rejected");
    }
    result
}

fn decompress_and_parse(token: &str) -> Result<ShareData, DecodeError> {
    let json = lzstring::decompress_from_encoded_uri_component(token.trim())?;
    if json.is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::store::tests::MockStore;
    use crate::lzstring::is_token_char;
    use crate::test_helpers::*;
    use std::time::Duration;

    const JPEG: &[u8] = b"\xff\xd8\xff\xe0\0\x10JFIF\0";
    const MP3: &[u8] = b"ID3\x04\0\0\0\0\0\0";

    fn spring_store() -> MockStore {
        MockStore::new()
            .with_asset("sunrise.jpg", JPEG, None)
            .with_asset("dusk.jpg", JPEG, Some("image/jpeg"))
            .with_asset("waves.mp3", MP3, None)
    }

    // =========================================================================
    // Round trips
    // =========================================================================

    #[test]
    fn roundtrip_preserves_name_order_and_text() {
        let gallery = gallery_with(
            "Spring",
            vec![
                artwork("Sunrise", "", "sunrise.jpg"),
                artwork("Dusk", "Late light over the bay", "dusk.jpg"),
            ],
        );

        let token = encode(&gallery, &spring_store()).unwrap();
        let shared = decode(&token).unwrap();

        assert_eq!(shared.name, "Spring");
        assert_eq!(artwork_titles(&shared), vec!["Sunrise", "Dusk"]);
        assert_eq!(shared.artworks[1].description, "Late light over the bay");
        assert_eq!(shared.artworks[0].id, "shared-0");
        assert_eq!(shared.artworks[1].id, "shared-1");
        assert!(shared.is_shared());
    }

    #[test]
    fn image_is_inlined_as_data_uri() {
        let gallery = gallery_with("Spring", vec![artwork("Sunrise", "", "sunrise.jpg")]);

        let shared = decode(&encode(&gallery, &spring_store()).unwrap()).unwrap();
        let expected = crate::assets::data_uri::encode("image/jpeg", JPEG);
        assert_eq!(shared.artworks[0].img_path, expected);
    }

    #[test]
    fn audio_is_inlined_when_present() {
        let mut item = artwork("Sunrise", "", "sunrise.jpg");
        item.audio_path = Some("waves.mp3".into());
        let gallery = gallery_with("Spring", vec![item]);

        let data = materialize(&gallery, &spring_store());
        assert_eq!(
            data.artworks[0].audio_data.as_deref(),
            Some(crate::assets::data_uri::encode("audio/mpeg", MP3).as_str())
        );
    }

    #[test]
    fn empty_gallery_roundtrips() {
        let gallery = gallery_with("Nothing yet", vec![]);
        let store = MockStore::new();

        let token = encode(&gallery, &store).unwrap();
        let shared = decode(&token).unwrap();

        assert_eq!(shared.name, "Nothing yet");
        assert!(shared.artworks.is_empty());
        assert!(store.fetched().is_empty());
    }

    #[test]
    fn unicode_text_roundtrips() {
        let gallery = gallery_with(
            "Été à Kyōto 🌸",
            vec![artwork("桜", "Ünïcödé \"quotes\" & <tags>", "sunrise.jpg")],
        );
        let shared = decode(&encode(&gallery, &spring_store()).unwrap()).unwrap();
        assert_eq!(shared.name, "Été à Kyōto 🌸");
        assert_eq!(shared.artworks[0].title, "桜");
        assert_eq!(shared.artworks[0].description, "Ünïcödé \"quotes\" & <tags>");
    }

    #[test]
    fn decodes_token_from_web_builder() {
        // {"name":"Spring","artworks":[]} as produced by lz-string in the browser.
        let shared = decode("N4IgdghgtgpiBcIDKAHATgSzAcxAGhAjQBcB3AezQGsBnBAbQF0BfIA").unwrap();
        assert_eq!(shared.name, "Spring");
        assert!(shared.artworks.is_empty());
    }

    // =========================================================================
    // Ordering and fallback
    // =========================================================================

    #[test]
    fn order_is_preserved_when_fetches_finish_in_reverse() {
        let mut store = MockStore::new();
        let mut items = Vec::new();
        let mut references = Vec::new();
        for i in 0..6 {
            let reference = format!("img-{i}.jpg");
            store = store
                .with_asset(&reference, JPEG, None)
                .with_delay(&reference, Duration::from_millis(60 - 10 * i as u64));
            items.push(artwork(&format!("Artwork {i}"), "", &reference));
            references.push(reference);
        }
        let gallery = gallery_with("Ordered", items);

        let pool = rayon::ThreadPoolBuilder::new().num_threads(6).build().unwrap();
        let data = pool.install(|| materialize(&gallery, &store));
        let titles: Vec<&str> = data.artworks.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Artwork 0", "Artwork 1", "Artwork 2", "Artwork 3", "Artwork 4", "Artwork 5"]
        );
        let completed = store.completed();
        assert_eq!(completed.len(), 6);
        assert_ne!(completed, references, "fetches finished in input order");
        assert!(data.artworks.iter().all(|a| a.img_data.starts_with("data:image/jpeg")));
    }

    #[test]
    fn failed_image_keeps_original_reference() {
        let gallery = gallery_with(
            "Partial",
            vec![
                artwork("Sunrise", "", "sunrise.jpg"),
                artwork("Missing", "", "https://gone.example/missing.jpg"),
                artwork("Dusk", "", "dusk.jpg"),
            ],
        );

        let token = encode(&gallery, &spring_store()).unwrap();
        let shared = decode(&token).unwrap();

        assert_eq!(shared.artworks.len(), 3);
        assert_eq!(shared.artworks[1].img_path, "https://gone.example/missing.jpg");
        assert!(shared.artworks[0].img_path.starts_with("data:"));
        assert!(shared.artworks[2].img_path.starts_with("data:"));
    }

    #[test]
    fn failed_audio_keeps_original_reference() {
        let mut item = artwork("Sunrise", "", "sunrise.jpg");
        item.audio_path = Some("blob:http://localhost/abc".into());
        let gallery = gallery_with("Spring", vec![item]);

        let data = materialize(&gallery, &spring_store());
        assert_eq!(
            data.artworks[0].audio_data.as_deref(),
            Some("blob:http://localhost/abc")
        );
    }

    #[test]
    fn every_reference_is_fetched_once() {
        let mut item = artwork("Sunrise", "", "sunrise.jpg");
        item.audio_path = Some("waves.mp3".into());
        let gallery = gallery_with("Spring", vec![item, artwork("Dusk", "", "dusk.jpg")]);

        let store = spring_store();
        materialize(&gallery, &store);

        let mut fetched = store.fetched();
        fetched.sort();
        assert_eq!(fetched, vec!["dusk.jpg", "sunrise.jpg", "waves.mp3"]);
    }

    // =========================================================================
    // Wire format
    // =========================================================================

    #[test]
    fn absent_audio_has_no_key() {
        let gallery = gallery_with("Spring", vec![artwork("Sunrise", "", "sunrise.jpg")]);
        let token = encode(&gallery, &spring_store()).unwrap();

        let json = lzstring::decompress_from_encoded_uri_component(&token).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = value["artworks"][0].as_object().unwrap();
        assert!(!first.contains_key("audioData"));
        assert_eq!(
            first.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["title", "description", "imgData"]
        );

        assert_eq!(decode(&token).unwrap().artworks[0].audio_path, None);
    }

    #[test]
    fn token_is_url_safe() {
        let gallery = gallery_with(
            "?&=#% +/",
            vec![artwork("a&b=c", "100% <sure>\n", "https://x.example/a b.jpg?x=1&y=2")],
        );
        let token = encode(&gallery, &MockStore::new()).unwrap();
        assert!(token.chars().all(is_token_char), "{token}");
    }

    // =========================================================================
    // Malformed input
    // =========================================================================

    #[test]
    fn garbage_is_rejected() {
        for input in ["", "not a token!", "%%%%", "🙂", "hello world"] {
            assert!(decode(input).is_err(), "{input:?} decoded");
        }
    }

    #[test]
    fn empty_payload_is_rejected() {
        // "Q" is the compressed empty string.
        assert!(matches!(decode("Q"), Err(DecodeError::Empty)));
    }

    #[test]
    fn invalid_json_is_rejected() {
        let token = lzstring::compress_to_encoded_uri_component("{\"name\": \"Spring\",");
        assert!(matches!(decode(&token), Err(DecodeError::Json(_))));
    }

    #[test]
    fn wrong_shape_is_rejected() {
        for json in [
            r#"{"artworks":[]}"#,
            r#"{"name":"Spring"}"#,
            r#"{"name":"Spring","artworks":{}}"#,
            r#"{"name":"Spring","artworks":[{"title":"No image"}]}"#,
            r#"{"name":42,"artworks":[]}"#,
            r#"["Spring"]"#,
        ] {
            let token = lzstring::compress_to_encoded_uri_component(json);
            assert!(
                matches!(decode(&token), Err(DecodeError::Shape(_))),
                "{json} was not a shape error"
            );
        }
    }

    #[test]
    fn missing_description_defaults_to_empty() {
        let token = lzstring::compress_to_encoded_uri_component(
            r#"{"name":"Spring","artworks":[{"title":"A","imgData":"data:,x"}]}"#,
        );
        assert_eq!(decode(&token).unwrap().artworks[0].description, "");
    }

    #[test]
    fn truncated_and_padded_tokens_are_rejected() {
        let gallery = gallery_with("Spring", vec![artwork("Sunrise", "", "sunrise.jpg")]);
        let token = encode(&gallery, &spring_store()).unwrap();

        assert!(decode(&token[..token.len() - 1]).is_err());
        assert!(decode(&token[..token.len() / 2]).is_err());
        assert!(decode(&format!("{token}A")).is_err());
        assert!(decode(&format!("{token}%")).is_err());
    }

    #[test]
    fn single_character_alterations_never_yield_partial_galleries() {
        let gallery = gallery_with(
            "Spring",
            vec![
                artwork("Sunrise", "", "sunrise.jpg"),
                artwork("Dusk", "", "dusk.jpg"),
            ],
        );
        let token = encode(&gallery, &spring_store()).unwrap();
        let alphabet: Vec<char> = ('A'..='Z')
            .chain('a'..='z')
            .chain('0'..='9')
            .chain(['+', '-'])
            .collect();

        let mut decoded = 0;
        for position in 0..token.len() {
            for &replacement in &alphabet {
                let mut altered: Vec<char> = token.chars().collect();
                if altered[position] == replacement {
                    continue;
                }
                altered[position] = replacement;
                let altered: String = altered.into_iter().collect();

                if let Ok(shared) = decode(&altered) {
                    decoded += 1;
                    assert_eq!(shared.artworks.len(), 2, "{altered} lost artworks");
                    for (i, artwork) in shared.artworks.iter().enumerate() {
                        assert_eq!(artwork.id, format!("shared-{i}"));
                    }
                }
            }
        }
        // Flipped bits inside text still decode; the gallery stays whole.
        assert!(decoded > 0);
    }

    #[test]
    fn characters_outside_the_alphabet_are_rejected() {
        let gallery = gallery_with("Spring", vec![artwork("Sunrise", "", "sunrise.jpg")]);
        let token = encode(&gallery, &spring_store()).unwrap();
        for position in [0, token.len() / 2, token.len() - 1] {
            for foreign in ['!', '$', '%', '.'] {
                let mut altered: Vec<char> = token.chars().collect();
                altered[position] = foreign;
                let altered: String = altered.into_iter().collect();
                assert!(
                    matches!(decode(&altered), Err(DecodeError::Decompress(_))),
                    "{foreign:?} at {position} was accepted"
                );
            }
        }
    }

    #[test]
    fn error_messages_are_generic() {
        let err = decode("Q").unwrap_err();
        assert_eq!(
            err.user_message(),
            "Failed to load gallery. The link may be invalid or corrupted."
        );
    }
}
