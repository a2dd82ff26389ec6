//! Gallery types shared by the library, the editor, and the share codec.
//!
//! Two shapes live here:
//!
//! - [`Gallery`] / [`Artwork`]: the owned, authoring-side form. This is what
//!   the [`library`](crate::library) persists and what the
//!   [`edit`](crate::edit) operations mutate. Asset references may point at
//!   local files, URLs, or inline `data:` URIs.
//! - [`ShareData`] / [`SharedArtwork`]: the wire form embedded in a share
//!   token. Every asset is inlined, so a viewer needs nothing but the token.
//!
//! Field names are camelCase on the wire (`imgPath`, `imgData`, …) so stored
//! galleries and share tokens stay compatible with links produced by the web
//! builder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier carried by every gallery reconstructed from a share token.
///
/// It never names a stored gallery; the library refuses to save it.
pub const SHARED_GALLERY_ID: &str = "shared";

/// Positional identifier for the `index`-th artwork of a shared gallery.
pub fn shared_artwork_id(index: usize) -> String {
    format!("{SHARED_GALLERY_ID}-{index}")
}

/// An owned, named, ordered collection of artworks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gallery {
    /// Empty for a gallery that has never been saved.
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Display order is traversal order in the exhibit.
    #[serde(default)]
    pub artworks: Vec<Artwork>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Gallery {
    /// Whether this gallery came out of a share token (read-only, no owner).
    pub fn is_shared(&self) -> bool {
        self.id == SHARED_GALLERY_ID
    }

    /// Whether the gallery has been persisted at least once.
    pub fn is_saved(&self) -> bool {
        !self.id.is_empty() && !self.is_shared()
    }
}

/// One exhibited item: an image plus text and optional audio narration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artwork {
    pub id: String,
    /// Path, `file://`/`http(s)://` URL, or inline `data:` URI.
    pub img_path: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_path: Option<String>,
}

/// Self-contained share payload: the JSON that gets compressed into a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareData {
    pub name: String,
    pub artworks: Vec<SharedArtwork>,
}

/// Wire form of an artwork inside [`ShareData`].
///
/// Field order matters for byte-compatible tokens: serde emits fields in
/// declaration order, matching `{title, description, imgData, audioData}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedArtwork {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub img_data: String,
    /// Omitted from the JSON entirely when there is no narration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_data: Option<String>,
}

impl ShareData {
    /// Rebuild a read-only gallery with positional artwork ids.
    pub fn into_gallery(self) -> Gallery {
        let artworks = self
            .artworks
            .into_iter()
            .enumerate()
            .map(|(index, artwork)| Artwork {
                id: shared_artwork_id(index),
                img_path: artwork.img_data,
                title: artwork.title,
                description: artwork.description,
                audio_path: artwork.audio_data,
            })
            .collect();

        Gallery {
            id: SHARED_GALLERY_ID.to_string(),
            name: self.name,
            artworks,
            created_at: None,
            updated_at: None,
        }
    }
}
