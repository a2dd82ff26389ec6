//! Shared test utilities for the memora test suite.
//!
//! Builders for galleries and artworks plus lookup helpers that panic with a
//! readable message on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let gallery = gallery_with("Spring", vec![
//!     artwork("Sunrise", "", "sunrise.jpg"),
//!     artwork("Dusk", "Late light", "dusk.jpg"),
//! ]);
//!
//! assert_eq!(artwork_titles(&gallery), vec!["Sunrise", "Dusk"]);
//! assert_eq!(find_artwork(&gallery, "Dusk").description, "Late light");
//! ```

use crate::types::{Artwork, Gallery};
use uuid::Uuid;

// =========================================================================
// Builders
// =========================================================================

/// An unsaved gallery holding `artworks`.
pub fn gallery_with(name: &str, artworks: Vec<Artwork>) -> Gallery {
    let mut gallery = Gallery::draft(name);
    gallery.artworks = artworks;
    gallery
}

/// An artwork with a fresh id and no audio.
pub fn artwork(title: &str, description: &str, img_path: &str) -> Artwork {
    Artwork {
        id: Uuid::new_v4().to_string(),
        img_path: img_path.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        audio_path: None,
    }
}

// =========================================================================
// Lookups and extractors
// =========================================================================

/// Find an artwork by title. Panics if not found.
pub fn find_artwork<'a>(gallery: &'a Gallery, title: &str) -> &'a Artwork {
    gallery
        .artworks
        .iter()
        .find(|a| a.title == title)
        .unwrap_or_else(|| {
            let titles = artwork_titles(gallery);
            panic!(
                "artwork '{title}' not found in gallery '{}'. Available: {titles:?}",
                gallery.name
            )
        })
}

/// All artwork titles in display order.
pub fn artwork_titles(gallery: &Gallery) -> Vec<&str> {
    gallery.artworks.iter().map(|a| a.title.as_str()).collect()
}
