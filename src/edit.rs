//! Draft-gallery editing.
//!
//! Field edits are tagged by kind ([`ArtworkUpdate`]) so each kind validates
//! its own value: text fields accept anything, an image reference must not be
//! blank, and audio can be set or cleared.

use crate::types::{Artwork, Gallery};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("no artwork with id {0:?}")]
    UnknownArtwork(String),
    #[error("image reference must not be empty")]
    EmptyImage,
}

/// A single-field change to an artwork.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtworkUpdate {
    Title(String),
    Description(String),
    Image(String),
    /// `None` or an empty string removes the narration.
    Audio(Option<String>),
}

impl Artwork {
    pub fn apply(&mut self, update: ArtworkUpdate) -> Result<(), EditError> {
        match update {
            ArtworkUpdate::Title(title) => self.title = title,
            ArtworkUpdate::Description(description) => self.description = description,
            ArtworkUpdate::Image(reference) => {
                if reference.trim().is_empty() {
                    return Err(EditError::EmptyImage);
                }
                self.img_path = reference;
            }
            ArtworkUpdate::Audio(reference) => {
                self.audio_path = reference.filter(|r| !r.trim().is_empty());
            }
        }
        Ok(())
    }
}

impl Gallery {
    /// A new, unsaved, empty gallery.
    pub fn draft(name: impl Into<String>) -> Self {
        Gallery {
            id: String::new(),
            name: name.into(),
            artworks: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Append an artwork with a fresh id and no description or audio.
    pub fn add_artwork(
        &mut self,
        img_path: impl Into<String>,
        title: impl Into<String>,
    ) -> &Artwork {
        self.artworks.push(Artwork {
            id: Uuid::new_v4().to_string(),
            img_path: img_path.into(),
            title: title.into(),
            description: String::new(),
            audio_path: None,
        });
        &self.artworks[self.artworks.len() - 1]
    }

    pub fn artwork(&self, id: &str) -> Option<&Artwork> {
        self.artworks.iter().find(|a| a.id == id)
    }

    fn position_of(&self, id: &str) -> Result<usize, EditError> {
        self.artworks
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| EditError::UnknownArtwork(id.to_string()))
    }

    pub fn update_artwork(&mut self, id: &str, update: ArtworkUpdate) -> Result<(), EditError> {
        let index = self.position_of(id)?;
        self.artworks[index].apply(update)
    }

    pub fn remove_artwork(&mut self, id: &str) -> Result<Artwork, EditError> {
        let index = self.position_of(id)?;
        Ok(self.artworks.remove(index))
    }

    /// Move an artwork to `to_index`, clamped to the last position.
    pub fn move_artwork(&mut self, id: &str, to_index: usize) -> Result<(), EditError> {
        let from = self.position_of(id)?;
        let artwork = self.artworks.remove(from);
        let to = to_index.min(self.artworks.len());
        self.artworks.insert(to, artwork);
        Ok(())
    }
}
