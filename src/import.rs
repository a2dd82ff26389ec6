//! Build a draft gallery from a directory of files.
//!
//! ```text
//! 010-Spring-Show/                 # gallery "Spring Show"
//! ├── 001-Harbour.jpg              # artwork 1, title "Harbour"
//! ├── 001-Harbour.txt              # its description
//! ├── 001-Harbour.mp3              # its narration
//! ├── 002-Evening-Light.png        # artwork 2
//! └── sketch.webp                  # artwork 3 (unnumbered sorts last)
//! ```
//!
//! Only the top level is read. Files are classified by media type from their
//! extension: `image/*` files become artworks, and `audio/*` or `.txt` files
//! sharing an image's stem attach to it. Hidden files and anything else are
//! ignored. Artwork paths are absolute so the gallery can be shared from any
//! working directory.

use crate::naming::{compare_entries, parse_entry_name};
use crate::types::{Artwork, Gallery};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot read directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("no images found in {0}")]
    NoImages(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Image,
    Audio,
    Text,
}

fn classify(path: &Path) -> Option<FileKind> {
    let is_txt = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
    if is_txt {
        return Some(FileKind::Text);
    }
    let mime = mime_guess::from_path(path).first()?;
    match mime.type_().as_str() {
        "image" => Some(FileKind::Image),
        "audio" => Some(FileKind::Audio),
        _ => None,
    }
}

#[derive(Default)]
struct Sidecars {
    audio: Option<PathBuf>,
    text: Option<PathBuf>,
}

/// Read `dir` into an unsaved gallery named after the directory.
pub fn import_dir(dir: &Path) -> Result<Gallery, ImportError> {
    let dir = fs::canonicalize(dir)?;

    let mut images: Vec<(String, PathBuf)> = Vec::new();
    let mut sidecars: HashMap<String, Sidecars> = HashMap::new();

    for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        if file_name.starts_with('.') {
            continue;
        }
        let path = entry.path();
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };

        match classify(path) {
            Some(FileKind::Image) => images.push((file_name.into_owned(), path.to_path_buf())),
            Some(FileKind::Audio) => {
                sidecars.entry(stem).or_default().audio.get_or_insert(path.to_path_buf());
            }
            Some(FileKind::Text) => {
                sidecars.entry(stem).or_default().text = Some(path.to_path_buf());
            }
            None => debug!(file = %path.display(), "skipping unrecognised file"),
        }
    }

    if images.is_empty() {
        return Err(ImportError::NoImages(dir));
    }
    images.sort_by(|(a, _), (b, _)| compare_entries(a, b));

    let mut artworks = Vec::with_capacity(images.len());
    for (_, path) in images {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let sidecar = sidecars.get(&stem);

        let description = match sidecar.and_then(|s| s.text.as_ref()) {
            Some(text) => fs::read_to_string(text)?.trim().to_string(),
            None => String::new(),
        };

        artworks.push(Artwork {
            id: Uuid::new_v4().to_string(),
            img_path: path.to_string_lossy().into_owned(),
            title: parse_entry_name(&stem).title_or(&stem).to_string(),
            description,
            audio_path: sidecar
                .and_then(|s| s.audio.as_ref())
                .map(|a| a.to_string_lossy().into_owned()),
        });
    }

    let dir_name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = parse_entry_name(&dir_name).title_or(&dir_name).to_string();

    debug!(dir = %dir.display(), artworks = artworks.len(), "imported directory");
    let mut gallery = Gallery::draft(name);
    gallery.artworks = artworks;
    Ok(gallery)
}
