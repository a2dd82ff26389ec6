//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every entity leads with its positional index and title; references, ids
//! and descriptions follow as indented context lines. Inline `data:` assets
//! are summarised by media type and size instead of being dumped.
//!
//! # Output Format
//!
//! ## Gallery (`open`, `import`)
//!
//! ```text
//! Spring (2 artworks)
//! 001 Sunrise
//!     Image: inline image/png, 2.1 KB
//!     Audio: inline audio/mpeg, 48.0 KB
//! 002 Dusk
//!     Image: /home/ana/show/002-Dusk.jpg
//!     Late light over the bay
//! ```
//!
//! ## Library (`list`)
//!
//! ```text
//! Galleries of ana
//! 001 Spring (2 artworks)
//!     Id: 5f0c…
//!     Updated: 2026-04-02 09:15
//! ```
//!
//! ## Share
//!
//! ```text
//! Spring → http://localhost:8080?gallery=N4Ig…
//!     Token: 5321 chars
//!     QR: spring.svg
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::assets::data_uri;
use crate::links::SocialLinks;
use crate::types::Gallery;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// `Name (N artworks)`, singular for one.
fn gallery_header(gallery: &Gallery) -> String {
    let noun = if gallery.artworks.len() == 1 {
        "artwork"
    } else {
        "artworks"
    };
    format!("{} ({} {})", gallery.name, gallery.artworks.len(), noun)
}

fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_text(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// How an asset reference is shown: inline data by type and size, anything
/// else verbatim.
pub fn describe_reference(reference: &str) -> String {
    if !reference.get(..5).is_some_and(|p| p.eq_ignore_ascii_case("data:")) {
        return reference.to_string();
    }
    match data_uri::parse(reference) {
        Ok(asset) => format!(
            "inline {}, {}",
            asset.media_type.as_deref().unwrap_or("data"),
            format_size(asset.bytes.len())
        ),
        Err(_) => "inline data (unreadable)".to_string(),
    }
}

// ============================================================================
// Gallery
// ============================================================================

/// Format a gallery with each artwork and its assets.
pub fn format_gallery(gallery: &Gallery) -> Vec<String> {
    let mut lines = vec![gallery_header(gallery)];

    for (i, artwork) in gallery.artworks.iter().enumerate() {
        let title = if artwork.title.is_empty() {
            "(untitled)"
        } else {
            &artwork.title
        };
        lines.push(format!("{} {}", format_index(i + 1), title));
        lines.push(format!("    Image: {}", describe_reference(&artwork.img_path)));
        if let Some(audio) = &artwork.audio_path {
            lines.push(format!("    Audio: {}", describe_reference(audio)));
        }
        let description = artwork.description.trim();
        if !description.is_empty() {
            lines.push(format!("    {}", truncate_text(description, 60)));
        }
    }

    lines
}

pub fn print_gallery(gallery: &Gallery) {
    for line in format_gallery(gallery) {
        println!("{}", line);
    }
}

// ============================================================================
// Library
// ============================================================================

/// Format an owner's saved galleries.
pub fn format_library(owner: &str, galleries: &[Gallery]) -> Vec<String> {
    if galleries.is_empty() {
        return vec![format!("No saved galleries for {}", owner)];
    }

    let mut lines = vec![format!("Galleries of {}", owner)];
    for (i, gallery) in galleries.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), gallery_header(gallery)));
        lines.push(format!("    Id: {}", gallery.id));
        if let Some(updated) = gallery.updated_at {
            lines.push(format!("    Updated: {}", updated.format("%Y-%m-%d %H:%M")));
        }
    }
    lines
}

pub fn print_library(owner: &str, galleries: &[Gallery]) {
    for line in format_library(owner, galleries) {
        println!("{}", line);
    }
}

// ============================================================================
// Share
// ============================================================================

/// Format the result of sharing a gallery.
pub fn format_share_output(
    gallery_name: &str,
    url: &str,
    token: &str,
    qr_file: Option<&Path>,
    social: Option<&SocialLinks>,
) -> Vec<String> {
    let mut lines = vec![
        format!("{} \u{2192} {}", gallery_name, url),
        format!("    Token: {} chars", token.len()),
    ];
    if let Some(path) = qr_file {
        lines.push(format!("    QR: {}", path.display()));
    }
    if let Some(links) = social {
        lines.push(format!("    Twitter: {}", links.twitter));
        lines.push(format!("    Facebook: {}", links.facebook));
    }
    lines
}

pub fn print_share_output(
    gallery_name: &str,
    url: &str,
    token: &str,
    qr_file: Option<&Path>,
    social: Option<&SocialLinks>,
) {
    for line in format_share_output(gallery_name, url, token, qr_file, social) {
        println!("{}", line);
    }
}
