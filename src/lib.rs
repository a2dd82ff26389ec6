//! # Memora
//!
//! Galleries for a virtual 3D exhibit, and the links that share them.
//!
//! A gallery is a named, ordered list of artworks: an image, a title, a
//! description and optional audio narration. Galleries are authored and kept
//! in a per-user library; sharing turns one into a single URL that carries
//! everything a viewer needs, with no server to host the assets.
//!
//! # Share Links
//!
//! ```text
//! Gallery ──materialize──▶ ShareData ──JSON──▶ LZ-string ──▶ ?gallery=<token>
//!                 (assets inlined as data: URIs)
//! ```
//!
//! Tokens use the URI-safe LZ-string alphabet (`A-Z a-z 0-9 + -`), so they
//! go into a query string unescaped and stay compatible with links produced
//! by the web builder. Decoding is strict: malformed tokens are rejected as a
//! whole, never half-read.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | `Gallery`/`Artwork` and their share-payload forms |
//! | [`share`] | Encode a gallery into a token and decode it back |
//! | [`lzstring`] | URI-safe LZ-string compression, bit-compatible with the JS library |
//! | [`assets`] | Fetch asset bytes from files or HTTP and build `data:` URIs |
//! | [`links`] | Share URLs, token extraction, social share links |
//! | [`qr`] | QR codes for share URLs |
//! | [`storage`] | Keyed storage port with file and in-memory backends |
//! | [`library`] | A user's saved galleries on top of the storage port |
//! | [`edit`] | Draft editing: add, update, reorder, remove artworks |
//! | [`import`] | Build a gallery from a directory of images and sidecars |
//! | [`naming`] | `NNN-name` filename convention used by import |
//! | [`config`] | `memora.toml` loading, merging, and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Assets Travel Inside the Link
//!
//! Share links are long, often tens of kilobytes. In exchange a shared
//! gallery never breaks because a file moved or a server went away. When an
//! asset cannot be read at share time the link keeps its original reference
//! instead of failing, so sharing always produces something.
//!
//! ## Storage Behind a Port
//!
//! [`library::Library`] only sees [`storage::StoragePort`]: string keys,
//! JSON string values. The CLI uses a directory of files; tests use memory.
//! Keys and values match what the web builder keeps in browser storage.

pub mod assets;
pub mod config;
pub mod edit;
pub mod import;
pub mod library;
pub mod links;
pub mod lzstring;
pub mod naming;
pub mod output;
pub mod qr;
pub mod share;
pub mod storage;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
