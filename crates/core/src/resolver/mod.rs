//! Reference resolution: magnet URIs and `.torrent` files to a canonical
//! descriptor (info hash, name, announce list, optional file list).
//!
//! Both entry points are pure functions; callers treat a `ResolveError` as
//! a discard-and-log condition.

mod magnet;
mod torrent;

pub use magnet::resolve_magnet;
pub use torrent::resolve_torrent;

use thiserror::Error;

/// A resolved torrent reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference {
    /// Info hash, lowercase hex (40 chars).
    pub info_hash: String,
    /// Display name (`dn` for magnets, `info.name` for torrent files).
    pub name: Option<String>,
    /// Tracker URLs in announce order, without duplicates.
    pub announce: Vec<String>,
    /// File listing. `None` for magnets, which carry no metadata.
    pub files: Option<Vec<ResolvedFile>>,
}

/// A file inside a resolved torrent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    /// Path within the torrent, `/`-separated.
    pub path: String,
    /// Size in bytes.
    pub size_bytes: u64,
}

/// Errors produced while resolving a reference.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Invalid magnet URI: {0}")]
    InvalidMagnet(String),

    #[error("Magnet URI has no BitTorrent info hash")]
    MissingInfoHash,

    #[error("Failed to parse torrent: {0}")]
    ParseError(String),

    #[error("Empty torrent (no files)")]
    EmptyTorrent,
}

/// Whether the string is a magnet URI.
pub fn is_magnet(uri: &str) -> bool {
    uri.starts_with("magnet:")
}

/// Whether the string is an http(s) URL.
pub fn is_http(uri: &str) -> bool {
    uri.starts_with("http://") || uri.starts_with("https://")
}

pub(crate) fn push_unique(list: &mut Vec<String>, value: String) {
    if !value.is_empty() && !list.contains(&value) {
        list.push(value);
    }
}
