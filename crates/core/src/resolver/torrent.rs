//! `.torrent` file parsing.
//!
//! Uses librqbit-core to parse bencoded metainfo and extract the info hash,
//! announce list and file listing.

use librqbit_core::torrent_metainfo::{torrent_from_bytes, TorrentMetaV1Owned};

use super::{push_unique, ResolveError, ResolvedFile, ResolvedReference};

/// Parse raw `.torrent` bytes.
///
/// Supports both single-file and multi-file torrents. Multi-file paths are
/// prefixed with the torrent's root name.
pub fn resolve_torrent(bytes: &[u8]) -> Result<ResolvedReference, ResolveError> {
    let torrent: TorrentMetaV1Owned =
        torrent_from_bytes(bytes).map_err(|e| ResolveError::ParseError(e.to_string()))?;

    let mut announce = Vec::new();
    if let Some(ref url) = torrent.announce {
        push_unique(&mut announce, bytes_to_string(url.as_ref()));
    }
    for tier in &torrent.announce_list {
        for url in tier {
            push_unique(&mut announce, bytes_to_string(url.as_ref()));
        }
    }

    let info = &torrent.info;
    let name = info.name.as_ref().map(|b| bytes_to_string(b.as_ref()));
    let root_name = name.clone().unwrap_or_else(|| "unknown".to_string());

    let files = if let Some(ref files) = info.files {
        let listing: Vec<ResolvedFile> = files
            .iter()
            .map(|file| {
                let mut parts = vec![root_name.clone()];
                parts.extend(file.path.iter().map(|p| bytes_to_string(p.as_ref())));
                ResolvedFile {
                    path: parts.join("/"),
                    size_bytes: file.length,
                }
            })
            .collect();

        if listing.is_empty() {
            return Err(ResolveError::EmptyTorrent);
        }
        listing
    } else if let Some(length) = info.length {
        vec![ResolvedFile {
            path: root_name,
            size_bytes: length,
        }]
    } else {
        return Err(ResolveError::EmptyTorrent);
    };

    Ok(ResolvedReference {
        info_hash: torrent.info_hash.as_string().to_lowercase(),
        name,
        announce,
        files: Some(files),
    })
}

/// Lossy UTF-8 conversion; torrent metadata is not guaranteed to be UTF-8.
fn bytes_to_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
