//! Building user-facing stream descriptors from resolved references.

use std::sync::Arc;

use regex_lite::Regex;

use super::types::{BehaviorHints, StreamDescriptor};
use crate::gateway::{MediaType, RawResult, SearchQuery};
use crate::naming::{episode_tag, quality_tag};
use crate::resolver::{ResolvedFile, ResolvedReference};
use crate::size::format_size;
use crate::trackers::TrackerSet;

/// Per-request inputs to stream building.
#[derive(Debug, Clone)]
pub struct StreamContext {
    pub query: SearchQuery,
    pub addon_name: String,
    /// Require the release year when matching movie files.
    pub search_by_year: bool,
    pub trackers: Arc<TrackerSet>,
}

pub fn build_stream(
    raw: &RawResult,
    reference: &ResolvedReference,
    ctx: &StreamContext,
) -> StreamDescriptor {
    let info_hash = reference.info_hash.to_lowercase();
    let quality = quality_tag(&raw.extra_tag);

    let file_idx = reference
        .files
        .as_deref()
        .and_then(|files| select_file_index(files, &ctx.query, ctx.search_by_year));

    StreamDescriptor {
        file_idx,
        name: format!("{}\n{}", ctx.addon_name, quality),
        title: display_title(&ctx.query, raw),
        tag: quality.to_string(),
        media_type: ctx.query.media_type,
        sources: stream_sources(&reference.announce, &ctx.trackers, &info_hash),
        seeders: raw.seeders,
        behavior_hints: BehaviorHints {
            binge_group: binge_group(quality, &info_hash),
        },
        info_hash,
    }
}

/// `{title} {SxxEyy|year}` followed by a seeders/size/indexer line.
pub fn display_title(query: &SearchQuery, raw: &RawResult) -> String {
    let mut title = query.title.clone();
    if let Some((season, episode)) = query.season_episode() {
        title.push(' ');
        title.push_str(&episode_tag(season, episode));
    } else if let Some(year) = query.year {
        title.push_str(&format!(" {}", year));
    }

    format!(
        "{}\r\n\r\n👤 {}/{}  💾 {} ⚙️ {}",
        title,
        raw.seeders,
        raw.peers,
        format_size(raw.size_bytes),
        raw.source_indexer
    )
}

/// Pick the file to play.
///
/// A single-file torrent plays file 0. Otherwise the largest file whose name
/// contains the title words in order, followed by the episode tag (series)
/// or the year (movies, when `search_by_year` is set).
pub fn select_file_index(
    files: &[ResolvedFile],
    query: &SearchQuery,
    search_by_year: bool,
) -> Option<usize> {
    if files.len() == 1 {
        return Some(0);
    }

    let words: Vec<String> = query
        .title
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(regex_lite::escape)
        .collect();

    let suffix = match query.media_type {
        MediaType::Series => query
            .season_episode()
            .map(|(s, e)| episode_tag(s, e))
            .unwrap_or_default(),
        MediaType::Movie if search_by_year => {
            query.year.map(|y| y.to_string()).unwrap_or_default()
        }
        MediaType::Movie => String::new(),
    };

    let pattern = format!("(?i){}.*{}", words.join(".*"), suffix);
    let re = Regex::new(&pattern).ok()?;

    let mut best: Option<(usize, u64)> = None;
    for (index, file) in files.iter().enumerate() {
        let name = file.path.rsplit('/').next().unwrap_or(&file.path);
        if !re.is_match(name) {
            continue;
        }
        if best.map_or(true, |(_, size)| file.size_bytes > size) {
            best = Some((index, file.size_bytes));
        }
    }
    best.map(|(index, _)| index)
}

/// `tracker:` entries for the merged tracker list, then `dht:<hash>`.
pub fn stream_sources(announce: &[String], trackers: &TrackerSet, info_hash: &str) -> Vec<String> {
    trackers
        .merge(announce)
        .into_iter()
        .map(|t| format!("tracker:{}", t))
        .chain(std::iter::once(format!("dht:{}", info_hash)))
        .collect()
}

pub fn binge_group(quality: &str, info_hash: &str) -> String {
    format!("Jackett|{}|{}", quality, info_hash)
}
