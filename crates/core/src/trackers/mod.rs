//! Tracker augmentation for resolved streams.
//!
//! A `TrackerSet` is an immutable snapshot of extra trackers to add and
//! trackers to strip. `TrackerService` owns the current snapshot and swaps it
//! on refresh; requests take a snapshot at start and keep it for their
//! lifetime.

mod lists;
mod service;

pub use lists::{BLACKLIST_TRACKERS, EXTRA_TRACKERS, RUSSIAN_TRACKERS};
pub use service::TrackerService;

use std::collections::HashSet;

use crate::config::TrackersConfig;
use crate::resolver::push_unique;

/// Extra trackers and a blacklist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerSet {
    trackers: Vec<String>,
    blacklist: HashSet<String>,
}

impl TrackerSet {
    pub fn new(trackers: Vec<String>, blacklist: impl IntoIterator<Item = String>) -> Self {
        let mut unique = Vec::with_capacity(trackers.len());
        for tracker in trackers {
            push_unique(&mut unique, tracker);
        }
        Self {
            trackers: unique,
            blacklist: blacklist.into_iter().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn trackers(&self) -> &[String] {
        &self.trackers
    }

    pub fn blacklist_len(&self) -> usize {
        self.blacklist.len()
    }

    pub fn is_blacklisted(&self, tracker: &str) -> bool {
        self.blacklist.contains(tracker)
    }

    /// `announce` followed by the extra trackers, without duplicates or
    /// blacklisted entries.
    pub fn merge(&self, announce: &[String]) -> Vec<String> {
        let mut merged = Vec::with_capacity(announce.len() + self.trackers.len());
        for tracker in announce.iter().chain(self.trackers.iter()) {
            if !self.is_blacklisted(tracker) {
                push_unique(&mut merged, tracker.clone());
            }
        }
        merged
    }
}

/// Build a set from the configured switches and downloaded lists.
pub fn build_tracker_set(
    config: &TrackersConfig,
    best: Vec<String>,
    downloaded_blacklist: Vec<String>,
) -> TrackerSet {
    let mut trackers = Vec::new();
    if config.add_best {
        trackers.extend(best);
    }
    if config.add_russian {
        trackers.extend(RUSSIAN_TRACKERS.iter().map(|t| t.to_string()));
    }
    if config.add_extra {
        trackers.extend(EXTRA_TRACKERS.iter().map(|t| t.to_string()));
    }

    let mut blacklist = Vec::new();
    if config.remove_blacklist {
        blacklist.extend(downloaded_blacklist);
        blacklist.extend(BLACKLIST_TRACKERS.iter().map(|t| t.to_string()));
    }

    TrackerSet::new(trackers, blacklist)
}

/// Parse a plain-text tracker list: one URL per line, `#` starts a comment.
pub fn parse_list(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_strips_comments_and_blanks() {
        let text = "udp://a:1/announce\n\n# header\nudp://b:2/announce # trailing\n   \n";
        assert_eq!(
            parse_list(text),
            vec!["udp://a:1/announce".to_string(), "udp://b:2/announce".to_string()]
        );
    }

    #[test]
    fn test_build_respects_switches() {
        let config = TrackersConfig::default();
        let set = build_tracker_set(&config, vec!["udp://best:1".to_string()], vec![]);
        assert!(set.trackers().is_empty());
        assert_eq!(set.blacklist_len(), 0);

        let config = TrackersConfig {
            add_best: true,
            add_russian: true,
            remove_blacklist: true,
            ..Default::default()
        };
        let set = build_tracker_set(
            &config,
            vec!["udp://best:1".to_string()],
            vec!["udp://bad:1".to_string()],
        );
        assert_eq!(set.trackers()[0], "udp://best:1");
        assert_eq!(set.trackers().len(), 1 + RUSSIAN_TRACKERS.len());
        assert!(set.is_blacklisted("udp://bad:1"));
        assert!(set.is_blacklisted(BLACKLIST_TRACKERS[0]));
    }

    #[test]
    fn test_merge_orders_announce_first_and_strips_blacklist() {
        let set = TrackerSet::new(
            vec!["udp://extra:1".to_string(), "udp://own:1".to_string()],
            vec!["udp://bad:1".to_string()],
        );
        let merged = set.merge(&[
            "udp://own:1".to_string(),
            "udp://bad:1".to_string(),
        ]);
        assert_eq!(
            merged,
            vec!["udp://own:1".to_string(), "udp://extra:1".to_string()]
        );
    }
}
