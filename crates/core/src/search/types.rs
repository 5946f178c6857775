//! Search events and ingestion filtering.

use regex_lite::Regex;
use tracing::warn;

use crate::config::SearchConfig;
use crate::gateway::RawResult;

/// Message sent from the orchestrator to the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    /// Results of one indexer search that survived ingestion. Never empty.
    Batch(Vec<RawResult>),
    /// All searches have settled. Sent exactly once.
    Complete,
}

/// Why a raw result was dropped at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    TooFewSeeders,
    TooLarge,
    IgnoredTitle,
    NoReference,
    NotMagnet,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::TooFewSeeders => "seeders",
            Rejection::TooLarge => "size",
            Rejection::IgnoredTitle => "ignored_title",
            Rejection::NoReference => "no_reference",
            Rejection::NotMagnet => "not_magnet",
        }
    }
}

/// Per-result filter applied as results arrive from an indexer.
#[derive(Debug, Clone)]
pub struct IngestFilter {
    pub minimum_seeds: u32,
    pub maximum_size: u64,
    /// Drop results without a magnet URI.
    pub magnet_only: bool,
    pub ignore_titles: Option<Regex>,
}

impl IngestFilter {
    pub fn from_config(config: &SearchConfig) -> Self {
        let ignore_titles = config.ignore_titles.as_deref().and_then(|pattern| {
            match Regex::new(&format!("(?i){}", pattern)) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!(pattern = pattern, error = %e, "Ignoring invalid ignore_titles pattern");
                    None
                }
            }
        });

        Self {
            minimum_seeds: config.minimum_seeds,
            maximum_size: config.maximum_size,
            magnet_only: config.dont_parse_torrent_files,
            ignore_titles,
        }
    }

    pub fn check(&self, raw: &RawResult) -> Result<(), Rejection> {
        if let Some(ref re) = self.ignore_titles {
            if re.is_match(&raw.title) {
                return Err(Rejection::IgnoredTitle);
            }
        }
        if raw.seeders < self.minimum_seeds {
            return Err(Rejection::TooFewSeeders);
        }
        if raw.size_bytes > self.maximum_size {
            return Err(Rejection::TooLarge);
        }
        if raw.magnet().is_none() {
            if self.magnet_only {
                return Err(Rejection::NotMagnet);
            }
            if raw.http_link().is_none() {
                return Err(Rejection::NoReference);
            }
        }
        Ok(())
    }
}
