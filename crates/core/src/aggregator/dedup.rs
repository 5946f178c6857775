//! Deduplication and ranking of collected streams by info_hash.

use std::collections::HashMap;

use super::types::StreamDescriptor;

/// Deduplicate, rank and truncate collected streams.
///
/// Streams with the same info_hash collapse into the one with more seeders
/// (the first seen wins ties), carrying the union of both source lists. DHT
/// sources are moved after tracker sources. The result is sorted by seeders
/// descending and holds at most `maximum_results` entries.
pub fn finalize_streams(
    collected: Vec<StreamDescriptor>,
    maximum_results: usize,
) -> Vec<StreamDescriptor> {
    let mut by_hash: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<StreamDescriptor> = Vec::new();

    for stream in collected {
        match by_hash.get(&stream.info_hash).copied() {
            Some(index) => {
                let existing = &mut unique[index];
                let mut sources = std::mem::take(&mut existing.sources);
                for source in &stream.sources {
                    if !sources.contains(source) {
                        sources.push(source.clone());
                    }
                }
                if stream.seeders > existing.seeders {
                    *existing = stream;
                }
                existing.sources = sources;
            }
            None => {
                by_hash.insert(stream.info_hash.clone(), unique.len());
                unique.push(stream);
            }
        }
    }

    for stream in &mut unique {
        let (dht, trackers): (Vec<String>, Vec<String>) = std::mem::take(&mut stream.sources)
            .into_iter()
            .partition(|s| s.starts_with("dht:"));
        stream.sources = trackers.into_iter().chain(dht).collect();
    }

    // Stable: equal seeders keep arrival order
    unique.sort_by(|a, b| b.seeders.cmp(&a.seeders));
    unique.truncate(maximum_results);
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::stream;
    use std::collections::HashSet;

    #[test]
    fn test_finalize_single_stream() {
        let result = finalize_streams(vec![stream("abc", 10, &["tracker:udp://a"])], 5);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].seeders, 10);
    }

    #[test]
    fn test_duplicate_keeps_max_seeders_and_unions_sources() {
        let result = finalize_streams(
            vec![
                stream("abc", 10, &["tracker:udp://a", "dht:abc"]),
                stream("abc", 20, &["tracker:udp://b", "dht:abc"]),
                stream("abc", 15, &["tracker:udp://c"]),
            ],
            5,
        );

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].seeders, 20);
        let sources: HashSet<&str> = result[0].sources.iter().map(|s| s.as_str()).collect();
        assert_eq!(
            sources,
            HashSet::from(["tracker:udp://a", "tracker:udp://b", "tracker:udp://c", "dht:abc"])
        );
        assert_eq!(result[0].sources.last().map(|s| s.as_str()), Some("dht:abc"));
    }

    #[test]
    fn test_lower_seeder_duplicate_keeps_original_fields() {
        let mut first = stream("abc", 30, &["tracker:udp://a"]);
        first.title = "first".to_string();
        let mut second = stream("abc", 5, &["tracker:udp://b"]);
        second.title = "second".to_string();

        let result = finalize_streams(vec![first, second], 5);
        assert_eq!(result[0].title, "first");
        assert_eq!(result[0].sources.len(), 2);
    }

    #[test]
    fn test_sorted_descending_and_truncated() {
        let result = finalize_streams(
            vec![
                stream("a", 5, &[]),
                stream("b", 50, &[]),
                stream("c", 1, &[]),
                stream("d", 20, &[]),
            ],
            3,
        );
        let seeders: Vec<u32> = result.iter().map(|s| s.seeders).collect();
        assert_eq!(seeders, vec![50, 20, 5]);
    }

    #[test]
    fn test_dht_moved_after_trackers() {
        let result = finalize_streams(
            vec![stream("a", 5, &["dht:a", "tracker:udp://x", "tracker:udp://y"])],
            5,
        );
        assert_eq!(
            result[0].sources,
            vec!["tracker:udp://x", "tracker:udp://y", "dht:a"]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(finalize_streams(vec![], 5).is_empty());
    }
}
