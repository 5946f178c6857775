//! Release-title helpers: search-friendly names, episode tags, the "extra"
//! part of a release title and the quality tag derived from it.

use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Ordered quality table. The first matching pattern wins.
static QUALITY_TABLE: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)\b(2160p|4k|uhd)\b", "4K"),
        (r"(?i)\b1440p\b", "1440p"),
        (r"(?i)\b1080[pi]\b", "1080p"),
        (r"(?i)\b720p\b", "720p"),
        (r"(?i)\b(576p|480p|dvdrip|sd)\b", "480p"),
        (r"(?i)\b(hd-?cam|cam-?rip|cam|hd-?ts|telesync|ts)\b", "CAM"),
        (r"(?i)\b(scr|screener|dvdscr)\b", "SCR"),
    ]
    .into_iter()
    .map(|(pattern, tag)| (Regex::new(pattern).unwrap(), tag))
    .collect()
});

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[._\-–()\[\]:,]").unwrap());
static ESCAPED_QUOTES: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\\+['"]"#).unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static BRACKETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[_()\[\],]").unwrap());
static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(19|20)\d{2}$").unwrap());
static EPISODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^s\d{1,2}e\d{1,3}$").unwrap());

/// Fallback tag when no pattern matches.
pub const UNKNOWN_QUALITY: &str = "Unknown";

/// Classify a release title into a quality tag.
pub fn quality_tag(title: &str) -> &'static str {
    QUALITY_TABLE
        .iter()
        .find(|(re, _)| re.is_match(title))
        .map(|(_, tag)| *tag)
        .unwrap_or(UNKNOWN_QUALITY)
}

/// `S01E02`-style tag.
pub fn episode_tag(season: u32, episode: u32) -> String {
    format!("S{:02}E{:02}", season, episode)
}

/// Reduce a title to space-separated words suitable for a search query.
pub fn simple_name(name: &str) -> String {
    let name = ESCAPED_QUOTES.replace_all(name, "");
    let name = name.replace('\'', "");
    let name = SEPARATORS.replace_all(&name, " ");
    WHITESPACE.replace_all(name.trim(), " ").into_owned()
}

/// The part of a release title that follows the media name, e.g.
/// `1080p BluRay x264-GROUP` for `The.Movie.2020.1080p.BluRay.x264-GROUP`.
///
/// Falls back to the whole title when it consists only of query words.
pub fn extra_tag(release_title: &str, media_title: &str) -> String {
    let query_words: Vec<String> = simple_name(media_title)
        .split(' ')
        .map(|w| w.to_lowercase())
        .collect();

    let first_extra = simple_name(release_title).split(' ').find(|word| {
        let lower = word.to_lowercase();
        !query_words.contains(&lower) && !YEAR.is_match(word) && !EPISODE.is_match(word)
    }).map(|w| w.to_string());

    let Some(word) = first_extra else {
        return release_title.to_string();
    };

    let Some(start) = find_ignore_case(release_title, &word) else {
        return release_title.to_string();
    };

    let mut tail = BRACKETS.replace_all(&release_title[start..], " ").into_owned();
    if tail.matches('.').count() > 1 {
        tail = tail.replace('.', " ");
    }
    WHITESPACE.replace_all(tail.trim(), " ").into_owned()
}

/// Byte offset of the first case-insensitive occurrence of `needle`.
/// Always a char boundary of `haystack`.
fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    haystack.char_indices().map(|(i, _)| i).find(|&i| {
        let mut rest = haystack[i..].chars().flat_map(char::to_lowercase);
        needle.iter().all(|c| rest.next() == Some(*c))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_table_order() {
        assert_eq!(quality_tag("Movie.2020.2160p.UHD.BluRay"), "4K");
        assert_eq!(quality_tag("Movie 2020 1080p WEB-DL"), "1080p");
        assert_eq!(quality_tag("Show.S01E02.720p.HDTV"), "720p");
        assert_eq!(quality_tag("Movie.2020.DVDRip.XviD"), "480p");
        assert_eq!(quality_tag("Movie 2020 HDCAM"), "CAM");
        assert_eq!(quality_tag("Movie 2020 DVDSCR"), "SCR");
        assert_eq!(quality_tag("Movie 2020"), UNKNOWN_QUALITY);
    }

    #[test]
    fn test_resolution_beats_source_tag() {
        assert_eq!(quality_tag("Movie.2020.1080p.HDTS"), "1080p");
    }

    #[test]
    fn test_episode_tag_padding() {
        assert_eq!(episode_tag(1, 2), "S01E02");
        assert_eq!(episode_tag(12, 105), "S12E105");
    }

    #[test]
    fn test_simple_name() {
        assert_eq!(simple_name("Spider-Man: No Way Home"), "Spider Man No Way Home");
        assert_eq!(simple_name("Ocean's Eleven (2001)"), "Oceans Eleven 2001");
        assert_eq!(simple_name("a.b_c[d],e"), "a b c d e");
    }

    #[test]
    fn test_extra_tag_non_ascii_title() {
        assert_eq!(extra_tag("İstanbul éx 1080p", "İstanbul"), "éx 1080p");
        assert_eq!(
            extra_tag("Amélie.2001.ÉDITION.1080p.BluRay", "Amélie"),
            "ÉDITION 1080p BluRay"
        );
    }

    #[test]
    fn test_find_ignore_case_returns_char_boundary() {
        assert_eq!(find_ignore_case("İstanbul éx", "ÉX"), Some(10));
        assert_eq!(find_ignore_case("Heat 1080P", "1080p"), Some(5));
        assert_eq!(find_ignore_case("Heat", "cam"), None);
    }

    #[test]
    fn test_extra_tag_movie() {
        assert_eq!(
            extra_tag("The.Matrix.1999.1080p.BluRay.x264-GROUP", "The Matrix"),
            "1080p BluRay x264-GROUP"
        );
    }

    #[test]
    fn test_extra_tag_series() {
        assert_eq!(
            extra_tag("Breaking Bad S05E14 720p HDTV [eztv]", "Breaking Bad"),
            "720p HDTV eztv"
        );
    }

    #[test]
    fn test_extra_tag_only_name() {
        assert_eq!(extra_tag("The Matrix 1999", "The Matrix"), "The Matrix 1999");
    }
}
