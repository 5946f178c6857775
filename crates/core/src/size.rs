//! Human-readable byte sizes.
//!
//! Parses configuration values such as `5GB` or `700 MB` into bytes and
//! renders byte counts for stream titles (`1.4 GB`).

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

static SIZE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*([kKmMgGtT]?[bB]?)$").unwrap());

const DISPLAY_UNITS: [&str; 8] = ["kB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Errors produced while parsing a size string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SizeParseError {
    #[error("Invalid size '{0}'. Supported formats: B/KB/MB/GB/TB, e.g. 5GB")]
    InvalidFormat(String),
}

/// Parse a human-readable size (binary multiples) into bytes.
pub fn parse_size(input: &str) -> Result<u64, SizeParseError> {
    let trimmed = input.trim();
    let caps = SIZE_PATTERN
        .captures(trimmed)
        .ok_or_else(|| SizeParseError::InvalidFormat(input.to_string()))?;

    let number: f64 = caps[1]
        .parse()
        .map_err(|_| SizeParseError::InvalidFormat(input.to_string()))?;

    let multiplier: u64 = match caps[2].to_ascii_uppercase().trim_end_matches('B') {
        "" => 1,
        "K" => 1 << 10,
        "M" => 1 << 20,
        "G" => 1 << 30,
        "T" => 1 << 40,
        _ => return Err(SizeParseError::InvalidFormat(input.to_string())),
    };

    Ok((number * multiplier as f64) as u64)
}

/// Format a byte count with one decimal place, e.g. `4.2 GB`.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    value /= 1024.0;
    while value >= 1024.0 && unit < DISPLAY_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.1} {}", value, DISPLAY_UNITS[unit])
}

/// Serde helper accepting either a number of bytes or a size string.
pub fn deserialize_size<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bytes(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Bytes(b) => Ok(b),
        Raw::Text(s) => parse_size(&s).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_size("512").unwrap(), 512);
        assert_eq!(parse_size("512B").unwrap(), 512);
        assert_eq!(parse_size("1KB").unwrap(), 1024);
        assert_eq!(parse_size("5GB").unwrap(), 5 * 1024 * 1024 * 1024);
        assert_eq!(parse_size("2 tb").unwrap(), 2 * (1u64 << 40));
        assert_eq!(parse_size("1.5MB").unwrap(), 1_572_864);
    }

    #[test]
    fn test_parse_unit_without_b() {
        assert_eq!(parse_size("3G").unwrap(), 3 * (1u64 << 30));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_size("lots").is_err());
        assert!(parse_size("5PB").is_err());
        assert!(parse_size("").is_err());
    }

    #[test]
    fn test_format_small() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
    }

    #[test]
    fn test_format_scaled() {
        assert_eq!(format_size(1024), "1.0 kB");
        assert_eq!(format_size(1_572_864), "1.5 MB");
        assert_eq!(format_size(5 * 1024 * 1024 * 1024), "5.0 GB");
    }

    #[test]
    fn test_deserialize_size_forms() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(deserialize_with = "deserialize_size")]
            size: u64,
        }

        let h: Holder = toml::from_str(r#"size = "2GB""#).unwrap();
        assert_eq!(h.size, 2 * (1u64 << 30));

        let h: Holder = toml::from_str("size = 4096").unwrap();
        assert_eq!(h.size, 4096);
    }
}
