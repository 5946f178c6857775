//! Magnet URI parsing (BEP 9 `xt=urn:btih:`, `dn`, `tr`).

use super::{push_unique, ResolveError, ResolvedReference};

const BTIH_PREFIX: &str = "urn:btih:";
const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Parse a magnet URI. No network access.
pub fn resolve_magnet(uri: &str) -> Result<ResolvedReference, ResolveError> {
    let query = uri
        .strip_prefix("magnet:?")
        .ok_or_else(|| ResolveError::InvalidMagnet(truncate(uri)))?;

    let mut info_hash = None;
    let mut name = None;
    let mut announce = Vec::new();

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        // `+` means a space only in the display name
        let value = decode_component(value, key == "dn");
        match key {
            "xt" => {
                if let Some(hash) = value.strip_prefix(BTIH_PREFIX) {
                    info_hash = Some(normalize_btih(hash)?);
                }
            }
            "dn" => name = Some(value),
            "tr" => push_unique(&mut announce, value),
            _ => {}
        }
    }

    Ok(ResolvedReference {
        info_hash: info_hash.ok_or(ResolveError::MissingInfoHash)?,
        name,
        announce,
        files: None,
    })
}

fn decode_component(value: &str, plus_as_space: bool) -> String {
    let value = if plus_as_space {
        value.replace('+', " ")
    } else {
        value.to_string()
    };
    urlencoding::decode(&value)
        .map(|v| v.into_owned())
        .unwrap_or(value)
}

/// Accepts 40-char hex or 32-char base32 and returns lowercase hex.
fn normalize_btih(hash: &str) -> Result<String, ResolveError> {
    match hash.len() {
        40 if hash.chars().all(|c| c.is_ascii_hexdigit()) => Ok(hash.to_ascii_lowercase()),
        32 => decode_base32(hash)
            .map(|bytes| bytes.iter().map(|b| format!("{:02x}", b)).collect())
            .ok_or_else(|| ResolveError::InvalidMagnet(format!("bad base32 info hash {}", hash))),
        _ => Err(ResolveError::InvalidMagnet(format!(
            "info hash has unexpected length {}",
            hash.len()
        ))),
    }
}

fn decode_base32(input: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(20);
    let mut buffer: u64 = 0;
    let mut bits = 0;

    for c in input.bytes() {
        let value = BASE32_ALPHABET
            .iter()
            .position(|&a| a == c.to_ascii_uppercase())? as u64;
        buffer = (buffer << 5) | value;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }

    (out.len() == 20).then_some(out)
}

fn truncate(uri: &str) -> String {
    uri.chars().take(80).collect()
}
