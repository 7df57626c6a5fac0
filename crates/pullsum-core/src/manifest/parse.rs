//! Line-level manifest parsing.

use super::{basename, ChecksumManifestEntry};

/// Hex length of an MD5 digest.
const MD5_HEX_LEN: usize = 32;
const BSD_PREFIX: &str = "md5 (";
const BSD_SEPARATOR: &str = ") = ";

/// Classification of a single manifest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestLine {
    Entry(ChecksumManifestEntry),
    /// Blank line or `#` comment.
    Skip,
    /// Anything else; ignored by callers.
    Unrecognized,
}

/// Parse one line. Formats are tried in order: BSD `MD5 (name) = hash`,
/// then coreutils `hash  name` / `hash *name`.
pub fn parse_line(raw: &str) -> ManifestLine {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return ManifestLine::Skip;
    }
    if let Some(entry) = parse_bsd(line) {
        return entry;
    }
    parse_coreutils(line)
        .map(ManifestLine::Entry)
        .unwrap_or(ManifestLine::Unrecognized)
}

/// `Some(..)` whenever the BSD prefix matched, so a malformed BSD line is not
/// re-read as coreutils.
fn parse_bsd(line: &str) -> Option<ManifestLine> {
    let prefix = line.get(..BSD_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(BSD_PREFIX) {
        return None;
    }
    let rest = &line[BSD_PREFIX.len()..];
    let Some((name, hash)) = rest.rsplit_once(BSD_SEPARATOR) else {
        return Some(ManifestLine::Unrecognized);
    };
    let hash = hash.trim();
    if hash.is_empty() || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return Some(ManifestLine::Unrecognized);
    }
    Some(
        entry(name, hash)
            .map(ManifestLine::Entry)
            .unwrap_or(ManifestLine::Unrecognized),
    )
}

fn parse_coreutils(line: &str) -> Option<ChecksumManifestEntry> {
    let (hash, rest) = line.split_once(char::is_whitespace)?;
    if hash.len() != MD5_HEX_LEN || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let rest = rest.trim_start();
    let name = rest.strip_prefix('*').unwrap_or(rest).trim();
    entry(name, hash)
}

fn entry(name: &str, hash: &str) -> Option<ChecksumManifestEntry> {
    let base = basename(name.trim());
    if base.is_empty() {
        return None;
    }
    Some(ChecksumManifestEntry {
        basename: base.to_string(),
        hex_digest: hash.to_ascii_lowercase(),
    })
}
