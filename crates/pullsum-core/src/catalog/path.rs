//! Relative-key derivation and destination-safe paths.

use std::path::{Component, Path, PathBuf};

/// Normalizes a project name to a key prefix ending in `/` (empty stays empty).
pub fn project_prefix(project: &str) -> String {
    if project.is_empty() || project.ends_with('/') {
        project.to_string()
    } else {
        format!("{}/", project)
    }
}

/// Strips `prefix` from `key`; keys outside the prefix are returned unchanged.
pub fn relative_key<'a>(prefix: &str, key: &'a str) -> &'a str {
    key.strip_prefix(prefix).unwrap_or(key)
}

/// Converts a `/`-separated relative key into a path that stays under the
/// destination root. A leading `/` is ignored. Returns `None` for empty keys,
/// `..` components, or a trailing `/` (no file name).
pub fn safe_relative_path(relative_key: &str) -> Option<PathBuf> {
    if relative_key.is_empty() || relative_key.ends_with('/') || relative_key.contains('\0') {
        return None;
    }
    let mut out = PathBuf::new();
    for segment in relative_key.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => out.push(part),
            _ => return None,
        }
    }
    if out.as_os_str().is_empty() {
        None
    } else {
        Some(out)
    }
}

/// The `/`-joined form of [`safe_relative_path`]: keys that land on the same
/// destination file share one canonical key.
pub fn canonical_relative_key(relative_key: &str) -> Option<String> {
    let path = safe_relative_path(relative_key)?;
    let parts: Option<Vec<&str>> = path.iter().map(|part| part.to_str()).collect();
    parts.map(|parts| parts.join("/"))
}
