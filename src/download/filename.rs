//! Filename sanitization and destination path helpers.
//!
//! Destination names are derived from item metadata (title, falling back to
//! the item id) plus an extension taken from the rendition URL.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use url::Url;

use crate::api::MediaKind;

/// Longest stem kept from an item title, in characters.
const MAX_STEM_CHARS: usize = 120;

/// Suffix appended to in-progress downloads.
pub const PARTIAL_SUFFIX: &str = ".part";

/// Returns the lowercase extension (with leading dot) of the URL's last path
/// segment, if it looks like one.
pub(crate) fn extension_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let last_segment = parsed.path_segments()?.next_back()?;
    let dot_index = last_segment.rfind('.')?;
    let ext = &last_segment[dot_index..];
    if ext.len() <= 1 || ext.len() > 6 || !ext[1..].chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Extension used when the rendition URL carries none.
#[must_use]
pub fn default_extension(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Photo => ".jpg",
        MediaKind::Video => ".mp4",
    }
}

/// Collapses anything unsafe in a single path component into `_`.
pub(crate) fn sanitize_filename_component(value: &str) -> String {
    let mut out = String::new();
    let mut prev_sep = false;
    for ch in value.chars() {
        let mapped = match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\'' => '_',
            c if c.is_whitespace() || c.is_control() => '_',
            c if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') => c,
            _ => '_',
        };
        if mapped == '_' {
            if !prev_sep {
                out.push('_');
                prev_sep = true;
            }
        } else {
            out.push(mapped);
            prev_sep = false;
        }
    }
    let trimmed = out.trim_matches(|c| c == '_' || c == '.');
    let stem: String = trimmed.chars().take(MAX_STEM_CHARS).collect();
    if is_safe_filename_segment(&stem) {
        stem
    } else {
        stem.replace('.', "_")
    }
}

/// Builds the file name for an item: `sanitized(title or id) + extension`.
#[must_use]
pub fn item_file_name(title: &str, item_id: &str, extension: &str) -> String {
    let stem = {
        let from_title = sanitize_filename_component(title);
        if from_title.is_empty() {
            sanitize_filename_component(item_id)
        } else {
            from_title
        }
    };
    let stem = if stem.is_empty() {
        "item".to_string()
    } else {
        stem
    };
    format!("{stem}{extension}")
}

/// Returns `<stem>_<item id><ext>` next to `path`, used when two entries of
/// one run map to the same name.
#[must_use]
pub fn disambiguated_path(path: &Path, item_id: &str) -> PathBuf {
    with_stem_suffix(path, &sanitize_filename_component(item_id))
}

/// Returns `<stem>_<n><ext>` next to `path`, used when a disambiguated name
/// is itself already taken.
#[must_use]
pub fn numbered_path(path: &Path, n: u32) -> PathBuf {
    with_stem_suffix(path, &n.to_string())
}

fn with_stem_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match path.extension() {
        Some(ext) => format!("{stem}_{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{suffix}"),
    };
    path.with_file_name(file_name)
}

/// Temporary sibling path written while a transfer is in flight.
#[must_use]
pub fn partial_path(destination: &Path) -> PathBuf {
    let mut name: OsString = destination
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(PARTIAL_SUFFIX);
    destination.with_file_name(name)
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
