//! Size vocabularies and rendition selection.
//!
//! Photos and videos use disjoint label sets. Each list is ordered best
//! quality first, which doubles as the default preference order.

use crate::api::{MediaKind, SizeVariant};

/// Photo size labels, best quality first.
const PHOTO_SIZES: &[&str] = &[
    "Original",
    "X-Large 6K",
    "X-Large 5K",
    "X-Large 4K",
    "X-Large 3K",
    "Large 2048",
    "Large 1600",
    "Large",
    "Medium 800",
    "Medium 640",
    "Medium",
    "Small 400",
    "Small 320",
    "Small",
    "Thumbnail",
    "Large Square",
    "Square",
];

/// Video size labels, best quality first.
const VIDEO_SIZES: &[&str] = &[
    "Video Original",
    "1080p",
    "HD MP4",
    "720p",
    "Site MP4",
    "360p",
    "Mobile MP4",
    "288p",
];

/// Known photo size labels in default preference order.
#[must_use]
pub fn photo_size_labels() -> &'static [&'static str] {
    PHOTO_SIZES
}

/// Known video size labels in default preference order.
#[must_use]
pub fn video_size_labels() -> &'static [&'static str] {
    VIDEO_SIZES
}

/// Vocabulary for one media kind.
#[must_use]
pub fn size_labels(kind: MediaKind) -> &'static [&'static str] {
    match kind {
        MediaKind::Photo => PHOTO_SIZES,
        MediaKind::Video => VIDEO_SIZES,
    }
}

fn in_vocabulary(kind: MediaKind, label: &str) -> bool {
    size_labels(kind)
        .iter()
        .any(|known| known.eq_ignore_ascii_case(label))
}

/// Picks the rendition for an entry of `kind` from `variants`.
///
/// With `requested`, the first variant whose label matches it
/// case-insensitively wins. A label that only exists in the other kind's
/// vocabulary does not apply to this entry, so the default order is used
/// instead. Without `requested`, the first label of the default order
/// present among the variants wins.
///
/// Only variants of the entry's own kind are considered.
#[must_use]
pub fn select_variant<'a>(
    kind: MediaKind,
    variants: &'a [SizeVariant],
    requested: Option<&str>,
) -> Option<&'a SizeVariant> {
    let own_kind = || variants.iter().filter(move |v| v.kind == kind);

    let requested = requested.map(str::trim).filter(|label| !label.is_empty());
    let applies = requested.filter(|label| {
        let other = match kind {
            MediaKind::Photo => MediaKind::Video,
            MediaKind::Video => MediaKind::Photo,
        };
        in_vocabulary(kind, label) || !in_vocabulary(other, label)
    });

    if let Some(label) = applies {
        return own_kind().find(|v| v.label.trim().eq_ignore_ascii_case(label));
    }

    size_labels(kind).iter().find_map(|preferred| {
        own_kind().find(|v| v.label.trim().eq_ignore_ascii_case(preferred))
    })
}
