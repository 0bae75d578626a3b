//! `setget sizes`: list accepted size labels.

use setget_core::{photo_size_labels, video_size_labels};

/// Prints both vocabularies, best quality first.
pub fn run_sizes_command() {
    print!("{}", render_size_labels());
}

fn render_size_labels() -> String {
    let mut out = String::from("Photo sizes (best first):\n");
    for label in photo_size_labels() {
        out.push_str("  ");
        out.push_str(label);
        out.push('\n');
    }
    out.push_str("Video sizes (best first):\n");
    for label in video_size_labels() {
        out.push_str("  ");
        out.push_str(label);
        out.push('\n');
    }
    out
}
