//! Overwrite policy: whether a destination needs downloading at all.

use std::path::Path;

use tracing::debug;

/// What to do when a destination file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwritePolicy {
    /// Always download, replacing existing files.
    #[default]
    Overwrite,
    /// Skip entries whose destination already exists.
    SkipExisting,
}

impl OverwritePolicy {
    /// Maps the `--no-overwrite` flag onto a policy.
    #[must_use]
    pub fn from_no_overwrite(no_overwrite: bool) -> Self {
        if no_overwrite {
            Self::SkipExisting
        } else {
            Self::Overwrite
        }
    }

    /// Returns true when a task for `destination` should be queued.
    ///
    /// The existence check is a point-in-time test; call it immediately
    /// before queueing.
    pub async fn should_download(self, destination: &Path) -> bool {
        match self {
            Self::Overwrite => true,
            Self::SkipExisting => {
                // An unreadable parent counts as "absent": the download attempt
                // will surface the real IO error as a warning.
                let exists = tokio::fs::try_exists(destination).await.unwrap_or(false);
                if exists {
                    debug!(path = %destination.display(), "destination exists, skipping");
                }
                !exists
            }
        }
    }
}

/// Free-function form: `true` unless `no_overwrite` is set and a file exists.
pub async fn should_download(destination: &Path, no_overwrite: bool) -> bool {
    OverwritePolicy::from_no_overwrite(no_overwrite)
        .should_download(destination)
        .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_overwrite_always_downloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.jpg");
        std::fs::write(&path, b"x").unwrap();
        assert!(should_download(&path, false).await);
    }

    #[tokio::test]
    async fn test_skip_existing_skips_present_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.jpg");
        std::fs::write(&path, b"x").unwrap();
        assert!(!should_download(&path, true).await);
    }

    #[tokio::test]
    async fn test_skip_existing_downloads_absent_file() {
        let dir = TempDir::new().unwrap();
        assert!(should_download(&dir.path().join("missing.jpg"), true).await);
    }

    #[tokio::test]
    async fn test_partial_file_does_not_count_as_existing() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.jpg.part"), b"half").unwrap();
        assert!(should_download(&dir.path().join("a.jpg"), true).await);
    }

    #[test]
    fn test_policy_from_flag() {
        assert_eq!(OverwritePolicy::from_no_overwrite(true), OverwritePolicy::SkipExisting);
        assert_eq!(OverwritePolicy::from_no_overwrite(false), OverwritePolicy::Overwrite);
        assert_eq!(OverwritePolicy::default(), OverwritePolicy::Overwrite);
    }
}
