//! Skeleton packages from local directories.
//!
//! The "latest" skeleton is an explicitly configured directory. The
//! fallback is the most recently modified package in the cache directory.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, instrument};
use walkdir::WalkDir;

use kiln_core::{
    application::{ApplicationError, ports::SkeletonProvider},
    error::KilnResult,
};

#[derive(Debug, Clone, Default)]
pub struct LocalSkeletonProvider {
    latest: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
}

impl LocalSkeletonProvider {
    pub fn new(latest: Option<PathBuf>, cache_dir: Option<PathBuf>) -> Self {
        Self { latest, cache_dir }
    }
}

impl SkeletonProvider for LocalSkeletonProvider {
    fn fetch_latest(&self) -> KilnResult<PathBuf> {
        match &self.latest {
            Some(path) if path.exists() => Ok(path.clone()),
            Some(path) => Err(ApplicationError::SkeletonUnavailable {
                reason: format!("{} does not exist", path.display()),
            }
            .into()),
            None => Err(ApplicationError::SkeletonUnavailable {
                reason: "no skeleton configured".into(),
            }
            .into()),
        }
    }

    #[instrument(skip(self))]
    fn fetch_cached_fallback(&self) -> KilnResult<PathBuf> {
        let Some(cache) = &self.cache_dir else {
            return Err(ApplicationError::SkeletonUnavailable {
                reason: "no skeleton cache configured".into(),
            }
            .into());
        };
        newest_entry(cache).ok_or_else(|| {
            ApplicationError::SkeletonUnavailable {
                reason: format!("the cache {} holds no skeleton", cache.display()),
            }
            .into()
        })
    }
}

fn newest_entry(cache: &Path) -> Option<PathBuf> {
    WalkDir::new(cache)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .map(|entry| {
            let modified = entry
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            debug!(candidate = %entry.path().display(), "Cached skeleton");
            (modified, entry.into_path())
        })
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
        .map(|(_, path)| path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_latest_is_unavailable() {
        let provider = LocalSkeletonProvider::default();
        assert!(provider.fetch_latest().is_err());
        assert!(provider.fetch_cached_fallback().is_err());
    }

    #[test]
    fn configured_latest_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let provider = LocalSkeletonProvider::new(Some(dir.path().to_path_buf()), None);
        assert_eq!(provider.fetch_latest().unwrap(), dir.path());
    }

    #[test]
    fn fallback_picks_a_cached_package() {
        let cache = tempfile::tempdir().unwrap();
        std::fs::create_dir(cache.path().join("skeleton-2.4")).unwrap();

        let provider = LocalSkeletonProvider::new(None, Some(cache.path().to_path_buf()));
        assert_eq!(
            provider.fetch_cached_fallback().unwrap(),
            cache.path().join("skeleton-2.4")
        );
    }

    #[test]
    fn empty_cache_is_unavailable() {
        let cache = tempfile::tempdir().unwrap();
        let provider = LocalSkeletonProvider::new(None, Some(cache.path().to_path_buf()));
        assert!(provider.fetch_cached_fallback().is_err());
    }
}
