//! Project Service - new project from the application skeleton.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{ArchiveExtractor, DirectoryCopier, Filesystem, Reporter, Severity, SkeletonProvider},
    },
    error::KilnResult,
};

pub struct ProjectService {
    filesystem: Arc<dyn Filesystem>,
    skeletons: Arc<dyn SkeletonProvider>,
    extractor: Arc<dyn ArchiveExtractor>,
    copier: Arc<dyn DirectoryCopier>,
    reporter: Arc<dyn Reporter>,
}

impl ProjectService {
    pub fn new(
        filesystem: Arc<dyn Filesystem>,
        skeletons: Arc<dyn SkeletonProvider>,
        extractor: Arc<dyn ArchiveExtractor>,
        copier: Arc<dyn DirectoryCopier>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            filesystem,
            skeletons,
            extractor,
            copier,
            reporter,
        }
    }

    /// Fetch, extract and copy the skeleton to `destination`.
    ///
    /// `staging` is removed afterwards whether or not the copy succeeded.
    #[instrument(skip(self), fields(destination = %destination.display()))]
    pub fn create(&self, destination: &Path, staging: &Path) -> KilnResult<PathBuf> {
        if self.filesystem.exists(destination) {
            return Err(ApplicationError::TargetExists {
                what: "project".into(),
                path: destination.to_path_buf(),
            }
            .into());
        }

        let archive = match self.skeletons.fetch_latest() {
            Ok(archive) => archive,
            Err(e) => {
                warn!(error = %e, "Latest skeleton unavailable, using cached copy");
                self.reporter.report(
                    &format!("Could not fetch the latest skeleton ({e}); using the cached one"),
                    Severity::Warning,
                );
                self.skeletons.fetch_cached_fallback()?
            }
        };
        info!(archive = %archive.display(), "Skeleton selected");

        let result = self
            .extractor
            .extract(&archive, staging)
            .and_then(|root| self.copier.copy_dir(&root, destination));

        if self.filesystem.exists(staging) {
            if let Err(e) = self.filesystem.remove_dir_all(staging) {
                warn!(error = %e, staging = %staging.display(), "Failed to remove staging directory");
            }
        }
        result?;

        self.reporter.report(
            &format!("Project created in {}", destination.display()),
            Severity::Success,
        );
        Ok(destination.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        MockArchiveExtractor, MockDirectoryCopier, MockFilesystem, MockReporter,
        MockSkeletonProvider,
    };
    use crate::error::KilnError;

    struct Mocks {
        fs: MockFilesystem,
        skeletons: MockSkeletonProvider,
        extractor: MockArchiveExtractor,
        copier: MockDirectoryCopier,
        reporter: MockReporter,
    }

    impl Mocks {
        fn new() -> Self {
            let mut reporter = MockReporter::new();
            reporter.expect_report().return_const(());
            Self {
                fs: MockFilesystem::new(),
                skeletons: MockSkeletonProvider::new(),
                extractor: MockArchiveExtractor::new(),
                copier: MockDirectoryCopier::new(),
                reporter,
            }
        }

        fn service(self) -> ProjectService {
            ProjectService::new(
                Arc::new(self.fs),
                Arc::new(self.skeletons),
                Arc::new(self.extractor),
                Arc::new(self.copier),
                Arc::new(self.reporter),
            )
        }
    }

    fn staged(mocks: &mut Mocks) {
        mocks
            .fs
            .expect_exists()
            .returning(|p| p == Path::new("staging"));
        mocks
            .extractor
            .expect_extract()
            .returning(|_, staging| Ok(staging.join("skeleton")));
    }

    #[test]
    fn existing_destination_is_refused() {
        let mut mocks = Mocks::new();
        mocks.fs.expect_exists().return_const(true);
        mocks.skeletons.expect_fetch_latest().never();

        let err = mocks
            .service()
            .create(Path::new("blog"), Path::new("staging"))
            .unwrap_err();
        assert!(err.is_precondition());
    }

    #[test]
    fn copies_extracted_root_and_cleans_staging() {
        let mut mocks = Mocks::new();
        staged(&mut mocks);
        mocks
            .skeletons
            .expect_fetch_latest()
            .returning(|| Ok(PathBuf::from("skeleton.zip")));
        mocks
            .copier
            .expect_copy_dir()
            .withf(|from, to| from == Path::new("staging/skeleton") && to == Path::new("blog"))
            .times(1)
            .returning(|_, _| Ok(()));
        mocks
            .fs
            .expect_remove_dir_all()
            .withf(|p| p == Path::new("staging"))
            .times(1)
            .returning(|_| Ok(()));

        let created = mocks
            .service()
            .create(Path::new("blog"), Path::new("staging"))
            .unwrap();
        assert_eq!(created, PathBuf::from("blog"));
    }

    #[test]
    fn falls_back_to_cached_skeleton_with_warning() {
        let mut mocks = Mocks::new();
        staged(&mut mocks);
        mocks.reporter = MockReporter::new();
        mocks
            .reporter
            .expect_report()
            .withf(|_, severity| *severity == Severity::Warning)
            .times(1)
            .return_const(());
        mocks
            .reporter
            .expect_report()
            .withf(|_, severity| *severity == Severity::Success)
            .times(1)
            .return_const(());
        mocks.skeletons.expect_fetch_latest().returning(|| {
            Err(ApplicationError::SkeletonUnavailable {
                reason: "offline".into(),
            }
            .into())
        });
        mocks
            .skeletons
            .expect_fetch_cached_fallback()
            .times(1)
            .returning(|| Ok(PathBuf::from("cache/skeleton.zip")));
        mocks.copier.expect_copy_dir().returning(|_, _| Ok(()));
        mocks.fs.expect_remove_dir_all().returning(|_| Ok(()));

        mocks
            .service()
            .create(Path::new("blog"), Path::new("staging"))
            .unwrap();
    }

    #[test]
    fn staging_is_removed_when_copy_fails() {
        let mut mocks = Mocks::new();
        staged(&mut mocks);
        mocks
            .skeletons
            .expect_fetch_latest()
            .returning(|| Ok(PathBuf::from("skeleton.zip")));
        mocks.copier.expect_copy_dir().returning(|from, to| {
            Err(ApplicationError::CopyFailed {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                reason: "disk full".into(),
            }
            .into())
        });
        mocks
            .fs
            .expect_remove_dir_all()
            .times(1)
            .returning(|_| Ok(()));

        let err = mocks
            .service()
            .create(Path::new("blog"), Path::new("staging"))
            .unwrap_err();
        assert!(matches!(err, KilnError::Application(ApplicationError::CopyFailed { .. })));
    }
}
