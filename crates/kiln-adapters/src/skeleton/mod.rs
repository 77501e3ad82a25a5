//! Project skeleton adapters: provider, extractor and copier.

mod copy;
mod extractor;
mod provider;

pub use copy::WalkdirCopier;
pub use extractor::DirectoryExtractor;
pub use provider::LocalSkeletonProvider;
