//! Media pool bin hierarchy.
//!
//! Jobs name their timeline bin as a `/`-separated path below the
//! collections root. Resolution walks the path one segment at a time,
//! reusing existing bins and creating missing ones, so repeated jobs with
//! the same path land in the same bin.

use std::collections::HashMap;

use tracing::{debug, error, info};

use lrr_library::{AssetLibrary, FolderId};
use lrr_models::Job;

use crate::error::{WorkerError, WorkerResult};

/// Names of the two top-level bins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinLayout {
    /// Root of the per-collection timeline bins
    pub collections_root: String,
    /// Root of the per-folder source media bins
    pub source_root: String,
}

impl Default for BinLayout {
    fn default() -> Self {
        Self {
            collections_root: "Collections".to_string(),
            source_root: "Source Photos".to_string(),
        }
    }
}

/// Bins a job writes into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobBins {
    /// Where the job's timelines are created
    pub timeline_bin: FolderId,
    /// Where the job's media is imported
    pub source_bin: FolderId,
}

/// Split a bin path into trimmed, non-empty segments.
pub fn bin_path_segments(path: &str) -> Vec<&str> {
    path.split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Get-or-create resolver over the library's folder tree.
///
/// Children of each visited folder are listed once and cached as a
/// `name -> id` index. When the library holds two children with the same
/// name, the first one listed wins.
pub struct BinResolver<'a> {
    library: &'a dyn AssetLibrary,
    children: HashMap<FolderId, HashMap<String, FolderId>>,
}

impl<'a> BinResolver<'a> {
    pub fn new(library: &'a dyn AssetLibrary) -> Self {
        Self {
            library,
            children: HashMap::new(),
        }
    }

    /// Resolve `path` below `root`, creating missing bins.
    ///
    /// An empty path (or one made only of separators) resolves to `root`.
    pub async fn resolve(&mut self, root: &FolderId, path: &str) -> WorkerResult<FolderId> {
        let mut current = root.clone();
        for segment in bin_path_segments(path) {
            current = self.child(&current, segment).await?;
        }
        Ok(current)
    }

    /// Find or create the direct child `name` of `parent`.
    ///
    /// A refused or failed creation is `FolderCreation`; losing the
    /// connection to the library surfaces as `Library`.
    pub async fn child(&mut self, parent: &FolderId, name: &str) -> WorkerResult<FolderId> {
        if !self.children.contains_key(parent) {
            let listing = self.library.subfolders(parent).await?;
            let mut index = HashMap::with_capacity(listing.len());
            for folder in listing {
                index.entry(folder.name).or_insert(folder.id);
            }
            self.children.insert(parent.clone(), index);
        }

        if let Some(existing) = self.children.get(parent).and_then(|index| index.get(name)) {
            debug!(bin = name, "Reusing bin {}", existing);
            return Ok(existing.clone());
        }

        let created = match self.library.add_subfolder(parent, name).await {
            Ok(Some(folder)) => folder,
            Ok(None) => return Err(WorkerError::folder_creation(parent, name)),
            Err(e) if e.is_connection_error() => return Err(e.into()),
            Err(e) => {
                error!(bin = name, parent = %parent, "Folder creation failed: {}", e);
                return Err(WorkerError::folder_creation(parent, name));
            }
        };

        info!(bin = name, parent = %parent, "Created bin");
        if let Some(index) = self.children.get_mut(parent) {
            index.insert(name.to_string(), created.id.clone());
        }
        self.children.insert(created.id.clone(), HashMap::new());
        Ok(created.id)
    }

    /// Resolve `<collections>/<bin_path>` and `<source>/<parent dir>` for a job.
    pub async fn resolve_job_bins(&mut self, layout: &BinLayout, job: &Job) -> WorkerResult<JobBins> {
        let root = self.library.root_folder().await?;

        let collections = self.child(&root, &layout.collections_root).await?;
        let timeline_bin = self.resolve(&collections, &job.bin_path).await?;

        let sources = self.child(&root, &layout.source_root).await?;
        let source_bin = self.child(&sources, &job.source_bin_name()).await?;

        Ok(JobBins {
            timeline_bin,
            source_bin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lrr_library::InMemoryLibrary;
    use lrr_models::FileEntry;

    #[test]
    fn test_segments_trimmed_and_non_empty() {
        assert_eq!(bin_path_segments(" A / B//C/ "), vec!["A", "B", "C"]);
        assert!(bin_path_segments("///").is_empty());
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let library = InMemoryLibrary::new();
        let root = library.root_folder().await.unwrap();

        let first = BinResolver::new(&library).resolve(&root, "A/B/C").await.unwrap();
        let count = library.folder_count();
        let second = BinResolver::new(&library).resolve(&root, "A/B/C").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(library.folder_count(), count);
        assert_eq!(library.find_folder("A/B/C"), Some(first));
    }

    #[tokio::test]
    async fn test_resolve_shares_prefixes() {
        let library = InMemoryLibrary::new();
        let root = library.root_folder().await.unwrap();
        let mut resolver = BinResolver::new(&library);

        resolver.resolve(&root, "A/B").await.unwrap();
        resolver.resolve(&root, "A/C").await.unwrap();

        let a = library.find_folder("A").unwrap();
        assert_eq!(library.child_names(&a), vec!["B", "C"]);
        assert_eq!(library.child_names(&root), vec!["A"]);
    }

    #[tokio::test]
    async fn test_empty_path_is_root() {
        let library = InMemoryLibrary::new();
        let root = library.root_folder().await.unwrap();

        let resolved = BinResolver::new(&library).resolve(&root, " / ").await.unwrap();
        assert_eq!(resolved, root);
        assert_eq!(library.folder_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_names_first_wins() {
        let library = InMemoryLibrary::new();
        let root = library.root_folder().await.unwrap();
        let first = library.add_subfolder(&root, "Dup").await.unwrap().unwrap();
        library.add_subfolder(&root, "Dup").await.unwrap().unwrap();

        let resolved = BinResolver::new(&library).resolve(&root, "Dup").await.unwrap();
        assert_eq!(resolved, first.id);
    }

    #[tokio::test]
    async fn test_rejected_creation_is_hard_error() {
        let library = InMemoryLibrary::new().reject_folder("B");
        let root = library.root_folder().await.unwrap();

        let err = BinResolver::new(&library)
            .resolve(&root, "A/B/C")
            .await
            .unwrap_err();
        match err {
            WorkerError::FolderCreation { name, .. } => assert_eq!(name, "B"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(library.find_folder("A").is_some());
    }

    #[tokio::test]
    async fn test_lost_connection_is_not_a_folder_error() {
        let library = InMemoryLibrary::new().disconnected();
        let job = Job::new(
            lrr_models::SourceType::default(),
            vec![FileEntry::new("/shoots/Iceland/IMG_1.tif")],
        );

        let err = BinResolver::new(&library)
            .resolve_job_bins(&BinLayout::default(), &job)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::Library(_)));
        assert!(err.is_connection_lost());
    }

    #[tokio::test]
    async fn test_job_bins() {
        let library = InMemoryLibrary::new();
        let job = Job::new(
            lrr_models::SourceType::default(),
            vec![FileEntry::new("/shoots/Iceland/IMG_1.tif")],
        )
        .with_bin_path("Travel/2024");

        let bins = BinResolver::new(&library)
            .resolve_job_bins(&BinLayout::default(), &job)
            .await
            .unwrap();

        assert_eq!(library.find_folder("Collections/Travel/2024"), Some(bins.timeline_bin));
        assert_eq!(library.find_folder("Source Photos/Iceland"), Some(bins.source_bin));
    }
}
