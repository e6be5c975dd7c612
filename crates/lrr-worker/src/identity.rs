//! Per-file identity across RAW conversion and import.
//!
//! A job describes each input file by path. Conversion swaps the path for
//! the DNG's, and the media pool may report yet another path for the
//! imported clip, so lookups fall back to the file name when the exact path
//! is unknown.

use std::collections::HashMap;

use tracing::warn;

use lrr_models::{file_name, FileEntry, Orientation};

/// What the job said about one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileIdentity {
    pub is_vertical: bool,
    pub orientation: Option<Orientation>,
}

impl From<&FileEntry> for FileIdentity {
    fn from(entry: &FileEntry) -> Self {
        Self {
            is_vertical: entry.is_vertical,
            orientation: entry.orientation.clone(),
        }
    }
}

/// How a lookup was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityMatch {
    Exact,
    /// Matched by file name; `ambiguous` when several known paths share it
    Basename { ambiguous: bool },
    Missing,
}

/// Path-keyed identities with a file-name fallback.
#[derive(Debug, Clone, Default)]
pub struct IdentityTracker {
    by_path: HashMap<String, FileIdentity>,
    /// File name -> full paths, oldest insertion first
    by_name: HashMap<String, Vec<String>>,
}

impl IdentityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a job's file entries. A path listed twice keeps its last entry.
    pub fn from_entries(entries: &[FileEntry]) -> Self {
        let mut tracker = Self::new();
        for entry in entries {
            tracker.insert(entry.path.clone(), FileIdentity::from(entry));
        }
        tracker
    }

    /// Record `identity` for `path`, making it the newest holder of its file name.
    pub fn insert(&mut self, path: impl Into<String>, identity: FileIdentity) {
        let path = path.into();
        let paths = self.by_name.entry(file_name(&path).to_string()).or_default();
        paths.retain(|known| known != &path);
        paths.push(path.clone());
        self.by_path.insert(path, identity);
    }

    /// Give `to` the identity recorded for exactly `from`.
    ///
    /// Returns `false` (and records nothing) when `from` is unknown.
    pub fn carry_over(&mut self, from: &str, to: impl Into<String>) -> bool {
        match self.by_path.get(from).cloned() {
            Some(identity) => {
                self.insert(to, identity);
                true
            }
            None => false,
        }
    }

    /// Identity for `path`, or the default identity when nothing matches.
    pub fn lookup(&self, path: &str) -> FileIdentity {
        self.lookup_detailed(path).0
    }

    /// Identity for `path` together with how it was found.
    pub fn lookup_detailed(&self, path: &str) -> (FileIdentity, IdentityMatch) {
        if let Some(identity) = self.by_path.get(path) {
            return (identity.clone(), IdentityMatch::Exact);
        }

        let name = file_name(path);
        let Some((chosen, candidates)) = self
            .by_name
            .get(name)
            .and_then(|paths| Some((paths.last()?, paths)))
        else {
            return (FileIdentity::default(), IdentityMatch::Missing);
        };

        let ambiguous = candidates.len() > 1;
        if ambiguous {
            warn!(
                path,
                file_name = name,
                chosen = %chosen,
                candidates = ?candidates,
                "Ambiguous identity: several job files share this name, using the most recent"
            );
        }

        let identity = self.by_path.get(chosen).cloned().unwrap_or_default();
        (identity, IdentityMatch::Basename { ambiguous })
    }
}
