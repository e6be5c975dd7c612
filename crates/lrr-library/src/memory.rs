//! In-process media pool.
//!
//! Mirrors the parts of Resolve's media pool the pipeline touches: a folder
//! tree with a current folder, imported clips, and timelines with settings
//! and transformable items. Used for `LIBRARY_BACKEND=memory` dry runs and
//! throughout the pipeline tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use lrr_models::file_name;

use crate::error::{LibraryError, LibraryResult};
use crate::gateway::AssetLibrary;
use crate::types::{ClipId, Folder, FolderId, ItemId, TimelineId, TrackType};

const ROOT_NAME: &str = "Master";

/// Media the library knows how to import.
#[derive(Debug, Clone)]
struct MediaInfo {
    resolution: String,
    reported_path: Option<String>,
}

#[derive(Debug)]
struct FolderNode {
    name: String,
    parent: Option<usize>,
    children: Vec<usize>,
}

#[derive(Debug)]
struct ClipRecord {
    name: String,
    file_path: String,
    resolution: String,
    folder: usize,
}

#[derive(Debug)]
struct ItemRecord {
    clip: usize,
    properties: BTreeMap<String, f64>,
}

#[derive(Debug)]
struct TimelineRecord {
    name: String,
    folder: usize,
    settings: BTreeMap<String, String>,
    items: Vec<ItemRecord>,
}

#[derive(Debug)]
struct State {
    folders: Vec<FolderNode>,
    current_folder: usize,
    catalogue: HashMap<String, MediaInfo>,
    accept_any_media: bool,
    clips: Vec<ClipRecord>,
    timelines: Vec<TimelineRecord>,
    current_timeline: Option<usize>,
    rejected_folders: HashSet<String>,
    rejected_timelines: HashSet<String>,
    disconnected: bool,
}

impl State {
    fn folder_index(&self, id: &FolderId) -> LibraryResult<usize> {
        parse_index(id.as_str(), "folder-")
            .filter(|idx| *idx < self.folders.len())
            .ok_or_else(|| LibraryError::not_found(format!("folder {id}")))
    }

    fn clip_index(&self, id: &ClipId) -> LibraryResult<usize> {
        parse_index(id.as_str(), "clip-")
            .filter(|idx| *idx < self.clips.len())
            .ok_or_else(|| LibraryError::not_found(format!("clip {id}")))
    }

    fn timeline_index(&self, id: &TimelineId) -> LibraryResult<usize> {
        parse_index(id.as_str(), "timeline-")
            .filter(|idx| *idx < self.timelines.len())
            .ok_or_else(|| LibraryError::not_found(format!("timeline {id}")))
    }

    fn item_index(&self, id: &ItemId) -> LibraryResult<(usize, usize)> {
        id.as_str()
            .strip_prefix("item-")
            .and_then(|rest| rest.split_once('-'))
            .and_then(|(t, i)| Some((t.parse::<usize>().ok()?, i.parse::<usize>().ok()?)))
            .filter(|(t, i)| self.timelines.get(*t).is_some_and(|tl| *i < tl.items.len()))
            .ok_or_else(|| LibraryError::not_found(format!("timeline item {id}")))
    }

    fn folder_path(&self, mut idx: usize) -> String {
        let mut parts = Vec::new();
        while let Some(parent) = self.folders[idx].parent {
            parts.push(self.folders[idx].name.as_str());
            idx = parent;
        }
        parts.reverse();
        parts.join("/")
    }

    fn find_child(&self, parent: usize, name: &str) -> Option<usize> {
        self.folders[parent]
            .children
            .iter()
            .copied()
            .find(|child| self.folders[*child].name == name)
    }

    fn add_folder(&mut self, parent: usize, name: &str) -> usize {
        let idx = self.folders.len();
        self.folders.push(FolderNode {
            name: name.to_string(),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.folders[parent].children.push(idx);
        idx
    }
}

fn parse_index(id: &str, prefix: &str) -> Option<usize> {
    id.strip_prefix(prefix)?.parse().ok()
}

fn folder_id(idx: usize) -> FolderId {
    FolderId::new(format!("folder-{idx}"))
}

/// A timeline as seen by tests and dry-run reports.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineSnapshot {
    pub name: String,
    /// Slash-joined folder path below the root
    pub folder_path: String,
    pub settings: BTreeMap<String, String>,
    pub items: Vec<ItemSnapshot>,
}

impl TimelineSnapshot {
    /// Parsed numeric setting, if present.
    pub fn setting_u32(&self, key: &str) -> Option<u32> {
        self.settings.get(key).and_then(|v| v.parse().ok())
    }
}

/// One timeline item with the properties assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSnapshot {
    pub clip_name: String,
    pub properties: BTreeMap<String, f64>,
}

/// Deterministic media pool held in memory.
#[derive(Debug)]
pub struct InMemoryLibrary {
    state: Mutex<State>,
}

impl Default for InMemoryLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLibrary {
    /// An empty library that only imports media registered with [`with_media`](Self::with_media).
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                folders: vec![FolderNode {
                    name: ROOT_NAME.to_string(),
                    parent: None,
                    children: Vec::new(),
                }],
                current_folder: 0,
                catalogue: HashMap::new(),
                accept_any_media: false,
                clips: Vec::new(),
                timelines: Vec::new(),
                current_timeline: None,
                rejected_folders: HashSet::new(),
                rejected_timelines: HashSet::new(),
                disconnected: false,
            }),
        }
    }

    /// A library that imports any path, with an empty resolution for
    /// unregistered media.
    pub fn permissive() -> Self {
        let library = Self::new();
        library.lock().accept_any_media = true;
        library
    }

    /// Register importable media with its native resolution (`"6000x4000"`).
    pub fn with_media(self, path: impl Into<String>, resolution: impl Into<String>) -> Self {
        self.lock().catalogue.insert(
            path.into(),
            MediaInfo {
                resolution: resolution.into(),
                reported_path: None,
            },
        );
        self
    }

    /// Register media whose clip reports a different `"File Path"` than the
    /// path it was imported from.
    pub fn with_reported_media(
        self,
        path: impl Into<String>,
        reported_path: impl Into<String>,
        resolution: impl Into<String>,
    ) -> Self {
        self.lock().catalogue.insert(
            path.into(),
            MediaInfo {
                resolution: resolution.into(),
                reported_path: Some(reported_path.into()),
            },
        );
        self
    }

    /// Refuse to create folders with this name.
    pub fn reject_folder(self, name: impl Into<String>) -> Self {
        self.lock().rejected_folders.insert(name.into());
        self
    }

    /// Refuse to create timelines with this name.
    pub fn reject_timeline(self, name: impl Into<String>) -> Self {
        self.lock().rejected_timelines.insert(name.into());
        self
    }

    /// Fail every gateway call as if Resolve had quit.
    pub fn disconnected(self) -> Self {
        self.lock().disconnected = true;
        self
    }

    fn connected(&self) -> LibraryResult<MutexGuard<'_, State>> {
        let state = self.lock();
        if state.disconnected {
            return Err(LibraryError::Unavailable("in-memory library disconnected".to_string()));
        }
        Ok(state)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A poisoned lock only means a test panicked mid-call; the data is still usable.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Total folders below the root.
    pub fn folder_count(&self) -> usize {
        self.lock().folders.len() - 1
    }

    /// Follow `path` from the root, first match at each level.
    pub fn find_folder(&self, path: &str) -> Option<FolderId> {
        let state = self.lock();
        let mut current = 0;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            current = state.find_child(current, part)?;
        }
        Some(folder_id(current))
    }

    /// Names of a folder's direct children, in creation order.
    pub fn child_names(&self, folder: &FolderId) -> Vec<String> {
        let state = self.lock();
        match state.folder_index(folder) {
            Ok(idx) => state.folders[idx]
                .children
                .iter()
                .map(|child| state.folders[*child].name.clone())
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Slash-joined path of the current folder.
    pub fn current_folder_path(&self) -> String {
        let state = self.lock();
        state.folder_path(state.current_folder)
    }

    /// `(clip name, folder path)` for every imported clip.
    pub fn clips(&self) -> Vec<(String, String)> {
        let state = self.lock();
        state
            .clips
            .iter()
            .map(|clip| (clip.name.clone(), state.folder_path(clip.folder)))
            .collect()
    }

    /// Every timeline, in creation order.
    pub fn timelines(&self) -> Vec<TimelineSnapshot> {
        let state = self.lock();
        state
            .timelines
            .iter()
            .map(|tl| TimelineSnapshot {
                name: tl.name.clone(),
                folder_path: state.folder_path(tl.folder),
                settings: tl.settings.clone(),
                items: tl
                    .items
                    .iter()
                    .map(|item| ItemSnapshot {
                        clip_name: state.clips[item.clip].name.clone(),
                        properties: item.properties.clone(),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Timeline by name.
    pub fn timeline(&self, name: &str) -> Option<TimelineSnapshot> {
        self.timelines().into_iter().find(|tl| tl.name == name)
    }
}

#[async_trait]
impl AssetLibrary for InMemoryLibrary {
    async fn root_folder(&self) -> LibraryResult<FolderId> {
        let _state = self.connected()?;
        Ok(folder_id(0))
    }

    async fn subfolders(&self, parent: &FolderId) -> LibraryResult<Vec<Folder>> {
        let state = self.connected()?;
        let idx = state.folder_index(parent)?;
        Ok(state.folders[idx]
            .children
            .iter()
            .map(|child| Folder {
                id: folder_id(*child),
                name: state.folders[*child].name.clone(),
            })
            .collect())
    }

    async fn add_subfolder(&self, parent: &FolderId, name: &str) -> LibraryResult<Option<Folder>> {
        let mut state = self.connected()?;
        let parent = state.folder_index(parent)?;
        if name.is_empty() || state.rejected_folders.contains(name) {
            return Ok(None);
        }
        let idx = state.add_folder(parent, name);
        debug!("Created folder {}", state.folder_path(idx));
        Ok(Some(Folder {
            id: folder_id(idx),
            name: name.to_string(),
        }))
    }

    async fn set_current_folder(&self, folder: &FolderId) -> LibraryResult<bool> {
        let mut state = self.connected()?;
        state.current_folder = state.folder_index(folder)?;
        Ok(true)
    }

    async fn import_media(&self, paths: &[String]) -> LibraryResult<Vec<ClipId>> {
        let mut state = self.connected()?;
        let mut imported = Vec::new();

        for path in paths {
            let info = match state.catalogue.get(path) {
                Some(info) => info.clone(),
                None if state.accept_any_media => MediaInfo {
                    resolution: String::new(),
                    reported_path: None,
                },
                None => {
                    debug!("Not importable: {}", path);
                    continue;
                }
            };

            let idx = state.clips.len();
            let folder = state.current_folder;
            state.clips.push(ClipRecord {
                name: file_name(path).to_string(),
                file_path: info.reported_path.unwrap_or_else(|| path.clone()),
                resolution: info.resolution,
                folder,
            });
            imported.push(ClipId::new(format!("clip-{idx}")));
        }

        Ok(imported)
    }

    async fn clip_property(&self, clip: &ClipId, key: &str) -> LibraryResult<Option<String>> {
        let state = self.connected()?;
        let clip = &state.clips[state.clip_index(clip)?];
        Ok(match key {
            crate::clip_props::FILE_PATH => Some(clip.file_path.clone()),
            crate::clip_props::RESOLUTION => Some(clip.resolution.clone()),
            _ => None,
        })
    }

    async fn clip_name(&self, clip: &ClipId) -> LibraryResult<String> {
        let state = self.connected()?;
        Ok(state.clips[state.clip_index(clip)?].name.clone())
    }

    async fn create_empty_timeline(&self, name: &str) -> LibraryResult<Option<TimelineId>> {
        let mut state = self.connected()?;
        if state.rejected_timelines.contains(name) {
            return Ok(None);
        }
        let idx = state.timelines.len();
        let folder = state.current_folder;
        state.timelines.push(TimelineRecord {
            name: name.to_string(),
            folder,
            settings: BTreeMap::new(),
            items: Vec::new(),
        });
        state.current_timeline = Some(idx);
        Ok(Some(TimelineId::new(format!("timeline-{idx}"))))
    }

    async fn timeline_name(&self, timeline: &TimelineId) -> LibraryResult<String> {
        let state = self.connected()?;
        Ok(state.timelines[state.timeline_index(timeline)?].name.clone())
    }

    async fn set_timeline_setting(
        &self,
        timeline: &TimelineId,
        key: &str,
        value: &str,
    ) -> LibraryResult<bool> {
        let mut state = self.connected()?;
        let idx = state.timeline_index(timeline)?;
        state.timelines[idx]
            .settings
            .insert(key.to_string(), value.to_string());
        Ok(true)
    }

    async fn append_to_timeline(&self, clip: &ClipId) -> LibraryResult<bool> {
        let mut state = self.connected()?;
        let clip = state.clip_index(clip)?;
        let Some(current) = state.current_timeline else {
            return Ok(false);
        };
        state.timelines[current].items.push(ItemRecord {
            clip,
            properties: BTreeMap::new(),
        });
        Ok(true)
    }

    async fn track_items(
        &self,
        timeline: &TimelineId,
        track: TrackType,
        index: u32,
    ) -> LibraryResult<Vec<ItemId>> {
        let state = self.connected()?;
        let idx = state.timeline_index(timeline)?;
        // Stills land on V1; nothing is ever placed elsewhere.
        if track != TrackType::Video || index != 1 {
            return Ok(Vec::new());
        }
        Ok((0..state.timelines[idx].items.len())
            .map(|i| ItemId::new(format!("item-{idx}-{i}")))
            .collect())
    }

    async fn set_item_property(&self, item: &ItemId, key: &str, value: f64) -> LibraryResult<bool> {
        let mut state = self.connected()?;
        let (timeline, item) = state.item_index(item)?;
        state.timelines[timeline].items[item]
            .properties
            .insert(key.to_string(), value);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_folders_and_current_folder() {
        let library = InMemoryLibrary::new();
        let root = library.root_folder().await.unwrap();

        let a = library.add_subfolder(&root, "A").await.unwrap().unwrap();
        let b = library.add_subfolder(&a.id, "B").await.unwrap().unwrap();
        library.set_current_folder(&b.id).await.unwrap();

        assert_eq!(library.current_folder_path(), "A/B");
        assert_eq!(library.find_folder("A/B"), Some(b.id));
        assert_eq!(library.subfolders(&root).await.unwrap(), vec![a]);
        assert_eq!(library.folder_count(), 2);
    }

    #[tokio::test]
    async fn test_disconnected_library_fails_every_call() {
        let library = InMemoryLibrary::permissive().disconnected();
        let err = library.root_folder().await.unwrap_err();
        assert!(err.is_connection_error());
        assert!(library.import_media(&["/p/a.tif".into()]).await.is_err());
    }

    #[tokio::test]
    async fn test_rejected_folder() {
        let library = InMemoryLibrary::new().reject_folder("Locked");
        let root = library.root_folder().await.unwrap();
        assert_eq!(library.add_subfolder(&root, "Locked").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_import_only_known_media() {
        let library = InMemoryLibrary::new()
            .with_media("/p/a.tif", "6000x4000")
            .with_reported_media("/p/b.dng", "/Volumes/P/b.dng", "4000x6000");

        let clips = library
            .import_media(&["/p/a.tif".into(), "/p/missing.tif".into(), "/p/b.dng".into()])
            .await
            .unwrap();

        assert_eq!(clips.len(), 2);
        assert_eq!(library.clip_name(&clips[0]).await.unwrap(), "a.tif");
        assert_eq!(
            library
                .clip_property(&clips[1], crate::clip_props::FILE_PATH)
                .await
                .unwrap()
                .as_deref(),
            Some("/Volumes/P/b.dng")
        );
    }

    #[tokio::test]
    async fn test_timeline_items_and_properties() {
        let library = InMemoryLibrary::new().with_media("/p/a.tif", "6000x4000");
        let clips = library.import_media(&["/p/a.tif".into()]).await.unwrap();

        let tl = library.create_empty_timeline("a").await.unwrap().unwrap();
        library.set_timeline_setting(&tl, "useCustomSettings", "1").await.unwrap();
        assert!(library.append_to_timeline(&clips[0]).await.unwrap());

        let items = library.track_items(&tl, TrackType::Video, 1).await.unwrap();
        assert_eq!(items.len(), 1);
        assert!(library.track_items(&tl, TrackType::Video, 2).await.unwrap().is_empty());
        library.set_item_property(&items[0], "ZoomX", 1.5).await.unwrap();

        let snapshot = library.timeline("a").unwrap();
        assert_eq!(snapshot.settings.get("useCustomSettings").map(String::as_str), Some("1"));
        assert_eq!(snapshot.items[0].clip_name, "a.tif");
        assert_eq!(snapshot.items[0].properties.get("ZoomX"), Some(&1.5));
    }

    #[tokio::test]
    async fn test_unknown_handles() {
        let library = InMemoryLibrary::new();
        assert!(library.subfolders(&FolderId::new("folder-9")).await.is_err());
        assert!(library.clip_name(&ClipId::new("bogus")).await.is_err());
    }
}
