//! The media pool seam.

use async_trait::async_trait;

use crate::error::LibraryResult;
use crate::types::{ClipId, Folder, FolderId, ItemId, TimelineId, TrackType};

/// Operations the job pipeline needs from the open Resolve project.
///
/// Methods that Resolve reports as a falsy return (rather than an error)
/// surface as `Ok(None)` / `Ok(false)`; `Err` is reserved for the gateway
/// itself failing.
#[async_trait]
pub trait AssetLibrary: Send + Sync {
    /// The media pool's root folder.
    async fn root_folder(&self) -> LibraryResult<FolderId>;

    /// Direct children of `parent`, in media pool order.
    async fn subfolders(&self, parent: &FolderId) -> LibraryResult<Vec<Folder>>;

    /// Create a child folder. `None` when the host refuses.
    async fn add_subfolder(&self, parent: &FolderId, name: &str) -> LibraryResult<Option<Folder>>;

    /// Select the folder imports and new timelines land in.
    async fn set_current_folder(&self, folder: &FolderId) -> LibraryResult<bool>;

    /// Import files into the current folder in one batch.
    ///
    /// Files the host cannot import are left out of the result.
    async fn import_media(&self, paths: &[String]) -> LibraryResult<Vec<ClipId>>;

    /// Read a clip property such as `"File Path"` or `"Resolution"`.
    async fn clip_property(&self, clip: &ClipId, key: &str) -> LibraryResult<Option<String>>;

    /// The clip's display name (usually its file name).
    async fn clip_name(&self, clip: &ClipId) -> LibraryResult<String>;

    /// Create an empty timeline in the current folder and make it current.
    async fn create_empty_timeline(&self, name: &str) -> LibraryResult<Option<TimelineId>>;

    /// Display name of a timeline.
    async fn timeline_name(&self, timeline: &TimelineId) -> LibraryResult<String>;

    /// Assign a timeline setting. Numeric settings are passed as strings.
    async fn set_timeline_setting(
        &self,
        timeline: &TimelineId,
        key: &str,
        value: &str,
    ) -> LibraryResult<bool>;

    /// Append a clip to the current timeline.
    async fn append_to_timeline(&self, clip: &ClipId) -> LibraryResult<bool>;

    /// Items on one track (`index` is 1-based).
    async fn track_items(
        &self,
        timeline: &TimelineId,
        track: TrackType,
        index: u32,
    ) -> LibraryResult<Vec<ItemId>>;

    /// Assign a numeric timeline item property.
    async fn set_item_property(&self, item: &ItemId, key: &str, value: f64) -> LibraryResult<bool>;
}
