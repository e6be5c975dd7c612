//! One timeline per imported photo.
//!
//! Each clip gets its own timeline sized to the photo's orientation. When
//! the pixels need turning to fill that frame, the clip is rotated on the
//! timeline and zoomed so the rotated image still covers the frame.

use tracing::{debug, info, warn};

use lrr_library::{
    clip_props, item_props, timeline_settings, AssetLibrary, ClipId, FolderId, LibraryResult,
    TimelineId, TrackType,
};
use lrr_models::{file_stem, Orientation, Resolution, TimelineSpec};

use crate::error::WorkerResult;
use crate::identity::FileIdentity;

/// Parse a `"<width>x<height>"` clip resolution, falling back to 1920x1080.
pub fn parse_resolution(raw: &str) -> Resolution {
    raw.parse().unwrap_or_else(|e| {
        warn!("{}, using {}", e, Resolution::FALLBACK);
        Resolution::FALLBACK
    })
}

/// Timeline `(width, height)`: portrait photos get a tall frame.
pub fn target_dimensions(native: Resolution, is_vertical: bool) -> (u32, u32) {
    if is_vertical {
        (native.short_edge(), native.long_edge())
    } else {
        (native.long_edge(), native.short_edge())
    }
}

/// Clip rotation in degrees.
///
/// An orientation tag always decides; otherwise a portrait photo whose pixels
/// are stored landscape is turned a quarter clockwise.
pub fn rotation_angle(
    native: Resolution,
    target: (u32, u32),
    is_vertical: bool,
    orientation: Option<&Orientation>,
) -> f64 {
    match orientation {
        Some(Orientation::RotatedClockwise) => -90.0,
        Some(Orientation::RotatedCounterClockwise) => 90.0,
        Some(Orientation::Rotated180) => 180.0,
        _ if is_vertical && target.1 > target.0 && native.is_landscape() => -90.0,
        _ => 0.0,
    }
}

/// Zoom that keeps a rotated clip covering the frame.
pub fn zoom_factor(native: Resolution, rotation: f64) -> f64 {
    if rotation != 0.0 {
        native.aspect_ratio()
    } else {
        1.0
    }
}

/// Derive the timeline for a clip from its reported resolution and the job's
/// description of the file.
pub fn plan_timeline(
    resolution: &str,
    is_vertical: bool,
    orientation: Option<&Orientation>,
) -> TimelineSpec {
    let native = parse_resolution(resolution);
    let (width, height) = target_dimensions(native, is_vertical);
    let rotation_angle = rotation_angle(native, (width, height), is_vertical, orientation);

    TimelineSpec {
        width,
        height,
        rotation_angle,
        zoom: zoom_factor(native, rotation_angle),
    }
}

/// A timeline that was created for a clip.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedTimeline {
    pub id: TimelineId,
    pub name: String,
    pub spec: TimelineSpec,
}

/// Creates timelines inside one bin.
pub struct TimelineSynthesizer<'a> {
    library: &'a dyn AssetLibrary,
    timeline_bin: FolderId,
}

impl<'a> TimelineSynthesizer<'a> {
    pub fn new(library: &'a dyn AssetLibrary, timeline_bin: FolderId) -> Self {
        Self {
            library,
            timeline_bin,
        }
    }

    /// Build the timeline for `clip`.
    ///
    /// `Ok(None)` when the library refuses to create the timeline. Problems
    /// configuring a timeline that already exists are logged and the
    /// timeline is still returned, named as the library reports it.
    pub async fn synthesize(
        &self,
        clip: &ClipId,
        identity: &FileIdentity,
    ) -> WorkerResult<Option<CreatedTimeline>> {
        if !self.library.set_current_folder(&self.timeline_bin).await? {
            warn!(bin = %self.timeline_bin, "Could not select timeline bin");
        }

        let clip_name = self.library.clip_name(clip).await?;
        let resolution = self
            .library
            .clip_property(clip, clip_props::RESOLUTION)
            .await?
            .unwrap_or_default();

        let spec = plan_timeline(&resolution, identity.is_vertical, identity.orientation.as_ref());
        let name = file_stem(&clip_name).to_string();

        let Some(timeline) = self.library.create_empty_timeline(&name).await? else {
            warn!(clip = %clip, timeline = %name, "Failed to create timeline");
            return Ok(None);
        };
        let name = match self.library.timeline_name(&timeline).await {
            Ok(reported) => reported,
            Err(e) => {
                debug!(timeline = %timeline, "Could not read timeline name back: {}", e);
                name
            }
        };

        if let Err(e) = self.configure(&timeline, clip, &spec).await {
            warn!(timeline = %name, "Timeline created but not fully configured: {}", e);
        }

        Ok(Some(CreatedTimeline {
            id: timeline,
            name,
            spec,
        }))
    }

    async fn configure(
        &self,
        timeline: &TimelineId,
        clip: &ClipId,
        spec: &TimelineSpec,
    ) -> LibraryResult<()> {
        let width = spec.width.to_string();
        let height = spec.height.to_string();
        let settings = [
            (timeline_settings::USE_CUSTOM_SETTINGS, "1"),
            (timeline_settings::RESOLUTION_WIDTH, width.as_str()),
            (timeline_settings::RESOLUTION_HEIGHT, height.as_str()),
            (timeline_settings::OUTPUT_RESOLUTION_WIDTH, width.as_str()),
            (timeline_settings::OUTPUT_RESOLUTION_HEIGHT, height.as_str()),
        ];
        for (key, value) in settings {
            if !self.library.set_timeline_setting(timeline, key, value).await? {
                warn!(timeline = %timeline, key, value, "Timeline setting rejected");
            }
        }

        if !self.library.append_to_timeline(clip).await? {
            warn!(timeline = %timeline, clip = %clip, "Clip was not appended");
        }

        if !spec.needs_transform() {
            return Ok(());
        }

        let items = self.library.track_items(timeline, TrackType::Video, 1).await?;
        let Some(item) = items.first() else {
            debug!(timeline = %timeline, "No item on V1 to transform");
            return Ok(());
        };

        for (key, value) in [
            (item_props::ROTATION_ANGLE, spec.rotation_angle),
            (item_props::ZOOM_X, spec.zoom),
            (item_props::ZOOM_Y, spec.zoom),
        ] {
            if !self.library.set_item_property(item, key, value).await? {
                warn!(timeline = %timeline, key, value, "Item property rejected");
            }
        }
        info!(
            timeline = %timeline,
            rotation = spec.rotation_angle,
            zoom = spec.zoom,
            "Applied clip transform"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lrr_library::InMemoryLibrary;

    #[test]
    fn test_target_dimensions_follow_vertical_flag() {
        let native = Resolution::new(6000, 4000);
        assert_eq!(target_dimensions(native, true), (4000, 6000));
        assert_eq!(target_dimensions(native, false), (6000, 4000));
    }

    #[test]
    fn test_upside_down_always_180() {
        for vertical in [true, false] {
            let spec = plan_timeline("6000x4000", vertical, Some(&Orientation::Rotated180));
            assert_eq!(spec.rotation_angle, 180.0);
            assert_eq!(spec.zoom, 1.5);
        }
    }

    #[test]
    fn test_orientation_tags() {
        assert_eq!(
            plan_timeline("6000x4000", false, Some(&Orientation::RotatedClockwise)).rotation_angle,
            -90.0
        );
        assert_eq!(
            plan_timeline("6000x4000", false, Some(&Orientation::RotatedCounterClockwise))
                .rotation_angle,
            90.0
        );
        assert_eq!(
            plan_timeline("6000x4000", false, Some(&Orientation::Upright)).rotation_angle,
            0.0
        );
    }

    #[test]
    fn test_vertical_landscape_pixels_rotate() {
        let spec = plan_timeline("6000x4000", true, None);
        assert_eq!((spec.width, spec.height), (4000, 6000));
        assert_eq!(spec.rotation_angle, -90.0);
        assert_eq!(spec.zoom, 1.5);
    }

    #[test]
    fn test_vertical_portrait_pixels_untouched() {
        let spec = plan_timeline("4000x6000", true, None);
        assert_eq!((spec.width, spec.height), (4000, 6000));
        assert_eq!(spec.rotation_angle, 0.0);
        assert_eq!(spec.zoom, 1.0);
    }

    #[test]
    fn test_unparseable_resolution_falls_back() {
        for raw in ["", "garbage", "0x1080", "1920x"] {
            let spec = plan_timeline(raw, false, None);
            assert_eq!((spec.width, spec.height), (1920, 1080), "input {raw:?}");
        }
        let spec = plan_timeline(" 6000 x 4000 ", false, None);
        assert_eq!((spec.width, spec.height), (6000, 4000));
    }

    async fn imported(library: &InMemoryLibrary, path: &str) -> (FolderId, ClipId) {
        let root = library.root_folder().await.unwrap();
        let bin = library.add_subfolder(&root, "Timelines").await.unwrap().unwrap();
        let clip = library.import_media(&[path.to_string()]).await.unwrap().remove(0);
        (bin.id, clip)
    }

    #[tokio::test]
    async fn test_synthesize_rotated_clip() {
        let library = InMemoryLibrary::new().with_media("/p/IMG_9.dng", "6000x4000");
        let (bin, clip) = imported(&library, "/p/IMG_9.dng").await;

        let created = TimelineSynthesizer::new(&library, bin)
            .synthesize(&clip, &FileIdentity { is_vertical: true, orientation: None })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(created.name, "IMG_9");

        let timeline = library.timeline("IMG_9").unwrap();
        assert_eq!(timeline.folder_path, "Timelines");
        assert_eq!(timeline.settings.get("useCustomSettings").map(String::as_str), Some("1"));
        assert_eq!(timeline.setting_u32("timelineResolutionWidth"), Some(4000));
        assert_eq!(timeline.setting_u32("timelineOutputResolutionHeight"), Some(6000));
        assert_eq!(timeline.items.len(), 1);
        assert_eq!(timeline.items[0].properties.get("RotationAngle"), Some(&-90.0));
        assert_eq!(timeline.items[0].properties.get("ZoomX"), Some(&1.5));
        assert_eq!(timeline.items[0].properties.get("ZoomY"), Some(&1.5));
    }

    #[tokio::test]
    async fn test_synthesize_without_rotation_leaves_item_alone() {
        let library = InMemoryLibrary::new().with_media("/p/IMG_10.tif", "6000x4000");
        let (bin, clip) = imported(&library, "/p/IMG_10.tif").await;

        TimelineSynthesizer::new(&library, bin)
            .synthesize(&clip, &FileIdentity::default())
            .await
            .unwrap()
            .unwrap();

        let timeline = library.timeline("IMG_10").unwrap();
        assert_eq!(timeline.setting_u32("timelineResolutionWidth"), Some(6000));
        assert!(timeline.items[0].properties.is_empty());
    }

    #[tokio::test]
    async fn test_refused_timeline_is_skipped() {
        let library = InMemoryLibrary::new()
            .with_media("/p/IMG_11.tif", "6000x4000")
            .reject_timeline("IMG_11");
        let (bin, clip) = imported(&library, "/p/IMG_11.tif").await;

        let created = TimelineSynthesizer::new(&library, bin)
            .synthesize(&clip, &FileIdentity::default())
            .await
            .unwrap();
        assert!(created.is_none());
        assert!(library.timelines().is_empty());
    }
}
