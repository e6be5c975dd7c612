//! Handles and well-known keys for media pool objects.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

handle!(
    /// Opaque handle to a media pool folder (bin).
    FolderId
);
handle!(
    /// Opaque handle to an imported media pool clip.
    ClipId
);
handle!(
    /// Opaque handle to a timeline.
    TimelineId
);
handle!(
    /// Opaque handle to an item placed on a timeline track.
    ItemId
);

/// A folder as listed by the media pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
}

impl Folder {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: FolderId::new(id),
            name: name.into(),
        }
    }
}

/// Timeline track kinds the pipeline reads. Stills only ever land on video tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackType {
    Video,
}

impl TrackType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackType::Video => "video",
        }
    }
}

/// Clip property names understood by `GetClipProperty`.
pub mod clip_props {
    pub const FILE_PATH: &str = "File Path";
    pub const RESOLUTION: &str = "Resolution";
}

/// Timeline setting names understood by `SetSetting`.
pub mod timeline_settings {
    pub const USE_CUSTOM_SETTINGS: &str = "useCustomSettings";
    pub const RESOLUTION_WIDTH: &str = "timelineResolutionWidth";
    pub const RESOLUTION_HEIGHT: &str = "timelineResolutionHeight";
    pub const OUTPUT_RESOLUTION_WIDTH: &str = "timelineOutputResolutionWidth";
    pub const OUTPUT_RESOLUTION_HEIGHT: &str = "timelineOutputResolutionHeight";
}

/// Timeline item property names understood by `SetProperty`.
pub mod item_props {
    pub const ROTATION_ANGLE: &str = "RotationAngle";
    pub const ZOOM_X: &str = "ZoomX";
    pub const ZOOM_Y: &str = "ZoomY";
}
