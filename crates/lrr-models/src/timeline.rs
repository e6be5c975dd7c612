//! Derived timeline parameters.

use serde::{Deserialize, Serialize};

/// Resolution and transform for a single-clip timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineSpec {
    /// Timeline and output width in pixels
    pub width: u32,
    /// Timeline and output height in pixels
    pub height: u32,
    /// Clip rotation in degrees (signed)
    pub rotation_angle: f64,
    /// Uniform zoom applied to both axes
    pub zoom: f64,
}

impl TimelineSpec {
    /// The clip needs a rotation/zoom transform on the timeline.
    pub fn needs_transform(&self) -> bool {
        self.rotation_angle != 0.0
    }
}
