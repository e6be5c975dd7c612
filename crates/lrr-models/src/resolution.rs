//! Clip pixel dimensions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a resolution string is not `<width>x<height>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid resolution string: {0:?}")]
pub struct ResolutionParseError(pub String);

/// Native pixel dimensions of a clip, as reported by the media pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Fallback used when the host reports something unparseable.
    pub const FALLBACK: Resolution = Resolution {
        width: 1920,
        height: 1080,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn long_edge(&self) -> u32 {
        self.width.max(self.height)
    }

    pub fn short_edge(&self) -> u32 {
        self.width.min(self.height)
    }

    /// Pixels are wider than tall.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }

    /// Long edge over short edge.
    pub fn aspect_ratio(&self) -> f64 {
        self.long_edge() as f64 / self.short_edge() as f64
    }
}

impl FromStr for Resolution {
    type Err = ResolutionParseError;

    /// Parse `"6000x4000"`. Whitespace around each number is tolerated and
    /// zero-sized dimensions are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ResolutionParseError(s.to_string());

        let (width, height) = s.split_once('x').ok_or_else(err)?;
        let width: u32 = width.trim().parse().map_err(|_| err())?;
        let height: u32 = height.trim().parse().map_err(|_| err())?;

        if width == 0 || height == 0 {
            return Err(err());
        }

        Ok(Self { width, height })
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
