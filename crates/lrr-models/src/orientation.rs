//! Sensor orientation tags.
//!
//! Lightroom records orientation as a pair of letters naming which edge of
//! the sensor ended up on top and on the right (`A` = original top edge,
//! then clockwise `B`, `C`, `D`).

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Orientation tag attached to a job file entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// `AB` - as shot
    Upright,
    /// `BC` - turned 90 degrees clockwise
    RotatedClockwise,
    /// `CD` - upside down
    Rotated180,
    /// `DA` - turned 90 degrees counter-clockwise
    RotatedCounterClockwise,
    /// Any other tag (mirrored variants, future codes)
    Other(String),
}

impl Orientation {
    /// Parse a tag. Empty tags carry no information and yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let orientation = match tag {
            "" => return None,
            "AB" => Orientation::Upright,
            "BC" => Orientation::RotatedClockwise,
            "CD" => Orientation::Rotated180,
            "DA" => Orientation::RotatedCounterClockwise,
            other => Orientation::Other(other.to_string()),
        };
        Some(orientation)
    }

    /// The two-letter tag.
    pub fn tag(&self) -> &str {
        match self {
            Orientation::Upright => "AB",
            Orientation::RotatedClockwise => "BC",
            Orientation::Rotated180 => "CD",
            Orientation::RotatedCounterClockwise => "DA",
            Orientation::Other(tag) => tag,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for Orientation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for Orientation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Orientation::from_tag(&tag)
            .ok_or_else(|| serde::de::Error::custom("empty orientation tag"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags_round_trip() {
        for tag in ["AB", "BC", "CD", "DA"] {
            let orientation = Orientation::from_tag(tag).unwrap();
            assert!(!matches!(orientation, Orientation::Other(_)));
            assert_eq!(orientation.tag(), tag);
        }
    }

    #[test]
    fn test_unknown_and_empty_tags() {
        assert_eq!(
            Orientation::from_tag("BA"),
            Some(Orientation::Other("BA".to_string()))
        );
        assert_eq!(Orientation::from_tag(""), None);
    }
}
