//! Job definitions read from the file queue.
//!
//! Job files are produced by the Lightroom export plugin. Parsing is
//! best-effort: missing fields fall back to defaults and malformed file
//! entries are dropped instead of rejecting the whole job.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

use crate::utils::parent_dir_name;
use crate::Orientation;

/// Bin path used when a job does not name one.
pub const DEFAULT_BIN_PATH: &str = "Lightroom Import";

/// Source bin name used when the job has no usable input file.
pub const DEFAULT_SOURCE_BIN: &str = "Imported";

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Derive a job ID from a queue file name (`2024-05-01_1234.json` -> `2024-05-01_1234`).
    pub fn from_file_name(file_name: &str) -> Self {
        let id = file_name.strip_suffix(".json").unwrap_or(file_name);
        Self(id.to_string())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of media a job carries.
///
/// Only the exact label `"RAW"` selects RAW handling; every other label is
/// kept verbatim for logging and treated as ready-to-import media.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceType {
    /// Camera RAW files that must be converted to DNG before import
    Raw,
    /// Anything else (TIFF, JPEG, ...)
    Other(String),
}

impl SourceType {
    pub fn from_label(label: impl Into<String>) -> Self {
        let label = label.into();
        if label == "RAW" {
            SourceType::Raw
        } else {
            SourceType::Other(label)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SourceType::Raw => "RAW",
            SourceType::Other(label) => label,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, SourceType::Raw)
    }
}

impl Default for SourceType {
    fn default() -> Self {
        SourceType::Other("TIFF".to_string())
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SourceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SourceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(label) => SourceType::from_label(label),
            _ => SourceType::default(),
        })
    }
}

/// One file listed in a job.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Absolute path on disk
    pub path: String,
    /// Whether the photo was shot in portrait orientation
    #[serde(default)]
    pub is_vertical: bool,
    /// Sensor orientation tag recorded at capture time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub orientation: Option<Orientation>,
}

impl FileEntry {
    /// Create a landscape entry without an orientation tag.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_vertical: false,
            orientation: None,
        }
    }

    /// Mark the entry as portrait.
    pub fn vertical(mut self, is_vertical: bool) -> Self {
        self.is_vertical = is_vertical;
        self
    }

    /// Attach an orientation tag.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    /// Extract an entry from either a bare path string or an object.
    ///
    /// Returns `None` for entries without a usable path.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(path) if !path.is_empty() => Some(Self::new(path.clone())),
            Value::Object(map) => {
                let path = map.get("path").and_then(Value::as_str)?;
                if path.is_empty() {
                    return None;
                }
                Some(Self {
                    path: path.to_string(),
                    is_vertical: map.get("isVertical").is_some_and(is_truthy),
                    orientation: map
                        .get("orientation")
                        .and_then(Value::as_str)
                        .and_then(Orientation::from_tag),
                })
            }
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for FileEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        FileEntry::from_value(&value)
            .ok_or_else(|| serde::de::Error::custom("file entry has no usable path"))
    }
}

/// A batch of photos to bring into the current Resolve project.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Queue-assigned identifier (derived from the job file name)
    #[serde(skip)]
    pub id: JobId,

    /// RAW or ready-to-import media
    #[serde(default)]
    #[schemars(with = "String")]
    pub source_type: SourceType,

    /// Slash-delimited bin path under "Collections"
    #[serde(
        default = "default_bin_path",
        deserialize_with = "deserialize_bin_path"
    )]
    pub bin_path: String,

    /// Files in export order
    #[serde(default, deserialize_with = "deserialize_file_entries")]
    pub files: Vec<FileEntry>,
}

impl Job {
    /// Create a job with the default bin path.
    pub fn new(source_type: SourceType, files: Vec<FileEntry>) -> Self {
        Self {
            id: JobId::new(),
            source_type,
            bin_path: DEFAULT_BIN_PATH.to_string(),
            files,
        }
    }

    /// Parse a job document.
    pub fn from_json_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Set the job ID.
    pub fn with_id(mut self, id: JobId) -> Self {
        self.id = id;
        self
    }

    /// Set the bin path.
    pub fn with_bin_path(mut self, bin_path: impl Into<String>) -> Self {
        self.bin_path = bin_path.into();
        self
    }

    pub fn is_raw(&self) -> bool {
        self.source_type.is_raw()
    }

    /// Input paths in job order.
    pub fn input_paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|entry| entry.path.as_str())
    }

    /// Name of the per-batch bin under "Source Photos".
    ///
    /// This is the name of the first input file's parent directory.
    pub fn source_bin_name(&self) -> String {
        self.files
            .first()
            .and_then(|entry| parent_dir_name(&entry.path))
            .unwrap_or(DEFAULT_SOURCE_BIN)
            .to_string()
    }
}

/// Plugin flags are loosely typed: `1`, `"yes"` and `true` all count as set,
/// while `0`, `""`, `null` and empty containers do not.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn default_bin_path() -> String {
    DEFAULT_BIN_PATH.to_string()
}

fn deserialize_bin_path<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(path) => path,
        _ => default_bin_path(),
    })
}

fn deserialize_file_entries<'de, D>(deserializer: D) -> Result<Vec<FileEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.iter().filter_map(FileEntry::from_value).collect(),
        _ => Vec::new(),
    })
}
