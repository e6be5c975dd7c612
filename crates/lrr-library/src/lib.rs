//! Media pool gateway for DaVinci Resolve.
//!
//! This crate provides:
//! - The [`AssetLibrary`] trait the job pipeline drives the project through
//! - [`BridgeClient`], a JSON-over-HTTP client for the scripting bridge
//!   running inside Resolve
//! - [`InMemoryLibrary`], a deterministic in-process library for dry runs
//!   and tests

pub mod bridge;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod types;

pub use bridge::{BridgeClient, BridgeConfig};
pub use error::{LibraryError, LibraryResult};
pub use gateway::AssetLibrary;
pub use memory::{InMemoryLibrary, ItemSnapshot, TimelineSnapshot};
pub use types::{clip_props, item_props, timeline_settings, ClipId, Folder, FolderId, ItemId, TimelineId, TrackType};
