//! Resolve scripting bridge client.
//!
//! Resolve only exposes its scripting API in-process (Python/Lua). The bridge
//! script shipped in `bridge/resolve_bridge.py` runs inside Resolve
//! (Workspace > Scripts) and serves that API over local HTTP: every call is a
//! `POST <base>/rpc` with `{"method", "params"}` and the reply carries either
//! `{"result": ...}` or `{"error": {"message": ...}}`. An unknown method is
//! answered with HTTP 404 and an exception inside Resolve with HTTP 500.
//!
//! Objects cross the bridge as opaque string handles. Folders travel as
//! `{"id", "name"}`; clips, timelines and timeline items as bare handle
//! strings.
//!
//! | Method | Params | Result |
//! |---|---|---|
//! | `ProjectManager.GetCurrentProject` | `{}` | `{"name"}` or `null` |
//! | `MediaPool.GetRootFolder` | `{}` | folder |
//! | `Folder.GetSubFolderList` | `{"folder"}` | `[folder]` |
//! | `MediaPool.AddSubFolder` | `{"parent", "name"}` | folder or `null` |
//! | `MediaPool.SetCurrentFolder` | `{"folder"}` | bool |
//! | `MediaPool.ImportMedia` | `{"paths": [string]}` | `[clip]` or `null` |
//! | `MediaPoolItem.GetClipProperty` | `{"clip", "key"}` | string or `null` |
//! | `MediaPoolItem.GetName` | `{"clip"}` | string |
//! | `MediaPool.CreateEmptyTimeline` | `{"name"}` | timeline or `null` |
//! | `Timeline.GetName` | `{"timeline"}` | string |
//! | `Timeline.SetSetting` | `{"timeline", "key", "value": string}` | bool |
//! | `MediaPool.AppendToTimeline` | `{"clips": [clip]}` | `[item]` or `null` |
//! | `Timeline.GetItemListInTrack` | `{"timeline", "trackType", "index"}` | `[item]` or `null` |
//! | `TimelineItem.SetProperty` | `{"item", "key", "value": number}` | bool |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::{LibraryError, LibraryResult};
use crate::gateway::AssetLibrary;
use crate::types::{ClipId, Folder, FolderId, ItemId, TimelineId, TrackType};

/// RPC method names served by the bridge script.
pub mod methods {
    pub const GET_CURRENT_PROJECT: &str = "ProjectManager.GetCurrentProject";
    pub const GET_ROOT_FOLDER: &str = "MediaPool.GetRootFolder";
    pub const GET_SUBFOLDER_LIST: &str = "Folder.GetSubFolderList";
    pub const ADD_SUBFOLDER: &str = "MediaPool.AddSubFolder";
    pub const SET_CURRENT_FOLDER: &str = "MediaPool.SetCurrentFolder";
    pub const IMPORT_MEDIA: &str = "MediaPool.ImportMedia";
    pub const GET_CLIP_PROPERTY: &str = "MediaPoolItem.GetClipProperty";
    pub const GET_CLIP_NAME: &str = "MediaPoolItem.GetName";
    pub const CREATE_EMPTY_TIMELINE: &str = "MediaPool.CreateEmptyTimeline";
    pub const GET_TIMELINE_NAME: &str = "Timeline.GetName";
    pub const SET_TIMELINE_SETTING: &str = "Timeline.SetSetting";
    pub const APPEND_TO_TIMELINE: &str = "MediaPool.AppendToTimeline";
    pub const GET_ITEM_LIST_IN_TRACK: &str = "Timeline.GetItemListInTrack";
    pub const SET_ITEM_PROPERTY: &str = "TimelineItem.SetProperty";

    pub const ALL: [&str; 14] = [
        GET_CURRENT_PROJECT,
        GET_ROOT_FOLDER,
        GET_SUBFOLDER_LIST,
        ADD_SUBFOLDER,
        SET_CURRENT_FOLDER,
        IMPORT_MEDIA,
        GET_CLIP_PROPERTY,
        GET_CLIP_NAME,
        CREATE_EMPTY_TIMELINE,
        GET_TIMELINE_NAME,
        SET_TIMELINE_SETTING,
        APPEND_TO_TIMELINE,
        GET_ITEM_LIST_IN_TRACK,
        SET_ITEM_PROPERTY,
    ];
}

/// Bridge client configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Base URL of the bridge, without the `/rpc` suffix
    pub base_url: String,
    /// Request timeout (imports of large batches can be slow)
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8765".to_string(),
            timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl BridgeConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("RESOLVE_BRIDGE_URL").unwrap_or(defaults.base_url),
            timeout: std::env::var("RESOLVE_BRIDGE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            connect_timeout: defaults.connect_timeout,
        }
    }
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ProjectInfo {
    name: String,
}

/// HTTP client for the Resolve scripting bridge.
#[derive(Clone)]
pub struct BridgeClient {
    http: Client,
    rpc_url: String,
}

impl BridgeClient {
    /// Build a client without contacting the bridge.
    pub fn new(config: BridgeConfig) -> LibraryResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("lrr-library/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            rpc_url: format!("{}/rpc", config.base_url.trim_end_matches('/')),
        })
    }

    /// Build a client and verify Resolve has a project open.
    pub async fn connect(config: BridgeConfig) -> LibraryResult<Self> {
        let client = Self::new(config)?;
        let project: Option<ProjectInfo> = client
            .call(methods::GET_CURRENT_PROJECT, json!({}))
            .await?;

        match project {
            Some(project) => {
                info!(project = %project.name, "Connected to Resolve");
                Ok(client)
            }
            None => Err(LibraryError::NoProject),
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> LibraryResult<T> {
        debug!(method, "Bridge call");

        let response = self
            .http
            .post(&self.rpc_url)
            .json(&RpcRequest { method, params })
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    LibraryError::Unavailable(format!("{}: {}", self.rpc_url, e))
                } else {
                    LibraryError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LibraryError::from_http_status(status.as_u16(), body));
        }

        let envelope: RpcResponse = response.json().await?;
        if let Some(error) = envelope.error {
            return Err(LibraryError::call_failed(method, error.message));
        }

        serde_json::from_value(envelope.result)
            .map_err(|e| LibraryError::invalid_response(format!("{method}: {e}")))
    }
}

#[async_trait]
impl AssetLibrary for BridgeClient {
    async fn root_folder(&self) -> LibraryResult<FolderId> {
        let folder: Option<Folder> = self.call(methods::GET_ROOT_FOLDER, json!({})).await?;
        folder
            .map(|f| f.id)
            .ok_or_else(|| LibraryError::invalid_response("media pool has no root folder"))
    }

    async fn subfolders(&self, parent: &FolderId) -> LibraryResult<Vec<Folder>> {
        self.call(methods::GET_SUBFOLDER_LIST, json!({ "folder": parent }))
            .await
    }

    async fn add_subfolder(&self, parent: &FolderId, name: &str) -> LibraryResult<Option<Folder>> {
        self.call(
            methods::ADD_SUBFOLDER,
            json!({ "parent": parent, "name": name }),
        )
        .await
    }

    async fn set_current_folder(&self, folder: &FolderId) -> LibraryResult<bool> {
        self.call(methods::SET_CURRENT_FOLDER, json!({ "folder": folder }))
            .await
    }

    async fn import_media(&self, paths: &[String]) -> LibraryResult<Vec<ClipId>> {
        let clips: Option<Vec<ClipId>> = self
            .call(methods::IMPORT_MEDIA, json!({ "paths": paths }))
            .await?;
        Ok(clips.unwrap_or_default())
    }

    async fn clip_property(&self, clip: &ClipId, key: &str) -> LibraryResult<Option<String>> {
        self.call(
            methods::GET_CLIP_PROPERTY,
            json!({ "clip": clip, "key": key }),
        )
        .await
    }

    async fn clip_name(&self, clip: &ClipId) -> LibraryResult<String> {
        self.call(methods::GET_CLIP_NAME, json!({ "clip": clip }))
            .await
    }

    async fn create_empty_timeline(&self, name: &str) -> LibraryResult<Option<TimelineId>> {
        self.call(methods::CREATE_EMPTY_TIMELINE, json!({ "name": name }))
            .await
    }

    async fn timeline_name(&self, timeline: &TimelineId) -> LibraryResult<String> {
        self.call(methods::GET_TIMELINE_NAME, json!({ "timeline": timeline }))
            .await
    }

    async fn set_timeline_setting(
        &self,
        timeline: &TimelineId,
        key: &str,
        value: &str,
    ) -> LibraryResult<bool> {
        self.call(
            methods::SET_TIMELINE_SETTING,
            json!({ "timeline": timeline, "key": key, "value": value }),
        )
        .await
    }

    async fn append_to_timeline(&self, clip: &ClipId) -> LibraryResult<bool> {
        let items: Option<Vec<ItemId>> = self
            .call(methods::APPEND_TO_TIMELINE, json!({ "clips": [clip] }))
            .await?;
        Ok(items.is_some_and(|items| !items.is_empty()))
    }

    async fn track_items(
        &self,
        timeline: &TimelineId,
        track: TrackType,
        index: u32,
    ) -> LibraryResult<Vec<ItemId>> {
        let items: Option<Vec<ItemId>> = self
            .call(
                methods::GET_ITEM_LIST_IN_TRACK,
                json!({ "timeline": timeline, "trackType": track.as_str(), "index": index }),
            )
            .await?;
        Ok(items.unwrap_or_default())
    }

    async fn set_item_property(&self, item: &ItemId, key: &str, value: f64) -> LibraryResult<bool> {
        self.call(
            methods::SET_ITEM_PROPERTY,
            json!({ "item": item, "key": key, "value": value }),
        )
        .await
    }
}
