//! Wire types of the dashcam HTTP API, shared between the client and the
//! device simulator.
//!
//! Field names on the wire are the device's own (`name`, `createtime`,
//! `folder`, ...); the Rust names describe what the fields hold.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default address of the dashcam's access point.  It does not change.
pub const DEFAULT_HOST: &str = "http://192.168.169.1";

pub const FILE_LIST_ENDPOINT: &str = "/app/getfilelist";
pub const THUMBNAIL_ENDPOINT: &str = "/app/getthumbnail";
pub const SET_PARAM_ENDPOINT: &str = "/app/setparamvalue";
pub const GET_PARAM_ENDPOINT: &str = "/app/getparamvalue";

/// Parameter controlling the recording state (`1` = recording).
pub const REC_PARAM: &str = "rec";

/// Format of [`VideoDescriptor::created_at_str`].
pub const CREATED_AT_FORMAT: &str = "%Y%m%d%H%M%S";

// ── listing ──────────────────────────────────────────────────────────────

/// Metadata the device reports for a single recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDescriptor {
    /// Absolute path on the device, e.g.
    /// `/mnt/card/video_front/20250101_000000_f.ts`.  Also the URL path the
    /// body is served at.
    #[serde(rename = "name")]
    pub path: String,
    /// Always -1 on the devices seen so far.
    #[serde(rename = "duration")]
    pub duration_secs: i64,
    #[serde(rename = "size")]
    pub size_kb: u64,
    /// Unix timestamp.
    #[serde(rename = "createtime")]
    pub created_at: i64,
    /// `YYYYMMDDhhmmss`.
    #[serde(rename = "createtimestr")]
    pub created_at_str: String,
    /// Always 2 on the devices seen so far.
    #[serde(rename = "type")]
    pub kind: i32,
}

impl VideoDescriptor {
    /// Filename component of [`Self::path`].
    pub fn file_name(&self) -> &str {
        basename(&self.path)
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_at, 0)
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_kb.saturating_mul(1024)
    }
}

/// One folder's worth of a windowed listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderListing {
    /// Device folder code (`loop`, `emr`, ...), not the logical category.
    #[serde(rename = "folder")]
    pub category: String,
    /// Number of recordings in the whole folder, not just this window.
    #[serde(rename = "count")]
    pub total_count: u64,
    /// Newest first.
    #[serde(rename = "files")]
    pub videos: Vec<VideoDescriptor>,
}

/// Response of `GET /app/getfilelist`.
///
/// The device answers one folder per request, so `info` holds zero or one
/// block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileListResponse {
    pub result: i32,
    #[serde(default)]
    pub info: Vec<FolderListing>,
}

// ── parameters ───────────────────────────────────────────────────────────

/// Response of `GET /app/setparamvalue`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamWrite {
    /// 0 for success, 1 for failure.
    #[serde(rename = "result")]
    pub result_code: i32,
    /// Usually `"set success"` or `"set fail"`.
    #[serde(rename = "info")]
    pub message: String,
}

impl ParamWrite {
    pub fn is_success(&self) -> bool {
        self.result_code == 0
    }
}

/// Response of `GET /app/getparamvalue`, as sent by the device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetParamResponse {
    pub result: i32,
    pub info: ParamInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamInfo {
    pub value: i64,
}

/// A parameter read, flattened from [`GetParamResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamValue {
    /// 0 for success.
    pub result_code: i32,
    pub value: i64,
}

impl From<GetParamResponse> for ParamValue {
    fn from(resp: GetParamResponse) -> Self {
        Self {
            result_code: resp.result,
            value: resp.info.value,
        }
    }
}

/// Query of `GET /app/setparamvalue` (and of `getparamvalue`, without a value).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamQuery {
    pub param: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Recording on/off, expressed through the `rec` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingCommand {
    Start,
    Stop,
}

impl RecordingCommand {
    pub const fn param_value(self) -> &'static str {
        match self {
            Self::Start => "1",
            Self::Stop => "0",
        }
    }
}

/// Filename component of a device path, or the whole string if it has none.
pub fn basename(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}
