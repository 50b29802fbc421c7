//! Error types for the dashcam client

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the dashcam.
///
/// Device-level `result` codes are not errors: parameter reads and writes
/// return them as data.
#[derive(Error, Debug)]
pub enum Error {
    /// Network, DNS or connection failure, or a broken body stream.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The device answered with a non-2xx status.
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The body did not have the expected JSON shape.
    #[error("malformed response from {url}: {source}")]
    MalformedResponse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A category name outside looping/locked/parked/event.
    ///
    /// The client itself only takes typed [`Category`](dashcam_common::Category)
    /// values; this variant lets callers parse user input with `?` inside
    /// functions returning this crate's [`Result`].
    #[error(transparent)]
    InvalidCategory(#[from] dashcam_common::InvalidCategory),

    /// The configured host is not a usable base URL.
    #[error("invalid host '{host}': {reason}")]
    InvalidHost { host: String, reason: String },

    /// Fetching a thumbnail or video body failed.
    #[error("cannot fetch {path}: {source}")]
    MediaFetch {
        path: String,
        #[source]
        source: Box<Error>,
    },

    /// Creating a directory or writing a file failed.
    #[error("filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn media(path: &str, source: Error) -> Self {
        Error::MediaFetch {
            path: path.to_string(),
            source: Box::new(source),
        }
    }

    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// HTTP status of a failed request, looking through media wrappers.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Error::Status { status, .. } => Some(*status),
            Error::MediaFetch { source, .. } => source.status(),
            _ => None,
        }
    }
}
