//! dashcam-client – async client for the dashcam's on-device HTTP API.
//!
//! A [`Dashcam`] is a session bound to one device.  It lists recordings by
//! category ([`Dashcam::list`]), fetches thumbnails and video bodies
//! ([`Dashcam::get_thumbnail`], [`Dashcam::download_video`], ...) and reads
//! or writes device parameters, including the recording switch
//! ([`Dashcam::start_recording`], [`Dashcam::is_recording`]).
//!
//! The session holds no state besides the base URL and reqwest's
//! connection pool; it is cheap to clone and safe to share between tasks.
//! The device serialises requests itself and has no notion of
//! transactions, so concurrent calls may interleave arbitrarily.
//! Operations cannot be cancelled other than by dropping their future.

mod error;
mod listing;
mod media;
mod params;
pub mod transport;

#[cfg(test)]
mod testutil;

pub use dashcam_common::protocol::{
    FolderListing, ParamValue, ParamWrite, RecordingCommand, VideoDescriptor, DEFAULT_HOST,
};
pub use dashcam_common::Category;
pub use error::{Error, Result};
pub use listing::{ListQuery, Window};
pub use media::VideoRef;

use dashcam_common::config::Config;
use transport::Transport;

const USER_AGENT: &str = "dashcam-client/0.1";

/// A session with one dashcam.
#[derive(Debug, Clone)]
pub struct Dashcam {
    transport: Transport,
}

impl Dashcam {
    /// Connect to the device at `host` (e.g. [`DEFAULT_HOST`]).
    ///
    /// No request is made; an unreachable device shows up on the first call.
    /// No request timeout is set because video downloads can run for minutes.
    pub fn new(host: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| Error::Transport {
                url: host.to_string(),
                source,
            })?;
        Self::with_client(host, http)
    }

    /// Like [`Dashcam::new`] but with a caller-configured HTTP client.
    pub fn with_client(host: &str, http: reqwest::Client) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(host, http)?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.host)
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_targets_device() {
        let cam = Dashcam::from_config(&Config::default()).unwrap();
        assert_eq!(cam.transport().base().as_str(), "http://192.168.169.1/");
    }

    #[test]
    fn test_session_is_shareable() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<Dashcam>();
    }
}
