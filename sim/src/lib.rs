//! dashcam-sim – a stand-in for the dashcam's HTTP API.
//!
//! Serves recordings from a local directory laid out as `<card>/<folder
//! code>/<file>`, thumbnails from `<file>.jpg` sidecars, and keeps an
//! in-memory parameter table in which `rec` changes lag behind their
//! acknowledgement the way they do on the device.

mod device;
mod server;

pub use device::{DeviceState, CARD_PREFIX};
pub use server::{router, run, serve};
