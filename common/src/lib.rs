//! Types shared between the dashcam client, its CLI and the device simulator.

pub mod config;
pub mod folder;
pub mod protocol;

pub use folder::{Category, InvalidCategory};
