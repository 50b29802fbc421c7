//! Recording categories and the device folder codes they map to.
//!
//! The dashcam stores recordings in four folders.  Callers use the logical
//! names (`looping`, `locked`, `parked`, `event`); the device API expects its
//! own short codes (`loop`, `emr`, `park`, `event`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A logical recording category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Continuous loop recording, overwritten when the card fills up.
    #[default]
    Looping,
    /// Emergency recordings locked against overwrite (G-sensor or button).
    Locked,
    /// Parking-mode recordings.
    Parked,
    /// Event recordings.
    Event,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Looping,
        Category::Locked,
        Category::Parked,
        Category::Event,
    ];

    /// Folder code used by the device's `/app/getfilelist` endpoint.
    pub const fn device_code(self) -> &'static str {
        match self {
            Self::Looping => "loop",
            Self::Locked => "emr",
            Self::Parked => "park",
            Self::Event => "event",
        }
    }

    /// Reverse lookup of [`Category::device_code`].
    pub fn from_device_code(code: &str) -> Option<Self> {
        match code {
            "loop" => Some(Self::Looping),
            "emr" => Some(Self::Locked),
            "park" => Some(Self::Parked),
            "event" => Some(Self::Event),
            _ => None,
        }
    }

    /// Caller-facing name, e.g. `locked`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Looping => "looping",
            Self::Locked => "locked",
            Self::Parked => "parked",
            Self::Event => "event",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a string does not name one of the four categories.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid category '{0}' (expected looping, locked, parked or event)")]
pub struct InvalidCategory(pub String);

impl FromStr for Category {
    type Err = InvalidCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| InvalidCategory(s.to_string()))
    }
}
