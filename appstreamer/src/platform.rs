//! Target platform selection and the vendor's well-known identifiers.

use std::fmt;
use std::str::FromStr;

use crate::error::StreamerError;

/// Application id of the flagship application, used when none is given.
pub const DEFAULT_APP_ID: &str = "73e72ada57b7480280f7a6f4a289729f";

/// OS id of the Windows distribution.
pub const WINDOWS_OS_ID: &str = "67316f5e79bc48318aa5f7b6bb58243d";

/// OS id of the macOS distribution.
pub const OSX_OS_ID: &str = "97e6dd95735340d6ad6e222a520454db";

/// Platform a manifest tree is resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Platform {
    #[default]
    Windows,
    Osx,
}

impl Platform {
    /// The vendor OS id for this platform.
    pub fn os_id(&self) -> &'static str {
        match self {
            Self::Windows => WINDOWS_OS_ID,
            Self::Osx => OSX_OS_ID,
        }
    }

    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Osx => "osx",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = StreamerError;

    /// Accepts exactly `windows`, `win`, `osx` and `mac`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "windows" | "win" => Ok(Self::Windows),
            "osx" | "mac" => Ok(Self::Osx),
            other => Err(StreamerError::UnknownPlatform(other.to_string())),
        }
    }
}
