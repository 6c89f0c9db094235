use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Operating system a build is performed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildPlatform {
  #[serde(rename = "linux")]
  Linux,
  #[serde(rename = "darwin")]
  MacOs,
  #[serde(rename = "windows")]
  Windows,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown build platform: {0}")]
pub struct UnknownPlatform(pub String);

impl BuildPlatform {
  /// Detect the platform of the running process
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::MacOs),
      "windows" => Some(Self::Windows),
      _ => None,
    }
  }

  /// Returns the lowercase string identifier for this platform
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "darwin",
      Self::Windows => "windows",
    }
  }

  /// Separator between entries of list-valued variables such as `PATH`.
  pub fn path_list_separator(&self) -> &'static str {
    match self {
      Self::Windows => ";",
      Self::Linux | Self::MacOs => ":",
    }
  }
}

impl fmt::Display for BuildPlatform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for BuildPlatform {
  type Err = UnknownPlatform;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "linux" => Ok(Self::Linux),
      "darwin" | "macos" => Ok(Self::MacOs),
      "windows" | "win32" | "cygwin" => Ok(Self::Windows),
      other => Err(UnknownPlatform(other.to_string())),
    }
  }
}
