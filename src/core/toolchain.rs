//! Toolchain discovery
//!
//! MSBuild is normally made available by sourcing Visual Studio's developer
//! command prompt script (`VsDevCmd.bat`). The locator checks a fixed list of
//! well-known install locations and returns the first one that exists.
//!
//! Priority follows the list order: 2017 editions before 2019, Enterprise
//! before Professional before Community.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Known `VsDevCmd.bat` install locations, in priority order
pub const DEFAULT_CANDIDATES: [&str; 6] = [
  r"C:\Program Files (x86)\Microsoft Visual Studio\2017\Enterprise\Common7\Tools\VsDevCmd.bat",
  r"C:\Program Files (x86)\Microsoft Visual Studio\2017\Professional\Common7\Tools\VsDevCmd.bat",
  r"C:\Program Files (x86)\Microsoft Visual Studio\2017\Community\Common7\Tools\VsDevCmd.bat",
  r"C:\Program Files (x86)\Microsoft Visual Studio\2019\Enterprise\Common7\Tools\VsDevCmd.bat",
  r"C:\Program Files (x86)\Microsoft Visual Studio\2019\Professional\Common7\Tools\VsDevCmd.bat",
  r"C:\Program Files (x86)\Microsoft Visual Studio\2019\Community\Common7\Tools\VsDevCmd.bat",
];

/// The build tool's executable name
pub const MSBUILD: &str = "msbuild";

/// How msbuild is reached once verification has succeeded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "lowercase")]
pub enum Toolchain {
  /// msbuild is already on the ambient PATH
  Ambient,
  /// msbuild becomes available after sourcing this bootstrap script
  Bootstrapped(PathBuf),
}

impl Toolchain {
  pub fn bootstrap(&self) -> Option<&Path> {
    match self {
      Toolchain::Ambient => None,
      Toolchain::Bootstrapped(path) => Some(path),
    }
  }

  pub fn describe(&self) -> String {
    match self {
      Toolchain::Ambient => "msbuild on PATH".to_string(),
      Toolchain::Bootstrapped(path) => format!("msbuild via {}", path.display()),
    }
  }
}

/// Find the first existing default install location
pub fn locate() -> Option<PathBuf> {
  locate_in(DEFAULT_CANDIDATES.iter().map(PathBuf::from))
}

/// Return the first candidate that exists on disk
pub fn locate_in<I, P>(candidates: I) -> Option<PathBuf>
where
  I: IntoIterator<Item = P>,
  P: AsRef<Path>,
{
  candidates
    .into_iter()
    .map(|p| p.as_ref().to_path_buf())
    .find(|p| p.exists())
}
