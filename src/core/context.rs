//! Release context - the read-only environment handed to both lifecycle steps
//!
//! The host (or the CLI standing in for it) builds this once and passes it by
//! reference. Nothing in the core mutates it.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variable holding the fallback toolchain path
pub const TOOLCHAIN_ENV: &str = "VS_PATH";

/// Version the host computed for the upcoming release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextRelease {
  /// Version string exactly as supplied (may carry a `v` prefix or prerelease tag)
  pub version: String,
}

/// Working directory, environment and (at build time) the release version
#[derive(Debug, Clone)]
pub struct ReleaseContext {
  /// Absolute working directory; relative project paths resolve against it
  pub cwd: PathBuf,

  /// Environment passed to every child process
  pub env: BTreeMap<String, String>,

  /// Only present for the build step
  pub next_release: Option<NextRelease>,
}

impl ReleaseContext {
  pub fn new(cwd: PathBuf, env: BTreeMap<String, String>) -> Self {
    Self {
      cwd,
      env,
      next_release: None,
    }
  }

  /// Context for the current process: given cwd and the inherited environment
  ///
  /// Variables that are not valid UTF-8 are dropped.
  pub fn from_process(cwd: PathBuf) -> Self {
    let env = std::env::vars_os()
      .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
      .collect();
    Self::new(cwd, env)
  }

  pub fn with_next_release(mut self, version: impl Into<String>) -> Self {
    self.next_release = Some(NextRelease {
      version: version.into(),
    });
    self
  }

  /// Look up an environment variable in the context (not the process)
  pub fn var(&self, key: &str) -> Option<&str> {
    self.env.get(key).map(String::as_str)
  }

  pub fn cwd(&self) -> &Path {
    &self.cwd
  }
}
