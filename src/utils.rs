//! Utility functions for cross-platform path handling
//!
//! Project paths come from config files that are often written on Windows and
//! read on CI runners of any OS, so drive-letter and backslash forms are
//! recognised everywhere, not just when compiled for Windows.

use std::path::{Component, Path, PathBuf};

/// Check if a configured path string is absolute on any platform
///
/// Returns true for:
/// - Absolute paths on Unix: /path/to/App.csproj
/// - Absolute paths on Windows: C:\path\to\App.csproj or C:/path/to/App.csproj
/// - UNC paths on Windows: \\server\share\App.csproj
pub fn is_absolute_path(path: &str) -> bool {
  // Windows drive letter (C:\ or C:/)
  let bytes = path.as_bytes();
  if bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && (bytes[2] == b'\\' || bytes[2] == b'/')
  {
    return true;
  }

  // Windows UNC paths (\\server\share)
  if path.starts_with("\\\\") {
    return true;
  }

  // Checked separately: on Windows, Path::is_absolute() is false for "/x"
  if path.starts_with('/') {
    return true;
  }

  Path::new(path).is_absolute()
}

/// Resolve a configured path against the working directory
///
/// Absolute paths are kept, relative ones are joined onto `cwd`. `.` and `..`
/// segments are folded lexically; the filesystem is never consulted.
pub fn resolve_path(cwd: &Path, path: &str) -> PathBuf {
  if is_absolute_path(path) {
    normalize(Path::new(path))
  } else {
    normalize(&cwd.join(path))
  }
}

/// Lexically remove `.` and `..` components
pub fn normalize(path: &Path) -> PathBuf {
  let mut out = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => {
        // Never pop past the root
        if !matches!(out.components().next_back(), None | Some(Component::RootDir | Component::Prefix(_))) {
          out.pop();
        }
      }
      other => out.push(other.as_os_str()),
    }
  }
  out
}

/// File name of a project path without its final extension
///
/// Both `/` and `\` are treated as separators. A leading dot is part of the
/// name, not an extension.
pub fn project_stem(path: &str) -> &str {
  let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
  match name.rfind('.') {
    Some(idx) if idx > 0 => &name[..idx],
    _ => name,
  }
}
