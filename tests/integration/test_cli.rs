//! Integration tests for argument handling

use crate::helpers::{TestRelease, run_msbuild_release};
use anyhow::Result;

#[test]
fn test_usage_errors_exit_as_user_errors() -> Result<()> {
  let rel = TestRelease::new()?;

  let missing_version = run_msbuild_release(&rel.path, &["build"], &[])?;
  assert_eq!(missing_version.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&missing_version.stderr).contains("--next-version"));

  let unknown = run_msbuild_release(&rel.path, &["verify", "--no-such-flag"], &[])?;
  assert_eq!(unknown.status.code(), Some(1));

  Ok(())
}

#[test]
fn test_help_and_version_exit_zero() -> Result<()> {
  let rel = TestRelease::new()?;

  let help = run_msbuild_release(&rel.path, &["--help"], &[])?;
  assert_eq!(help.status.code(), Some(0));
  assert!(String::from_utf8_lossy(&help.stdout).contains("verify"));

  let version = run_msbuild_release(&rel.path, &["--version"], &[])?;
  assert_eq!(version.status.code(), Some(0));
  assert!(String::from_utf8_lossy(&version.stdout).contains("msbuild-release"));

  Ok(())
}
