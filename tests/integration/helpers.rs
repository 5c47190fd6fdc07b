//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A release working directory with a fake msbuild toolchain
pub struct TestRelease {
  _root: TempDir,
  /// Canonical working directory passed as --cwd
  pub path: PathBuf,
  /// Directory holding the fake `msbuild` (not on PATH unless requested)
  pub tool_dir: PathBuf,
  /// Every fake msbuild call appends one line here
  pub log: PathBuf,
}

impl TestRelease {
  /// Create a working directory and a fake msbuild that exits 0
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let base = root.path().canonicalize()?;
    let path = base.join("repo");
    let tool_dir = base.join("vs").join("bin");
    std::fs::create_dir_all(&path)?;
    std::fs::create_dir_all(&tool_dir)?;

    let release = Self {
      _root: root,
      path,
      log: base.join("msbuild.log"),
      tool_dir,
    };
    release.write_fake_msbuild()?;
    Ok(release)
  }

  /// Fake msbuild: logs its arguments, answers /version, fails for Broken projects
  ///
  /// Builds print to stdout like the real tool does.
  fn write_fake_msbuild(&self) -> Result<()> {
    let script = format!(
      r#"#!/bin/sh
for arg in "$@"; do printf '%s\037' "$arg" >> "{log}"; done
printf '\n' >> "{log}"
if [ "$1" = "/version" ]; then
  echo "MSBuild version 17.9.8 for .NET Framework"
  echo "17.9.8.16306"
  exit 0
fi
echo "Build started."
case "$*" in
  *Broken*) echo "error MSB4025: The project file could not be loaded." >&2; exit 1 ;;
esac
echo "Build succeeded."
exit 0
"#,
      log = self.log.display()
    );

    let msbuild = self.tool_dir.join("msbuild");
    std::fs::write(&msbuild, script)?;
    std::fs::set_permissions(&msbuild, std::fs::Permissions::from_mode(0o755))?;
    Ok(())
  }

  /// Bootstrap script that puts the fake msbuild on PATH (stand-in for VsDevCmd.bat)
  pub fn bootstrap(&self) -> Result<PathBuf> {
    let script = self.tool_dir.parent().unwrap().join("VsDevCmd.sh");
    std::fs::write(
      &script,
      format!("echo \"** Visual Studio Developer Command Prompt\"\nexport PATH=\"{}:$PATH\"\n", self.tool_dir.display()),
    )?;
    Ok(script)
  }

  /// Create an (empty) project descriptor
  pub fn add_project(&self, rel: &str) -> Result<PathBuf> {
    let project = self.path.join(rel);
    if let Some(parent) = project.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&project, "<Project Sdk=\"Microsoft.NET.Sdk\" />\n")?;
    Ok(project)
  }

  /// Write msbuild-release.toml
  pub fn write_config(&self, toml: &str) -> Result<()> {
    std::fs::write(self.path.join("msbuild-release.toml"), toml)?;
    Ok(())
  }

  /// Recorded msbuild calls, one argument list per call
  pub fn msbuild_calls(&self) -> Result<Vec<Vec<String>>> {
    if !self.log.exists() {
      return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(&self.log)?;
    Ok(
      content
        .lines()
        .map(|line| {
          line
            .split('\u{1f}')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
        })
        .collect(),
    )
  }

  /// Recorded calls excluding /version probes
  pub fn build_calls(&self) -> Result<Vec<Vec<String>>> {
    Ok(
      self
        .msbuild_calls()?
        .into_iter()
        .filter(|args| args.first().map(String::as_str) != Some("/version"))
        .collect(),
    )
  }

  /// PATH with the fake msbuild in front
  pub fn path_with_msbuild(&self) -> String {
    format!("{}:{}", self.tool_dir.display(), base_path())
  }
}

/// PATH without any fake tools
pub fn base_path() -> String {
  std::env::var("PATH").unwrap_or_else(|_| "/usr/bin:/bin".to_string())
}

/// Run the msbuild-release binary in `cwd` with extra environment
///
/// `VS_PATH` is always cleared first so the host environment cannot leak in.
pub fn run_msbuild_release(cwd: &Path, args: &[&str], env: &[(&str, &str)]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_msbuild-release");

  let mut cmd = Command::new(bin);
  cmd.current_dir(cwd).args(args).env_remove("VS_PATH").env("PATH", base_path());
  for (key, value) in env {
    cmd.env(key, value);
  }

  cmd.output().context("Failed to run msbuild-release")
}

/// Like [`run_msbuild_release`] but fails on a non-zero exit
pub fn run_ok(cwd: &Path, args: &[&str], env: &[(&str, &str)]) -> Result<Output> {
  let output = run_msbuild_release(cwd, args, env)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "msbuild-release command failed: msbuild-release {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

/// Parse stdout as JSON
pub fn stdout_json(output: &Output) -> Result<serde_json::Value> {
  serde_json::from_slice(&output.stdout).context("stdout is not valid JSON")
}
