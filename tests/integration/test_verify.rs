//! Integration tests for `msbuild-release verify`

use crate::helpers::{TestRelease, run_msbuild_release, run_ok, stdout_json};
use anyhow::Result;

const ONE_PROJECT: &str = r#"
[[projects]]
path = "src/App/App.csproj"
"#;

#[test]
fn test_verify_with_msbuild_on_path() -> Result<()> {
  let rel = TestRelease::new()?;
  rel.add_project("src/App/App.csproj")?;
  rel.write_config(ONE_PROJECT)?;

  let output = run_ok(&rel.path, &["verify"], &[("PATH", &rel.path_with_msbuild())])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("msbuild on PATH"), "stdout: {stdout}");
  assert!(stdout.contains("src/App/App.csproj"));

  // Ambient probe succeeded, so the bootstrap probe never ran
  let calls = rel.msbuild_calls()?;
  assert_eq!(calls, vec![vec!["/version".to_string()]]);

  Ok(())
}

#[test]
fn test_verify_via_vs_path_bootstrap() -> Result<()> {
  let rel = TestRelease::new()?;
  rel.add_project("src/App/App.csproj")?;
  rel.write_config(ONE_PROJECT)?;
  let bootstrap = rel.bootstrap()?;
  let bootstrap_str = bootstrap.to_string_lossy().to_string();

  let output = run_ok(&rel.path, &["verify", "--json"], &[("VS_PATH", &bootstrap_str)])?;
  let json = stdout_json(&output)?;

  assert_eq!(json["toolchain"]["kind"], "bootstrapped");
  assert_eq!(json["toolchain"]["path"], bootstrap_str.as_str());
  assert_eq!(json["projects"][0]["path"], "src/App/App.csproj");

  Ok(())
}

#[test]
fn test_verify_without_msbuild_fails() -> Result<()> {
  let rel = TestRelease::new()?;
  rel.add_project("src/App/App.csproj")?;
  rel.write_config(ONE_PROJECT)?;

  let output = run_msbuild_release(&rel.path, &["verify", "--json"], &[])?;

  assert_eq!(output.status.code(), Some(2));
  let json = stdout_json(&output)?;
  assert_eq!(json["kind"], "ToolchainNotFound");
  assert_eq!(json["code"], "E_MSBUILD_NOT_FOUND");

  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("E_MSBUILD_NOT_FOUND"), "stderr: {stderr}");

  Ok(())
}

#[test]
fn test_verify_reports_missing_project() -> Result<()> {
  let rel = TestRelease::new()?;
  rel.write_config(ONE_PROJECT)?;

  let output = run_msbuild_release(&rel.path, &["verify", "--json"], &[("PATH", &rel.path_with_msbuild())])?;

  assert_eq!(output.status.code(), Some(3));
  let json = stdout_json(&output)?;
  assert_eq!(json["kind"], "ProjectNotFound");
  assert!(json["details"].as_str().unwrap_or_default().contains("src/App/App.csproj"));

  Ok(())
}

#[test]
fn test_verify_rejects_bad_targets() -> Result<()> {
  let rel = TestRelease::new()?;
  rel.add_project("src/App/App.csproj")?;
  rel.write_config(
    r#"
[[projects]]
path = "src/App/App.csproj"
targets = "clean;publish"
"#,
  )?;

  let output = run_msbuild_release(&rel.path, &["verify", "--json"], &[("PATH", &rel.path_with_msbuild())])?;

  assert_eq!(output.status.code(), Some(3));
  assert_eq!(stdout_json(&output)?["kind"], "InvalidTargetsType");

  Ok(())
}

#[test]
fn test_verify_rejects_empty_project_list() -> Result<()> {
  let rel = TestRelease::new()?;
  std::fs::write(rel.path.join("msbuild-release.json"), r#"{ "projects": [] }"#)?;

  let output = run_msbuild_release(&rel.path, &["verify", "--json"], &[("PATH", &rel.path_with_msbuild())])?;

  assert_eq!(output.status.code(), Some(3));
  assert_eq!(stdout_json(&output)?["kind"], "InvalidProjectList");

  Ok(())
}

#[test]
fn test_verify_without_config_file() -> Result<()> {
  let rel = TestRelease::new()?;

  let output = run_msbuild_release(&rel.path, &["verify"], &[("PATH", &rel.path_with_msbuild())])?;

  assert_eq!(output.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("No msbuild-release configuration found"), "stderr: {stderr}");

  Ok(())
}
