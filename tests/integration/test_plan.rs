//! Integration tests for `msbuild-release plan`

use crate::helpers::{TestRelease, run_msbuild_release, run_ok, stdout_json};
use anyhow::Result;

#[test]
fn test_plan_never_runs_msbuild() -> Result<()> {
  let rel = TestRelease::new()?;
  rel.add_project("src/App/App.csproj")?;
  rel.write_config("[[projects]]\npath = \"src/App/App.csproj\"\n")?;

  let output = run_ok(
    &rel.path,
    &["plan", "--next-version", "2.3.1"],
    &[("PATH", &rel.path_with_msbuild())],
  )?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("DRY RUN"));
  assert!(stdout.contains("/property:InformationalVersion=2.3.1"));
  assert!(rel.msbuild_calls()?.is_empty());

  Ok(())
}

#[test]
fn test_plan_json_without_version() -> Result<()> {
  let rel = TestRelease::new()?;
  rel.add_project("App.csproj")?;
  rel.write_config(
    r#"
[[projects]]
path = "App.csproj"
targets = ["build"]
"#,
  )?;

  let output = run_ok(&rel.path, &["plan", "--json"], &[])?;
  let json = stdout_json(&output)?;

  assert_eq!(json["projects"][0]["path"], "App.csproj");
  assert_eq!(json["projects"][0]["targets"][0], "build");
  assert!(json["invocations"].is_null());

  Ok(())
}

#[test]
fn test_plan_uses_explicit_config_file() -> Result<()> {
  let rel = TestRelease::new()?;
  rel.add_project("App.csproj")?;
  std::fs::create_dir_all(rel.path.join("ci"))?;
  std::fs::write(
    rel.path.join("ci/release.json"),
    r#"{ "projects": [ { "path": "App.csproj", "properties": { "B": "2", "A": "1" } } ] }"#,
  )?;

  let output = run_ok(
    &rel.path,
    &["plan", "--config", "ci/release.json", "--next-version", "1.0.0", "--json"],
    &[],
  )?;
  let json = stdout_json(&output)?;
  let args: Vec<_> = json["invocations"][0]["args"]
    .as_array()
    .map(|a| a.iter().filter_map(|v| v.as_str()).collect())
    .unwrap_or_default();

  assert_eq!(&args[1..3], ["/property:B=2", "/property:A=1"]);

  Ok(())
}

#[test]
fn test_plan_rejects_bare_string_projects() -> Result<()> {
  let rel = TestRelease::new()?;
  rel.add_project("App.csproj")?;
  rel.write_config("projects = [\"App.csproj\"]\n")?;

  let output = run_msbuild_release(&rel.path, &["plan", "--json"], &[])?;

  assert_eq!(output.status.code(), Some(3));
  let json = stdout_json(&output)?;
  assert_eq!(json["kind"], "InvalidProjectList");
  assert_eq!(json["code"], "E_BAD_PROJECTS");

  Ok(())
}
