//! `msbuild-release build` - verifyConditions followed by verifyRelease
//!
//! Both steps run in one process so the toolchain resolved during verification
//! is handed straight to the build step.

use crate::core::build::{BuildReport, verify_release};
use crate::core::config::PluginConfig;
use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::core::exec::{ChildOutput, SystemRunner};
use crate::core::verify::verify_conditions;
use std::path::Path;

/// Run the build command
pub fn run_build(
  ctx: &ReleaseContext,
  config_path: Option<&Path>,
  next_version: String,
  json: bool,
) -> ReleaseResult<()> {
  let ctx = ctx.clone().with_next_release(next_version);
  let config = PluginConfig::load(ctx.cwd(), config_path)?;

  let verification = verify_conditions(&config, &ctx, &SystemRunner)?;
  if !json {
    super::verify::display_verification(&verification);
    println!();
  }

  let output = if json { ChildOutput::ToStderr } else { ChildOutput::Inherit };
  let report = verify_release(&verification, &ctx, &SystemRunner, output)?;

  if json {
    return super::print_json(&report);
  }

  display_report(&report);
  Ok(())
}

fn display_report(report: &BuildReport) {
  println!("\n🚀 Built {} project(s) at version {}", report.projects.len(), report.version.full);
  for project in &report.projects {
    println!(
      "  ✅ {} -> {} ({:.1}s)",
      project.project,
      project.publish_dir.display(),
      project.duration_ms as f64 / 1000.0
    );
  }
}
