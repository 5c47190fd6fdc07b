//! `msbuild-release plan` - show what `build` would run
//!
//! Validates the project list the same way `verify` does, but never probes or
//! runs msbuild, so it works on machines without Visual Studio.

use crate::core::build::{BuildInvocation, ReleaseVersion, plan_invocations};
use crate::core::config::PluginConfig;
use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::core::toolchain::MSBUILD;
use crate::core::verify::verify_projects;
use serde_json::json;
use std::path::Path;

/// Run the plan command
pub fn run_plan(
  ctx: &ReleaseContext,
  config_path: Option<&Path>,
  next_version: Option<String>,
  json: bool,
) -> ReleaseResult<()> {
  let config = PluginConfig::load(ctx.cwd(), config_path)?;
  let projects = verify_projects(&config, ctx)?;

  let invocations = match &next_version {
    Some(raw) => Some(plan_invocations(&projects, ctx, &ReleaseVersion::parse(raw)?)),
    None => None,
  };

  if json {
    return super::print_json(&json!({
      "projects": projects,
      "invocations": invocations,
    }));
  }

  println!("📋 Release Plan");
  println!("════════════════════════════════════════");
  println!("Projects: {}", projects.len());
  for project in &projects {
    println!("  📦 {}", project.path);
  }

  match invocations {
    Some(invocations) => display_invocations(&invocations),
    None => println!("\nPass --next-version <VERSION> to see the msbuild command lines."),
  }

  Ok(())
}

fn display_invocations(invocations: &[BuildInvocation]) {
  println!("\nDRY RUN: Would execute:");
  for invocation in invocations {
    println!("  {} {}", MSBUILD, invocation.args.join(" "));
  }
}
