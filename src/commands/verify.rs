//! `msbuild-release verify` - the verifyConditions lifecycle step

use crate::core::config::PluginConfig;
use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::core::exec::SystemRunner;
use crate::core::verify::{Verification, verify_conditions};
use std::path::Path;

/// Run the verify command
pub fn run_verify(ctx: &ReleaseContext, config_path: Option<&Path>, json: bool) -> ReleaseResult<()> {
  let config = PluginConfig::load(ctx.cwd(), config_path)?;
  let verification = verify_conditions(&config, ctx, &SystemRunner)?;

  if json {
    return super::print_json(&verification);
  }

  if let Some(source) = &config.source {
    println!("📄 Config: {}", source.display());
  }
  display_verification(&verification);
  println!("\n✅ Release conditions verified");
  Ok(())
}

/// Print the resolved toolchain and project list
pub(crate) fn display_verification(verification: &Verification) {
  println!("🔧 Toolchain: {}", verification.toolchain.describe());
  println!("Projects: {}", verification.projects.len());
  for project in &verification.projects {
    println!("  📦 {}", project.path);
  }
}
