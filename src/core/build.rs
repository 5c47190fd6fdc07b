//! Release build (the `verifyRelease` lifecycle step)
//!
//! For each verified project, in configured order, derive the msbuild command
//! line and run it through the verified toolchain. Version metadata is injected
//! as MSBuild properties:
//!
//! | property | value |
//! |---|---|
//! | FileVersion | `major.minor.patch` |
//! | AssemblyVersion | `major.minor.patch` |
//! | InformationalVersion | release version as supplied |
//! | PackageVersion | release version as supplied |
//!
//! The first failing project aborts the whole step.

use crate::core::config::ProjectEntry;
use crate::core::context::ReleaseContext;
use crate::core::error::{BuildError, ReleaseError, ReleaseResult, ResultExt};
use crate::core::exec::{ChildOutput, ToolInvocation, ToolRunner};
use crate::core::toolchain::{MSBUILD, Toolchain};
use crate::core::verify::Verification;
use crate::utils::{normalize, project_stem, resolve_path};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, info_span};

/// Targets used when a project configures none
pub const DEFAULT_TARGETS: &str = "clean;publish";
/// Build configuration used when a project configures none
pub const DEFAULT_CONFIGURATION: &str = "Release";
/// Folder under the working directory that holds default publish output
pub const PUBLISH_ROOT: &str = "msbuild-publish";

/// Release version in the two forms msbuild needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseVersion {
  /// Exactly as supplied by the host
  pub full: String,
  /// `major.minor.patch`, without prerelease or build metadata
  pub numeric: String,
}

impl ReleaseVersion {
  /// Parse a semantic version; a leading `=`, `v` or `=v` is accepted
  pub fn parse(raw: &str) -> ReleaseResult<Self> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('=').unwrap_or(trimmed);
    let version = semver::Version::parse(trimmed.strip_prefix('v').unwrap_or(trimmed))
      .with_context(|| format!("Release version '{}' is not a valid semantic version", raw))?;

    Ok(Self {
      full: raw.to_string(),
      numeric: format!("{}.{}.{}", version.major, version.minor, version.patch),
    })
  }
}

/// Fully derived msbuild call for one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInvocation {
  /// Project path as configured
  pub project: String,
  pub project_path: PathBuf,
  pub configuration: String,
  pub publish_dir: PathBuf,
  /// Complete msbuild argument list, project path last
  pub args: Vec<String>,
}

/// Derive the msbuild command line for a project
pub fn plan_invocation(project: &ProjectEntry, ctx: &ReleaseContext, version: &ReleaseVersion) -> BuildInvocation {
  let project_path = resolve_path(ctx.cwd(), &project.path);

  let configuration = project
    .config
    .clone()
    .unwrap_or_else(|| DEFAULT_CONFIGURATION.to_string());

  let publish_dir = match &project.publish_dir {
    Some(dir) => resolve_path(ctx.cwd(), dir),
    None => normalize(
      &ctx
        .cwd()
        .join(PUBLISH_ROOT)
        .join(project_stem(&project.path))
        .join(&configuration),
    ),
  };

  let mut args = Vec::new();

  match &project.targets {
    Some(targets) => args.extend(targets.iter().map(|t| format!("/target:{}", t))),
    None => args.push(format!("/target:{}", DEFAULT_TARGETS)),
  }

  args.extend(
    project
      .properties
      .iter()
      .map(|p| format!("/property:{}={}", p.name, p.value)),
  );

  args.push(format!("/property:FileVersion={}", version.numeric));
  args.push(format!("/property:AssemblyVersion={}", version.numeric));
  args.push(format!("/property:InformationalVersion={}", version.full));
  args.push(format!("/property:PackageVersion={}", version.full));
  args.push(format!("/property:Configuration={}", configuration));
  args.push(format!("/property:PublishDir={}", publish_dir.display()));
  args.push("/property:GenerateAssemblyInfo=true".to_string());
  args.extend(project.args.iter().cloned());
  args.push(project_path.display().to_string());

  BuildInvocation {
    project: project.path.clone(),
    project_path,
    configuration,
    publish_dir,
    args,
  }
}

/// Derive command lines for every project, in order
pub fn plan_invocations(
  projects: &[ProjectEntry],
  ctx: &ReleaseContext,
  version: &ReleaseVersion,
) -> Vec<BuildInvocation> {
  projects.iter().map(|p| plan_invocation(p, ctx, version)).collect()
}

/// One successfully built project
#[derive(Debug, Clone, Serialize)]
pub struct BuiltProject {
  pub project: String,
  pub publish_dir: PathBuf,
  pub duration_ms: u128,
}

/// Summary of a completed build step
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
  pub version: ReleaseVersion,
  pub toolchain: Toolchain,
  pub projects: Vec<BuiltProject>,
  pub finished_at: DateTime<Utc>,
}

/// Build every verified project with the release version stamped in
///
/// `output` decides where msbuild's console output goes; `--json` callers pass
/// [`ChildOutput::ToStderr`] so stdout only carries the report.
pub fn verify_release(
  verification: &Verification,
  ctx: &ReleaseContext,
  runner: &dyn ToolRunner,
  output: ChildOutput,
) -> ReleaseResult<BuildReport> {
  let _span = info_span!("verify_release").entered();

  let next = ctx.next_release.as_ref().ok_or_else(|| {
    ReleaseError::with_help(
      "No release version available for the build step",
      "Pass the version computed by the release host with --next-version <VERSION>.",
    )
  })?;
  let version = ReleaseVersion::parse(&next.version)?;

  let mut built = Vec::with_capacity(verification.projects.len());

  for project in &verification.projects {
    info!("Building project {}", project.path);

    let plan = plan_invocation(project, ctx, &version);
    let invocation = ToolInvocation::new(MSBUILD, ctx)
      .args(plan.args)
      .toolchain(&verification.toolchain)
      .output(output);

    let started = Instant::now();
    runner
      .run_checked(&invocation)
      .map_err(|source| BuildError::ProjectFailed {
        path: project.path.clone(),
        source,
      })?;

    info!("Project {} built successfully", project.path);
    built.push(BuiltProject {
      project: project.path.clone(),
      publish_dir: plan.publish_dir,
      duration_ms: started.elapsed().as_millis(),
    });
  }

  info!("All specified projects built");

  Ok(BuildReport {
    version,
    toolchain: verification.toolchain.clone(),
    projects: built,
    finished_at: Utc::now(),
  })
}
