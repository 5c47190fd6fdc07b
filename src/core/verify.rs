//! Condition verification (the `verifyConditions` lifecycle step)
//!
//! Resolves how msbuild is reached, then checks the shape of every configured
//! project. The first failure aborts verification; there is no aggregation.
//!
//! The result is a [`Verification`] value. The build step takes it as input,
//! so the resolved toolchain never lives in global state.

use crate::core::config::{PluginConfig, ProjectEntry, Property, is_truthy, truthy_field, value_to_arg};
use crate::core::context::{ReleaseContext, TOOLCHAIN_ENV};
use crate::core::error::{ProjectError, ReleaseResult, ToolchainError};
use crate::core::exec::{ToolInvocation, ToolRunner};
use crate::core::toolchain::{self, MSBUILD, Toolchain};
use crate::utils::resolve_path;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, info, info_span, warn};

/// Everything the build step needs from verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verification {
  pub toolchain: Toolchain,
  pub projects: Vec<ProjectEntry>,
}

/// Verify toolchain availability and project configuration
pub fn verify_conditions(
  config: &PluginConfig,
  ctx: &ReleaseContext,
  runner: &dyn ToolRunner,
) -> ReleaseResult<Verification> {
  verify_conditions_with(config, ctx, runner, toolchain::locate)
}

/// [`verify_conditions`] with a custom install-location lookup
pub fn verify_conditions_with(
  config: &PluginConfig,
  ctx: &ReleaseContext,
  runner: &dyn ToolRunner,
  locate: impl FnOnce() -> Option<PathBuf>,
) -> ReleaseResult<Verification> {
  let _span = info_span!("verify_conditions").entered();

  let toolchain = verify_toolchain(config, ctx, runner, locate)?;
  let projects = verify_projects(config, ctx)?;

  Ok(Verification { toolchain, projects })
}

/// Resolve the toolchain override and probe msbuild
fn verify_toolchain(
  config: &PluginConfig,
  ctx: &ReleaseContext,
  runner: &dyn ToolRunner,
  locate: impl FnOnce() -> Option<PathBuf>,
) -> ReleaseResult<Toolchain> {
  let resolved = match resolve_override(config, ctx)? {
    Some(path) => Some(path),
    None => {
      let found = locate();
      match &found {
        Some(path) => debug!(path = %path.display(), "Found Visual Studio install"),
        None => debug!("No Visual Studio install found in default locations"),
      }
      found
    }
  };

  info!("Validating installation of msbuild");

  info!("Checking for msbuild on PATH");
  if probe(runner, ctx, &Toolchain::Ambient) {
    info!("msbuild found on PATH");
    return Ok(Toolchain::Ambient);
  }

  match &resolved {
    Some(path) => {
      info!(bootstrap = %path.display(), "Checking for msbuild via toolchainPath/{}", TOOLCHAIN_ENV);
      let bootstrapped = Toolchain::Bootstrapped(path.clone());
      if probe(runner, ctx, &bootstrapped) {
        info!("msbuild found via {}", path.display());
        return Ok(bootstrapped);
      }
    }
    None => warn!("No toolchain path to try: toolchainPath, {} and default install locations are all empty", TOOLCHAIN_ENV),
  }

  Err(ToolchainError::NotFound { resolved }.into())
}

/// Work out the operator-supplied toolchain path, if any
///
/// A configured path that is absent, falsy, or a non-blank string is replaced by
/// the `VS_PATH` environment value, even when that value is unset. Only a
/// truthy non-string or whitespace-only configured value survives, and it then
/// fails the type check below.
fn resolve_override(config: &PluginConfig, ctx: &ReleaseContext) -> ReleaseResult<Option<PathBuf>> {
  let configured = config.toolchain_override();

  let replaced_by_env = match configured {
    None => true,
    Some(v) if !is_truthy(v) => true,
    Some(Value::String(s)) => !s.trim().is_empty(),
    Some(_) => false,
  };

  let value = if replaced_by_env {
    let env_value = ctx.var(TOOLCHAIN_ENV);
    if let Some(Value::String(s)) = configured
      && !s.trim().is_empty()
      && env_value != Some(s.as_str())
    {
      warn!(
        configured = %s,
        "toolchainPath from config is ignored; {} is used instead{}",
        TOOLCHAIN_ENV,
        if env_value.is_none() { " (unset, falling back to discovery)" } else { "" }
      );
    }
    env_value.map(|s| Value::String(s.to_string()))
  } else {
    configured.cloned()
  };

  match value {
    Some(v) if is_truthy(&v) => match v.as_str() {
      Some(s) if !s.trim().is_empty() => Ok(Some(PathBuf::from(s))),
      _ => Err(ToolchainError::InvalidPath { value: v.to_string() }.into()),
    },
    _ => Ok(None),
  }
}

/// Best-effort `msbuild /version`; failures are logged, never raised
fn probe(runner: &dyn ToolRunner, ctx: &ReleaseContext, toolchain: &Toolchain) -> bool {
  let invocation = ToolInvocation::new(MSBUILD, ctx)
    .args(["/version"])
    .toolchain(toolchain)
    .captured();

  match runner.run_checked(&invocation) {
    Ok(outcome) => {
      if let Some(version) = outcome.stdout.lines().map(str::trim).rfind(|l| !l.is_empty()) {
        debug!(version, "msbuild responded");
      }
      true
    }
    Err(e) => {
      warn!("msbuild not found ({}): {}", toolchain.describe(), e);
      false
    }
  }
}

/// Validate the project list and each entry, in order
///
/// This is the configuration half of verification; it never runs a process.
pub fn verify_projects(config: &PluginConfig, ctx: &ReleaseContext) -> ReleaseResult<Vec<ProjectEntry>> {
  let items = match config.projects() {
    None => return Err(invalid_list("\"projects\" is missing")),
    Some(Value::Array(items)) if items.is_empty() => return Err(invalid_list("\"projects\" is empty")),
    Some(Value::Array(items)) => items,
    Some(other) => return Err(invalid_list(format!("expected an array, found {}", type_name(other)))),
  };

  for (idx, item) in items.iter().enumerate() {
    if !item.is_object() {
      return Err(invalid_list(format!("entry {} is {}, expected a table", idx, type_name(item))));
    }
    if !item.get("path").is_some_and(Value::is_string) {
      return Err(invalid_list(format!("entry {} has no string \"path\"", idx)));
    }
  }

  items
    .iter()
    .enumerate()
    .map(|(idx, entry)| validate_entry(idx, entry, ctx))
    .collect()
}

fn validate_entry(idx: usize, entry: &Value, ctx: &ReleaseContext) -> ReleaseResult<ProjectEntry> {
  let path = entry
    .get("path")
    .and_then(Value::as_str)
    .ok_or_else(|| invalid_list(format!("entry {} has no string \"path\"", idx)))?;

  info!("Checking for existence of {}", path);
  if !resolve_path(ctx.cwd(), path).exists() {
    return Err(ProjectError::NotFound { path: path.to_string() }.into());
  }

  let owned = || path.to_string();

  let targets = match truthy_field(entry, "targets") {
    None => None,
    Some(Value::Array(items)) => Some(items.iter().map(value_to_arg).collect()),
    Some(_) => return Err(ProjectError::InvalidTargets { path: owned() }.into()),
  };

  let properties = match truthy_field(entry, "properties") {
    None => Vec::new(),
    Some(Value::Object(map)) => map
      .iter()
      .map(|(name, value)| Property {
        name: name.clone(),
        value: value_to_arg(value),
      })
      .collect(),
    Some(_) => return Err(ProjectError::InvalidProperties { path: owned() }.into()),
  };

  let config = match truthy_field(entry, "config") {
    None => None,
    Some(Value::String(s)) => Some(s.clone()),
    Some(_) => return Err(ProjectError::InvalidConfig { path: owned() }.into()),
  };

  let publish_dir = match truthy_field(entry, "publishDir") {
    None => None,
    Some(Value::String(s)) => Some(s.clone()),
    Some(_) => return Err(ProjectError::InvalidPublishDir { path: owned() }.into()),
  };

  let args = match truthy_field(entry, "args") {
    None => Vec::new(),
    Some(Value::Array(items)) => items.iter().map(value_to_arg).collect(),
    Some(_) => return Err(ProjectError::InvalidArgs { path: owned() }.into()),
  };

  Ok(ProjectEntry {
    path: owned(),
    targets,
    properties,
    config,
    publish_dir,
    args,
  })
}

fn invalid_list(reason: impl Into<String>) -> crate::core::error::ReleaseError {
  ProjectError::InvalidList { reason: reason.into() }.into()
}

fn type_name(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "a table",
  }
}
