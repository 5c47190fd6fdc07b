//! Plugin configuration loading and the typed project model
//!
//! The release host hands the plugin an untyped JSON object, so configuration is
//! kept as a `serde_json::Value` until the condition verifier has checked every
//! field's shape. Only then is it turned into [`ProjectEntry`] values. Parsing
//! straight into typed structs would replace the per-field error kinds with one
//! generic deserialization error.
//!
//! Files are searched in order: msbuild-release.toml, .msbuild-release.toml,
//! .config/msbuild-release.toml, msbuild-release.json

use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Config key for the toolchain override
pub const TOOLCHAIN_KEY: &str = "toolchainPath";
/// Older name of [`TOOLCHAIN_KEY`], still accepted
pub const TOOLCHAIN_KEY_ALIAS: &str = "vsPath";

/// Raw plugin configuration plus where it came from
#[derive(Debug, Clone)]
pub struct PluginConfig {
  pub raw: Value,
  pub source: Option<PathBuf>,
}

impl PluginConfig {
  /// Wrap a value supplied directly by a host
  #[cfg(test)]
  pub fn from_value(raw: Value) -> Self {
    Self { raw, source: None }
  }

  /// Find config file in search order
  pub fn find_config_path(dir: &Path) -> Option<PathBuf> {
    let candidates = vec![
      dir.join("msbuild-release.toml"),
      dir.join(".msbuild-release.toml"),
      dir.join(".config").join("msbuild-release.toml"),
      dir.join("msbuild-release.json"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from an explicit file, or search `dir` for one
  pub fn load(dir: &Path, explicit: Option<&Path>) -> ReleaseResult<Self> {
    let config_path = match explicit {
      Some(path) => crate::utils::resolve_path(dir, &path.to_string_lossy()),
      None => Self::find_config_path(dir).ok_or_else(|| {
        ReleaseError::with_help(
          format!("No msbuild-release configuration found in {}", dir.display()),
          "Create msbuild-release.toml with at least one [[projects]] entry, or pass --config <FILE>.",
        )
      })?,
    };

    let content = fs::read_to_string(&config_path)
      .map_err(|e| ReleaseError::message(format!("Failed to read config from {}: {}", config_path.display(), e)))?;
    let raw = Self::parse(&content, &config_path)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    Ok(Self {
      raw,
      source: Some(config_path),
    })
  }

  /// Parse by extension: `.json` as JSON, anything else as TOML
  pub fn parse(content: &str, path: &Path) -> ReleaseResult<Value> {
    let is_json = path
      .extension()
      .and_then(|e| e.to_str())
      .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
      Ok(serde_json::from_str(content)?)
    } else {
      Ok(toml_edit::de::from_str(content)?)
    }
  }

  /// Configured toolchain override (`toolchainPath`, falling back to `vsPath`)
  pub fn toolchain_override(&self) -> Option<&Value> {
    self
      .raw
      .get(TOOLCHAIN_KEY)
      .or_else(|| self.raw.get(TOOLCHAIN_KEY_ALIAS))
  }

  pub fn projects(&self) -> Option<&Value> {
    self.raw.get("projects")
  }
}

/// A custom build property, in configured order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
  pub name: String,
  pub value: String,
}

/// One validated buildable unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectEntry {
  /// Path exactly as configured (used in messages)
  pub path: String,
  /// None = default `clean;publish`
  pub targets: Option<Vec<String>>,
  pub properties: Vec<Property>,
  /// None = `Release`
  pub config: Option<String>,
  /// None = derived from cwd, project stem and configuration
  pub publish_dir: Option<String>,
  pub args: Vec<String>,
}

impl ProjectEntry {
  /// Entry with only a path; everything else defaulted
  #[cfg(test)]
  pub fn new(path: impl Into<String>) -> Self {
    Self {
      path: path.into(),
      targets: None,
      properties: Vec::new(),
      config: None,
      publish_dir: None,
      args: Vec::new(),
    }
  }
}

/// JavaScript-style truthiness: null, false, 0 and "" are unset
pub fn is_truthy(value: &Value) -> bool {
  match value {
    Value::Null => false,
    Value::Bool(b) => *b,
    Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
    Value::String(s) => !s.is_empty(),
    Value::Array(_) | Value::Object(_) => true,
  }
}

/// Look up an optional field, treating falsy values as absent
pub fn truthy_field<'a>(entry: &'a Value, key: &str) -> Option<&'a Value> {
  entry.get(key).filter(|v| is_truthy(v))
}

/// Render a scalar config value as a command-line fragment
pub fn value_to_arg(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    Value::Array(items) => items.iter().map(value_to_arg).collect::<Vec<_>>().join(","),
    other => other.to_string(),
  }
}
