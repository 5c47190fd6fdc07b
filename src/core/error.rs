//! Error types for msbuild-release with stable kinds, contextual messages and exit codes
//!
//! Every plugin failure carries a stable `kind` string (consumed by the release host),
//! the short error code the plugin has always emitted, a one-line message, and a
//! longer detail sentence. Generic failures (I/O, bad CLI input) fall back to
//! `ReleaseError::Message` and have no kind.

use crate::core::exec::ExecError;
use serde::Serialize;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for msbuild-release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing files)
  User = 1,
  /// System error (toolchain, process execution, I/O)
  System = 2,
  /// Validation failure (project list shape checks)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Flat taxonomy of plugin failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
  InvalidToolchainPath,
  ToolchainNotFound,
  InvalidProjectList,
  ProjectNotFound,
  InvalidTargetsType,
  InvalidPropertiesType,
  InvalidConfigType,
  InvalidPublishDirType,
  InvalidArgsType,
  ProjectBuildFailed,
}

impl ErrorKind {
  /// Stable name consumed by the release host
  pub fn as_str(self) -> &'static str {
    match self {
      ErrorKind::InvalidToolchainPath => "InvalidToolchainPath",
      ErrorKind::ToolchainNotFound => "ToolchainNotFound",
      ErrorKind::InvalidProjectList => "InvalidProjectList",
      ErrorKind::ProjectNotFound => "ProjectNotFound",
      ErrorKind::InvalidTargetsType => "InvalidTargetsType",
      ErrorKind::InvalidPropertiesType => "InvalidPropertiesType",
      ErrorKind::InvalidConfigType => "InvalidConfigType",
      ErrorKind::InvalidPublishDirType => "InvalidPublishDirType",
      ErrorKind::InvalidArgsType => "InvalidArgsType",
      ErrorKind::ProjectBuildFailed => "ProjectBuildFailed",
    }
  }

  /// Legacy error code, kept so existing pipeline dashboards keep matching
  pub fn code(self) -> &'static str {
    match self {
      ErrorKind::InvalidToolchainPath => "E_VS_PATH",
      ErrorKind::ToolchainNotFound => "E_MSBUILD_NOT_FOUND",
      ErrorKind::InvalidProjectList => "E_BAD_PROJECTS",
      ErrorKind::ProjectNotFound => "E_PROJ_DNE",
      ErrorKind::InvalidTargetsType => "E_TARGETS_ARRAY",
      ErrorKind::InvalidPropertiesType => "E_PROP_OBJ",
      ErrorKind::InvalidConfigType => "E_CONFIG_STR",
      ErrorKind::InvalidPublishDirType => "E_PUB_DIR",
      ErrorKind::InvalidArgsType => "E_ARGS_ARRAY",
      ErrorKind::ProjectBuildFailed => "E_PROJ_BUILD",
    }
  }
}

impl fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Main error type for msbuild-release
#[derive(Debug)]
pub enum ReleaseError {
  /// Toolchain resolution and probing errors
  Toolchain(ToolchainError),

  /// Project list and project entry validation errors
  Project(ProjectError),

  /// Build tool invocation errors
  Build(BuildError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ReleaseError::Message { message, context, help } => ReleaseError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      _ => self,
    }
  }

  /// Plugin error kind, `None` for generic failures
  pub fn kind(&self) -> Option<ErrorKind> {
    match self {
      ReleaseError::Toolchain(e) => Some(e.kind()),
      ReleaseError::Project(e) => Some(e.kind()),
      ReleaseError::Build(e) => Some(e.kind()),
      _ => None,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ReleaseError::Toolchain(ToolchainError::InvalidPath { .. }) => ExitCode::User,
      ReleaseError::Toolchain(ToolchainError::NotFound { .. }) => ExitCode::System,
      ReleaseError::Project(_) => ExitCode::Validation,
      ReleaseError::Build(_) => ExitCode::System,
      ReleaseError::Io(_) => ExitCode::System,
      ReleaseError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::Toolchain(e) => e.help_message(),
      ReleaseError::Project(e) => e.help_message(),
      ReleaseError::Build(e) => e.help_message(),
      ReleaseError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }

  /// Machine-readable form for `--json` output
  pub fn report(&self) -> ErrorReport {
    let (message, details) = match self {
      ReleaseError::Toolchain(e) => (e.summary().to_string(), e.to_string()),
      ReleaseError::Project(e) => (e.summary().to_string(), e.to_string()),
      ReleaseError::Build(e) => (e.summary().to_string(), e.to_string()),
      other => (other.to_string(), other.to_string()),
    };
    let cause = std::error::Error::source(self).map(|s| s.to_string());

    ErrorReport {
      kind: self.kind().map(ErrorKind::as_str),
      code: self.kind().map(ErrorKind::code),
      message,
      details,
      cause,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::Toolchain(e) => write!(f, "{}", e),
      ReleaseError::Project(e) => write!(f, "{}", e),
      ReleaseError::Build(e) => write!(f, "{}", e),
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
      ReleaseError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      ReleaseError::Build(BuildError::ProjectFailed { source, .. }) => Some(source),
      _ => None,
    }
  }
}

impl From<ToolchainError> for ReleaseError {
  fn from(err: ToolchainError) -> Self {
    ReleaseError::Toolchain(err)
  }
}

impl From<ProjectError> for ReleaseError {
  fn from(err: ProjectError) -> Self {
    ReleaseError::Project(err)
  }
}

impl From<BuildError> for ReleaseError {
  fn from(err: BuildError) -> Self {
    ReleaseError::Build(err)
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<String> for ReleaseError {
  fn from(msg: String) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<&str> for ReleaseError {
  fn from(msg: &str) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<toml_edit::de::Error> for ReleaseError {
  fn from(err: toml_edit::de::Error) -> Self {
    ReleaseError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ReleaseError {
  fn from(err: serde_json::Error) -> Self {
    ReleaseError::message(format!("JSON error: {}", err))
  }
}

impl From<semver::Error> for ReleaseError {
  fn from(err: semver::Error) -> Self {
    ReleaseError::message(format!("Version parse error: {}", err))
  }
}

/// Toolchain resolution errors
#[derive(Debug)]
pub enum ToolchainError {
  /// `toolchainPath` / `VS_PATH` resolved to something that is not a usable path string
  InvalidPath { value: String },

  /// Neither the ambient PATH nor the resolved bootstrap produced a working msbuild
  NotFound { resolved: Option<PathBuf> },
}

impl ToolchainError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      ToolchainError::InvalidPath { .. } => ErrorKind::InvalidToolchainPath,
      ToolchainError::NotFound { .. } => ErrorKind::ToolchainNotFound,
    }
  }

  fn summary(&self) -> &'static str {
    match self {
      ToolchainError::InvalidPath { .. } => "toolchainPath or VS_PATH is not a path string",
      ToolchainError::NotFound { .. } => "msbuild not found",
    }
  }

  fn help_message(&self) -> Option<String> {
    match self {
      ToolchainError::InvalidPath { .. } => {
        Some("Set VS_PATH to the full path of VsDevCmd.bat, or remove the setting to use auto-discovery.".to_string())
      }
      ToolchainError::NotFound { .. } => Some(
        "Install the Visual Studio build tools, put msbuild on PATH, or point VS_PATH at VsDevCmd.bat.".to_string(),
      ),
    }
  }
}

impl fmt::Display for ToolchainError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ToolchainError::InvalidPath { value } => {
        write!(f, "toolchainPath must be a path string (got {})", value)
      }
      ToolchainError::NotFound { resolved } => {
        write!(f, "msbuild was searched on the PATH and via ")?;
        match resolved {
          Some(path) => write!(f, "{}", path.display())?,
          None => write!(f, "toolchainPath/VS_PATH (nothing resolved)")?,
        }
        write!(f, " and could not be found")
      }
    }
  }
}

/// Project list validation errors
#[derive(Debug)]
pub enum ProjectError {
  /// `projects` missing, empty, not a list, or holding non-record entries
  InvalidList { reason: String },

  /// Project descriptor does not exist on disk
  NotFound { path: String },

  /// `targets` is not a list
  InvalidTargets { path: String },

  /// `properties` is not a key/value table
  InvalidProperties { path: String },

  /// `config` is not a string
  InvalidConfig { path: String },

  /// `publishDir` is not a string
  InvalidPublishDir { path: String },

  /// `args` is not a list
  InvalidArgs { path: String },
}

impl ProjectError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      ProjectError::InvalidList { .. } => ErrorKind::InvalidProjectList,
      ProjectError::NotFound { .. } => ErrorKind::ProjectNotFound,
      ProjectError::InvalidTargets { .. } => ErrorKind::InvalidTargetsType,
      ProjectError::InvalidProperties { .. } => ErrorKind::InvalidPropertiesType,
      ProjectError::InvalidConfig { .. } => ErrorKind::InvalidConfigType,
      ProjectError::InvalidPublishDir { .. } => ErrorKind::InvalidPublishDirType,
      ProjectError::InvalidArgs { .. } => ErrorKind::InvalidArgsType,
    }
  }

  fn summary(&self) -> &'static str {
    match self {
      ProjectError::InvalidList { .. } => "Bad projects config",
      ProjectError::NotFound { .. } => "Project does not exist",
      ProjectError::InvalidTargets { .. } => "targets must be an array",
      ProjectError::InvalidProperties { .. } => "properties must be an object",
      ProjectError::InvalidConfig { .. } => "config must be a string",
      ProjectError::InvalidPublishDir { .. } => "publishDir must be a string",
      ProjectError::InvalidArgs { .. } => "args must be an array",
    }
  }

  fn help_message(&self) -> Option<String> {
    match self {
      ProjectError::InvalidList { .. } => Some(
        "Declare at least one project table, e.g.\n\n  [[projects]]\n  path = \"src/App/App.csproj\"".to_string(),
      ),
      ProjectError::NotFound { .. } => {
        Some("Relative project paths are resolved against the working directory (--cwd).".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for ProjectError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ProjectError::InvalidList { reason } => {
        write!(f, "\"projects\" must be a non-empty array of project tables: {}", reason)
      }
      ProjectError::NotFound { path } => {
        write!(f, "The project at {} does not appear to exist", path)
      }
      ProjectError::InvalidTargets { path } => {
        write!(f, "\"targets\" for project {} must be an array", path)
      }
      ProjectError::InvalidProperties { path } => {
        write!(f, "\"properties\" for project {} must be a table of key-value pairs", path)
      }
      ProjectError::InvalidConfig { path } => {
        write!(f, "\"config\" for project {} must be a string", path)
      }
      ProjectError::InvalidPublishDir { path } => {
        write!(f, "\"publishDir\" for project {} must be a path string", path)
      }
      ProjectError::InvalidArgs { path } => {
        write!(f, "\"args\" for project {} must be an array", path)
      }
    }
  }
}

/// Build tool invocation errors
#[derive(Debug)]
pub enum BuildError {
  /// msbuild failed to start or exited non-zero for a project
  ProjectFailed { path: String, source: ExecError },
}

impl BuildError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      BuildError::ProjectFailed { .. } => ErrorKind::ProjectBuildFailed,
    }
  }

  fn summary(&self) -> &'static str {
    "Error building project"
  }

  fn help_message(&self) -> Option<String> {
    match self {
      BuildError::ProjectFailed { source, .. } => match source {
        ExecError::Spawn { .. } => Some("Run `msbuild-release verify` to check the toolchain setup.".to_string()),
        ExecError::Failed { .. } => Some("Scroll up for the msbuild output of the failing project.".to_string()),
      },
    }
  }
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildError::ProjectFailed { path, source } => {
        write!(f, "There was an error building the project at {}\n{}", path, source)
      }
    }
  }
}

/// Serializable error payload for `--json` output
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
  pub kind: Option<&'static str>,
  pub code: Option<&'static str>,
  pub message: String,
  pub details: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cause: Option<String>,
}

/// Result type alias for msbuild-release
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ReleaseError) {
  match error.kind() {
    Some(kind) => eprintln!("\n❌ [{}] {}\n", kind.code(), error),
    None => eprintln!("\n❌ {}\n", error),
  }

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
