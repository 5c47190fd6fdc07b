//! Process runner - the single seam for every external tool invocation
//!
//! Both toolchain probes and project builds go through [`ToolRunner::run`]. The
//! system implementation spawns the tool directly when no bootstrap is given,
//! or sources the bootstrap script first (VsDevCmd.bat on Windows, a shell
//! script elsewhere) so the tool sees the environment it sets up.
//!
//! Exit code 0 is the only success signal.

use crate::core::context::ReleaseContext;
use crate::core::toolchain::Toolchain;
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Where a child's output goes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChildOutput {
  /// Stream both streams to the terminal
  #[default]
  Inherit,
  /// Collect stdout/stderr into the [`ToolOutcome`]
  Capture,
  /// Stream, but send the child's stdout to our stderr (keeps stdout for JSON)
  ToStderr,
}

/// One external tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
  /// Script sourced before the tool runs (None = tool must be on PATH)
  pub bootstrap: Option<PathBuf>,
  pub tool: String,
  pub args: Vec<String>,
  pub cwd: PathBuf,
  pub env: BTreeMap<String, String>,
  pub output: ChildOutput,
}

impl ToolInvocation {
  /// Invocation of `tool` in the context's working directory and environment
  pub fn new(tool: impl Into<String>, ctx: &ReleaseContext) -> Self {
    Self {
      bootstrap: None,
      tool: tool.into(),
      args: Vec::new(),
      cwd: ctx.cwd.clone(),
      env: ctx.env.clone(),
      output: ChildOutput::Inherit,
    }
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  /// Route the call through the toolchain's bootstrap script, if it has one
  pub fn toolchain(mut self, toolchain: &Toolchain) -> Self {
    self.bootstrap = toolchain.bootstrap().map(|p| p.to_path_buf());
    self
  }

  pub fn captured(self) -> Self {
    self.output(ChildOutput::Capture)
  }

  pub fn output(mut self, output: ChildOutput) -> Self {
    self.output = output;
    self
  }

  /// Human-readable command line for logs and error messages
  pub fn display(&self) -> String {
    let mut line = String::new();
    if let Some(script) = &self.bootstrap {
      line.push_str(&format!("[{}] ", script.display()));
    }
    line.push_str(&self.tool);
    for arg in &self.args {
      line.push(' ');
      line.push_str(arg);
    }
    line
  }
}

/// Result of a finished child process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutcome {
  /// Exit code (None when terminated by a signal)
  pub code: Option<i32>,
  /// Captured stdout (empty unless the invocation was captured)
  pub stdout: String,
  /// Captured stderr (empty unless the invocation was captured)
  pub stderr: String,
}

impl ToolOutcome {
  pub fn success(&self) -> bool {
    self.code == Some(0)
  }
}

/// Failure to run a tool to a successful exit
#[derive(Debug)]
pub enum ExecError {
  /// The process (or its bootstrap shell) could not be started
  Spawn { command: String, source: io::Error },

  /// The process ran and exited non-zero
  Failed {
    command: String,
    code: Option<i32>,
    stderr: String,
  },
}

impl fmt::Display for ExecError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ExecError::Spawn { command, source } => write!(f, "Failed to execute `{}`: {}", command, source),
      ExecError::Failed { command, code, stderr } => {
        match code {
          Some(code) => write!(f, "`{}` failed with exit code {}", command, code)?,
          None => write!(f, "`{}` was terminated by a signal", command)?,
        }
        let stderr = stderr.trim();
        if !stderr.is_empty() {
          write!(f, "\n{}", stderr)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ExecError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ExecError::Spawn { source, .. } => Some(source),
      ExecError::Failed { .. } => None,
    }
  }
}

/// Runs external tools
pub trait ToolRunner {
  /// Run the invocation to completion. Non-zero exits are returned as outcomes,
  /// only spawn failures are errors.
  fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutcome, ExecError>;

  /// Run the invocation and treat any non-zero exit as an error
  fn run_checked(&self, invocation: &ToolInvocation) -> Result<ToolOutcome, ExecError> {
    let outcome = self.run(invocation)?;
    if outcome.success() {
      Ok(outcome)
    } else {
      Err(ExecError::Failed {
        command: invocation.display(),
        code: outcome.code,
        stderr: outcome.stderr,
      })
    }
  }
}

/// Runner backed by `std::process::Command`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
  /// Build the command with an isolated environment
  ///
  /// - Sets working directory to the release cwd
  /// - Clears inherited environment variables
  /// - Passes exactly the release context's environment map
  fn command(&self, invocation: &ToolInvocation) -> Command {
    let mut cmd = match &invocation.bootstrap {
      Some(script) => bootstrapped_command(script, &invocation.tool, &invocation.args),
      None => {
        let mut cmd = Command::new(&invocation.tool);
        cmd.args(&invocation.args);
        cmd
      }
    };

    cmd.current_dir(&invocation.cwd);
    cmd.env_clear();
    cmd.envs(&invocation.env);
    cmd.stdin(Stdio::null());

    match invocation.output {
      ChildOutput::Inherit => cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit()),
      ChildOutput::Capture => cmd.stdout(Stdio::piped()).stderr(Stdio::piped()),
      ChildOutput::ToStderr => cmd.stdout(Stdio::from(io::stderr())).stderr(Stdio::inherit()),
    };

    cmd
  }
}

impl ToolRunner for SystemRunner {
  fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutcome, ExecError> {
    let mut cmd = self.command(invocation);
    let spawn_error = |source| ExecError::Spawn {
      command: invocation.display(),
      source,
    };

    if invocation.output == ChildOutput::Capture {
      let output = cmd.output().map_err(spawn_error)?;
      Ok(ToolOutcome {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
      })
    } else {
      let status = cmd.status().map_err(spawn_error)?;
      Ok(ToolOutcome {
        code: status.code(),
        ..Default::default()
      })
    }
  }
}

/// `cmd.exe` line that calls the bootstrap batch file, then the tool
#[cfg(windows)]
fn bootstrapped_command(script: &std::path::Path, tool: &str, args: &[String]) -> Command {
  use std::os::windows::process::CommandExt;

  let mut line = format!("\"call \"{}\" >nul && {}", script.display(), tool);
  for arg in args {
    line.push(' ');
    line.push_str(&quote_windows_arg(arg));
  }
  line.push('"');

  let mut cmd = Command::new("cmd.exe");
  cmd.args(["/d", "/s", "/c"]).raw_arg(line);
  cmd
}

/// `sh` sources the bootstrap script, then execs the tool with untouched arguments
#[cfg(not(windows))]
fn bootstrapped_command(script: &std::path::Path, tool: &str, args: &[String]) -> Command {
  let mut cmd = Command::new("sh");
  cmd
    .arg("-c")
    .arg(r#". "$1" >/dev/null && shift && exec "$@""#)
    .arg("msbuild-release")
    .arg(script)
    .arg(tool)
    .args(args);
  cmd
}

/// Quote an argument for a `cmd.exe` command line (MSVCRT parsing rules)
#[cfg_attr(not(windows), allow(dead_code))]
fn quote_windows_arg(arg: &str) -> String {
  const SPECIAL: [char; 10] = [' ', '\t', '"', '&', '|', '<', '>', '^', '(', ')'];

  if !arg.is_empty() && !arg.contains(SPECIAL) {
    return arg.to_string();
  }

  let mut out = String::with_capacity(arg.len() + 2);
  out.push('"');
  let mut backslashes = 0;
  for c in arg.chars() {
    if c == '\\' {
      backslashes += 1;
      continue;
    }
    if c == '"' {
      out.push_str(&"\\".repeat(backslashes * 2 + 1));
    } else {
      out.push_str(&"\\".repeat(backslashes));
    }
    out.push(c);
    backslashes = 0;
  }
  out.push_str(&"\\".repeat(backslashes * 2));
  out.push('"');
  out
}
