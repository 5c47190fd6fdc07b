mod commands;
mod core;
mod utils;

use clap::{Parser, Subcommand};
use crate::core::context::ReleaseContext;
use crate::core::error::{ExitCode, ReleaseError, ReleaseResult, print_error};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Locate MSBuild, validate release config, and build versioned artifacts
#[derive(Parser)]
#[command(name = "msbuild-release")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Working directory (project paths and default publish dirs resolve against it)
  #[arg(long, global = true)]
  cwd: Option<PathBuf>,

  /// Config file (default: search msbuild-release.toml, .msbuild-release.toml, .config/, msbuild-release.json)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Output results (and errors) in JSON format on stdout
  #[arg(long, global = true)]
  json: bool,

  /// Enable debug logging (overridden by RUST_LOG)
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Check that msbuild is available and the project list is valid (verifyConditions)
  Verify,

  /// Verify, then build every project with the release version stamped in (verifyRelease)
  Build {
    /// Version of the upcoming release (e.g. 2.3.1 or 2.4.0-beta.1)
    #[arg(long)]
    next_version: String,
  },

  /// Validate projects and show the msbuild command lines without running anything
  Plan {
    /// Version to stamp into the planned command lines
    #[arg(long)]
    next_version: Option<String>,
  },

  /// Search the default Visual Studio install locations
  Locate,
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn init_logging(verbose: bool) {
  let default_level = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  // stderr only: stdout is reserved for --json output and msbuild itself
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .without_time()
    .init();
}

fn main() {
  // Usage errors share the user exit class; --help and --version still exit 0
  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    Err(e) => {
      let code = if e.use_stderr() { ExitCode::User.as_i32() } else { 0 };
      let _ = e.print();
      std::process::exit(code);
    }
  };
  init_logging(cli.verbose);

  let json = cli.json;
  let ctx = match build_context(cli.cwd) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e, json),
  };
  let config = cli.config.as_deref();

  let result = match cli.command {
    Commands::Verify => commands::run_verify(&ctx, config, json),
    Commands::Build { next_version } => commands::run_build(&ctx, config, next_version, json),
    Commands::Plan { next_version } => commands::run_plan(&ctx, config, next_version, json),
    Commands::Locate => commands::run_locate(json),
  };

  if let Err(err) = result {
    handle_error(err, json);
  }
}

/// Release context for this process: absolute cwd plus the inherited environment
fn build_context(cwd: Option<PathBuf>) -> ReleaseResult<ReleaseContext> {
  let dir = match cwd {
    Some(dir) => dir,
    None => std::env::current_dir().map_err(|e| ReleaseError::message(format!("Failed to get current directory: {}", e)))?,
  };

  let dir = dir.canonicalize().map_err(|e| {
    ReleaseError::with_help(
      format!("Working directory {} is not accessible: {}", dir.display(), e),
      "Check the --cwd argument.",
    )
  })?;

  Ok(ReleaseContext::from_process(dunce_path(dir)))
}

/// `canonicalize` yields `\\?\C:\...` on Windows, which msbuild and cmd.exe reject
fn dunce_path(path: PathBuf) -> PathBuf {
  #[cfg(windows)]
  {
    let s = path.to_string_lossy();
    if let Some(stripped) = s.strip_prefix(r"\\?\")
      && !stripped.starts_with("UNC\\")
    {
      return PathBuf::from(stripped);
    }
  }
  path
}

fn handle_error(err: ReleaseError, json: bool) -> ! {
  if json {
    match serde_json::to_string_pretty(&err.report()) {
      Ok(payload) => println!("{}", payload),
      Err(e) => eprintln!("Failed to serialize error report: {}", e),
    }
  }
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
