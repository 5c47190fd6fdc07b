//! CLI commands for msbuild-release
//!
//! ## Lifecycle steps
//! - **verify**: verifyConditions - resolve the toolchain and validate projects
//! - **build**: verifyConditions followed by verifyRelease in one process
//!
//! ## Inspection
//! - **plan**: validate projects and print msbuild command lines (no processes run)
//! - **locate**: show which default Visual Studio install locations exist
//!
//! All commands accept `&ReleaseContext` built once in main.rs.

pub mod build;
pub mod locate;
pub mod plan;
pub mod verify;

pub use build::run_build;
pub use locate::run_locate;
pub use plan::run_plan;
pub use verify::run_verify;

use crate::core::error::ReleaseResult;
use serde::Serialize;

/// Print a value as pretty JSON on stdout
pub(crate) fn print_json<T: Serialize>(value: &T) -> ReleaseResult<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}
