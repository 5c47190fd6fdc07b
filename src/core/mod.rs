//! Core engine for msbuild-release
//!
//! - **config**: Plugin configuration loading and the typed project model
//! - **context**: Release context (cwd, environment, next version)
//! - **error**: Error taxonomy with stable kinds, help messages and exit codes
//! - **exec**: Process runner seam for every external tool call
//! - **toolchain**: Visual Studio install discovery
//! - **verify**: The `verifyConditions` lifecycle step
//! - **build**: The `verifyRelease` lifecycle step

pub mod build;
pub mod config;
pub mod context;
pub mod error;
pub mod exec;
pub mod toolchain;
pub mod verify;
