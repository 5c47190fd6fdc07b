//! `msbuild-release locate` - report default Visual Studio install locations

use crate::core::error::ReleaseResult;
use crate::core::toolchain::{DEFAULT_CANDIDATES, locate};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct Candidate<'a> {
  path: &'a str,
  exists: bool,
}

/// Run the locate command
pub fn run_locate(json: bool) -> ReleaseResult<()> {
  let found = locate();

  if json {
    let candidates: Vec<_> = DEFAULT_CANDIDATES
      .iter()
      .map(|&path| Candidate {
        path,
        exists: Path::new(path).exists(),
      })
      .collect();
    return super::print_json(&serde_json::json!({
      "found": found,
      "candidates": candidates,
    }));
  }

  println!("🔍 Searching default Visual Studio install locations");
  for path in DEFAULT_CANDIDATES {
    let marker = if Path::new(path).exists() { "✅" } else { "  " };
    println!("  {} {}", marker, path);
  }

  match found {
    Some(path) => println!("\n✅ Using {}", path.display()),
    None => println!("\nNo Visual Studio installation found; set VS_PATH or put msbuild on PATH"),
  }

  Ok(())
}
