//! Doctor command implementation.

use anyhow::Result;
use sierra_lib::{ENV_DEPTH_ROOT, ENV_SCID_ROOT, SyncConfig};
use std::path::Path;
use std::process::ExitCode;

fn root_status(path: &Path) -> &'static str {
    if path.is_dir() {
        "ok"
    } else if path.exists() {
        "not a directory"
    } else {
        "missing"
    }
}

/// Prints the effective configuration and whether each root exists.
///
/// Exits with code 2 when a storage root is missing, matching `sync`.
pub(crate) fn doctor(config: &SyncConfig, explicit: Option<&Path>) -> Result<ExitCode> {
    let file = explicit
        .map(Path::to_path_buf)
        .or_else(|| SyncConfig::default_path().filter(|p| p.is_file()));
    match &file {
        Some(path) => println!("config file            = {}", path.display()),
        None => println!("config file            = (none)"),
    }
    for key in [ENV_SCID_ROOT, ENV_DEPTH_ROOT] {
        if let Some(value) = std::env::var_os(key) {
            println!("env {key:<18} = {}", value.to_string_lossy());
        }
    }

    let scid = root_status(&config.scid_root);
    let depth = root_status(&config.depth_root);
    println!("scid_root              = {} ({scid})", config.scid_root.display());
    println!("depth_root             = {} ({depth})", config.depth_root.display());
    println!("fallback_window_days   = {}", config.fallback_window_days);

    if scid == "missing" || depth == "missing" {
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}
