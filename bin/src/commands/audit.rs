//! Audit command implementation.

use anyhow::{Context, Result};
use sierra_lib::prelude::*;
use sierra_lib::{DEPTH_EXTENSION, SYNC_SUFFIX, SyncConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Classification of one depth file's first record.
#[derive(Debug, PartialEq, Eq)]
enum Head {
    Ok(i64),
    Fail(i64, u8),
    Empty,
    Error(String),
}

fn inspect(path: &Path) -> Head {
    let file = match open_depth(path) {
        Ok(file) => file,
        Err(err) => return Head::Error(err.to_string()),
    };
    if file.is_empty() {
        return Head::Empty;
    }
    match file.record_at(0) {
        Ok(first) if first.is_clear_book() => Head::Ok(first.timestamp),
        Ok(first) => Head::Fail(first.timestamp, first.command),
        Err(err) => Head::Error(err.to_string()),
    }
}

/// Collects `*.depth` files under `root` (recursively) whose name contains
/// `filter`, skipping `-SYNC` outputs.
fn depth_files(root: &Path, filter: &str) -> Result<Vec<PathBuf>> {
    let sync_marker = SYNC_SUFFIX.to_ascii_uppercase();
    let mut pending = vec![root.to_path_buf()];
    let mut files = Vec::new();

    while let Some(dir) = pending.pop() {
        let entries =
            fs::read_dir(&dir).with_context(|| format!("Failed to list {}", dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let is_depth = path.extension().is_some_and(|e| e == DEPTH_EXTENSION);
            if is_depth && name.contains(filter) && !name.to_ascii_uppercase().contains(&sync_marker)
            {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Checks that every depth file starts with a clear-book record.
pub(crate) fn audit_depth_head(config: &SyncConfig, filter: &str) -> Result<ExitCode> {
    let root = &config.depth_root;
    let files = depth_files(root, filter)?;
    if files.is_empty() {
        println!(
            "No depth files matching {filter:?} under {} (excluding {SYNC_SUFFIX}).",
            root.display()
        );
        return Ok(ExitCode::FAILURE);
    }

    let (mut ok, mut fail, mut empty, mut errors) = (0usize, 0usize, 0usize, 0usize);
    for path in &files {
        let name = path.file_name().map_or_else(
            || path.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        );
        match inspect(path) {
            Head::Ok(ts) => {
                println!("[OK]    {name}  first={} UTC", format_ms(ts));
                ok += 1;
            }
            Head::Fail(ts, command) => {
                println!("[FAIL]  {name}  first={} UTC  first.cmd={command}", format_ms(ts));
                fail += 1;
            }
            Head::Empty => {
                println!("[EMPTY] {name}");
                empty += 1;
            }
            Head::Error(err) => {
                println!("[ERROR] {name}  ({err})");
                errors += 1;
            }
        }
    }

    println!(
        "\nScanned {} files under {} (excluding {SYNC_SUFFIX})",
        files.len(),
        root.display()
    );
    println!("OK={ok}  FAIL={fail}  EMPTY={empty}  ERRORS={errors}");
    Ok(ExitCode::SUCCESS)
}
