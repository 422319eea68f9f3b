//! Post-download purge: resolution and boring-background enforcement.
//!
//! Each violating file is blacklisted first and deleted second. A crash
//! between the two steps leaves the skip-list already correct; the file may
//! linger, but it will not be re-downloaded.

use std::path::{Path, PathBuf};

use crate::analysis::is_boring_background;
use crate::config::PurgeConfig;
use crate::error::Result;
use crate::skiplist::{SkipList, SkipReason};

/// Lists regular files in `dir`, skipping subdirectories and dot-prefixed
/// names (the skip-list store itself lives in the folder as a dotfile).
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn visible_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        files.push(entry.path());
    }
    files.sort();
    Ok(files)
}

/// Removes images narrower than `config.min_width` from `dir`, recording
/// each in the skip-list first.
///
/// Only the image header is decoded, enough to read the pixel width. A file
/// that fails to decode is logged and left in place — decode failure is not
/// evidence of being too small. The width boundary is inclusive: width equal
/// to the minimum is kept. Returns the number of purged files.
///
/// # Errors
///
/// Returns an error if the directory cannot be scanned or a skip-list write
/// fails; both are fatal to the purge pass.
pub fn purge_small_images(
    dir: &Path,
    skip_list: &mut SkipList,
    config: &PurgeConfig,
) -> Result<usize> {
    let mut purged = 0;
    for path in visible_files(dir)? {
        match image::image_dimensions(&path) {
            Ok((width, _)) => {
                if width < config.min_width {
                    blacklist_then_delete(&path, skip_list, SkipReason::TooSmall)?;
                    log::info!(
                        "Removed {}: too small ({width}px < {}px)",
                        path.display(),
                        config.min_width
                    );
                    purged += 1;
                }
            }
            Err(e) => log::warn!("Error processing {}: {e}", path.display()),
        }
    }
    Ok(purged)
}

/// Removes images whose border is predominantly white or black, recording
/// each in the skip-list first. Returns the number of purged files.
///
/// Decode failures are logged and the file kept, same as the width pass.
///
/// # Errors
///
/// Returns an error if the directory cannot be scanned or a skip-list write
/// fails.
pub fn purge_boring_images(
    dir: &Path,
    skip_list: &mut SkipList,
    config: &PurgeConfig,
) -> Result<usize> {
    let mut purged = 0;
    for path in visible_files(dir)? {
        match is_boring_background(&path, config.boring_threshold) {
            Ok(true) => {
                blacklist_then_delete(&path, skip_list, SkipReason::BoringBackground)?;
                log::info!("Removed {}: boring background", path.display());
                purged += 1;
            }
            Ok(false) => {}
            Err(e) => log::warn!("Error analyzing {}: {e}", path.display()),
        }
    }
    Ok(purged)
}

/// Blacklists `path` under `reason`, then unlinks it — strictly in that
/// order. A failed unlink is logged, not escalated: the store is already
/// correct and the lingering file will never be re-downloaded.
fn blacklist_then_delete(path: &Path, skip_list: &mut SkipList, reason: SkipReason) -> Result<()> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    skip_list.add(&filename, reason)?;
    if let Err(e) = std::fs::remove_file(path) {
        log::warn!("Failed to remove {}: {e}", path.display());
    }
    Ok(())
}
