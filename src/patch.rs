// SPDX-FileCopyrightText: 2024 Gabriel Marcano
//
// SPDX-License-Identifier: BSD-3-Clause

//! Application of a directory of unified diffs to a BSP source tree.

use std::fs;
use std::path::{self, Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};

use crate::error::{Error, Result};
use crate::runner::{Invocation, Runner, Toolchain};

/// File extension of the patches picked up from a patch directory.
pub const PATCH_EXTENSION: &str = "patch";

/// Lists the patch files in `patch_dir`, sorted by file name.
///
/// Application order matters, so directory enumeration order is never relied upon.
///
/// # Errors
///
/// Any I/O error raised while reading the directory.
pub fn discover_patches(patch_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut patches = vec![];
    for entry in fs::read_dir(patch_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == PATCH_EXTENSION) && path.is_file() {
            patches.push(path);
        }
    }
    patches.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(patches)
}

/// Command that applies one patch to `target_dir`.
///
/// Version-controlled trees use `git apply`; anything else gets the patch file piped into
/// `patch -f -p1`.
pub fn patch_invocation(
    toolchain: &Toolchain,
    target_dir: &Path,
    patch: &Path,
    is_versioned: bool,
) -> Invocation {
    let invocation = if is_versioned {
        Invocation::new(&toolchain.git).arg("apply").arg(patch)
    } else {
        Invocation::new(&toolchain.patch)
            .args(["-f", "-p1"])
            .stdin_file(patch)
    };
    invocation.current_dir(target_dir)
}

/// Applies every patch in `patch_dir` to `target_dir`, returning how many were applied.
///
/// Relative directories are resolved against the current directory before any patch runs. A
/// missing patch directory, or one without patches, is not an error. Application stops at the
/// first patch that fails; patches applied before it stay applied.
///
/// # Errors
///
/// [Error::PatchApplicationFailure] for the first patch that could not be applied, or an I/O
/// error while listing the directory.
pub fn apply_patches(
    target_dir: &Path,
    patch_dir: &Path,
    is_versioned: bool,
    toolchain: &Toolchain,
    runner: &mut impl Runner,
) -> Result<usize> {
    let target_dir = path::absolute(target_dir)?;
    let patch_dir = path::absolute(patch_dir)?;
    info!("Applying patches to: {}", target_dir.display());

    if !patch_dir.is_dir() {
        warn!("Patch directory not found {}", patch_dir.display());
        return Ok(0);
    }

    let patches = discover_patches(&patch_dir)?;
    if patches.is_empty() {
        info!("No valid patch files in {}", patch_dir.display());
        return Ok(0);
    }

    let progress_bar = ProgressBar::new(patches.len() as u64);
    progress_bar.set_style(
        ProgressStyle::with_template("{bar:^20.red/white.bold} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    for patch in &patches {
        let name = patch
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!("Processing patch: {name}");
        progress_bar.set_message(name);

        let invocation = patch_invocation(toolchain, &target_dir, patch, is_versioned);
        let failure = match runner.run(&invocation) {
            Ok(status) if status.success() => None,
            Ok(status) => {
                error!("{invocation} exited with {status}");
                Some(status.code())
            }
            Err(err) => {
                error!("Unable to run {invocation}: {err}");
                Some(None)
            }
        };
        if let Some(code) = failure {
            progress_bar.abandon();
            return Err(Error::PatchApplicationFailure {
                patch: patch.clone(),
                code,
            });
        }
        progress_bar.inc(1);
    }

    progress_bar.finish_and_clear();
    info!("Applied {} patches", patches.len());
    Ok(patches.len())
}
