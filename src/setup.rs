// SPDX-FileCopyrightText: 2024 Gabriel Marcano
//
// SPDX-License-Identifier: BSD-3-Clause

//! One-time preparation of a reference checkout for a BSP.
//!
//! Setup validates the checkout, synchronizes the nested dependency checkout, applies the BSP's
//! patch set and finally runs the vendor environment script as root.

use std::env;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{Error, Result};
use crate::patch::apply_patches;
use crate::runner::{Invocation, Runner, Toolchain};
use crate::target::Bsp;

/// Environment variable naming the STDK reference checkout.
pub const REF_PATH_VAR: &str = "STDK_REF_PATH";

/// Resolves the reference root from the value of [REF_PATH_VAR].
///
/// # Errors
///
/// [Error::MissingConfiguration] if the value is absent or empty.
pub fn reference_root(value: Option<OsString>) -> Result<PathBuf> {
    match value {
        Some(value) if !value.is_empty() => Ok(PathBuf::from(value)),
        _ => Err(Error::MissingConfiguration(REF_PATH_VAR)),
    }
}

/// Reads the reference root from the process environment.
pub fn reference_root_from_env() -> Result<PathBuf> {
    reference_root(env::var_os(REF_PATH_VAR))
}

/// Whether the BSP is a git submodule of the reference checkout.
///
/// Any failure, including git itself being unavailable, means the tree is treated as plain
/// files.
pub fn is_versioned(bsp: &Bsp, toolchain: &Toolchain, runner: &mut impl Runner) -> bool {
    let invocation = Invocation::new(&toolchain.git)
        .arg("-C")
        .arg(bsp.root())
        .args(["submodule", "status"])
        .arg(bsp.submodule_path())
        .quiet();
    match runner.run(&invocation) {
        Ok(status) => status.success(),
        Err(err) => {
            debug!("{invocation} could not run: {err}");
            false
        }
    }
}

/// Initializes the submodules of `checkout` recursively and hard-resets each of them.
///
/// # Errors
///
/// Whatever [Runner::run_checked] reports for either git command.
pub fn sync_submodules(
    checkout: &Path,
    toolchain: &Toolchain,
    runner: &mut impl Runner,
) -> Result<()> {
    info!("Synchronizing submodules of {}", checkout.display());
    runner.run_checked(
        &Invocation::new(&toolchain.git)
            .args(["submodule", "update", "--init", "--recursive"])
            .current_dir(checkout),
    )?;
    runner.run_checked(
        &Invocation::new(&toolchain.git)
            .args(["submodule", "foreach", "--recursive", "git", "reset", "--hard"])
            .current_dir(checkout),
    )
}

/// Runs the vendor environment setup script with elevated privileges.
///
/// # Errors
///
/// [Error::ElevationUnavailable] if the elevation tool cannot be started for lack of permission
/// or because it is not installed, otherwise whatever [Runner::run_checked] reports.
pub fn run_env_setup(
    script: &Path,
    toolchain: &Toolchain,
    runner: &mut impl Runner,
) -> Result<()> {
    let invocation = Invocation::new(&toolchain.sudo)
        .arg(&toolchain.shell)
        .arg(script);
    match runner.run_checked(&invocation) {
        Err(Error::Spawn { source, .. })
            if matches!(
                source.kind(),
                io::ErrorKind::PermissionDenied | io::ErrorKind::NotFound
            ) =>
        {
            Err(Error::ElevationUnavailable(script.to_path_buf()))
        }
        result => result,
    }
}

/// Prepares `bsp_name` inside the reference checkout at `root`.
///
/// # Errors
///
/// [Error::InvalidName] for a bad BSP name, [Error::PathNotFound] if the BSP, the dependency
/// checkout or the environment script is missing, [Error::PatchApplicationFailure] if a patch
/// does not apply, and any failure of the external tools involved.
pub fn setup(
    root: &Path,
    bsp_name: &str,
    toolchain: &Toolchain,
    runner: &mut impl Runner,
) -> Result<()> {
    let bsp = Bsp::new(root, bsp_name)?;

    for path in [bsp.bsp_dir(), bsp.core_dependency_dir()] {
        if !path.exists() {
            return Err(Error::PathNotFound(path));
        }
    }

    let versioned = is_versioned(&bsp, toolchain, runner);
    info!(
        "{} is {}",
        bsp.submodule_path(),
        if versioned {
            "a git submodule"
        } else {
            "not under version control"
        }
    );

    sync_submodules(&bsp.core_dependency_dir(), toolchain, runner)?;

    apply_patches(&bsp.bsp_dir(), &bsp.patch_dir(), versioned, toolchain, runner)?;

    let script = bsp.env_setup_script();
    if !script.is_file() {
        return Err(Error::PathNotFound(script));
    }
    run_env_setup(&script, toolchain, runner)?;

    info!("Setup of {} complete", bsp.name());
    Ok(())
}
