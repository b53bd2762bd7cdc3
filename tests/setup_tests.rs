// SPDX-FileCopyrightText: 2024 Gabriel Marcano
//
// SPDX-License-Identifier: BSD-3-Clause

mod common;

use std::fs;
use std::io;

use bsp_tools::{setup, Bsp, Error, Toolchain};
use common::{args_of, exit, has_arg, RecordingRunner};
use tempfile::TempDir;

const BSP: &str = "bk7236";

/// Reference checkout with the BSP, the dependency checkout, two patches and the env script.
fn reference() -> (TempDir, Bsp) {
    let root = tempfile::tempdir().expect("Failed to create temp dir");
    let bsp = Bsp::new(root.path(), BSP).unwrap();
    fs::create_dir_all(bsp.bsp_dir()).unwrap();
    fs::create_dir_all(bsp.core_dependency_dir()).unwrap();
    fs::create_dir_all(bsp.patch_dir()).unwrap();
    fs::write(bsp.patch_dir().join("0001-a.patch"), b"").unwrap();
    fs::write(bsp.patch_dir().join("0002-b.patch"), b"").unwrap();
    let script = bsp.env_setup_script();
    fs::create_dir_all(script.parent().unwrap()).unwrap();
    fs::write(&script, b"#!/bin/bash\n").unwrap();
    (root, bsp)
}

#[test]
fn missing_bsp_dir() {
    let (root, bsp) = reference();
    fs::remove_dir_all(bsp.bsp_dir()).unwrap();
    let mut runner = RecordingRunner::succeeding();

    let err = setup(root.path(), BSP, &Toolchain::default(), &mut runner).unwrap_err();

    assert!(matches!(err, Error::PathNotFound(path) if path == bsp.bsp_dir()));
    assert!(runner.calls.is_empty());
}

#[test]
fn missing_dependency_checkout() {
    let (root, bsp) = reference();
    fs::remove_dir_all(bsp.core_dependency_dir()).unwrap();
    let mut runner = RecordingRunner::succeeding();

    let err = setup(root.path(), BSP, &Toolchain::default(), &mut runner).unwrap_err();

    assert!(matches!(err, Error::PathNotFound(path) if path == bsp.core_dependency_dir()));
    assert!(runner.calls.is_empty());
}

#[test]
fn versioned_setup_sequence() {
    let (root, bsp) = reference();
    let mut runner = RecordingRunner::succeeding();

    setup(root.path(), BSP, &Toolchain::default(), &mut runner).unwrap();

    assert_eq!(
        runner.programs(),
        ["git", "git", "git", "git", "git", "sudo"]
    );

    let status = &runner.calls[0];
    assert!(status.quiet);
    assert_eq!(
        args_of(status),
        [
            "-C".to_string(),
            root.path().to_string_lossy().into_owned(),
            "submodule".to_string(),
            "status".to_string(),
            "bsp/bk7236".to_string(),
        ]
    );

    let update = &runner.calls[1];
    assert_eq!(args_of(update), ["submodule", "update", "--init", "--recursive"]);
    assert_eq!(update.cwd, Some(bsp.core_dependency_dir()));
    let reset = &runner.calls[2];
    assert_eq!(
        args_of(reset),
        ["submodule", "foreach", "--recursive", "git", "reset", "--hard"]
    );

    for apply in &runner.calls[3..5] {
        assert!(has_arg(apply, "apply"));
        assert_eq!(apply.cwd, Some(bsp.bsp_dir()));
    }

    let env_setup = &runner.calls[5];
    assert_eq!(
        args_of(env_setup),
        [
            "bash".to_string(),
            bsp.env_setup_script().to_string_lossy().into_owned(),
        ]
    );
}

#[test]
fn plain_tree_uses_patch_utility() {
    let (root, _bsp) = reference();
    let mut runner = RecordingRunner::with(|call| {
        if call.quiet {
            // Not a submodule
            Ok(exit(128))
        } else {
            Ok(exit(0))
        }
    });

    setup(root.path(), BSP, &Toolchain::default(), &mut runner).unwrap();

    assert_eq!(
        runner.programs(),
        ["git", "git", "git", "patch", "patch", "sudo"]
    );
    assert!(runner.calls[3].stdin.is_some());
}

#[test]
fn git_unavailable_means_plain_tree() {
    let (root, _bsp) = reference();
    let mut runner = RecordingRunner::with(|call| {
        if call.quiet {
            Err(io::Error::new(io::ErrorKind::NotFound, "no git"))
        } else {
            Ok(exit(0))
        }
    });

    setup(root.path(), BSP, &Toolchain::default(), &mut runner).unwrap();

    assert!(runner.programs().contains(&"patch".to_string()));
}

#[test]
fn submodule_sync_failure_stops_setup() {
    let (root, _bsp) = reference();
    let mut runner = RecordingRunner::with(|call| {
        if has_arg(call, "update") {
            Ok(exit(1))
        } else {
            Ok(exit(0))
        }
    });

    let err = setup(root.path(), BSP, &Toolchain::default(), &mut runner).unwrap_err();

    assert!(matches!(err, Error::ExternalToolFailure { code: 1, .. }));
    assert_eq!(runner.calls.len(), 2);
}

#[test]
fn patch_failure_skips_env_setup() {
    let (root, _bsp) = reference();
    let mut runner = RecordingRunner::with(|call| {
        if has_arg(call, "apply") {
            Ok(exit(1))
        } else {
            Ok(exit(0))
        }
    });

    let err = setup(root.path(), BSP, &Toolchain::default(), &mut runner).unwrap_err();

    assert!(matches!(err, Error::PatchApplicationFailure { .. }));
    assert!(!runner.programs().contains(&"sudo".to_string()));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn missing_env_script() {
    let (root, bsp) = reference();
    fs::remove_file(bsp.env_setup_script()).unwrap();
    let mut runner = RecordingRunner::succeeding();

    let err = setup(root.path(), BSP, &Toolchain::default(), &mut runner).unwrap_err();

    assert!(matches!(err, Error::PathNotFound(path) if path == bsp.env_setup_script()));
    assert!(!runner.programs().contains(&"sudo".to_string()));
}

#[test]
fn elevation_unavailable() {
    let (root, bsp) = reference();
    let mut runner = RecordingRunner::with(|call| {
        if call.program == "sudo" {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "not allowed"))
        } else {
            Ok(exit(0))
        }
    });

    let err = setup(root.path(), BSP, &Toolchain::default(), &mut runner).unwrap_err();

    assert!(matches!(err, Error::ElevationUnavailable(ref path) if *path == bsp.env_setup_script()));
    assert!(!err.hints().is_empty());
}

#[test]
fn env_script_failure_propagates_code() {
    let (root, _bsp) = reference();
    let mut runner = RecordingRunner::with(|call| {
        if call.program == "sudo" {
            Ok(exit(3))
        } else {
            Ok(exit(0))
        }
    });

    let err = setup(root.path(), BSP, &Toolchain::default(), &mut runner).unwrap_err();

    assert_eq!(err.exit_code(), 3);
}

#[test]
fn invalid_bsp_name() {
    let (root, _bsp) = reference();
    let mut runner = RecordingRunner::succeeding();

    let err = setup(root.path(), "../bk7236", &Toolchain::default(), &mut runner).unwrap_err();

    assert!(matches!(err, Error::InvalidName { .. }));
}
