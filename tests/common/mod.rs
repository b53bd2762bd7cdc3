// SPDX-FileCopyrightText: 2024 Gabriel Marcano
//
// SPDX-License-Identifier: BSD-3-Clause

#![allow(dead_code)]

use std::ffi::OsStr;
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

use bsp_tools::{Invocation, Runner};

pub fn exit(code: i32) -> ExitStatus {
    ExitStatus::from_raw(code << 8)
}

type Responder = Box<dyn FnMut(&Invocation) -> io::Result<ExitStatus>>;

/// Records every invocation instead of starting a process.
pub struct RecordingRunner {
    pub calls: Vec<Invocation>,
    respond: Responder,
}

impl RecordingRunner {
    /// Every command succeeds.
    pub fn succeeding() -> Self {
        Self::with(|_| Ok(exit(0)))
    }

    pub fn with(respond: impl FnMut(&Invocation) -> io::Result<ExitStatus> + 'static) -> Self {
        Self {
            calls: vec![],
            respond: Box::new(respond),
        }
    }

    pub fn programs(&self) -> Vec<String> {
        self.calls.iter().map(Invocation::tool).collect()
    }
}

impl Runner for RecordingRunner {
    fn run(&mut self, invocation: &Invocation) -> io::Result<ExitStatus> {
        self.calls.push(invocation.clone());
        (self.respond)(invocation)
    }
}

pub fn args_of(invocation: &Invocation) -> Vec<String> {
    invocation
        .args
        .iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}

pub fn has_arg(invocation: &Invocation, arg: &str) -> bool {
    invocation.args.iter().any(|a| a == OsStr::new(arg))
}

/// `path` spelled relative to the current directory, without changing it.
pub fn relative_to_cwd(path: &std::path::Path) -> std::path::PathBuf {
    let cwd = std::env::current_dir().unwrap();
    let mut relative = std::path::PathBuf::new();
    for _ in cwd.components().skip(1) {
        relative.push("..");
    }
    relative.join(path.strip_prefix("/").unwrap())
}

/// Whether this process runs as root, which bypasses device permission checks.
pub fn is_root() -> bool {
    nix::unistd::geteuid().is_root()
}
