// SPDX-FileCopyrightText: 2024 Gabriel Marcano
//
// SPDX-License-Identifier: BSD-3-Clause

//! Invocation of external tools.
//!
//! Every command carries its own working directory, so the process working directory is never
//! changed while dispatching actions or applying patches.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use log::debug;

use crate::error::{Error, Result};

/// A single external command line, ready to be run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
    /// File fed to the child's standard input.
    pub stdin: Option<PathBuf>,
    /// Discard the child's standard output and error.
    pub quiet: bool,
}

impl Invocation {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: vec![],
            cwd: None,
            stdin: None,
            quiet: false,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_os_string()));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn stdin_file(mut self, file: impl AsRef<Path>) -> Self {
        self.stdin = Some(file.as_ref().to_path_buf());
        self
    }

    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Short name of the program, used in error messages.
    pub fn tool(&self) -> String {
        Path::new(&self.program)
            .file_name()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
            .into_owned()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        if let Some(stdin) = &self.stdin {
            write!(f, " < {}", stdin.display())?;
        }
        Ok(())
    }
}

/// Something that can run an [Invocation] to completion.
///
/// Implementations block until the child exits. The default implementation is [SystemRunner];
/// tests substitute their own to observe which commands would have run.
pub trait Runner {
    /// Runs the command and returns its exit status.
    ///
    /// # Errors
    ///
    /// Any I/O error raised while starting the child or opening its standard input.
    fn run(&mut self, invocation: &Invocation) -> io::Result<ExitStatus>;

    /// Runs the command, mapping a non-zero exit to [Error::ExternalToolFailure] and a failure
    /// to start it to [Error::Spawn].
    fn run_checked(&mut self, invocation: &Invocation) -> Result<()> {
        let status = self.run(invocation).map_err(|source| Error::Spawn {
            program: invocation.tool(),
            source,
        })?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::ExternalToolFailure {
                tool: invocation.tool(),
                // Killed by a signal, no code to propagate
                code: status.code().unwrap_or(1),
            })
        }
    }
}

/// Runs commands as real child processes.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> io::Result<ExitStatus> {
        debug!("Running: {invocation}");
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        if let Some(cwd) = &invocation.cwd {
            debug!("  in {}", cwd.display());
            command.current_dir(cwd);
        }
        if let Some(stdin) = &invocation.stdin {
            command.stdin(File::open(stdin)?);
        }
        if invocation.quiet {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }
        command.status()
    }
}

/// Program names of the external tools the orchestration relies on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toolchain {
    pub make: OsString,
    pub git: OsString,
    pub patch: OsString,
    pub sudo: OsString,
    pub shell: OsString,
    pub python: OsString,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            make: "make".into(),
            git: "git".into(),
            patch: "patch".into(),
            sudo: "sudo".into(),
            shell: "bash".into(),
            python: "python3".into(),
        }
    }
}
