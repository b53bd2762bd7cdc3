// SPDX-FileCopyrightText: 2024 Gabriel Marcano
//
// SPDX-License-Identifier: BSD-3-Clause

//! Errors raised while validating inputs and driving external tools.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can be emitted by the dispatcher, patch applier and setup routines.
///
/// Everything except [Error::ExternalToolFailure] is detected locally and maps to exit status 1.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0} environment variable not set")]
    MissingConfiguration(&'static str),

    #[error("Invalid {kind} name [{name}]")]
    InvalidName { kind: &'static str, name: String },

    #[error("Path not found [{}]", .0.display())]
    PathNotFound(PathBuf),

    #[error("No serial device specified for '{0}'")]
    DeviceRequired(&'static str),

    #[error("Serial device not found [{}]", .0.display())]
    DeviceNotFound(PathBuf),

    #[error("Not a character device [{}]", .0.display())]
    NotACharacterDevice(PathBuf),

    #[error("Missing read/write permissions for [{}]", .0.display())]
    PermissionDenied(PathBuf),

    #[error("No port number at the end of device path [{0}]")]
    InvalidPortIndex(String),

    #[error("Firmware file not found [{}]", .0.display())]
    ArtifactMissing(PathBuf),

    #[error("Root privileges required to run [{}]", .0.display())]
    ElevationUnavailable(PathBuf),

    #[error("Command '{tool}' failed with code {code}")]
    ExternalToolFailure { tool: String, code: i32 },

    #[error("Patch application failed [{}]", .patch.display())]
    PatchApplicationFailure { patch: PathBuf, code: Option<i32> },

    #[error("Unable to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// The status the process should exit with for this error.
    ///
    /// Failures of an external tool propagate the tool's own exit code, all other errors use 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ExternalToolFailure { code, .. } => *code,
            _ => 1,
        }
    }

    /// Remediation lines to show the user alongside the error itself.
    pub fn hints(&self) -> Vec<String> {
        match self {
            Self::DeviceNotFound(_) => {
                let mut hints = vec!["Available devices:".to_string()];
                hints.extend(crate::device::available_devices().map(|port| format!("   {port}")));
                hints
            }
            Self::PermissionDenied(device) => {
                let user = std::env::var("USER").unwrap_or_else(|_| "$USER".to_string());
                vec![
                    "Try these solutions:".to_string(),
                    "1. Temporary solution (valid until reboot):".to_string(),
                    format!("   sudo chmod 666 {}", device.display()),
                    "2. Permanent solution:".to_string(),
                    format!("   sudo usermod -aG dialout {user}"),
                    "   Requires re-login to take effect".to_string(),
                ]
            }
            Self::ArtifactMissing(_) => vec!["Please compile the project first".to_string()],
            Self::ElevationUnavailable(_) => vec![
                "Configure passwordless sudo or execute the script manually".to_string(),
            ],
            Self::MissingConfiguration(var) => {
                vec![format!("Export {var} pointing at the STDK reference checkout")]
            }
            _ => vec![],
        }
    }
}
