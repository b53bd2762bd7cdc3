// SPDX-FileCopyrightText: 2024 Gabriel Marcano
//
// SPDX-License-Identifier: BSD-3-Clause

//! Day-to-day actions on a project: build, clean, erase, flash and monitor.

use std::fmt;
use std::fs;
use std::io;
use std::path::{self, Path, PathBuf};

use log::{info, warn};

use crate::device::{port_index, validate_device};
use crate::error::{Error, Result};
use crate::runner::{Invocation, Runner, Toolchain};
use crate::target::Project;

/// One of the actions the dispatcher knows how to perform.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Compile the project with the build tool.
    Build,
    /// Remove the project's build output.
    Clean,
    /// Erase the flash of the device on the given serial port.
    Erase,
    /// Download the built image to the device.
    Flash,
    /// Attach the serial monitor to the device.
    Monitor,
}

impl Action {
    /// Parses an action name as given on the command line. A missing or unknown name selects
    /// [Action::Build].
    pub fn parse(name: Option<&str>) -> Self {
        match name {
            None => Self::Build,
            Some("clean") => Self::Clean,
            Some("erase_flash") => Self::Erase,
            Some("flash") => Self::Flash,
            Some("monitor") => Self::Monitor,
            Some(other) => {
                warn!("Unknown action '{other}', building instead");
                Self::Build
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Clean => "clean",
            Self::Erase => "erase_flash",
            Self::Flash => "flash",
            Self::Monitor => "monitor",
        }
    }

    /// Whether the action talks to a serial device.
    pub fn needs_device(self) -> bool {
        matches!(self, Self::Erase | Self::Flash | Self::Monitor)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Performs `action` on `project`.
///
/// All preconditions are checked before anything is run or removed. For [Action::Flash] the
/// image is checked before the device.
///
/// # Errors
///
/// Validation errors from [validate_device] and [port_index], [Error::DeviceRequired] if a device
/// action has no device, [Error::ArtifactMissing] if there is nothing to flash, and whatever
/// [Runner::run_checked] reports for the external tool.
pub fn dispatch(
    project: &Project,
    action: Action,
    device: Option<&Path>,
    toolchain: &Toolchain,
    runner: &mut impl Runner,
) -> Result<()> {
    let bsp = project.bsp();
    info!("{} {} ({})", action, project.title(), bsp.name());

    let invocation = match action {
        Action::Build => Invocation::new(&toolchain.make)
            .arg(bsp.name())
            .arg(project.project_arg())
            .current_dir(bsp.bsp_dir()),
        Action::Clean => return clean(&project.build_dir()),
        Action::Erase => {
            let device = require_device(action, device)?;
            validate_device(&device)?;
            let port = port_index(&device)?;
            Invocation::new(bsp.loader())
                .args(["erase", "-p", &port.to_string(), "-c"])
                .current_dir(bsp.tool_dir())
        }
        Action::Flash => {
            let artifact = project.artifact();
            if !artifact.is_file() {
                return Err(Error::ArtifactMissing(artifact));
            }
            let device = require_device(action, device)?;
            validate_device(&device)?;
            let port = port_index(&device)?;
            Invocation::new(bsp.loader())
                .args(["download", "-p", &port.to_string(), "-i"])
                .arg(&artifact)
                .current_dir(bsp.tool_dir())
        }
        Action::Monitor => {
            let device = require_device(action, device)?;
            validate_device(&device)?;
            Invocation::new(&toolchain.python)
                .arg(bsp.monitor_script())
                .arg(&device)
                .current_dir(bsp.bsp_dir())
        }
    };

    runner.run_checked(&invocation)
}

fn require_device(action: Action, device: Option<&Path>) -> Result<PathBuf> {
    let device = device.ok_or(Error::DeviceRequired(action.name()))?;
    Ok(path::absolute(device)?)
}

fn clean(build_dir: &Path) -> Result<()> {
    match fs::remove_dir_all(build_dir) {
        Ok(()) => {
            info!("Removed {}", build_dir.display());
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            info!("Nothing to clean at {}", build_dir.display());
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
