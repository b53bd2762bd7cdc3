// SPDX-FileCopyrightText: 2024 Gabriel Marcano
//
// SPDX-License-Identifier: BSD-3-Clause

//! Serial device checks performed before any flashing tool is started.

use std::fs;
use std::io;
use std::os::unix::fs::FileTypeExt;
use std::path::Path;

use log::debug;
use nix::errno::Errno;
use nix::unistd::{access, AccessFlags};

use crate::error::{Error, Result};

/// Checks that `device` exists, is a character device, and is readable and writable by this
/// process.
///
/// # Errors
///
/// [Error::DeviceNotFound], [Error::NotACharacterDevice] or [Error::PermissionDenied], in that
/// order of precedence.
pub fn validate_device(device: &Path) -> Result<()> {
    let metadata = match fs::metadata(device) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(Error::DeviceNotFound(device.to_path_buf()));
        }
        Err(err) => return Err(err.into()),
    };

    if !metadata.file_type().is_char_device() {
        return Err(Error::NotACharacterDevice(device.to_path_buf()));
    }

    match access(device, AccessFlags::R_OK | AccessFlags::W_OK) {
        Ok(()) => {
            debug!("{} is usable", device.display());
            Ok(())
        }
        Err(Errno::EACCES | Errno::EPERM | Errno::EROFS) => {
            Err(Error::PermissionDenied(device.to_path_buf()))
        }
        Err(errno) => Err(io::Error::from(errno).into()),
    }
}

/// Extracts the port number the flashing tool expects from a device path, the run of decimal
/// digits at its very end: `/dev/ttyUSB12` is port 12.
///
/// # Errors
///
/// [Error::InvalidPortIndex] if the path does not end in a digit or the number does not fit.
pub fn port_index(device: &Path) -> Result<u32> {
    let path = device.to_string_lossy();
    let digits = path
        .bytes()
        .rev()
        .take_while(u8::is_ascii_digit)
        .count();
    let suffix = &path[path.len() - digits..];
    if suffix.is_empty() {
        return Err(Error::InvalidPortIndex(path.into_owned()));
    }
    suffix
        .parse()
        .map_err(|_| Error::InvalidPortIndex(path.into_owned()))
}

/// Names of the serial ports currently known to the system, for error hints.
pub fn available_devices() -> impl Iterator<Item = String> {
    serialport::available_ports()
        .unwrap_or_default()
        .into_iter()
        .map(|port| port.port_name)
}
