// SPDX-FileCopyrightText: 2024 Gabriel Marcano
//
// SPDX-License-Identifier: BSD-3-Clause

//! Directory layout of a board support package inside an STDK reference checkout.
//!
//! ```text
//! <root>/bsp/<bsp>/                    source tree, build tool entry point
//! <root>/bsp/<bsp>/build/<title>/      build output
//! <root>/tools/<bsp>/                  bk_loader and monitor.py
//! <root>/patches/<bsp>/*.patch         patch set applied during setup
//! ```

use std::ffi::OsString;
use std::path::{self, Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Name of the flashing tool binary inside the tool directory.
pub const LOADER: &str = "bk_loader";
/// Name of the serial monitor script inside the tool directory.
pub const MONITOR_SCRIPT: &str = "monitor.py";
/// Image produced by a successful build, relative to `<build_dir>/<bsp>`.
pub const ARTIFACT: &str = "all-app.bin";

fn check_name(kind: &'static str, name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(Error::InvalidName {
            kind,
            name: name.to_string(),
        }),
    }
}

/// A board support package, identified by its name under a reference root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bsp {
    root: PathBuf,
    name: String,
}

impl Bsp {
    /// # Errors
    ///
    /// [Error::InvalidName] if `name` is empty or is not a single path component.
    ///
    /// A relative `root` is resolved against the current directory, since commands run with
    /// other working directories.
    pub fn new(root: impl Into<PathBuf>, name: &str) -> Result<Self> {
        check_name("BSP", name)?;
        Ok(Self {
            root: path::absolute(root.into())?,
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bsp_dir(&self) -> PathBuf {
        self.root.join("bsp").join(&self.name)
    }

    pub fn tool_dir(&self) -> PathBuf {
        self.root.join("tools").join(&self.name)
    }

    pub fn loader(&self) -> PathBuf {
        self.tool_dir().join(LOADER)
    }

    pub fn monitor_script(&self) -> PathBuf {
        self.tool_dir().join(MONITOR_SCRIPT)
    }

    pub fn patch_dir(&self) -> PathBuf {
        self.root.join("patches").join(&self.name)
    }

    /// Path of the BSP as seen by `git submodule status` run from the root.
    pub fn submodule_path(&self) -> String {
        format!("bsp/{}", self.name)
    }

    /// Shell script that installs the vendor toolchain, run with elevated privileges.
    pub fn env_setup_script(&self) -> PathBuf {
        self.bsp_dir().join("tools/env_tools/setup/armino_env_setup.sh")
    }

    /// Nested dependency checkout whose own submodules are synchronized during setup.
    pub fn core_dependency_dir(&self) -> PathBuf {
        self.root.join("iot-core/src/deps/libsodium/libsodium")
    }
}

/// An application built against a BSP. Immutable for one invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Project {
    bsp: Bsp,
    title: String,
}

impl Project {
    /// # Errors
    ///
    /// [Error::InvalidName] if either the BSP name or the title is not a single path component.
    pub fn new(root: impl Into<PathBuf>, bsp_name: &str, title: &str) -> Result<Self> {
        let bsp = Bsp::new(root, bsp_name)?;
        check_name("project", title)?;
        Ok(Self {
            bsp,
            title: title.to_string(),
        })
    }

    pub fn bsp(&self) -> &Bsp {
        &self.bsp
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn build_dir(&self) -> PathBuf {
        self.bsp.bsp_dir().join("build").join(&self.title)
    }

    pub fn artifact(&self) -> PathBuf {
        self.build_dir().join(self.bsp.name()).join(ARTIFACT)
    }

    /// `PROJECT=` override handed to the build tool, relative to the BSP directory.
    pub fn project_arg(&self) -> OsString {
        let mut arg = OsString::from("PROJECT=../../../");
        arg.push(Path::new("apps").join(self.bsp.name()).join(&self.title));
        arg
    }
}
