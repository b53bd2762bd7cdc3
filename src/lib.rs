// SPDX-FileCopyrightText: 2024 Gabriel Marcano
//
// SPDX-License-Identifier: BSD-3-Clause

//! This crate contains the orchestration core for building, flashing and preparing BK7236 board
//! support packages of an STDK reference checkout. It does not implement any of the tools it
//! drives: the build tool, `bk_loader`, the serial monitor, git, patch and the vendor environment
//! script are all run as external programs through a [Runner].
//!
//! A binary companion crate exposes the `build` and `setup` workflows on the command line.

pub mod device;
pub mod dispatch;
pub mod error;
pub mod patch;
pub mod runner;
pub mod setup;
pub mod target;

pub use dispatch::{dispatch, Action};
pub use error::{Error, Result};
pub use patch::apply_patches;
pub use runner::{Invocation, Runner, SystemRunner, Toolchain};
pub use setup::setup;
pub use target::{Bsp, Project};
