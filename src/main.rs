// SPDX-FileCopyrightText: 2024 Gabriel Marcano
//
// SPDX-License-Identifier: BSD-3-Clause

//! # bsp-tools
//!
//! This CLI builds, flashes and monitors STDK applications for a BSP, and prepares a reference
//! checkout for that BSP.
//!
//! Commands supported: build, setup

use bsp_tools::setup::reference_root_from_env;
use bsp_tools::{dispatch, setup, Action, Error, Project, Result, SystemRunner, Toolchain};

use clap::{Parser, Subcommand};
use clap_verbosity_flag::InfoLevel;
use log::{debug, error};

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Subcommand)]
enum Commands {
    /// Build a project, or run one of clean, erase_flash, flash or monitor on it.
    Build {
        /// Name of the board support package.
        bsp: String,
        /// Title of the application under apps/<bsp>/.
        title: String,
        /// Action to perform instead of building. Unknown actions build.
        action: Option<String>,
        /// Serial device of the board, required by erase_flash, flash and monitor.
        device: Option<PathBuf>,
        #[arg(short, long)]
        /// Root of the STDK checkout. Defaults to the current directory.
        root: Option<PathBuf>,
        #[arg(long, default_value = "make")]
        /// Build tool to invoke.
        make: OsString,
        #[arg(long, default_value = "python3")]
        /// Interpreter used to run the serial monitor script.
        python: OsString,
    },
    /// Prepare the reference checkout named by STDK_REF_PATH for a BSP.
    Setup {
        /// Name of the board support package.
        bsp: String,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about=None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    /// The task to perform.
    command: Commands,
    #[command(flatten)]
    /// The level of output verbosity.
    verbose: clap_verbosity_flag::Verbosity<InfoLevel>,
}

fn run(cli: Cli) -> Result<()> {
    let mut runner = SystemRunner;
    match cli.command {
        Commands::Build {
            bsp,
            title,
            action,
            device,
            root,
            make,
            python,
        } => {
            let root = match root {
                Some(root) => root,
                None => env::current_dir()?,
            };
            let project = Project::new(root, &bsp, &title)?;
            let toolchain = Toolchain {
                make,
                python,
                ..Toolchain::default()
            };
            let action = Action::parse(action.as_deref());
            dispatch(
                &project,
                action,
                device.as_deref(),
                &toolchain,
                &mut runner,
            )
        }
        Commands::Setup { bsp } => {
            let root = reference_root_from_env()?;
            setup(&root, &bsp, &Toolchain::default(), &mut runner)
        }
    }
}

fn report(err: &Error) {
    error!("Error: {err}");
    for hint in err.hints() {
        error!("{hint}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    debug!(
        "bsp-tools version: {}.{}",
        env!("CARGO_PKG_VERSION_MAJOR"),
        env!("CARGO_PKG_VERSION_MINOR")
    );

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            // Exit codes outside 0..=255 cannot be represented
            ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
        }
    }
}
