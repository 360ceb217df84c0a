use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// bottlescope - icons, shortcuts and programs of Wine bottles
#[derive(Debug, Parser)]
#[command(name = "bottlescope", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Display executable overview: architecture, machine, sections and icons.
    Info {
        /// Path to the PE file.
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Parse with the strict resource and icon limits.
        #[arg(long)]
        strict: bool,
    },

    /// Extract the best icon of an executable as PNG.
    Icon {
        /// Path to the PE file.
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Output file, or output directory with --all. Defaults to `<FILE>.png`.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write every decodable icon instead of only the best one.
        #[arg(long)]
        all: bool,

        /// Parse with the strict resource and icon limits.
        #[arg(long)]
        strict: bool,
    },

    /// Show the contents of a shortcut and where it points inside a bottle.
    Shortcut {
        /// Path to the .lnk file.
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Bottle root used to resolve the target. Guessed from the link location if omitted.
        #[arg(short, long, value_name = "DIR")]
        bottle: Option<PathBuf>,
    },

    /// List the programs of a bottle from Program Files and the Start Menu.
    Scan {
        /// Bottle root, the directory that contains `drive_c`.
        #[arg(value_name = "DIR")]
        bottle: PathBuf,

        /// Wine user whose Start Menu is scanned.
        #[arg(short, long)]
        user: Option<String>,

        /// Parse every program and report its architecture and icon.
        #[arg(long)]
        inspect: bool,

        /// Include hidden files and directories.
        #[arg(long)]
        hidden: bool,
    },
}
