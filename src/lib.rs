// Copyright 2025 The bottlescope Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # bottlescope
//!
//! Reads the Windows binaries found inside a Wine bottle without Windows, Wine or a PE library:
//! the executables (to classify them and pull out their application icon) and the Start Menu
//! shortcuts (to find the executables they launch).
//!
//! ## Features
//!
//! - **PE/COFF headers** - signature, COFF header, both optional header layouts, section table
//!   and RVA translation
//! - **Resource tree** - bounded, cycle-safe walk of the `.rsrc` directory tree
//! - **Icons** - DIB (8, 16, 24 and 32 bits per pixel) and PNG icon resources decoded to RGBA8,
//!   largest one selected
//! - **Shell Links** - header, `LinkInfo` local base path (ANSI and unicode), `StringData`, and
//!   translation of the Windows target path into the bottle's `drive_c`
//! - **Bottle scanning** - installed programs and Start Menu shortcuts, parsed in parallel
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bottlescope::prelude::*;
//!
//! let pe = PeFile::from_file("drive_c/Program Files/Game/game.exe")?;
//! println!("architecture: {}", pe.architecture());
//!
//! if let Some(icon) = pe.best_icon() {
//!     println!("icon: {}x{}", icon.width(), icon.height());
//! }
//! # Ok::<(), bottlescope::Error>(())
//! ```
//!
//! ### Shortcuts
//!
//! ```rust,no_run
//! use std::path::Path;
//! use bottlescope::ShellLink;
//!
//! let bottle = Path::new("/Users/me/Bottles/Steam");
//! let link = ShellLink::from_file(bottle.join("drive_c/users/crossover/Desktop/Steam.lnk"))?;
//! if let Some(program) = link.program(bottle) {
//!     println!("{} -> {}", program.name, program.path.display());
//! }
//! # Ok::<(), bottlescope::Error>(())
//! ```
//!
//! ### Memory-based parsing
//!
//! Every parser accepts a byte buffer as well as a path; both go through the same code:
//!
//! ```rust,no_run
//! use bottlescope::PeFile;
//!
//! let data = std::fs::read("game.exe")?;
//! let pe = PeFile::from_mem(data)?;
//! println!("{} sections", pe.sections().len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Untrusted input
//!
//! All offsets are taken from the files themselves. Every read is bounds checked, recursion over
//! file structures is replaced by bounded work-lists, and the limits in [`ParseOptions`] cap the
//! work a single file can cause. Problems local to one structure (a broken resource entry, an
//! unsupported bitmap format) are logged through the `log` facade and turn into missing data
//! instead of errors.
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`], aliasing `std::result::Result<T, Error>`:
//!
//! ```rust,no_run
//! use bottlescope::{Error, PeFile};
//!
//! match PeFile::from_file("drive_c/windows/notepad.exe") {
//!     Ok(pe) => println!("{}", pe.architecture()),
//!     Err(Error::InvalidFormat(reason)) => println!("not an executable: {reason}"),
//!     Err(e) => println!("error: {e}"),
//! }
//! ```
//!
//! ## Development and Testing
//!
//! ### Fuzzing
//!
//! ```bash
//! cargo +nightly fuzz run pefile
//! cargo +nightly fuzz run shelllink
//! ```

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust,no_run
/// use bottlescope::prelude::*;
///
/// let bottle = Bottle::new("/Users/me/Bottles/Steam");
/// for report in bottle.inspect(&bottle.installed_programs()) {
///     println!("{} {:?}", report.program.name, report.architecture);
/// }
/// ```
pub mod prelude;

/// Byte access: memory-mapped and in-memory backends, endian-aware reads, sequential reader
pub mod file;

/// Parser limits and bottle scan settings
pub mod config;

/// PE/COFF headers, section table and RVA translation
pub mod pe;

/// Resource directory tree of the `.rsrc` section
pub mod resources;

/// DIB and PNG icon resource decoding
pub mod bitmap;

/// Choosing the icon to show for an executable
pub mod icon;

/// Windows Shell Link (`.lnk`) parsing and path translation
pub mod shelllink;

/// Program discovery inside a Wine bottle
pub mod bottle;

/// `bottlescope` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
///
/// # Examples
///
/// ```rust,no_run
/// use bottlescope::{PeFile, Result};
///
/// fn load(path: &str) -> Result<PeFile> {
///     PeFile::from_file(path)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `bottlescope` Error type
///
/// Only failures that prevent parsing a file as a whole surface as errors; see [`Error`] for the
/// variants.
pub use error::Error;

/// Main entry point for executables, see [`pe::PeFile`].
pub use pe::{Architecture, PeFile};

/// Main entry point for shortcuts, see [`shelllink::ShellLink`].
pub use shelllink::ShellLink;

/// Bottle scanning, see [`bottle::Bottle`].
pub use bottle::{Bottle, Program, ProgramReport};

/// Decoded icons.
pub use bitmap::{IconImage, ImageSource};

/// Parser and scan settings.
pub use config::{ParseOptions, ScanOptions};

/// The loaded data source every parser reads from.
pub use file::File;
