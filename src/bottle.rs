//! Program discovery inside a Wine bottle.
//!
//! A bottle is a Wine prefix: a host directory whose `drive_c` subdirectory is the Windows `C:`
//! drive. [`Bottle`] finds the executables installed under `Program Files`, resolves the Start
//! Menu shortcuts to the programs they launch, and inspects programs in bulk.
//!
//! All batch operations parse one file per task on the `rayon` pool. A file that fails to parse
//! is logged (or recorded in its [`ProgramReport`]) and never aborts the batch.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bottlescope::{Bottle, ScanOptions};
//!
//! let bottle = Bottle::with_options("/Users/me/Bottles/Steam", ScanOptions::for_user("me"));
//!
//! let mut programs = bottle.installed_programs();
//! programs.extend(bottle.start_menu_programs());
//!
//! for report in bottle.inspect(&programs) {
//!     println!("{:<32} {:?}", report.program.name, report.architecture);
//! }
//! ```

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use log::{debug, trace, warn};
use rayon::prelude::*;
use walkdir::{DirEntry, WalkDir};

use crate::{
    bitmap::IconImage, config::ScanOptions, pe::Architecture, shelllink::path::DRIVE_C, Error,
    PeFile, Result, ShellLink,
};

/// Directories below `drive_c` that hold installed programs.
pub const PROGRAM_DIRECTORIES: [&str; 2] = ["Program Files", "Program Files (x86)"];

/// The all-users Start Menu, relative to `drive_c`.
pub const GLOBAL_START_MENU: &str = "ProgramData/Microsoft/Windows/Start Menu";

/// A user's Start Menu, relative to that user's profile directory.
pub const USER_START_MENU: &str = "AppData/Roaming/Microsoft/Windows/Start Menu";

/// An executable inside a bottle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Program {
    /// Display name, the file name of the executable
    pub name: String,
    /// Host path of the executable
    pub path: PathBuf,
    /// Arguments a shortcut passes to the executable
    pub arguments: Option<String>,
}

impl Program {
    /// A program for the executable at `path`, named after its file name.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Program {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Program {
            name,
            path,
            arguments: None,
        }
    }
}

/// What [`Bottle::inspect`] found out about one program
#[derive(Debug)]
pub struct ProgramReport {
    /// The inspected program
    pub program: Program,
    /// Word size of the executable, `None` if it could not be parsed
    pub architecture: Option<Architecture>,
    /// Best icon of the executable
    pub icon: Option<IconImage>,
    /// Why the executable could not be parsed
    pub error: Option<Error>,
}

/// A Wine prefix on the host filesystem
#[derive(Debug, Clone)]
pub struct Bottle {
    root: PathBuf,
    options: ScanOptions,
}

impl Bottle {
    /// A bottle rooted at `root` with the default [`ScanOptions`].
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Bottle {
        Self::with_options(root, ScanOptions::default())
    }

    /// A bottle rooted at `root`.
    #[must_use]
    pub fn with_options(root: impl Into<PathBuf>, options: ScanOptions) -> Bottle {
        Bottle {
            root: root.into(),
            options,
        }
    }

    /// The host directory of the prefix.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The scan settings.
    #[must_use]
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// The directory backing the `C:` drive.
    #[must_use]
    pub fn drive_c(&self) -> PathBuf {
        self.root.join(DRIVE_C)
    }

    /// The Start Menu directories that are searched for shortcuts, all-users first.
    #[must_use]
    pub fn start_menu_directories(&self) -> [PathBuf; 2] {
        let drive_c = self.drive_c();
        [
            drive_c.join(GLOBAL_START_MENU),
            drive_c
                .join("users")
                .join(&self.options.wine_user)
                .join(USER_START_MENU),
        ]
    }

    /// Every `.exe` below `Program Files` and `Program Files (x86)`, sorted by lowercased name.
    #[must_use]
    pub fn installed_programs(&self) -> Vec<Program> {
        let drive_c = self.drive_c();
        let mut programs: Vec<Program> = PROGRAM_DIRECTORIES
            .iter()
            .flat_map(|directory| self.find_files(&drive_c.join(directory), "exe"))
            .map(Program::new)
            .collect();

        programs.sort_by_cached_key(|program| program.name.to_lowercase());
        trace!(
            "{} installed programs in {}",
            programs.len(),
            self.root.display()
        );
        programs
    }

    /// The programs the Start Menu shortcuts point to.
    ///
    /// Links are processed in order of their lowercased file name. Links without a usable target
    /// are skipped, and of several links to the same target only the first is kept. The link files
    /// themselves are left in place.
    #[must_use]
    pub fn start_menu_programs(&self) -> Vec<Program> {
        let mut links: Vec<PathBuf> = self
            .start_menu_directories()
            .iter()
            .flat_map(|directory| self.find_files(directory, "lnk"))
            .collect();
        links.sort_by_cached_key(|link| {
            link.file_name()
                .map(|name| name.to_string_lossy().to_lowercase())
                .unwrap_or_default()
        });

        let resolved: Vec<Option<Program>> = links
            .par_iter()
            .map(|link| match self.resolve_shortcut(link) {
                Ok(Some(program)) => Some(program),
                Ok(None) => {
                    debug!("Shortcut {} has no target", link.display());
                    None
                }
                Err(error) => {
                    warn!("Failed to read shortcut {} - {error}", link.display());
                    None
                }
            })
            .collect();

        let mut seen = HashSet::new();
        resolved
            .into_iter()
            .flatten()
            .filter(|program| seen.insert(program.path.clone()))
            .collect()
    }

    /// Resolves the shortcut at `link` into the program it launches inside this bottle.
    ///
    /// # Errors
    /// Returns an error if the link file cannot be read or is too short to be a link.
    pub fn resolve_shortcut(&self, link: impl AsRef<Path>) -> Result<Option<Program>> {
        let link = ShellLink::from_file(link)?;
        Ok(link.program(&self.root))
    }

    /// Parses every program's executable in parallel, in input order.
    #[must_use]
    pub fn inspect(&self, programs: &[Program]) -> Vec<ProgramReport> {
        programs
            .par_iter()
            .map(|program| {
                match PeFile::from_file_with_options(&program.path, self.options.parse) {
                    Ok(pe) => ProgramReport {
                        program: program.clone(),
                        architecture: Some(pe.architecture()),
                        icon: pe.best_icon(),
                        error: None,
                    },
                    Err(error) => {
                        warn!("Failed to parse {} - {error}", program.path.display());
                        ProgramReport {
                            program: program.clone(),
                            architecture: None,
                            icon: None,
                            error: Some(error),
                        }
                    }
                }
            })
            .collect()
    }

    fn find_files(&self, directory: &Path, extension: &str) -> Vec<PathBuf> {
        let skip_hidden = self.options.skip_hidden;

        WalkDir::new(directory)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !skip_hidden || entry.depth() == 0 || !is_hidden(entry))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(error) => {
                    debug!("Skipping part of {} - {error}", directory.display());
                    None
                }
            })
            .filter(|entry| is_file(entry) && has_extension(entry.path(), extension))
            .map(DirEntry::into_path)
            .collect()
    }
}

/// Regular files, and symlinks whose target is a regular file. Symlinked directories are not
/// descended into.
fn is_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
}
