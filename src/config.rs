//! Parser limits and bottle scan settings
//!
//! Every structure bottlescope reads is addressed by offsets taken from the file itself. The
//! limits in [`ParseOptions`] bound the work a single hostile file can cause; [`ScanOptions`]
//! controls where a [`crate::Bottle`] looks for programs.

/// Limits applied while parsing a single PE file
///
/// The resource tree is conventionally three levels deep (type, name, language) and real
/// executables carry a few dozen icons at most, so the defaults leave plenty of room while
/// still stopping pathological inputs early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Number of resource directory levels the walker descends into (default: 4)
    /// Tables at depth `max_resource_depth` and below are not read
    pub max_resource_depth: usize,

    /// Upper bound on collected resource data entries per file (default: 4096)
    pub max_resource_entries: usize,

    /// Upper bound on directory entries examined across all resource tables (default: 16384)
    pub max_resource_directory_entries: usize,

    /// Largest width or height of a decoded icon in pixels (default: 1024)
    pub max_icon_dimension: u32,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_resource_depth: 4,
            max_resource_entries: 4096,
            max_resource_directory_entries: 16384,
            max_icon_dimension: 1024,
        }
    }
}

impl ParseOptions {
    /// Creates a strict configuration for scanning untrusted bottles
    ///
    /// Only the conventional three resource levels are walked and icons are limited to 256
    /// pixels, the largest size the icon format can describe in its directory.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            max_resource_depth: 3,
            max_resource_entries: 512,
            max_resource_directory_entries: 2048,
            max_icon_dimension: 256,
        }
    }

    /// Creates a lenient configuration for unusual but trusted binaries
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            max_resource_depth: 8,
            max_resource_entries: 65536,
            max_resource_directory_entries: 262_144,
            max_icon_dimension: 4096,
        }
    }
}

/// Settings for scanning the programs of a bottle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Name of the Wine user whose roaming Start Menu is scanned (default: `crossover`)
    pub wine_user: String,

    /// Limits for every executable parsed during the scan
    pub parse: ParseOptions,

    /// Skip files and directories whose name starts with a dot (default: true)
    pub skip_hidden: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            wine_user: String::from("crossover"),
            parse: ParseOptions::default(),
            skip_hidden: true,
        }
    }
}

impl ScanOptions {
    /// Default scan settings for the given Wine user
    #[must_use]
    pub fn for_user(wine_user: impl Into<String>) -> Self {
        Self {
            wine_user: wine_user.into(),
            ..Self::default()
        }
    }
}
