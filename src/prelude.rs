//! # bottlescope Prelude
//!
//! The types needed for everyday use of bottlescope: parsing executables and shortcuts, scanning
//! bottles and handling the results.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all bottlescope operations
pub use crate::Error;

/// The result type used throughout bottlescope
pub use crate::Result;

/// Limits for parsing untrusted files and settings for bottle scans
pub use crate::{ParseOptions, ScanOptions};

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Executables and their icons
pub use crate::{Architecture, PeFile};

/// Shortcuts
pub use crate::ShellLink;

/// Bottles and the programs inside them
pub use crate::{Bottle, Program, ProgramReport};

/// Low-level data source
pub use crate::File;

// ================================================================================================
// PE Structures
// ================================================================================================

/// Headers of an image
pub use crate::pe::{
    coff::{CoffCharacteristics, CoffHeader, Machine},
    optional::{DataDirectory, DataDirectoryType, Magic, OptionalHeader},
    section::{Section, SectionTable},
};

/// The resource tree
pub use crate::resources::{
    ResourceDataEntry, ResourceDirectoryTable, ResourceId, ResourceTree, ResourceType,
};

// ================================================================================================
// Icons
// ================================================================================================

/// Decoded images and the DIB header
pub use crate::bitmap::{
    decode_icon, BitmapInfoHeader, ColorFormat, ColorQuad, Compression, IconImage, ImageSource,
    Origin,
};

/// Icon selection
pub use crate::icon::select_best_icon;

// ================================================================================================
// Shell Links
// ================================================================================================

/// Shell Link structures
pub use crate::shelllink::{
    linkinfo::{LinkInfo, LinkInfoFlags},
    path::translate_path,
    stringdata::StringData,
    LinkFlags, ShellLinkHeader,
};
