//! Windows Shell Link (`.lnk`) parsing.
//!
//! Start Menu entries inside a bottle are Shell Link files. Only the parts needed to find the
//! executable a shortcut launches are read:
//!
//! ```text
//! ShellLinkHeader       HeaderSize bytes (0x4C)
//! LinkTargetIDList      if HAS_LINK_TARGET_ID_LIST, u16 size + data (skipped)
//! LinkInfo              if HAS_LINK_INFO, local base path of the target
//! StringData            name, relative path, working dir, arguments, icon location
//! ```
//!
//! Extra data blocks after `StringData` are ignored.
//!
//! # Lenient parsing
//!
//! Shortcuts are written by whatever installer ran in the bottle. Header fields past the end of the
//! file read as zero and a missing or unreadable base path simply leaves the link without a
//! target. Only files too short to hold the header size field are rejected.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::path::Path;
//! use bottlescope::ShellLink;
//!
//! let bottle = Path::new("/Users/me/Bottles/Steam");
//! let link = ShellLink::from_file(bottle.join(
//!     "drive_c/ProgramData/Microsoft/Windows/Start Menu/Programs/Steam/Steam.lnk",
//! ))?;
//!
//! if let Some(target) = link.target(bottle) {
//!     println!("{} -> {}", link.header.class_id, target.display());
//! }
//! # Ok::<(), bottlescope::Error>(())
//! ```

pub mod linkinfo;
pub mod path;
pub mod stringdata;

use std::path::{Path, PathBuf};

use bitflags::bitflags;
use log::debug;
use uguid::{guid, Guid};

use crate::{bottle::Program, file::File, Result};
use linkinfo::LinkInfo;
use path::translate_path;
use stringdata::StringData;

/// Class id every Shell Link header carries.
pub const LINK_CLSID: Guid = guid!("00021401-0000-0000-c000-000000000046");

bitflags! {
    /// Flags of the Shell Link header that select the optional structures
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LinkFlags: u32 {
        /// A `LinkTargetIDList` follows the header
        const HAS_LINK_TARGET_ID_LIST = 0x0000_0001;
        /// A `LinkInfo` block is present
        const HAS_LINK_INFO = 0x0000_0002;
        /// `StringData` has a name
        const HAS_NAME = 0x0000_0004;
        /// `StringData` has a relative path
        const HAS_RELATIVE_PATH = 0x0000_0008;
        /// `StringData` has a working directory
        const HAS_WORKING_DIR = 0x0000_0010;
        /// `StringData` has command-line arguments
        const HAS_ARGUMENTS = 0x0000_0020;
        /// `StringData` has an icon location
        const HAS_ICON_LOCATION = 0x0000_0040;
        /// `StringData` is UTF-16
        const IS_UNICODE = 0x0000_0080;
        /// The `LinkInfo` block is to be ignored
        const FORCE_NO_LINK_INFO = 0x0000_0100;
        /// An environment variables data block is present
        const HAS_EXP_STRING = 0x0000_0200;
        /// Target runs in a separate virtual machine
        const RUN_IN_SEPARATE_PROCESS = 0x0000_0400;
        /// The target is run as a different user
        const RUN_AS_USER = 0x0000_2000;
    }
}

/// The fixed 76-byte `ShellLinkHeader`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellLinkHeader {
    /// Size of the header, also the offset of the structure that follows it
    pub header_size: u32,
    /// Class id, [`LINK_CLSID`] for well-formed files (not validated)
    pub class_id: Guid,
    /// Raw link flags, see [`ShellLinkHeader::flags`]
    pub raw_flags: u32,
    /// File attributes of the target
    pub file_attributes: u32,
    /// Creation time of the target as a `FILETIME`
    pub creation_time: u64,
    /// Access time of the target as a `FILETIME`
    pub access_time: u64,
    /// Write time of the target as a `FILETIME`
    pub write_time: u64,
    /// Size of the target in bytes, low 32 bits
    pub file_size: u32,
    /// Index of the icon within the icon location
    pub icon_index: i32,
    /// Window state the target is started in
    pub show_command: u32,
    /// Keyboard shortcut
    pub hot_key: u16,
}

impl ShellLinkHeader {
    /// Reads the header at the start of `file`; fields past the end of the file are zero.
    #[must_use]
    pub fn read(file: &File) -> ShellLinkHeader {
        let mut reader = file.reader(0);
        let header_size = reader.field();

        let mut class_id = [0u8; 16];
        for byte in &mut class_id {
            *byte = reader.field();
        }

        ShellLinkHeader {
            header_size,
            class_id: Guid::from_bytes(class_id),
            raw_flags: reader.field(),
            file_attributes: reader.field(),
            creation_time: reader.field(),
            access_time: reader.field(),
            write_time: reader.field(),
            file_size: reader.field(),
            icon_index: reader.field(),
            show_command: reader.field(),
            hot_key: reader.field(),
        }
    }

    /// The link flags; unknown bits are dropped.
    #[must_use]
    pub fn flags(&self) -> LinkFlags {
        LinkFlags::from_bits_truncate(self.raw_flags)
    }

    /// `true` if the class id is the Shell Link one.
    #[must_use]
    pub fn is_shell_link(&self) -> bool {
        self.class_id == LINK_CLSID
    }
}

/// A parsed Shell Link file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellLink {
    /// The fixed header
    pub header: ShellLinkHeader,
    /// The `LinkInfo` block, if the link has one
    pub link_info: Option<LinkInfo>,
    /// The descriptive strings
    pub strings: StringData,
    /// Path of the `.lnk` file, `None` for in-memory links
    pub path: Option<PathBuf>,
}

impl ShellLink {
    /// Parses the link file at `path`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] or [`crate::Error::Error`] if the file cannot be
    /// opened or mapped, and [`crate::Error::Malformed`] if it is too short to be a link.
    pub fn from_file(path: impl AsRef<Path>) -> Result<ShellLink> {
        Self::parse(&File::from_file(path.as_ref())?)
    }

    /// Parses a link held in memory.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the buffer is too short to be a link.
    pub fn from_mem(data: Vec<u8>) -> Result<ShellLink> {
        Self::parse(&File::from_mem(data))
    }

    /// Parses a link from an already loaded [`File`].
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the file cannot hold the header size field.
    pub fn parse(file: &File) -> Result<ShellLink> {
        if file.read_le_at::<u32>(0).is_err() {
            return Err(malformed_error!(
                "Shell link of {} bytes has no header",
                file.len()
            ));
        }

        let header = ShellLinkHeader::read(file);
        let flags = header.flags();
        let mut reader = file.reader(header.header_size as usize);

        if flags.contains(LinkFlags::HAS_LINK_TARGET_ID_LIST) {
            let size = reader.field::<u16>();
            reader.advance_by(usize::from(size));
        }

        let link_info = if flags.contains(LinkFlags::HAS_LINK_INFO) {
            let block = reader.pos();
            let info = LinkInfo::read(file, block);
            reader.seek(block.saturating_add(info.size as usize));
            Some(info)
        } else {
            None
        };

        let strings = StringData::read(&mut reader, flags);

        Ok(ShellLink {
            header,
            link_info,
            strings,
            path: file.path().map(Path::to_path_buf),
        })
    }

    /// The Windows path of the target as stored in the `LinkInfo` block.
    #[must_use]
    pub fn local_base_path(&self) -> Option<&str> {
        self.link_info.as_ref()?.local_base_path.as_deref()
    }

    /// The command-line arguments the shortcut passes to its target.
    #[must_use]
    pub fn arguments(&self) -> Option<&str> {
        self.strings.arguments.as_deref()
    }

    /// The target translated into the bottle rooted at `bottle_root`, `None` without a local
    /// base path.
    #[must_use]
    pub fn target(&self, bottle_root: &Path) -> Option<PathBuf> {
        let Some(windows_path) = self.local_base_path() else {
            debug!(
                "Shell link {} has no local base path",
                self.path
                    .as_deref()
                    .map_or_else(|| String::from("<memory>"), |p| p.display().to_string())
            );
            return None;
        };

        Some(translate_path(windows_path, bottle_root))
    }

    /// The program the shortcut launches, named after the target's file name.
    #[must_use]
    pub fn program(&self, bottle_root: &Path) -> Option<Program> {
        let target = self.target(bottle_root)?;
        let name = target.file_name()?.to_string_lossy().into_owned();

        Some(Program {
            name,
            path: target,
            arguments: self.strings.arguments.clone().filter(|a| !a.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test::{BasePath, LinkBuilder},
        Error,
    };

    const ROOT: &str = "/bottles/Steam";

    #[test]
    fn header_fields() {
        let link = ShellLink::from_mem(LinkBuilder::new().build()).unwrap();

        assert_eq!(link.header.header_size, 0x4C);
        assert!(link.header.is_shell_link());
        assert_eq!(
            link.header.class_id.to_string(),
            "00021401-0000-0000-c000-000000000046"
        );
        assert_eq!(link.header.file_attributes, 0x20);
        assert_eq!(link.header.file_size, 4096);
        assert_eq!(link.header.show_command, 1);
        assert!(link.link_info.is_none());
        assert!(link.target(Path::new(ROOT)).is_none());
    }

    #[test]
    fn ansi_target() {
        let data = LinkBuilder::new()
            .with_base_path(BasePath::Ansi(b"C:\\Games\\app.exe".to_vec()))
            .build();
        let link = ShellLink::from_mem(data).unwrap();

        assert_eq!(link.local_base_path(), Some(r"C:\Games\app.exe"));
        assert_eq!(
            link.target(Path::new(ROOT)).unwrap(),
            Path::new("/bottles/Steam/drive_c/Games/app.exe")
        );
    }

    #[test]
    fn unicode_target_after_id_list() {
        let data = LinkBuilder::new()
            .with_id_list(vec![0x14, 0x00, 0x1F, 0x50, 0xE0, 0x4F, 0xD0, 0x20, 0xEA, 0x3A])
            .with_base_path(BasePath::Unicode(r"C:\Program Files\Steam\steam.exe"))
            .build();
        let link = ShellLink::from_mem(data).unwrap();

        let program = link.program(Path::new(ROOT)).unwrap();
        assert_eq!(program.name, "steam.exe");
        assert_eq!(
            program.path,
            Path::new("/bottles/Steam/drive_c/Program Files/Steam/steam.exe")
        );
        assert_eq!(program.arguments, None);
    }

    #[test]
    fn string_data_after_link_info() {
        let data = LinkBuilder::new()
            .with_base_path(BasePath::Ansi(b"C:\\Games\\launcher.exe".to_vec()))
            .with_flags(0x80 | 0x04 | 0x20)
            .with_strings(vec!["Launch the game", "-silent -fullscreen"])
            .build();
        let link = ShellLink::from_mem(data).unwrap();

        assert_eq!(link.strings.name.as_deref(), Some("Launch the game"));
        assert_eq!(link.arguments(), Some("-silent -fullscreen"));

        let program = link.program(Path::new(ROOT)).unwrap();
        assert_eq!(program.name, "launcher.exe");
        assert_eq!(program.arguments.as_deref(), Some("-silent -fullscreen"));
    }

    #[test]
    fn truncated_link() {
        let data = LinkBuilder::new()
            .with_base_path(BasePath::Ansi(b"C:\\Games\\app.exe".to_vec()))
            .build();

        let link = ShellLink::from_mem(data[..0x50].to_vec()).unwrap();
        assert!(link.link_info.is_some());
        assert!(link.local_base_path().is_none());

        let link = ShellLink::from_mem(data[..30].to_vec()).unwrap();
        assert_eq!(link.header.flags(), LinkFlags::HAS_LINK_INFO);
        assert_eq!(link.header.show_command, 0);
        assert!(link.target(Path::new(ROOT)).is_none());

        assert!(matches!(
            ShellLink::from_mem(vec![0x4C, 0x00]),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn bogus_sizes_do_not_panic() {
        let mut data = LinkBuilder::new()
            .with_id_list(vec![0; 4])
            .with_base_path(BasePath::Ansi(b"C:\\x.exe".to_vec()))
            .with_flags(0x20)
            .with_strings(vec!["-x"])
            .build();
        data[0..4].copy_from_slice(&u32::MAX.to_le_bytes());

        let link = ShellLink::from_mem(data).unwrap();
        assert!(link.target(Path::new(ROOT)).is_none());
        assert!(link.arguments().is_none());
    }
}
