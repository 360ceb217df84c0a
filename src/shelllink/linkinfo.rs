//! The `LinkInfo` block of a Shell Link.
//!
//! ```text
//! +0   LinkInfoSize                      u32
//! +4   LinkInfoHeaderSize                u32   0x1C, or >= 0x24 with unicode offsets
//! +8   LinkInfoFlags                     u32
//! +12  VolumeIDOffset                    u32
//! +16  LocalBasePathOffset               u32
//! +20  CommonNetworkRelativeLinkOffset   u32
//! +24  CommonPathSuffixOffset            u32
//! +28  LocalBasePathOffsetUnicode        u32   header size >= 0x24 only
//! +32  CommonPathSuffixOffsetUnicode     u32   header size >= 0x24 only
//! ```
//!
//! All offsets are relative to the start of the block.

use bitflags::bitflags;
use encoding_rs::WINDOWS_1254;
use log::debug;

use crate::file::File;

/// Smallest header size that carries the unicode offsets.
pub const UNICODE_HEADER_SIZE: u32 = 0x24;

bitflags! {
    /// Flags of a `LinkInfo` block
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LinkInfoFlags: u32 {
        /// `VolumeID` and `LocalBasePath` are present
        const VOLUME_ID_AND_LOCAL_BASE_PATH = 0x0000_0001;
        /// `CommonNetworkRelativeLink` is present
        const COMMON_NETWORK_RELATIVE_LINK_AND_PATH_SUFFIX = 0x0000_0002;
    }
}

/// Location information of the link target
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkInfo {
    /// Size of the whole block
    pub size: u32,
    /// Size of the fixed part of the block
    pub header_size: u32,
    /// Raw flags, see [`LinkInfo::flags`]
    pub raw_flags: u32,
    /// Local path of the target on the machine the link was created on
    pub local_base_path: Option<String>,
}

impl LinkInfo {
    /// Reads the block at file offset `offset`; fields past the end of the file are zero.
    #[must_use]
    pub fn read(file: &File, offset: usize) -> LinkInfo {
        let mut reader = file.reader(offset);
        let size = reader.field::<u32>();
        let header_size = reader.field::<u32>();
        let raw_flags = reader.field::<u32>();

        let mut info = LinkInfo {
            size,
            header_size,
            raw_flags,
            local_base_path: None,
        };

        if info
            .flags()
            .contains(LinkInfoFlags::VOLUME_ID_AND_LOCAL_BASE_PATH)
        {
            info.local_base_path = info.read_local_base_path(file, offset);
        }

        info
    }

    /// The flags; unknown bits are dropped.
    #[must_use]
    pub fn flags(&self) -> LinkInfoFlags {
        LinkInfoFlags::from_bits_truncate(self.raw_flags)
    }

    /// `true` if the header carries the unicode path offsets.
    #[must_use]
    pub fn is_unicode(&self) -> bool {
        self.header_size >= UNICODE_HEADER_SIZE
    }

    fn read_local_base_path(&self, file: &File, block: usize) -> Option<String> {
        let field = if self.is_unicode() { 28 } else { 16 };
        let relative = file.read_le_at::<u32>(block.checked_add(field)?).ok()?;
        let start = block.checked_add(relative as usize)?;
        let mut reader = file.reader(start);

        let path = if self.is_unicode() {
            reader.read_utf16_nul().ok()?
        } else {
            let bytes = reader.read_bytes_nul().ok()?;
            let (decoded, _, _) = WINDOWS_1254.decode(bytes);
            decoded.into_owned()
        };

        if path.is_empty() {
            debug!("LinkInfo at 0x{block:x} has an empty local base path");
            return None;
        }
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{link_info, BasePath};

    #[test]
    fn ansi_path_at_block_16() {
        let block = link_info(&BasePath::Ansi(b"C:\\Games\\app.exe".to_vec()));
        let info = LinkInfo::read(&File::from_mem(block.clone()), 0);

        assert_eq!(info.size as usize, block.len());
        assert_eq!(info.header_size, 0x1C);
        assert!(!info.is_unicode());
        assert_eq!(info.local_base_path.as_deref(), Some(r"C:\Games\app.exe"));
    }

    #[test]
    fn unicode_path_at_block_28() {
        let block = link_info(&BasePath::Unicode(r"C:\Spiele\Über.exe"));
        let info = LinkInfo::read(&File::from_mem(block), 0);

        assert!(info.is_unicode());
        assert_eq!(info.local_base_path.as_deref(), Some(r"C:\Spiele\Über.exe"));
    }

    #[test]
    fn ansi_code_page() {
        // 0xDE and 0xFE are the S with cedilla in Windows-1254
        let block = link_info(&BasePath::Ansi(b"C:\\Oyunlar\\\xDEim\xFEek.exe".to_vec()));
        let info = LinkInfo::read(&File::from_mem(block), 0);

        assert_eq!(info.local_base_path.as_deref(), Some("C:\\Oyunlar\\Şimşek.exe"));
    }

    #[test]
    fn without_local_path_flag() {
        let mut block = link_info(&BasePath::Ansi(b"C:\\app.exe".to_vec()));
        let flags = LinkInfoFlags::COMMON_NETWORK_RELATIVE_LINK_AND_PATH_SUFFIX;
        block[8..12].copy_from_slice(&flags.bits().to_le_bytes());
        let info = LinkInfo::read(&File::from_mem(block), 0);

        assert!(info.local_base_path.is_none());
        assert!(info
            .flags()
            .contains(LinkInfoFlags::COMMON_NETWORK_RELATIVE_LINK_AND_PATH_SUFFIX));
    }

    #[test]
    fn offset_past_end() {
        let mut block = link_info(&BasePath::Ansi(b"C:\\app.exe".to_vec()));
        block[16..20].copy_from_slice(&0x1000_u32.to_le_bytes());
        assert!(LinkInfo::read(&File::from_mem(block), 0).local_base_path.is_none());

        let info = LinkInfo::read(&File::from_mem(vec![0x30, 0, 0, 0, 0x1C]), 0);
        assert_eq!(info.size, 0x30);
        assert_eq!(info.header_size, 0);
        assert!(info.local_base_path.is_none());
    }
}
