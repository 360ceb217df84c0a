//! The optional `StringData` strings that follow the `LinkInfo` block.

use encoding_rs::WINDOWS_1254;
use log::debug;

use crate::{file::reader::Reader, shelllink::LinkFlags, Result};

/// Descriptive strings of a Shell Link, each present only if its [`LinkFlags`] bit is set
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StringData {
    /// Description of the shortcut (`HAS_NAME`)
    pub name: Option<String>,
    /// Target path relative to the link file (`HAS_RELATIVE_PATH`)
    pub relative_path: Option<String>,
    /// Working directory of the target (`HAS_WORKING_DIR`)
    pub working_dir: Option<String>,
    /// Command-line arguments passed to the target (`HAS_ARGUMENTS`)
    pub arguments: Option<String>,
    /// Location of the icon to show for the shortcut (`HAS_ICON_LOCATION`)
    pub icon_location: Option<String>,
}

impl StringData {
    /// Reads the strings selected by `flags` at the reader's position.
    ///
    /// Each string is a `u16` character count followed by UTF-16LE code units when
    /// `IS_UNICODE` is set, single-byte Windows-1254 characters otherwise. Reading stops at the
    /// first string that does not fit; the strings before it are kept.
    #[must_use]
    pub fn read(reader: &mut Reader<'_>, flags: LinkFlags) -> StringData {
        let unicode = flags.contains(LinkFlags::IS_UNICODE);
        let mut strings = StringData::default();

        let slots = [
            (LinkFlags::HAS_NAME, &mut strings.name),
            (LinkFlags::HAS_RELATIVE_PATH, &mut strings.relative_path),
            (LinkFlags::HAS_WORKING_DIR, &mut strings.working_dir),
            (LinkFlags::HAS_ARGUMENTS, &mut strings.arguments),
            (LinkFlags::HAS_ICON_LOCATION, &mut strings.icon_location),
        ];

        for (flag, slot) in slots {
            if !flags.contains(flag) {
                continue;
            }

            match read_string(reader, unicode) {
                Ok(value) => *slot = Some(value),
                Err(_) => {
                    debug!(
                        "StringData {flag:?} at 0x{:x} runs past the end of the file",
                        reader.pos()
                    );
                    break;
                }
            }
        }

        strings
    }
}

fn read_string(reader: &mut Reader<'_>, unicode: bool) -> Result<String> {
    if unicode {
        return reader.read_prefixed_utf16();
    }

    reader.transactional(|reader| {
        let count = reader.read_le::<u16>()?;
        let bytes = reader.read_bytes(usize::from(count))?;
        let (decoded, _, _) = WINDOWS_1254.decode(bytes);
        Ok(decoded.into_owned())
    })
}
