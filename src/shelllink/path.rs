//! Mapping Windows paths onto a bottle's host directory tree.
//!
//! Wine backs the `C:` drive of a prefix with `<prefix>/drive_c`; every other drive letter is a
//! symlink in `<prefix>/dosdevices`, named after the lowercase letter and a colon.

use std::path::{Path, PathBuf};

/// Directory backing the `C:` drive inside a bottle.
pub const DRIVE_C: &str = "drive_c";

/// Directory holding the drive letter links inside a bottle.
pub const DOS_DEVICES: &str = "dosdevices";

/// Translates the absolute Windows path `windows_path` into a path below `bottle_root`.
///
/// Backslashes become forward slashes. A leading `C:` (either case) maps to
/// `<bottle_root>/drive_c`, any other drive letter `X:` to `<bottle_root>/dosdevices/x:`. Paths
/// without a drive letter are joined to `bottle_root` as they are.
///
/// # Examples
///
/// ```rust
/// use std::path::Path;
/// use bottlescope::shelllink::path::translate_path;
///
/// let target = translate_path(r"C:\Games\app.exe", Path::new("/bottles/steam"));
/// assert_eq!(target, Path::new("/bottles/steam/drive_c/Games/app.exe"));
/// ```
#[must_use]
pub fn translate_path(windows_path: &str, bottle_root: &Path) -> PathBuf {
    let unix = windows_path.replace('\\', "/");
    let (base, rest) = match split_drive(&unix) {
        Some(('c', rest)) => (bottle_root.join(DRIVE_C), rest),
        Some((letter, rest)) => (bottle_root.join(DOS_DEVICES).join(format!("{letter}:")), rest),
        None => (bottle_root.to_path_buf(), unix.as_str()),
    };

    let rest = rest.trim_start_matches('/');
    if rest.is_empty() {
        base
    } else {
        base.join(rest)
    }
}

/// Splits `X:rest` into the lowercase drive letter and `rest`.
fn split_drive(path: &str) -> Option<(char, &str)> {
    let mut chars = path.chars();
    let letter = chars.next().filter(char::is_ascii_alphabetic)?;
    let rest = chars.as_str().strip_prefix(':')?;
    Some((letter.to_ascii_lowercase(), rest))
}
