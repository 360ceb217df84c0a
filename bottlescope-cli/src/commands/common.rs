use std::{
    fs,
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::Context;
use bottlescope::{IconImage, ParseOptions, PeFile};

/// Load an executable, with the strict limits if requested.
pub fn load_pe(path: &Path, strict: bool) -> anyhow::Result<PeFile> {
    let options = if strict {
        ParseOptions::strict()
    } else {
        ParseOptions::default()
    };
    PeFile::from_file_with_options(path, options)
        .with_context(|| format!("failed to load executable: {}", path.display()))
}

/// Encode `icon` as an RGBA PNG at `path`.
pub fn write_png(icon: &IconImage, path: &Path) -> anyhow::Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let mut encoder = png::Encoder::new(BufWriter::new(file), icon.width(), icon.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer
        .write_image_data(icon.pixels())
        .with_context(|| format!("failed to write {}", path.display()))?;
    writer.finish()?;
    Ok(())
}

/// The bottle a file lives in: the parent of the closest `drive_c` ancestor.
pub fn guess_bottle_root(path: &Path) -> Option<PathBuf> {
    let absolute = fs::canonicalize(path).ok()?;
    absolute
        .ancestors()
        .find(|ancestor| ancestor.file_name().is_some_and(|name| name == "drive_c"))
        .and_then(Path::parent)
        .map(Path::to_path_buf)
}

/// Display-friendly file name of a path.
pub fn file_display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().to_string(),
    )
}

/// `width x height` of an icon.
pub fn dimensions(icon: &IconImage) -> String {
    format!("{}x{}", icon.width(), icon.height())
}
