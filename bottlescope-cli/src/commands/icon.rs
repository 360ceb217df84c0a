use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use bottlescope::IconImage;
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::{dimensions, load_pe, write_png},
    output::print_output,
};

#[derive(Debug, Serialize)]
struct WrittenIcon {
    path: PathBuf,
    width: u32,
    height: u32,
    source: String,
}

#[derive(Debug, Serialize)]
struct IconOutput {
    icons: Vec<WrittenIcon>,
}

pub fn run(
    path: &Path,
    output: Option<&Path>,
    all: bool,
    strict: bool,
    opts: &GlobalOptions,
) -> anyhow::Result<()> {
    let pe = load_pe(path, strict)?;

    let targets: Vec<(IconImage, PathBuf)> = if all {
        let icons = pe.icons();
        if icons.is_empty() {
            bail!("no decodable icon in {}", path.display());
        }

        let directory = output.map_or_else(
            || path.parent().unwrap_or(Path::new(".")).to_path_buf(),
            Path::to_path_buf,
        );
        fs::create_dir_all(&directory)
            .with_context(|| format!("failed to create {}", directory.display()))?;

        let stem = path
            .file_stem()
            .map_or_else(|| "icon".to_string(), |s| s.to_string_lossy().to_string());
        icons
            .into_iter()
            .enumerate()
            .map(|(index, icon)| {
                let file = directory.join(format!("{stem}-{index}-{}.png", dimensions(&icon)));
                (icon, file)
            })
            .collect()
    } else {
        let Some(icon) = pe.best_icon() else {
            bail!("no decodable icon in {}", path.display());
        };
        let file = output.map_or_else(|| path.with_extension("png"), Path::to_path_buf);
        vec![(icon, file)]
    };

    let mut written = Vec::with_capacity(targets.len());
    for (icon, file) in targets {
        write_png(&icon, &file)?;
        written.push(WrittenIcon {
            path: file,
            width: icon.width(),
            height: icon.height(),
            source: icon.source().to_string(),
        });
    }

    print_output(&IconOutput { icons: written }, opts, |output| {
        for icon in &output.icons {
            println!(
                "{}x{} {} -> {}",
                icon.width,
                icon.height,
                icon.source,
                icon.path.display()
            );
        }
    })
}
