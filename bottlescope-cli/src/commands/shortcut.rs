use std::path::{Path, PathBuf};

use anyhow::Context;
use bottlescope::ShellLink;
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::{file_display_name, guess_bottle_root},
    output::print_output,
};

#[derive(Debug, Serialize)]
struct ShortcutInfo {
    file: String,
    class_id: String,
    flags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    local_base_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    working_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    arguments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bottle: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_exists: Option<bool>,
}

pub fn run(path: &Path, bottle: Option<&Path>, opts: &GlobalOptions) -> anyhow::Result<()> {
    let link = ShellLink::from_file(path)
        .with_context(|| format!("failed to load shortcut: {}", path.display()))?;

    let bottle = bottle
        .map(Path::to_path_buf)
        .or_else(|| guess_bottle_root(path));
    if bottle.is_none() {
        log::info!("{} is not inside a bottle, pass --bottle to resolve it", path.display());
    }
    let target = bottle.as_deref().and_then(|root| link.target(root));

    let info = ShortcutInfo {
        file: file_display_name(path),
        class_id: link.header.class_id.to_string(),
        flags: link
            .header
            .flags()
            .iter_names()
            .map(|(name, _)| name.to_string())
            .collect(),
        local_base_path: link.local_base_path().map(str::to_string),
        name: link.strings.name.clone(),
        working_dir: link.strings.working_dir.clone(),
        arguments: link.strings.arguments.clone(),
        icon_location: link.strings.icon_location.clone(),
        target_exists: target.as_deref().map(Path::exists),
        target,
        bottle,
    };

    print_output(&info, opts, |info| {
        println!("Shortcut:        {}", info.file);
        println!("Class id:        {}", info.class_id);
        if !info.flags.is_empty() {
            println!("Flags:           {}", info.flags.join(" | "));
        }
        if let Some(path) = &info.local_base_path {
            println!("Base path:       {path}");
        }
        if let Some(name) = &info.name {
            println!("Description:     {name}");
        }
        if let Some(dir) = &info.working_dir {
            println!("Working dir:     {dir}");
        }
        if let Some(arguments) = &info.arguments {
            println!("Arguments:       {arguments}");
        }
        if let Some(icon) = &info.icon_location {
            println!("Icon location:   {icon}");
        }
        if let Some(bottle) = &info.bottle {
            println!("Bottle:          {}", bottle.display());
        }
        if let Some(target) = &info.target {
            let missing = if info.target_exists == Some(false) {
                " (missing)"
            } else {
                ""
            };
            println!("Target:          {}{missing}", target.display());
        }
    })
}
