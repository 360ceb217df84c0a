use std::path::{Path, PathBuf};

use anyhow::bail;
use bottlescope::{Bottle, Program, ProgramReport, ScanOptions};
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::dimensions,
    output::{print_output, Align, TabWriter},
};

pub struct ScanArgs<'a> {
    pub user: Option<&'a str>,
    pub inspect: bool,
    pub hidden: bool,
}

#[derive(Debug, Serialize)]
struct ProgramEntry {
    name: String,
    path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    arguments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    architecture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<&Program> for ProgramEntry {
    fn from(program: &Program) -> Self {
        ProgramEntry {
            name: program.name.clone(),
            path: program.path.clone(),
            arguments: program.arguments.clone(),
            architecture: None,
            icon: None,
            error: None,
        }
    }
}

impl From<&ProgramReport> for ProgramEntry {
    fn from(report: &ProgramReport) -> Self {
        ProgramEntry {
            architecture: report.architecture.map(|a| a.to_string()),
            icon: report.icon.as_ref().map(dimensions),
            error: report.error.as_ref().map(ToString::to_string),
            ..ProgramEntry::from(&report.program)
        }
    }
}

#[derive(Debug, Serialize)]
struct ScanOutput {
    bottle: PathBuf,
    installed: Vec<ProgramEntry>,
    start_menu: Vec<ProgramEntry>,
}

pub fn run(root: &Path, args: &ScanArgs<'_>, opts: &GlobalOptions) -> anyhow::Result<()> {
    let mut options = args
        .user
        .map_or_else(ScanOptions::default, ScanOptions::for_user);
    options.skip_hidden = !args.hidden;

    let bottle = Bottle::with_options(root, options);
    if !bottle.drive_c().is_dir() {
        bail!("{} is not a bottle, it has no drive_c", root.display());
    }

    let installed = bottle.installed_programs();
    let start_menu = bottle.start_menu_programs();

    let entries = |programs: &[Program]| -> Vec<ProgramEntry> {
        if args.inspect {
            bottle.inspect(programs).iter().map(ProgramEntry::from).collect()
        } else {
            programs.iter().map(ProgramEntry::from).collect()
        }
    };

    let output = ScanOutput {
        bottle: root.to_path_buf(),
        installed: entries(&installed),
        start_menu: entries(&start_menu),
    };

    print_output(&output, opts, |output| {
        println!("Bottle: {}", output.bottle.display());
        print_section("Installed programs", &output.installed, args.inspect);
        print_section("Start Menu", &output.start_menu, args.inspect);
    })
}

fn print_section(title: &str, entries: &[ProgramEntry], inspect: bool) {
    println!();
    println!("{title} ({}):", entries.len());
    if entries.is_empty() {
        return;
    }

    let mut columns = vec![("Name", Align::Left)];
    if inspect {
        columns.extend([("Arch", Align::Left), ("Icon", Align::Right)]);
    }
    columns.push(("Path", Align::Left));

    let mut table = TabWriter::new(&columns).indent("  ");
    for entry in entries {
        let mut row = vec![entry.name.clone()];
        if inspect {
            row.push(
                entry
                    .architecture
                    .clone()
                    .unwrap_or_else(|| "error".to_string()),
            );
            row.push(entry.icon.clone().unwrap_or_else(|| "-".to_string()));
        }
        let mut path = entry.path.display().to_string();
        if let Some(arguments) = &entry.arguments {
            path.push(' ');
            path.push_str(arguments);
        }
        row.push(path);
        table.row(row);
    }
    table.print();
}
