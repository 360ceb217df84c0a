mod app;
mod commands;
mod output;

use clap::Parser;

use crate::app::{Cli, Command};

fn main() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        eprintln!("\nCancelled.");
        std::process::exit(130);
    })?;

    let cli = Cli::parse();

    // bottlescope info+ on stderr unless --json; --verbose enables debug; RUST_LOG overrides
    if !cli.global.json {
        let level = if cli.global.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        env_logger::Builder::new()
            .filter_module("bottlescope", level)
            .parse_default_env()
            .target(env_logger::Target::Stderr)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(false)
            .init();
    }

    match &cli.command {
        Command::Info { path, strict } => commands::info::run(path, *strict, &cli.global),
        Command::Icon {
            path,
            output,
            all,
            strict,
        } => commands::icon::run(path, output.as_deref(), *all, *strict, &cli.global),
        Command::Shortcut { path, bottle } => {
            commands::shortcut::run(path, bottle.as_deref(), &cli.global)
        }
        Command::Scan {
            bottle,
            user,
            inspect,
            hidden,
        } => commands::scan::run(
            bottle,
            &commands::scan::ScanArgs {
                user: user.as_deref(),
                inspect: *inspect,
                hidden: *hidden,
            },
            &cli.global,
        ),
    }
}
