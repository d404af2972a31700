//! `storefront [OPTIONS.toml | PRESET]`: open the storefront viewer window.
//!
//! `PRESET` names a file in `presets/` without its extension.
//! `storefront --write-defaults PATH` writes the default options as TOML
//! for editing.

use std::path::Path;
use std::process::ExitCode;

use storefront::{options::Options, Viewer};

/// Directory searched for named option presets.
const PRESET_DIR: &str = "presets";

fn write_defaults(path: Option<String>) -> ExitCode {
    let Some(path) = path else {
        log::error!("--write-defaults needs a destination path");
        return ExitCode::FAILURE;
    };
    match Options::default().save(Path::new(&path)) {
        Ok(()) => {
            log::info!("wrote default options to {path}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let mut args = std::env::args().skip(1);
    let options = match args.next() {
        Some(flag) if flag == "--write-defaults" => {
            return write_defaults(args.next());
        }
        Some(arg) => match Options::resolve(&arg, Path::new(PRESET_DIR)) {
            Ok(options) => {
                log::info!("loaded options from {arg}");
                options
            }
            Err(e) => {
                log::error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => Options::default(),
    };

    match Viewer::builder().with_options(options).build().run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
