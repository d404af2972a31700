//! Build tasks: `cargo xtask web` produces the browser bundle and
//! `cargo xtask schema` writes the JSON schema of the tunable options.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

const WASM_TARGET: &str = "wasm32-unknown-unknown";

#[derive(Parser)]
#[command(about = "Storefront build tasks")]
struct Cli {
    #[command(subcommand)]
    task: Task,
}

#[derive(Subcommand)]
enum Task {
    /// Build the wasm bundle and JS bindings into `--out-dir`.
    Web {
        /// Output directory for the bindings and wasm module.
        #[arg(long, default_value = "web/pkg")]
        out_dir: PathBuf,
        /// Build without optimizations.
        #[arg(long)]
        debug: bool,
    },
    /// Write the JSON schema of the tunable options (camera, lighting,
    /// selection) for editors and inspectors.
    Schema {
        /// Destination file.
        #[arg(long, default_value = "options.schema.json")]
        out: PathBuf,
    },
}

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

fn run(command: &mut Command) -> Result<()> {
    let status = command
        .status()
        .with_context(|| format!("failed to spawn {command:?}"))?;
    if !status.success() {
        bail!("{command:?} exited with {status}");
    }
    Ok(())
}

fn web(out_dir: &Path, debug: bool) -> Result<()> {
    let root = workspace_root();
    let cargo = std::env::var("CARGO").unwrap_or_else(|_| "cargo".into());

    let mut build = Command::new(cargo);
    let _ = build
        .current_dir(&root)
        .args(["rustc", "--lib", "--crate-type", "cdylib"])
        .args(["--target", WASM_TARGET])
        .args(["--no-default-features", "--features", "web"]);
    if !debug {
        let _ = build.arg("--release");
    }
    run(&mut build)?;

    let profile = if debug { "debug" } else { "release" };
    let wasm = root
        .join("target")
        .join(WASM_TARGET)
        .join(profile)
        .join("storefront.wasm");
    run(Command::new("wasm-bindgen")
        .current_dir(&root)
        .args(["--target", "web", "--out-dir"])
        .arg(out_dir)
        .arg(&wasm))
    .context("wasm-bindgen failed (install with `cargo install wasm-bindgen-cli`)")?;

    println!("web bundle written to {}", out_dir.display());
    Ok(())
}

fn schema(out: &Path) -> Result<()> {
    let schema = storefront::options::Options::json_schema();
    let json = serde_json::to_string_pretty(&schema)
        .context("failed to serialize the options schema")?;
    std::fs::write(out, json + "\n")
        .with_context(|| format!("failed to write {}", out.display()))?;
    println!("options schema written to {}", out.display());
    Ok(())
}

fn main() -> Result<()> {
    match Cli::parse().task {
        Task::Web { out_dir, debug } => web(&out_dir, debug),
        Task::Schema { out } => schema(&out),
    }
}
