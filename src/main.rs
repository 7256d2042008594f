use std::path::{Path, PathBuf};
use std::{fs, process};

use anyhow::{Context, Result, bail};

use scene_compiler::{
    config::CompilerConfig,
    engine::{BatchReport, Compiler},
    progress::TerminalMonitor,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run() {
        Ok(report) if report.is_success() => {}
        Ok(_) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    }
}

const COMPILE_USAGE: &str = "scene-compiler compile [--config <file>] <scene.scene>...";
const BUILD_USAGE: &str = "scene-compiler build [--config <file>] <dir>";

fn run() -> Result<BatchReport> {
    let mut args = std::env::args().skip(1);
    let command = args.next();

    let mut config_path = None;
    let mut operands = Vec::new();
    while let Some(arg) = args.next() {
        if arg == "--config" {
            config_path = Some(PathBuf::from(args.next().context("--config needs a file")?));
        } else {
            operands.push(PathBuf::from(arg));
        }
    }

    match command.as_deref() {
        Some("compile") => {
            if operands.is_empty() {
                bail!("Usage: {COMPILE_USAGE}");
            }
            let config_dir = operands[0].parent().unwrap_or_else(|| Path::new("."));
            let config = load_config(config_path, config_dir);
            compile(config, &operands)
        }
        Some("build") => {
            let [dir] = operands.as_slice() else {
                bail!("Usage: {BUILD_USAGE}");
            };
            let config = load_config(config_path, dir);
            let scenes = scene_files(dir)?;
            if scenes.is_empty() {
                log::warn!("No .scene files under {}", dir.display());
            }
            compile(config, &scenes)
        }
        _ => bail!("Scene compiler: scene files to scene classes\n\nUsage:\n  {COMPILE_USAGE}\n  {BUILD_USAGE}"),
    }
}

fn load_config(explicit: Option<PathBuf>, dir: &Path) -> CompilerConfig {
    let path = explicit.unwrap_or_else(|| CompilerConfig::path_in(dir));
    CompilerConfig::load(&path)
}

fn compile(config: CompilerConfig, paths: &[PathBuf]) -> Result<BatchReport> {
    let compiler = Compiler::from_config(config).context("Failed to load asset packs")?;
    let mut monitor = TerminalMonitor::stderr();
    let report = compiler.compile_batch(paths, &mut monitor);

    eprintln!(
        "Compiled {} of {} scenes, {} failed, {} warnings",
        report.compiled.len(),
        paths.len(),
        report.failed.len(),
        monitor.diagnostic_count(),
    );
    Ok(report)
}

/// Every `*.scene` file under `dir`, sorted.
fn scene_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir).with_context(|| format!("Failed to read {}", dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "scene") {
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}
