use crate::config_loader::MasterConfig;
use crate::errors::AppError;
use anyhow::{Context, Result};
use clap::ArgMatches;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// One per-camera directory directly under the dataset root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetDir {
    pub name: String,
    pub path: PathBuf,
}

/// Immediate child directories of `root`, sorted by name in plain byte order
/// (`cam10` sorts before `cam2`). Regular files and symlinks to files are
/// skipped.
pub fn list_dataset_dirs(root: &Path) -> Result<Vec<DatasetDir>, AppError> {
    let start_time = Instant::now();
    if !root.is_dir() {
        return Err(AppError::NotFound(format!("Dataset root '{}' is not a directory", root.display())));
    }

    let mut dirs = Vec::new();
    let entries = fs::read_dir(root)
        .map_err(|e| AppError::Io(format!("Failed to list dataset root '{}': {}", root.display(), e)))?;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            debug!("  Skipping non-directory entry '{}'", path.display());
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        dirs.push(DatasetDir { name, path });
    }
    dirs.sort_by(|a, b| a.name.cmp(&b.name));
    debug!("Listed {} dataset dirs under '{}' in {:?}", dirs.len(), root.display(), start_time.elapsed());
    Ok(dirs)
}

/// `--dataset` when given, the configured root otherwise.
pub fn determine_dataset_root(master_config: &MasterConfig, args: &ArgMatches) -> PathBuf {
    match args.get_one::<String>("dataset") {
        Some(path_str) => {
            debug!("  Dataset root specified via CLI: {}", path_str);
            PathBuf::from(path_str)
        }
        None => master_config.dataset.root.clone(),
    }
}

/// Directory that fleet scripts and the host list live in. The configured
/// `base_dir` wins; otherwise this is the directory of the running binary.
pub fn determine_fleet_base_dir(master_config: &MasterConfig) -> Result<PathBuf> {
    if let Some(dir) = &master_config.fleet.base_dir {
        return Ok(dir.clone());
    }
    let exe = std::env::current_exe().context("Failed to locate the running executable")?;
    let exe = exe.canonicalize().unwrap_or(exe);
    exe.parent()
        .map(Path::to_path_buf)
        .with_context(|| format!("Executable path '{}' has no parent directory", exe.display()))
}
