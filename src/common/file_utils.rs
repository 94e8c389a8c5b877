use crate::errors::AppError;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

pub fn ensure_output_directory(dir_path: &Path) -> Result<PathBuf, AppError> {
    if !dir_path.exists() {
        debug!("Output directory '{}' does not exist, attempting to create it.", dir_path.display());
        fs::create_dir_all(dir_path).map_err(|e| {
            AppError::Io(format!(
                "Failed to create output directory '{}': {}",
                dir_path.display(),
                e
            ))
        })?;
    } else if !dir_path.is_dir() {
        return Err(AppError::Io(format!(
            "Output path '{}' exists but is not a directory.",
            dir_path.display()
        )));
    }
    Ok(dir_path.to_path_buf())
}

/// Deletes every entry inside `dir_path`, leaving the directory itself in
/// place. Nothing is confirmed and nothing is recoverable. Returns the number
/// of removed entries.
pub fn reset_folder(dir_path: &Path) -> Result<usize, AppError> {
    let entries = fs::read_dir(dir_path).map_err(|e| {
        AppError::Io(format!("Failed to list '{}' for reset: {}", dir_path.display(), e))
    })?;

    let mut removed = 0;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let result = if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.map_err(|e| AppError::Io(format!("Failed to remove '{}': {}", path.display(), e)))?;
        removed += 1;
    }
    debug!("Removed {} entries from '{}'", removed, dir_path.display());
    Ok(removed)
}

/// Makes `dir_path` ready to receive a capture run. An existing folder is
/// emptied when `reset` is set and left untouched otherwise.
pub fn prepare_output_folder(dir_path: &Path, reset: bool) -> Result<PathBuf, AppError> {
    let existed = dir_path.is_dir();
    let dir = ensure_output_directory(dir_path)?;
    if !existed {
        info!("📁 Created output folder '{}'", dir.display());
    } else if reset {
        println!("Folder {} already exists. Overwriting all files in the folder.", dir.display());
        let removed = reset_folder(&dir)?;
        warn!("🧹 Deleted {} existing entries from '{}'", removed, dir.display());
    } else {
        info!("ℹ️ Keeping existing contents of '{}'", dir.display());
    }
    Ok(dir)
}
