use crate::config_loader::MasterConfig;
use crate::errors::AppError;
use crate::operations::op_helper::{self, DatasetDir};
use anyhow::{Context, Result};
use clap::ArgMatches;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    pub rank: usize,
    pub source_name: String,
    pub source_path: PathBuf,
    pub target_name: String,
}

impl RenamePlan {
    pub fn is_identity(&self) -> bool {
        self.source_name == self.target_name
    }
}

pub fn handle_rename_dirs_cli(master_config: &MasterConfig, args: &ArgMatches) -> Result<()> {
    let op_start_time = Instant::now();
    let root = op_helper::determine_dataset_root(master_config, args);
    info!("🗂️ Normalizing camera directory names under '{}'", root.display());

    let dirs = op_helper::list_dataset_dirs(&root)
        .with_context(|| format!("Failed to list dataset directories under '{}'", root.display()))?;
    if dirs.is_empty() {
        warn!("⚠️ No directories found under '{}', nothing to rename.", root.display());
        return Ok(());
    }

    let plans = plan_renames(&dirs, &master_config.dataset.camera_prefix);
    let stdout = std::io::stdout();
    let renamed = apply_renames(&root, &plans, &mut stdout.lock())
        .with_context(|| format!("Renaming directories under '{}' failed", root.display()))?;
    info!("✅ Renamed {} of {} directories in {:?}.", renamed, plans.len(), op_start_time.elapsed());
    Ok(())
}

/// Maps the i-th directory (already sorted) to `{prefix}{i}`.
pub fn plan_renames(dirs: &[DatasetDir], prefix: &str) -> Vec<RenamePlan> {
    dirs.iter()
        .enumerate()
        .map(|(rank, dir)| RenamePlan {
            rank,
            source_name: dir.name.clone(),
            source_path: dir.path.clone(),
            target_name: format!("{}{}", prefix, rank),
        })
        .collect()
}

// Renames run in rank order, so a target is free once the directory holding
// that name has itself been moved earlier in the run. Anything else at the
// target would either fail or clobber an empty directory mid-run.
fn check_conflicts(root: &Path, plans: &[RenamePlan]) -> Result<(), AppError> {
    let ranks: HashMap<&str, usize> = plans.iter().map(|p| (p.source_name.as_str(), p.rank)).collect();
    for plan in plans.iter().filter(|p| !p.is_identity()) {
        let blocked = match ranks.get(plan.target_name.as_str()) {
            Some(&holder_rank) => holder_rank > plan.rank,
            None => root.join(&plan.target_name).exists(),
        };
        if blocked {
            return Err(AppError::RenameConflict {
                source_name: plan.source_name.clone(),
                target_name: plan.target_name.clone(),
            });
        }
    }
    Ok(())
}

/// Applies `plans` in order, writing `Renamed {old} to {new}` to `out` for
/// every directory, including ones already at their canonical name (those
/// are not moved). Conflicts are detected before anything moves; a failure
/// after that leaves earlier renames in place. Returns how many directories
/// moved.
pub fn apply_renames<W: Write>(root: &Path, plans: &[RenamePlan], out: &mut W) -> Result<usize, AppError> {
    check_conflicts(root, plans)?;

    let mut renamed = 0;
    for plan in plans {
        if plan.is_identity() {
            debug!("  '{}' already has its canonical name", plan.source_name);
        } else {
            let from = &plan.source_path;
            let to = root.join(&plan.target_name);
            fs::rename(from, &to).map_err(|e| {
                AppError::Io(format!("Failed to rename '{}' to '{}': {}", from.display(), to.display(), e))
            })?;
            renamed += 1;
        }
        writeln!(out, "Renamed {} to {}", plan.source_name, plan.target_name)?;
    }
    Ok(renamed)
}
