use crate::app_config::CalibrationConfig;
use crate::config_loader::MasterConfig;
use crate::operations::op_helper::{self, DatasetDir};
use anyhow::{Context, Result};
use clap::ArgMatches;
use log::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalibrationCommand {
    pub topics: Vec<String>,
    pub models: Vec<String>,
    pub line: String,
}

pub fn handle_calib_command_cli(master_config: &MasterConfig, args: &ArgMatches) -> Result<()> {
    let root = op_helper::determine_dataset_root(master_config, args);
    let dirs = op_helper::list_dataset_dirs(&root)
        .with_context(|| format!("Failed to list dataset directories under '{}'", root.display()))?;
    if dirs.is_empty() {
        warn!("⚠️ No camera directories under '{}'; the command will list no topics.", root.display());
    }
    debug!("Building calibration command for {} directories", dirs.len());

    let command = build_calibration_command(&master_config.calibration, &dirs);
    println!("{}", command.line);
    Ok(())
}

/// One `/{dir}/{suffix}` topic and one model tag per directory, both in the
/// order `dirs` is given in.
pub fn build_calibration_command(config: &CalibrationConfig, dirs: &[DatasetDir]) -> CalibrationCommand {
    let topics: Vec<String> = dirs
        .iter()
        .map(|dir| format!("/{}/{}", dir.name, config.topic_suffix))
        .collect();
    let models: Vec<String> = dirs.iter().map(|_| config.camera_model.clone()).collect();

    let line = format!(
        "{} --bag {} --target {} --models {} --topics {}",
        config.command_prefix,
        config.bag_path,
        config.target_path,
        models.join(" "),
        topics.join(" ")
    );
    CalibrationCommand { topics, models, line }
}
