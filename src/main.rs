mod cli;
mod config_loader;
mod app_config;
mod camera_config;
mod camera;
mod core;
mod errors;
mod operations;
mod common;

use common::logging_setup;
use log::{info, error, debug};
use anyhow::{Result, bail};
use std::time::Instant;

#[tokio::main]
async fn main() -> Result<()> {
    let main_start_time = Instant::now();
    let matches = cli::build_cli().get_matches();
    let Some((operation_name, sub_matches)) = matches.subcommand() else {
        bail!("No subcommand provided.");
    };

    // Global flags are propagated into the subcommand's matches.
    let config_path = sub_matches.get_one::<String>("config").map(|s| s.as_str());
    let master_config = match config_loader::resolve_config(config_path) {
        Ok(cfg) => {
            logging_setup::initialize_logging(Some(&cfg), sub_matches);
            cfg
        }
        Err(e) => {
            logging_setup::initialize_logging(None, sub_matches);
            error!("❌ Failed to load configuration: {:#}. Exiting.", e);
            return Err(e.context("Failed to load configuration"));
        }
    };

    debug!("🎬 Dispatching to subcommand: {}", operation_name);
    let op_start_time = Instant::now();
    let op_result: Result<()> = match operation_name {
        "capture-images" => {
            operations::image_capture_op::handle_capture_images_cli(&master_config, sub_matches).await
        }
        "rename-dirs" => {
            operations::rename_op::handle_rename_dirs_cli(&master_config, sub_matches)
        }
        "calib-command" => {
            operations::calib_command_op::handle_calib_command_cli(&master_config, sub_matches)
        }
        "run-script" => {
            operations::remote_script_op::handle_run_script_cli(&master_config, sub_matches).await
        }
        other => bail!("Subcommand '{}' not implemented.", other),
    };

    if let Err(e) = op_result {
        error!("❌ Operation '{}' failed after {:?}: {:#}", operation_name, op_start_time.elapsed(), e);
        return Err(e);
    }
    info!("✅ Operation '{}' completed successfully in {:?}.", operation_name, op_start_time.elapsed());
    debug!("🏁 rcalib finished in {:?}.", main_start_time.elapsed());
    Ok(())
}
