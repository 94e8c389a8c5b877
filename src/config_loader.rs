use serde::Deserialize;
use std::fs;
use std::path::Path;
use crate::app_config::{ApplicationConfig, CalibrationConfig, DatasetConfig, FleetConfig};
use crate::camera_config::CaptureConfig;
use anyhow::{Result, Context, bail};
use log::{debug, info};
use std::time::Instant;

pub const DEFAULT_CONFIG_PATH: &str = "config/rcalib.yaml";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct MasterConfig {
    #[serde(rename = "application")]
    pub app_settings: ApplicationConfig,
    pub capture: CaptureConfig,
    pub dataset: DatasetConfig,
    pub calibration: CalibrationConfig,
    pub fleet: FleetConfig,
}

pub fn load_config(path: &str) -> Result<MasterConfig> {
    debug!("📄 Attempting to load config from: {}", path);
    let start_time = Instant::now();

    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file '{}'. 📖", path))?;
    debug!("Read config file in {:?}", start_time.elapsed());

    let config = parse_config(&config_str)
        .with_context(|| format!("Invalid configuration in '{}'", path))?;

    info!("✅ Successfully loaded and validated configuration from '{}' in {:?}", path, start_time.elapsed());
    Ok(config)
}

/// Explicit `--config` paths must load; the default path is optional and
/// built-in defaults apply when it is absent.
pub fn resolve_config(cli_path: Option<&str>) -> Result<MasterConfig> {
    match cli_path {
        Some(path) => load_config(path),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => load_config(DEFAULT_CONFIG_PATH),
        None => {
            debug!("No configuration file at '{}', using built-in defaults.", DEFAULT_CONFIG_PATH);
            let config = MasterConfig::default();
            validate_master_config(&config)?;
            Ok(config)
        }
    }
}

pub fn parse_config(yaml: &str) -> Result<MasterConfig> {
    // An empty document deserializes to unit, not to an all-default struct.
    let config: MasterConfig = if yaml.trim().is_empty() {
        MasterConfig::default()
    } else {
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration. 💔")?
    };
    validate_master_config(&config).context("Master configuration validation failed 👎")?;
    Ok(config)
}

fn validate_master_config(config: &MasterConfig) -> Result<()> {
    debug!("🕵️ Validating master configuration...");
    let capture = &config.capture;
    if capture.color_width == 0 || capture.color_height == 0 {
        bail!("❌ Capture resolution must be non-zero, got {}x{}.", capture.color_width, capture.color_height);
    }
    if capture.color_fps == 0 {
        bail!("❌ Capture color_fps must be non-zero.");
    }
    if !(capture.duration_seconds.is_finite() && capture.duration_seconds > 0.0) {
        bail!("❌ Capture duration_seconds must be positive, got {}.", capture.duration_seconds);
    }
    if !(1..=100).contains(&capture.jpeg_quality) {
        bail!("❌ Capture jpeg_quality must be within 1..=100, got {}.", capture.jpeg_quality);
    }

    let prefix = &config.dataset.camera_prefix;
    if prefix.is_empty() {
        bail!("❌ Dataset camera_prefix cannot be empty.");
    }
    if prefix.contains('/') || prefix.contains('\\') {
        bail!("❌ Dataset camera_prefix '{}' must not contain a path separator.", prefix);
    }

    let calibration = &config.calibration;
    if calibration.camera_model.trim().is_empty() {
        bail!("❌ Calibration camera_model cannot be empty.");
    }
    if calibration.topic_suffix.trim().is_empty() {
        bail!("❌ Calibration topic_suffix cannot be empty.");
    }
    if calibration.command_prefix.trim().is_empty() {
        bail!("❌ Calibration command_prefix cannot be empty.");
    }

    let fleet = &config.fleet;
    if fleet.hosts_file.is_empty() {
        bail!("❌ Fleet hosts_file cannot be empty.");
    }
    if fleet.default_user.is_empty() {
        bail!("❌ Fleet default_user cannot be empty.");
    }
    if fleet.remote_shell.is_empty() || fleet.ssh_program.is_empty() {
        bail!("❌ Fleet remote_shell and ssh_program cannot be empty.");
    }
    debug!("👍 Master configuration validated.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.capture.color_width, 640);
        assert_eq!(config.capture.color_height, 480);
        assert_eq!(config.capture.color_fps, 30);
        assert_eq!(config.capture.warmup_frames, 30);
        assert_eq!(config.capture.duration_seconds, 20.0);
        assert!(config.capture.reset_existing);
        assert_eq!(config.dataset.root, std::path::PathBuf::from("dataset"));
        assert_eq!(config.calibration.camera_model, "pinhole-equi");
        assert_eq!(config.fleet.default_user, "lab");
        assert_eq!(config.fleet.hosts_file, "HOSTS");
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let yaml = "application:\n  log_level: debug\ncapture:\n  duration_seconds: 5\nfleet:\n  default_user: ops\n";
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.app_settings.log_level.as_deref(), Some("debug"));
        assert_eq!(config.capture.duration_seconds, 5.0);
        assert_eq!(config.capture.color_fps, 30);
        assert_eq!(config.fleet.default_user, "ops");
        assert_eq!(config.fleet.remote_shell, "/usr/bin/fish");
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(parse_config("capture:\n  color_fps: 0\n").is_err());
        assert!(parse_config("capture:\n  duration_seconds: -1\n").is_err());
        assert!(parse_config("capture:\n  jpeg_quality: 0\n").is_err());
        assert!(parse_config("dataset:\n  camera_prefix: a/b\n").is_err());
        assert!(parse_config("fleet:\n  default_user: ''\n").is_err());
    }

    #[test]
    fn load_config_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(load_config(missing.to_str().unwrap()).is_err());
    }

    #[test]
    fn load_config_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rcalib.yaml");
        fs::write(&path, "dataset:\n  root: /srv/calib\n").unwrap();
        let config = load_config(path.to_str().unwrap()).unwrap();
        assert_eq!(config.dataset.root, std::path::PathBuf::from("/srv/calib"));
    }
}
