use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ApplicationConfig {
    pub log_level: Option<String>, // CLI --debug takes precedence
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatasetConfig {
    pub root: PathBuf,
    pub camera_prefix: String, // renamed dirs become {prefix}{rank}
}

impl Default for DatasetConfig {
    fn default() -> Self {
        DatasetConfig {
            root: PathBuf::from("dataset"),
            camera_prefix: "cam".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CalibrationConfig {
    pub command_prefix: String,
    pub camera_model: String,
    pub bag_path: String,
    pub target_path: String,
    pub topic_suffix: String,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        CalibrationConfig {
            command_prefix: "rosrun kalibr kalibr_calibrate_cameras".to_string(),
            camera_model: "pinhole-equi".to_string(),
            bag_path: "/data/dataset.bag".to_string(),
            target_path: "/data/custom.yaml".to_string(),
            topic_suffix: "image_raw".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FleetConfig {
    /// Directory that script paths and the host list are resolved against.
    /// Defaults to the directory holding the running executable.
    pub base_dir: Option<PathBuf>,
    pub hosts_file: String,
    pub default_user: String,
    pub remote_shell: String,
    pub ssh_program: String,
}

impl Default for FleetConfig {
    fn default() -> Self {
        FleetConfig {
            base_dir: None,
            hosts_file: "HOSTS".to_string(),
            default_user: "lab".to_string(),
            remote_shell: "/usr/bin/fish".to_string(),
            ssh_program: "ssh".to_string(),
        }
    }
}
