#[cfg(feature = "realsense")]
pub mod realsense_device;

use crate::camera_config::CaptureConfig;
use crate::core::capture_source::FrameSource;
use crate::errors::AppError;

/// The color stream used by `capture-images`.
#[cfg(feature = "realsense")]
pub fn open_color_source(config: &CaptureConfig) -> Result<Box<dyn FrameSource>, AppError> {
    let name = config.serial_number.clone().unwrap_or_else(|| "realsense".to_string());
    Ok(Box::new(realsense_device::RealsenseSource::new(name, config.clone())))
}

#[cfg(not(feature = "realsense"))]
pub fn open_color_source(_config: &CaptureConfig) -> Result<Box<dyn FrameSource>, AppError> {
    Err(AppError::Unsupported(
        "rcalib was built without Realsense support; rebuild with `--features realsense`".to_string(),
    ))
}
