use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CaptureConfig {
    pub serial_number: Option<String>, // first device found when unset
    pub color_width: u32,
    pub color_height: u32,
    pub color_fps: u32,
    pub warmup_frames: u32,
    pub duration_seconds: f64,
    pub jpeg_quality: u8,
    pub reset_existing: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        CaptureConfig {
            serial_number: None,
            color_width: 640,
            color_height: 480,
            color_fps: 30,
            warmup_frames: 30,
            duration_seconds: 20.0,
            jpeg_quality: 95,
            reset_existing: true,
        }
    }
}
