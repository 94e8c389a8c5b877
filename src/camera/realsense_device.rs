use crate::camera_config::CaptureConfig;
use crate::core::capture_source::{CapturedFrame, FrameSource};
use crate::errors::AppError;
use log::{debug, info, warn};
use realsense_rust::{
    config::Config as RsConfig,
    context::Context as RsContext,
    frame::{ColorFrame, CompositeFrame, FrameEx},
    kind::{Rs2CameraInfo, Rs2Format, Rs2StreamKind},
    pipeline::{ActivePipeline as RsActivePipeline, InactivePipeline as RsInactivePipeline},
};
use std::collections::HashSet;
use std::ffi::CString;

/// Color stream of one Realsense device, BGR8 at the configured resolution.
pub struct RealsenseSource {
    name: String,
    config: CaptureConfig,
    // Declared before the context so the pipeline is dropped first.
    pipeline: Option<RsActivePipeline>,
    context: Option<RsContext>,
}

impl RealsenseSource {
    pub fn new(name: String, config: CaptureConfig) -> Self {
        Self { name, config, pipeline: None, context: None }
    }

    fn resolve_serial(&self, context: &RsContext) -> Result<String, AppError> {
        let device_list = context.query_devices(HashSet::new());
        if device_list.is_empty() {
            return Err(AppError::Device(format!("RS [{}]: No Realsense devices found.", self.name)));
        }

        let serial_of = |dev: &realsense_rust::device::Device| -> Option<String> {
            dev.info(Rs2CameraInfo::SerialNumber)
                .and_then(|cstr| cstr.to_str().ok())
                .map(str::to_string)
        };

        match &self.config.serial_number {
            Some(wanted) => {
                info!("RS [{}]: Searching for device S/N: {}", self.name, wanted);
                device_list
                    .iter()
                    .filter_map(serial_of)
                    .find(|sn| sn == wanted)
                    .ok_or_else(|| AppError::Device(format!("RS [{}]: Specified device S/N '{}' not found.", self.name, wanted)))
            }
            None => {
                info!("RS [{}]: No S/N specified, using first available device.", self.name);
                device_list
                    .first()
                    .and_then(serial_of)
                    .ok_or_else(|| AppError::Device(format!("RS [{}]: Failed to read S/N of first available device", self.name)))
            }
        }
    }
}

impl FrameSource for RealsenseSource {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn start(&mut self) -> Result<(), AppError> {
        let context = RsContext::new()
            .map_err(|e| AppError::Device(format!("RS: Failed to create Realsense context: {}", e)))?;
        let serial = self.resolve_serial(&context)?;

        let inactive_pipeline = RsInactivePipeline::try_from(&context)
            .map_err(|e| AppError::Device(format!("RS: Failed to create inactive pipeline from context: {}", e)))?;

        let mut rs_config = RsConfig::new();
        let c_serial = CString::new(serial.clone())
            .map_err(|e| AppError::Device(format!("RS [{}]: Invalid serial '{}': {}", self.name, serial, e)))?;
        rs_config
            .enable_device_from_serial(c_serial.as_c_str())
            .map_err(|e| AppError::Device(format!("RS [{}]: Failed to enable device S/N '{}': {}", self.name, serial, e)))?;
        rs_config
            .disable_all_streams()
            .map_err(|e| AppError::Device(format!("RS: Failed to disable all streams in config: {}", e)))?;

        let (w, h, fps) = (self.config.color_width, self.config.color_height, self.config.color_fps);
        rs_config
            .enable_stream(Rs2StreamKind::Color, None, w as usize, h as usize, Rs2Format::Bgr8, fps as usize)
            .map_err(|e| AppError::Device(format!("RS [{}]: Failed to enable color stream ({}x{}@{} BGR8): {}", self.name, w, h, fps, e)))?;
        info!("RS [{}]: Color stream configured ({}x{}@{}fps BGR8).", self.name, w, h, fps);

        info!("RS [{}]: Starting pipeline for S/N {}...", self.name, serial);
        let active_pipeline = inactive_pipeline
            .start(Some(rs_config))
            .map_err(|e| AppError::Device(format!("RS: Failed to start pipeline: {}", e)))?;
        self.pipeline = Some(active_pipeline);
        self.context = Some(context);
        Ok(())
    }

    fn next_frame(&mut self) -> Result<CapturedFrame, AppError> {
        let pipeline = self
            .pipeline
            .as_mut()
            .ok_or_else(|| AppError::Capture(format!("RS [{}]: Pipeline is not started", self.name)))?;

        let frameset: CompositeFrame = pipeline
            .wait(None)
            .map_err(|e| AppError::Capture(format!("RS [{}]: Wait for frames failed: {}", self.name, e)))?;

        let color_frames: Vec<ColorFrame> = frameset.frames_of_type::<ColorFrame>();
        let color_frame = color_frames
            .first()
            .ok_or_else(|| AppError::Capture(format!("RS [{}]: Frameset contained no color frame", self.name)))?;

        let width = color_frame.width() as u32;
        let height = color_frame.height() as u32;
        let bpp = color_frame.bits_per_pixel() / 8;
        if bpp != 3 {
            return Err(AppError::Capture(format!("RS [{}]: Color frame BPP is {}, expected 3 (BGR8).", self.name, bpp)));
        }
        let data_size = width as usize * height as usize * bpp;
        let raw_data_ptr: *const std::os::raw::c_void = unsafe { color_frame.get_data() };
        let bgr = unsafe { std::slice::from_raw_parts(raw_data_ptr as *const u8, data_size) };

        let mut rgb = Vec::with_capacity(data_size);
        for chunk in bgr.chunks_exact(3) {
            rgb.extend_from_slice(&[chunk[2], chunk[1], chunk[0]]);
        }

        Ok(CapturedFrame { timestamp: color_frame.timestamp(), width, height, rgb })
    }

    fn stop(&mut self) {
        match self.pipeline.take() {
            Some(pipeline) => {
                info!("RS [{}]: Stopping pipeline...", self.name);
                let _inactive = pipeline.stop();
                debug!("RS [{}]: Pipeline stopped.", self.name);
            }
            None => warn!("RS [{}]: Stop requested but pipeline was never started.", self.name),
        }
        self.context = None;
    }
}
