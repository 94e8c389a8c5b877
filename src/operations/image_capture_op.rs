use crate::camera;
use crate::camera_config::CaptureConfig;
use crate::common::{file_utils, timestamp_utils};
use crate::config_loader::MasterConfig;
use crate::core::capture_source::{CapturedFrame, FrameSource};
use crate::errors::AppError;
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use log::{debug, error, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct CaptureSummary {
    pub warmup_discarded: u32,
    pub frames_written: usize,
    pub files: Vec<PathBuf>, // in capture order; repeats when timestamps collide
}

pub async fn handle_capture_images_cli(master_config: &MasterConfig, args: &ArgMatches) -> Result<()> {
    let op_start_time = Instant::now();
    let folder = args
        .get_one::<String>("folder")
        .context("Missing FOLDER argument for capture-images")?;

    let mut capture_config = master_config.capture.clone();
    if let Some(serial) = args.get_one::<String>("serial") {
        capture_config.serial_number = Some(serial.clone());
    }
    let reset = capture_config.reset_existing && !args.get_flag("keep-existing");
    debug!("Capture images CLI: folder: {}, reset: {}, config: {:?}", folder, reset, capture_config);

    let output_dir = PathBuf::from(folder);
    info!(
        "📸 Capturing {}x{}@{}fps for {}s after {} warm-up frames into {}",
        capture_config.color_width,
        capture_config.color_height,
        capture_config.color_fps,
        capture_config.duration_seconds,
        capture_config.warmup_frames,
        output_dir.display()
    );

    // Device handles are not Send, so the source lives entirely on the blocking thread.
    let task_dir = output_dir.clone();
    let summary = tokio::task::spawn_blocking(move || -> Result<CaptureSummary, AppError> {
        let mut source = camera::open_color_source(&capture_config)?;
        run_capture_session(source.as_mut(), &capture_config, &task_dir, reset)
    })
    .await
    .map_err(|e| anyhow!("Capture task panicked: {}", e))?;

    match summary {
        Ok(summary) => {
            info!(
                "✅ Wrote {} frame(s) to {} in {:?} ({} warm-up frames discarded).",
                summary.frames_written,
                output_dir.display(),
                op_start_time.elapsed(),
                summary.warmup_discarded
            );
            println!("done");
            Ok(())
        }
        Err(e) => {
            error!("❌ Image capture into '{}' failed after {:?}: {}", output_dir.display(), op_start_time.elapsed(), e);
            Err(e.into())
        }
    }
}

/// Starts `source`, then prepares `output_dir` (emptying it when `reset` is
/// set), throws away the warm-up frames and writes every frame delivered
/// within `duration_seconds` (measured from the end of warm-up) as
/// `<timestamp>.jpg`. The folder is only touched once the stream is running,
/// and the stream is stopped on every exit path after that.
pub fn run_capture_session(
    source: &mut dyn FrameSource,
    config: &CaptureConfig,
    output_dir: &Path,
    reset: bool,
) -> Result<CaptureSummary, AppError> {
    info!("🎥 Starting color stream '{}'", source.name());
    source.start()?;
    let result = file_utils::prepare_output_folder(output_dir, reset)
        .and_then(|dir| capture_frames(source, config, &dir));
    source.stop();
    result
}

fn capture_frames(
    source: &mut dyn FrameSource,
    config: &CaptureConfig,
    output_dir: &Path,
) -> Result<CaptureSummary, AppError> {
    let mut summary = CaptureSummary::default();

    let warmup_start = Instant::now();
    for _ in 0..config.warmup_frames {
        source.next_frame()?;
        summary.warmup_discarded += 1;
    }
    debug!("Discarded {} warm-up frames in {:?}", summary.warmup_discarded, warmup_start.elapsed());

    let duration = Duration::from_secs_f64(config.duration_seconds);
    let start_time = Instant::now();
    while start_time.elapsed() < duration {
        let frame = source.next_frame()?;
        let path = save_frame(&frame, output_dir, config.jpeg_quality)?;
        debug!("  Saved {}", path.display());
        summary.frames_written += 1;
        summary.files.push(path);
    }
    Ok(summary)
}

/// Encodes `frame` as JPEG at `<output_dir>/<timestamp>.jpg`, replacing any
/// file of the same name.
pub fn save_frame(frame: &CapturedFrame, output_dir: &Path, jpeg_quality: u8) -> Result<PathBuf, AppError> {
    let expected = frame.width as usize * frame.height as usize * 3;
    if frame.rgb.len() != expected {
        return Err(AppError::Capture(format!(
            "Frame buffer holds {} bytes, expected {} for {}x{} RGB8",
            frame.rgb.len(),
            expected,
            frame.width,
            frame.height
        )));
    }

    let path = output_dir.join(format!("{}.jpg", timestamp_utils::frame_timestamp_stem(frame.timestamp)));
    let file = File::create(&path)
        .map_err(|e| AppError::Io(format!("Failed to create '{}': {}", path.display(), e)))?;
    let mut writer = BufWriter::new(file);
    JpegEncoder::new_with_quality(&mut writer, jpeg_quality)
        .encode(&frame.rgb, frame.width, frame.height, ExtendedColorType::Rgb8)
        .map_err(|e| AppError::Io(format!("Failed to encode JPEG '{}': {}", path.display(), e)))?;
    writer
        .flush()
        .map_err(|e| AppError::Io(format!("Failed to write '{}': {}", path.display(), e)))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct FakeSource {
        next_timestamp: f64,
        step: f64,
        delay: Duration,
        delivered: usize,
        fail_at: Option<usize>,
        start_error: bool,
        started: bool,
        stopped: bool,
    }

    impl FakeSource {
        fn new(step: f64, delay: Duration) -> Self {
            FakeSource {
                next_timestamp: 1_000.0,
                step,
                delay,
                delivered: 0,
                fail_at: None,
                start_error: false,
                started: false,
                stopped: false,
            }
        }
    }

    impl FrameSource for FakeSource {
        fn name(&self) -> String {
            "fake".to_string()
        }

        fn start(&mut self) -> Result<(), AppError> {
            if self.start_error {
                return Err(AppError::Device("no device connected".to_string()));
            }
            self.started = true;
            Ok(())
        }

        fn next_frame(&mut self) -> Result<CapturedFrame, AppError> {
            if self.fail_at == Some(self.delivered) {
                return Err(AppError::Capture("device unplugged".to_string()));
            }
            std::thread::sleep(self.delay);
            let frame = CapturedFrame {
                timestamp: self.next_timestamp,
                width: 4,
                height: 2,
                rgb: vec![128; 4 * 2 * 3],
            };
            self.next_timestamp += self.step;
            self.delivered += 1;
            Ok(frame)
        }

        fn stop(&mut self) {
            self.stopped = true;
        }
    }

    fn test_config(warmup_frames: u32, duration_seconds: f64) -> CaptureConfig {
        CaptureConfig { warmup_frames, duration_seconds, ..CaptureConfig::default() }
    }

    fn jpg_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn writes_every_frame_after_warmup() {
        let tmp = tempfile::tempdir().unwrap();
        let mut source = FakeSource::new(32.5, Duration::from_millis(2));
        let summary = run_capture_session(&mut source, &test_config(5, 0.06), tmp.path(), false).unwrap();

        assert!(source.started && source.stopped);
        assert_eq!(summary.warmup_discarded, 5);
        assert!(summary.frames_written > 0);
        assert_eq!(summary.frames_written, source.delivered - 5);
        assert_eq!(jpg_names(tmp.path()).len(), summary.frames_written);

        // The first warm-up frame (timestamp 1000.0) is never persisted.
        assert!(!tmp.path().join("1000000000.jpg").exists());
        let first_kept = format!("{}.jpg", timestamp_utils::frame_timestamp_stem(1_000.0 + 5.0 * 32.5));
        assert_eq!(summary.files[0], tmp.path().join(first_kept));
    }

    #[test]
    fn filenames_are_numeric_and_follow_capture_order() {
        let tmp = tempfile::tempdir().unwrap();
        let mut source = FakeSource::new(33.333, Duration::from_millis(1));
        let summary = run_capture_session(&mut source, &test_config(0, 0.03), tmp.path(), false).unwrap();

        let stems: Vec<u128> = summary
            .files
            .iter()
            .map(|p| p.file_stem().unwrap().to_str().unwrap().parse::<u128>().unwrap())
            .collect();
        assert!(stems.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn colliding_timestamps_overwrite_silently() {
        let tmp = tempfile::tempdir().unwrap();
        let mut source = FakeSource::new(0.0, Duration::from_millis(2));
        let summary = run_capture_session(&mut source, &test_config(0, 0.03), tmp.path(), false).unwrap();

        assert!(summary.frames_written > 1);
        assert_eq!(jpg_names(tmp.path()), vec!["1000000000.jpg"]);
    }

    #[test]
    fn read_failure_propagates_and_stops_stream() {
        let tmp = tempfile::tempdir().unwrap();
        let mut source = FakeSource::new(10.0, Duration::from_millis(1));
        source.fail_at = Some(2);
        let result = run_capture_session(&mut source, &test_config(5, 1.0), tmp.path(), false);

        assert!(matches!(result, Err(AppError::Capture(_))));
        assert!(source.stopped);
        assert!(jpg_names(tmp.path()).is_empty());
    }

    #[test]
    fn rerun_leaves_only_new_files() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("999.jpg"), b"stale").unwrap();

        let mut source = FakeSource::new(33.333, Duration::from_millis(2));
        let summary = run_capture_session(&mut source, &test_config(1, 0.02), tmp.path(), true).unwrap();

        assert!(!tmp.path().join("999.jpg").exists());
        assert_eq!(jpg_names(tmp.path()).len(), summary.frames_written);
    }

    #[test]
    fn failed_start_leaves_existing_files() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("prior.jpg"), b"keep me").unwrap();

        let mut source = FakeSource::new(33.333, Duration::from_millis(1));
        source.start_error = true;
        let result = run_capture_session(&mut source, &test_config(0, 0.02), tmp.path(), true);

        assert!(matches!(result, Err(AppError::Device(_))));
        assert!(!source.stopped);
        assert_eq!(fs::read(tmp.path().join("prior.jpg")).unwrap(), b"keep me");
    }

    #[cfg(not(feature = "realsense"))]
    #[tokio::test]
    async fn unsupported_build_does_not_reset_folder() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("prior.jpg"), b"keep me").unwrap();
        let folder = tmp.path().to_string_lossy().into_owned();

        let matches = crate::cli::build_cli()
            .try_get_matches_from(["rcalib", "capture-images", folder.as_str()])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        let err = handle_capture_images_cli(&MasterConfig::default(), sub).await.unwrap_err();

        assert!(matches!(err.downcast_ref::<AppError>(), Some(AppError::Unsupported(_))));
        assert_eq!(fs::read(tmp.path().join("prior.jpg")).unwrap(), b"keep me");
    }

    #[test]
    fn rejects_short_buffer() {
        let tmp = tempfile::tempdir().unwrap();
        let frame = CapturedFrame { timestamp: 1.0, width: 4, height: 4, rgb: vec![0; 10] };
        assert!(matches!(save_frame(&frame, tmp.path(), 90), Err(AppError::Capture(_))));
    }
}
