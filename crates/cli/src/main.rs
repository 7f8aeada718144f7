use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;

use facecam_core::capture::capture_session::{CaptureConfig, CaptureSession};
use facecam_core::capture::domain::frame_source::{CameraPosition, FrameSource};
use facecam_core::capture::infrastructure::image_sequence_frame_source::ImageSequenceFrameSource;
use facecam_core::capture::infrastructure::synthetic_frame_source::SyntheticFrameSource;
use facecam_core::detection::domain::face_detector::FaceDetector;
use facecam_core::detection::infrastructure::proportional_landmark_detector::ProportionalLandmarkDetector;
use facecam_core::detection::infrastructure::scripted_face_detector::{
    DetectionScript, ScriptedFaceDetector,
};
use facecam_core::detection::infrastructure::two_stage_face_detector::TwoStageFaceDetector;
use facecam_core::overlay::infrastructure::log_overlay_renderer::LogOverlayRenderer;
use facecam_core::overlay::overlay_channel::{ui_channel, Delivery};
use facecam_core::pipeline::frame_pipeline::FramePipeline;
use facecam_core::pipeline::infrastructure::inline_detection_executor::InlineDetectionExecutor;
use facecam_core::pipeline::infrastructure::worker_detection_executor::WorkerDetectionExecutor;
use facecam_core::pipeline::pipeline_logger::LogPipelineLogger;
use facecam_core::shared::constants::{
    DEFAULT_CAPTURE_FPS, DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH, DEFAULT_VIEWPORT_HEIGHT,
    DEFAULT_VIEWPORT_WIDTH,
};
use facecam_core::shared::frame::Orientation;
use facecam_core::shared::screen_rect::Viewport;

const UI_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Live face overlay over a simulated camera feed.
#[derive(Parser)]
#[command(name = "facecam")]
struct Cli {
    /// Replay the images of this directory instead of blank synthetic frames.
    #[arg(long)]
    frames_dir: Option<PathBuf>,

    /// Synthetic frame width in pixels.
    #[arg(long, default_value_t = DEFAULT_FRAME_WIDTH)]
    width: u32,

    /// Synthetic frame height in pixels.
    #[arg(long, default_value_t = DEFAULT_FRAME_HEIGHT)]
    height: u32,

    /// Capture rate in frames per second.
    #[arg(long, default_value_t = DEFAULT_CAPTURE_FPS)]
    fps: f64,

    /// Number of synthetic frames to capture.
    #[arg(long, default_value = "300")]
    frame_count: usize,

    /// Times to cycle through --frames-dir.
    #[arg(long, default_value = "1")]
    loops: usize,

    /// JSON detection script to replay (no faces if omitted).
    #[arg(long)]
    script: Option<PathBuf>,

    /// Simulated detector latency, overriding the script's value.
    #[arg(long)]
    latency_ms: Option<u64>,

    /// Overlay viewport size in points, as WIDTHxHEIGHT.
    #[arg(
        long,
        default_value_t = format!("{DEFAULT_VIEWPORT_WIDTH}x{DEFAULT_VIEWPORT_HEIGHT}")
    )]
    viewport: String,

    /// Locate facial landmarks in every frame where faces were found.
    #[arg(long)]
    landmarks: bool,

    /// Run detection on the capture thread instead of a dedicated worker.
    #[arg(long)]
    inline: bool,

    /// Use the back camera (frames are not mirrored).
    #[arg(long)]
    back_camera: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;
    let viewport = parse_viewport(&cli.viewport)?;

    let pipeline = build_pipeline(&cli)?;
    let (dispatcher, mut receiver) = ui_channel(viewport);
    pipeline.set_result_handler(dispatcher.into_result_handler());

    let config = capture_config(cli.back_camera);
    let session = CaptureSession::start(build_source(&cli), pipeline.clone(), config)?;
    pipeline.info(&format!(
        "Overlay viewport {}x{}, detection {}",
        viewport.width,
        viewport.height,
        if cli.inline {
            "inline"
        } else {
            "on worker thread"
        }
    ));

    let mut renderer = LogOverlayRenderer::new();
    while !session.is_finished() {
        let delivery = receiver.deliver_timeout(&mut renderer, UI_POLL_INTERVAL);
        if delivery == Delivery::Disconnected {
            break;
        }
    }

    let pipeline = session
        .join()
        .ok_or("capture thread terminated unexpectedly")?;
    pipeline.shutdown();
    receiver.deliver_pending(&mut renderer);

    pipeline.summary();
    let stats = pipeline.stats();
    log::info!(
        "Frames: {} submitted, {} dropped, {} processed ({} failed); {} overlay updates",
        stats.submitted,
        stats.dropped,
        stats.processed,
        stats.failed,
        receiver.delivered()
    );
    Ok(())
}

fn build_pipeline(cli: &Cli) -> Result<FramePipeline, Box<dyn std::error::Error>> {
    let mut script = match &cli.script {
        Some(path) => {
            log::info!("Loading detection script: {}", path.display());
            DetectionScript::load(path)?
        }
        None => DetectionScript::default(),
    };
    if let Some(latency_ms) = cli.latency_ms {
        script.latency_ms = latency_ms;
    }

    let landmark_failures = script.landmark_failures.clone();
    let faces: Box<dyn FaceDetector> = Box::new(ScriptedFaceDetector::new(script));
    let detector: Box<dyn FaceDetector> = if cli.landmarks {
        let landmarks = ProportionalLandmarkDetector::new().failing_on(landmark_failures);
        Box::new(TwoStageFaceDetector::new(faces, Box::new(landmarks)))
    } else {
        faces
    };

    let builder = FramePipeline::builder(detector)
        .logger(Box::new(LogPipelineLogger::default()));
    let builder = if cli.inline {
        builder.executor(InlineDetectionExecutor)
    } else {
        builder.executor(WorkerDetectionExecutor::new()?)
    };
    Ok(builder.build())
}

fn build_source(cli: &Cli) -> Box<dyn FrameSource> {
    let position = camera_position(cli.back_camera);
    match &cli.frames_dir {
        Some(dir) => Box::new(
            ImageSequenceFrameSource::new(dir, cli.fps)
                .with_loops(cli.loops)
                .with_position(position),
        ),
        None => Box::new(
            SyntheticFrameSource::new(cli.width, cli.height, cli.fps)
                .with_frame_limit(cli.frame_count)
                .with_position(position),
        ),
    }
}

fn camera_position(back_camera: bool) -> CameraPosition {
    if back_camera {
        CameraPosition::Back
    } else {
        CameraPosition::Front
    }
}

fn capture_config(back_camera: bool) -> CaptureConfig {
    if back_camera {
        CaptureConfig {
            position: CameraPosition::Back,
            orientation: Orientation::Right,
            ..CaptureConfig::default()
        }
    } else {
        CaptureConfig::default()
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(dir) = &cli.frames_dir {
        if !dir.is_dir() {
            return Err(format!("Frames directory not found: {}", dir.display()).into());
        }
    }
    if let Some(script) = &cli.script {
        if !script.is_file() {
            return Err(format!("Detection script not found: {}", script.display()).into());
        }
    }
    if !(cli.fps.is_finite() && cli.fps > 0.0) {
        return Err(format!("FPS must be a positive number, got {}", cli.fps).into());
    }
    if cli.loops == 0 {
        return Err("Loops must be at least 1".into());
    }
    Ok(())
}

fn parse_viewport(value: &str) -> Result<Viewport, String> {
    let invalid = || format!("Viewport must be WIDTHxHEIGHT, got '{value}'");
    let (w, h) = value.split_once(['x', 'X']).ok_or_else(invalid)?;
    let width: f64 = w.trim().parse().map_err(|_| invalid())?;
    let height: f64 = h.trim().parse().map_err(|_| invalid())?;
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(format!("Viewport dimensions must be positive, got '{value}'"));
    }
    Ok(Viewport::new(width, height))
}
