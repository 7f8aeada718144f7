use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::capture::domain::frame_source::{
    CameraPosition, CaptureSetupError, FrameSource, PixelFormat, SourceInfo,
};
use crate::capture::infrastructure::frame_pacer::{frame_interval, FramePacer};
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;

/// Replays the still images of a directory as a live camera feed.
///
/// Images are decoded once at `open` (sorted by file name) and then emitted
/// as RGB frames at `fps`, cycling through the set `loops` times, or
/// forever when no loop count is given. All images must share one size.
pub struct ImageSequenceFrameSource {
    dir: PathBuf,
    fps: f64,
    loops: Option<usize>,
    position: CameraPosition,
    images: Vec<Arc<[u8]>>,
    width: u32,
    height: u32,
    next_index: usize,
    pacer: Option<FramePacer>,
}

impl ImageSequenceFrameSource {
    pub fn new(dir: impl Into<PathBuf>, fps: f64) -> Self {
        Self {
            dir: dir.into(),
            fps,
            loops: None,
            position: CameraPosition::Front,
            images: Vec::new(),
            width: 0,
            height: 0,
            next_index: 0,
            pacer: None,
        }
    }

    pub fn with_loops(mut self, loops: usize) -> Self {
        self.loops = Some(loops);
        self
    }

    pub fn with_position(mut self, position: CameraPosition) -> Self {
        self.position = position;
        self
    }

    fn image_paths(&self) -> Result<Vec<PathBuf>, CaptureSetupError> {
        if !self.dir.is_dir() {
            return Err(CaptureSetupError::DeviceUnavailable(format!(
                "{} is not a directory",
                self.dir.display()
            )));
        }
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_image(p))
            .collect();
        paths.sort();
        if paths.is_empty() {
            return Err(CaptureSetupError::DeviceUnavailable(format!(
                "no images found in {}",
                self.dir.display()
            )));
        }
        Ok(paths)
    }

    fn total_frames(&self) -> Option<usize> {
        self.loops.map(|loops| loops * self.images.len())
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
}

impl FrameSource for ImageSequenceFrameSource {
    fn open(&mut self) -> Result<SourceInfo, CaptureSetupError> {
        let Some(interval) = frame_interval(self.fps) else {
            return Err(CaptureSetupError::InputRejected(format!(
                "unsupported frame rate {}",
                self.fps
            )));
        };

        let paths = self.image_paths()?;
        let mut images = Vec::with_capacity(paths.len());
        let mut size: Option<(u32, u32)> = None;
        for path in &paths {
            let rgb = image::open(path)
                .map_err(|e| {
                    CaptureSetupError::InputRejected(format!("{}: {e}", path.display()))
                })?
                .to_rgb8();
            let dims = rgb.dimensions();
            match size {
                None => size = Some(dims),
                Some(expected) if expected != dims => {
                    return Err(CaptureSetupError::InputRejected(format!(
                        "{} is {}x{}, expected {}x{}",
                        path.display(),
                        dims.0,
                        dims.1,
                        expected.0,
                        expected.1
                    )));
                }
                Some(_) => {}
            }
            images.push(Arc::from(rgb.into_raw()));
        }

        let (width, height) = size.unwrap_or_default();
        log::info!(
            "Replaying {} image(s) of {width}x{height} from {}",
            images.len(),
            self.dir.display()
        );

        self.images = images;
        self.width = width;
        self.height = height;
        self.next_index = 0;
        self.pacer = Some(FramePacer::new(interval));
        Ok(SourceInfo {
            width,
            height,
            fps: self.fps,
            position: self.position,
            pixel_format: PixelFormat::Rgb8,
        })
    }

    fn next_frame(&mut self) -> Option<Frame> {
        if self.images.is_empty() {
            return None;
        }
        if self.total_frames().is_some_and(|total| self.next_index >= total) {
            return None;
        }
        self.pacer.as_mut()?.wait();

        let pixels = Arc::clone(&self.images[self.next_index % self.images.len()]);
        let frame = Frame::from_shared(pixels, self.width, self.height, 3, self.next_index);
        self.next_index += 1;
        Some(frame)
    }

    fn close(&mut self) {
        self.images.clear();
        self.pacer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_image(dir: &Path, name: &str, width: u32, height: u32, value: u8) {
        let mut img = image::RgbImage::new(width, height);
        for pixel in img.pixels_mut() {
            *pixel = image::Rgb([value, value, value]);
        }
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_open_reports_image_size() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.png", 12, 8, 10);

        let mut source = ImageSequenceFrameSource::new(dir.path(), 30.0);
        let info = source.open().unwrap();

        assert_eq!(info.width, 12);
        assert_eq!(info.height, 8);
        assert_eq!(info.pixel_format, PixelFormat::Rgb8);
        assert_eq!(info.position, CameraPosition::Front);
    }

    #[test]
    fn test_frames_follow_file_name_order_and_loop() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "b.png", 4, 4, 20);
        write_image(dir.path(), "a.png", 4, 4, 10);

        let mut source = ImageSequenceFrameSource::new(dir.path(), 1000.0).with_loops(2);
        source.open().unwrap();
        let frames: Vec<Frame> = std::iter::from_fn(|| source.next_frame()).collect();

        assert_eq!(frames.len(), 4);
        let firsts: Vec<u8> = frames.iter().map(|f| f.data()[0]).collect();
        assert_eq!(firsts, vec![10, 20, 10, 20]);
        assert_eq!(frames[3].index(), 3);
        assert_eq!(frames[0].channels(), 3);
    }

    #[test]
    fn test_replayed_frames_share_decoded_pixels() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.png", 4, 4, 10);

        let mut source = ImageSequenceFrameSource::new(dir.path(), 1000.0).with_loops(2);
        source.open().unwrap();
        let first = source.next_frame().unwrap();
        let second = source.next_frame().unwrap();

        assert_eq!(second.index(), 1);
        assert!(std::ptr::eq(first.data().as_ptr(), second.data().as_ptr()));
    }

    #[test]
    fn test_non_image_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "frame.PNG", 4, 4, 1);
        fs::write(dir.path().join("notes.txt"), "not a frame").unwrap();

        let mut source = ImageSequenceFrameSource::new(dir.path(), 1000.0).with_loops(1);
        source.open().unwrap();
        assert!(source.next_frame().is_some());
        assert!(source.next_frame().is_none());
    }

    #[test]
    fn test_missing_directory_is_unavailable() {
        let mut source = ImageSequenceFrameSource::new("/nonexistent/frames", 30.0);
        assert!(matches!(source.open(), Err(CaptureSetupError::DeviceUnavailable(_))));
    }

    #[test]
    fn test_empty_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = ImageSequenceFrameSource::new(dir.path(), 30.0);
        assert!(matches!(source.open(), Err(CaptureSetupError::DeviceUnavailable(_))));
    }

    #[test]
    fn test_mismatched_sizes_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.png", 4, 4, 1);
        write_image(dir.path(), "b.png", 8, 4, 1);

        let mut source = ImageSequenceFrameSource::new(dir.path(), 30.0);
        let err = source.open().unwrap_err();
        assert!(matches!(err, CaptureSetupError::InputRejected(_)));
        assert!(err.to_string().contains("expected 4x4"));
    }

    #[test]
    fn test_undecodable_image_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.jpg"), b"not really a jpeg").unwrap();

        let mut source = ImageSequenceFrameSource::new(dir.path(), 30.0);
        assert!(matches!(source.open(), Err(CaptureSetupError::InputRejected(_))));
    }

    #[test]
    fn test_tiny_fps_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.png", 4, 4, 1);

        let mut source = ImageSequenceFrameSource::new(dir.path(), 1e-30);
        assert!(matches!(source.open(), Err(CaptureSetupError::InputRejected(_))));
    }

    #[test]
    fn test_close_stops_frames() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.png", 4, 4, 1);

        let mut source = ImageSequenceFrameSource::new(dir.path(), 1000.0);
        source.open().unwrap();
        source.close();
        assert!(source.next_frame().is_none());
        source.close();
    }
}
