use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::detection::domain::face_detector::{DetectionError, FaceDetector};
use crate::shared::frame::Frame;
use crate::shared::region::DetectionRegion;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read detection script {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid detection script: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Per-frame detections to replay, as stored on disk.
///
/// ```json
/// { "frames": [[{"x": 0.3, "y": 0.4, "width": 0.2, "height": 0.25}], []],
///   "failures": [7],
///   "latency_ms": 50,
///   "landmark_failures": [3] }
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DetectionScript {
    #[serde(default)]
    pub frames: Vec<Vec<DetectionRegion>>,
    #[serde(default)]
    pub failures: Vec<usize>,
    #[serde(default)]
    pub latency_ms: u64,
    /// Frames on which a landmark stage, when one runs, should fail.
    #[serde(default)]
    pub landmark_failures: Vec<usize>,
}

impl DetectionScript {
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let json = fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

/// Replays scripted detection results by frame index.
///
/// Stands in for a platform vision model: frame `i` yields
/// `frames[i % frames.len()]`, frames listed in `failures` fail, and every
/// call blocks for `latency_ms` so a slow detector can be simulated.
pub struct ScriptedFaceDetector {
    frames: Vec<Vec<DetectionRegion>>,
    failures: HashSet<usize>,
    latency: Duration,
}

impl ScriptedFaceDetector {
    pub fn new(script: DetectionScript) -> Self {
        let outside = script
            .frames
            .iter()
            .flatten()
            .filter(|r| !r.is_normalized())
            .count();
        if outside > 0 {
            log::warn!("Detection script contains {outside} regions outside the unit square");
        }
        Self {
            frames: script.frames,
            failures: script.failures.into_iter().collect(),
            latency: Duration::from_millis(script.latency_ms),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ScriptError> {
        Ok(Self::new(DetectionScript::load(path)?))
    }
}

impl FaceDetector for ScriptedFaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<DetectionRegion>, DetectionError> {
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }

        let index = frame.index();
        if self.failures.contains(&index) {
            return Err(DetectionError::Failed {
                frame_index: index,
                reason: "scripted failure".into(),
            });
        }

        if self.frames.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.frames[index % self.frames.len()].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn frame(index: usize) -> Frame {
        Frame::new(vec![0u8; 4 * 4 * 3], 4, 4, 3, index)
    }

    fn face(x: f64) -> DetectionRegion {
        DetectionRegion::new(x, 0.2, 0.3, 0.3)
    }

    fn script(frames: Vec<Vec<DetectionRegion>>, failures: Vec<usize>) -> DetectionScript {
        DetectionScript {
            frames,
            failures,
            ..DetectionScript::default()
        }
    }

    #[test]
    fn test_replays_regions_by_frame_index() {
        let mut detector = ScriptedFaceDetector::new(script(
            vec![vec![face(0.1)], vec![face(0.2), face(0.5)]],
            vec![],
        ));

        assert_eq!(detector.detect(&frame(0)).unwrap(), vec![face(0.1)]);
        assert_eq!(detector.detect(&frame(1)).unwrap(), vec![face(0.2), face(0.5)]);
    }

    #[test]
    fn test_cycles_through_script() {
        let mut detector = ScriptedFaceDetector::new(script(vec![vec![face(0.1)], vec![]], vec![]));

        assert_eq!(detector.detect(&frame(4)).unwrap(), vec![face(0.1)]);
        assert!(detector.detect(&frame(5)).unwrap().is_empty());
    }

    #[test]
    fn test_empty_script_detects_nothing() {
        let mut detector = ScriptedFaceDetector::new(DetectionScript::default());
        assert!(detector.detect(&frame(3)).unwrap().is_empty());
    }

    #[test]
    fn test_listed_frames_fail() {
        let mut detector = ScriptedFaceDetector::new(script(vec![vec![face(0.1)]], vec![2]));

        assert!(detector.detect(&frame(1)).is_ok());
        let err = detector.detect(&frame(2)).unwrap_err();
        assert!(matches!(err, DetectionError::Failed { frame_index: 2, .. }));
        assert!(detector.detect(&frame(3)).is_ok());
    }

    #[test]
    fn test_parses_json_with_defaults() {
        let json = r#"{"frames": [[{"x":0.1,"y":0.2,"width":0.3,"height":0.4}]]}"#;
        let parsed = DetectionScript::from_json(json).unwrap();
        assert_eq!(parsed.frames.len(), 1);
        assert!(parsed.failures.is_empty());
        assert_eq!(parsed.latency_ms, 0);
        assert!(parsed.landmark_failures.is_empty());
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = DetectionScript::from_json("{\"frames\": 3}").unwrap_err();
        assert!(matches!(err, ScriptError::Parse(_)));
    }

    #[test]
    fn test_from_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"frames": [[], [{{"x":0.5,"y":0.5,"width":0.1,"height":0.1}}]], "failures": [0]}}"#
        )
        .unwrap();

        let mut detector = ScriptedFaceDetector::from_path(file.path()).unwrap();
        assert!(detector.detect(&frame(0)).is_err());
        assert_eq!(detector.detect(&frame(1)).unwrap().len(), 1);
    }

    #[test]
    fn test_from_path_missing_file_is_io_error() {
        let result = ScriptedFaceDetector::from_path(Path::new("/nonexistent/script.json"));
        assert!(matches!(result, Err(ScriptError::Io { .. })));
    }
}
