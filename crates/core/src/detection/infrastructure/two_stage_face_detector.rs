use crate::detection::domain::face_detector::{DetectionError, FaceDetector};
use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::detection::domain::landmark_detector::LandmarkDetector;
use crate::shared::frame::Frame;
use crate::shared::region::DetectionRegion;

/// Receives the landmarks of each frame on which the second stage succeeded.
pub type LandmarkHandler = Box<dyn FnMut(usize, &[FaceLandmarks]) + Send>;

/// Face rectangles first, then landmarks for the faces found.
///
/// The landmark stage is skipped when no face was found. Its failure is
/// logged and recovered: the rectangles of the first stage are still
/// returned. A failing first stage fails the whole call.
pub struct TwoStageFaceDetector {
    faces: Box<dyn FaceDetector>,
    landmarks: Box<dyn LandmarkDetector>,
    on_landmarks: Option<LandmarkHandler>,
    last_landmarks: Vec<FaceLandmarks>,
}

impl TwoStageFaceDetector {
    pub fn new(faces: Box<dyn FaceDetector>, landmarks: Box<dyn LandmarkDetector>) -> Self {
        Self {
            faces,
            landmarks,
            on_landmarks: None,
            last_landmarks: Vec::new(),
        }
    }

    pub fn with_landmark_handler(mut self, handler: LandmarkHandler) -> Self {
        self.on_landmarks = Some(handler);
        self
    }

    /// Landmarks from the most recent call; empty if it found no faces or
    /// the landmark stage failed.
    pub fn last_landmarks(&self) -> &[FaceLandmarks] {
        &self.last_landmarks
    }

    fn run_landmarks(&mut self, frame: &Frame, faces: &[DetectionRegion]) {
        match self.landmarks.detect_landmarks(frame, faces) {
            Ok(landmarks) => {
                for lm in &landmarks {
                    log::debug!(
                        "Frame {}: landmarks for face at ({:.3}, {:.3}), center {:?}",
                        frame.index(),
                        lm.face().x,
                        lm.face().y,
                        lm.center()
                    );
                }
                if let Some(handler) = self.on_landmarks.as_mut() {
                    handler(frame.index(), &landmarks);
                }
                self.last_landmarks = landmarks;
            }
            Err(e) => log::warn!("Landmark detection failed, keeping face rectangles: {e}"),
        }
    }
}

impl FaceDetector for TwoStageFaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<DetectionRegion>, DetectionError> {
        self.last_landmarks.clear();
        let faces = self.faces.detect(frame)?;
        if !faces.is_empty() {
            self.run_landmarks(frame, &faces);
        }
        Ok(faces)
    }
}
