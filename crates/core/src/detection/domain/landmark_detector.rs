use crate::detection::domain::face_detector::DetectionError;
use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::shared::frame::Frame;
use crate::shared::region::DetectionRegion;

/// Second detection stage: locates landmarks inside faces already found on
/// the same frame.
///
/// Only called with a non-empty `faces` slice. Returns at most one entry per
/// face, in the order of `faces`.
pub trait LandmarkDetector: Send {
    fn detect_landmarks(
        &mut self,
        frame: &Frame,
        faces: &[DetectionRegion],
    ) -> Result<Vec<FaceLandmarks>, DetectionError>;
}
