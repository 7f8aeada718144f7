use std::collections::HashSet;

use crate::detection::domain::face_detector::DetectionError;
use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::detection::domain::landmark_detector::LandmarkDetector;
use crate::shared::frame::Frame;
use crate::shared::region::DetectionRegion;

/// Landmark positions as fractions of the face box, origin bottom-left:
/// left eye, right eye, nose, left and right mouth corner.
const FRONTAL_LAYOUT: [(f64, f64); 5] = [
    (0.30, 0.65),
    (0.70, 0.65),
    (0.50, 0.45),
    (0.35, 0.25),
    (0.65, 0.25),
];

/// Places a frontal-face landmark layout inside every face box.
///
/// No model involved: it gives the second detection stage something real
/// to run when no landmark backend is available. Frames listed with
/// [`failing_on`](Self::failing_on) fail, for exercising recovery.
#[derive(Debug, Default)]
pub struct ProportionalLandmarkDetector {
    failures: HashSet<usize>,
}

impl ProportionalLandmarkDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, frames: impl IntoIterator<Item = usize>) -> Self {
        self.failures.extend(frames);
        self
    }
}

fn place(face: &DetectionRegion) -> FaceLandmarks {
    let points = FRONTAL_LAYOUT
        .map(|(fx, fy)| (face.x + fx * face.width, face.y + fy * face.height));
    FaceLandmarks::new(*face, points)
}

impl LandmarkDetector for ProportionalLandmarkDetector {
    fn detect_landmarks(
        &mut self,
        frame: &Frame,
        faces: &[DetectionRegion],
    ) -> Result<Vec<FaceLandmarks>, DetectionError> {
        if self.failures.contains(&frame.index()) {
            return Err(DetectionError::Failed {
                frame_index: frame.index(),
                reason: "scripted landmark failure".into(),
            });
        }
        Ok(faces.iter().map(place).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn frame(index: usize) -> Frame {
        Frame::new(vec![0u8; 4 * 4 * 3], 4, 4, 3, index)
    }

    #[test]
    fn test_one_entry_per_face_in_order() {
        let faces = [
            DetectionRegion::new(0.0, 0.0, 0.5, 0.5),
            DetectionRegion::new(0.5, 0.5, 0.2, 0.4),
        ];
        let mut detector = ProportionalLandmarkDetector::new();

        let landmarks = detector.detect_landmarks(&frame(0), &faces).unwrap();

        assert_eq!(landmarks.len(), 2);
        assert_eq!(landmarks[0].face(), &faces[0]);
        assert_eq!(landmarks[1].face(), &faces[1]);
    }

    #[test]
    fn test_points_sit_inside_their_face() {
        let face = DetectionRegion::new(0.5, 0.5, 0.2, 0.4);
        let mut detector = ProportionalLandmarkDetector::new();

        let landmarks = detector.detect_landmarks(&frame(0), &[face]).unwrap();
        let points = landmarks[0].points();

        assert_relative_eq!(points[0].0, 0.56, epsilon = 1e-12);
        assert_relative_eq!(points[0].1, 0.76, epsilon = 1e-12);
        assert!(points.iter().all(|&(x, y)| {
            (face.x..=face.x + face.width).contains(&x)
                && (face.y..=face.y + face.height).contains(&y)
        }));
        assert_relative_eq!(landmarks[0].profile_ratio(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_listed_frames_fail() {
        let face = DetectionRegion::new(0.1, 0.1, 0.2, 0.2);
        let mut detector = ProportionalLandmarkDetector::new().failing_on([3]);

        assert!(detector.detect_landmarks(&frame(2), &[face]).is_ok());
        let err = detector.detect_landmarks(&frame(3), &[face]).unwrap_err();
        assert!(matches!(err, DetectionError::Failed { frame_index: 3, .. }));
    }
}
