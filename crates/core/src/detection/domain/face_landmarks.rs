use crate::shared::region::DetectionRegion;

const LEFT_EYE: usize = 0;
const RIGHT_EYE: usize = 1;
const NOSE: usize = 2;

/// Centroid weights: [left_eye, right_eye, nose, left_mouth, right_mouth].
const WEIGHTS: [f64; 5] = [2.0, 2.0, 3.0, 1.0, 1.0];

/// Five facial landmarks of one detected face, in the same unit,
/// bottom-left-origin coordinates as the face's [`DetectionRegion`].
#[derive(Clone, Debug, PartialEq)]
pub struct FaceLandmarks {
    face: DetectionRegion,
    points: [(f64, f64); 5],
}

impl FaceLandmarks {
    /// `points` in order: left eye, right eye, nose, left and right mouth corner.
    pub fn new(face: DetectionRegion, points: [(f64, f64); 5]) -> Self {
        Self { face, points }
    }

    pub fn face(&self) -> &DetectionRegion {
        &self.face
    }

    pub fn points(&self) -> &[(f64, f64); 5] {
        &self.points
    }

    /// Weighted centroid, nose-heavy so it stays put as the head turns.
    pub fn center(&self) -> (f64, f64) {
        let total: f64 = WEIGHTS.iter().sum();
        let (sx, sy) = self
            .points
            .iter()
            .zip(WEIGHTS)
            .fold((0.0, 0.0), |(sx, sy), ((x, y), w)| (sx + x * w, sy + y * w));
        (sx / total, sy / total)
    }

    /// 0.0 for a frontal face up to 1.0 for a full profile: nose offset from
    /// the eye midpoint relative to the eye span.
    pub fn profile_ratio(&self) -> f64 {
        let eye_span = (self.points[RIGHT_EYE].0 - self.points[LEFT_EYE].0).abs();
        if eye_span <= 0.0 {
            return 0.0;
        }
        let eye_mid = (self.points[LEFT_EYE].0 + self.points[RIGHT_EYE].0) / 2.0;
        ((self.points[NOSE].0 - eye_mid).abs() / eye_span).min(1.0)
    }
}
