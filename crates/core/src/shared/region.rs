use serde::{Deserialize, Serialize};

/// A detected face box in the detector's normalized space.
///
/// Unit coordinates in `[0, 1]` with the origin at the bottom-left corner
/// of the frame, the convention platform vision frameworks report in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DetectionRegion {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when the box is non-negative in size and fits the unit square.
    pub fn is_normalized(&self) -> bool {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        in_unit(self.x)
            && in_unit(self.y)
            && self.width >= 0.0
            && self.height >= 0.0
            && self.x + self.width <= 1.0
            && self.y + self.height <= 1.0
    }
}
