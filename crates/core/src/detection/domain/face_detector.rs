use thiserror::Error;

use crate::shared::frame::Frame;
use crate::shared::region::DetectionRegion;

/// A single detection call failed. Recovered per frame by the pipeline.
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("face detection failed on frame {frame_index}: {reason}")]
    Failed { frame_index: usize, reason: String },
    #[error("detector backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain interface for face detection.
///
/// Implementations may be stateful (e.g. sequence handlers that track faces
/// across frames), hence `&mut self`. Returned regions are normalized with a
/// bottom-left origin, in the detector's own order.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<DetectionRegion>, DetectionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_message_names_frame() {
        let err = DetectionError::Failed {
            frame_index: 12,
            reason: "request rejected".into(),
        };
        assert_eq!(
            err.to_string(),
            "face detection failed on frame 12: request rejected"
        );
    }

    #[test]
    fn test_backend_exposes_source() {
        use std::error::Error as _;

        let inner = std::io::Error::new(std::io::ErrorKind::Other, "model missing");
        let err = DetectionError::Backend(Box::new(inner));
        assert!(err.to_string().contains("model missing"));
        assert!(err.source().is_some());
    }
}
