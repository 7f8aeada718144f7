use crate::shared::screen_rect::ScreenRect;

/// Draws face boxes over the camera preview.
///
/// Always called on the UI-serialized context, once per processed frame.
/// An empty slice means no faces: previously drawn boxes must be cleared.
pub trait OverlayRenderer {
    fn on_regions(&mut self, rects: &[ScreenRect]);
}
