use crate::overlay::domain::overlay_renderer::OverlayRenderer;
use crate::shared::screen_rect::ScreenRect;

/// Headless renderer that keeps the boxes currently "on screen" and logs them.
///
/// Face-count changes are logged at info level, individual boxes at debug.
pub struct LogOverlayRenderer {
    shown: Vec<ScreenRect>,
    updates: usize,
}

impl LogOverlayRenderer {
    pub fn new() -> Self {
        Self {
            shown: Vec::new(),
            updates: 0,
        }
    }

    /// Boxes drawn by the most recent update.
    pub fn shown(&self) -> &[ScreenRect] {
        &self.shown
    }

    pub fn updates(&self) -> usize {
        self.updates
    }
}

impl Default for LogOverlayRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayRenderer for LogOverlayRenderer {
    fn on_regions(&mut self, rects: &[ScreenRect]) {
        self.updates += 1;
        if rects.len() != self.shown.len() {
            match rects.len() {
                0 => log::info!("Overlay cleared"),
                n => log::info!("Overlay showing {n} face(s)"),
            }
        }
        for (i, r) in rects.iter().enumerate() {
            log::debug!(
                "  face {i}: x={:.1} y={:.1} w={:.1} h={:.1}",
                r.x,
                r.y,
                r.width,
                r.height
            );
        }
        self.shown = rects.to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_shown_boxes() {
        let mut renderer = LogOverlayRenderer::new();
        renderer.on_regions(&[
            ScreenRect::new(0.0, 0.0, 10.0, 10.0),
            ScreenRect::new(20.0, 0.0, 10.0, 10.0),
        ]);
        renderer.on_regions(&[ScreenRect::new(5.0, 5.0, 1.0, 1.0)]);

        assert_eq!(renderer.shown(), &[ScreenRect::new(5.0, 5.0, 1.0, 1.0)]);
        assert_eq!(renderer.updates(), 2);
    }

    #[test]
    fn test_empty_update_clears_stale_boxes() {
        let mut renderer = LogOverlayRenderer::default();
        renderer.on_regions(&[ScreenRect::new(0.0, 0.0, 10.0, 10.0)]);
        renderer.on_regions(&[]);

        assert!(renderer.shown().is_empty());
        assert_eq!(renderer.updates(), 2);
    }
}
