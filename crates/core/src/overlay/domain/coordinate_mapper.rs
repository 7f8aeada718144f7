use crate::shared::region::DetectionRegion;
use crate::shared::screen_rect::{ScreenRect, Viewport};

/// Converts a normalized, bottom-left-origin detection box into a
/// top-left-origin rectangle in viewport points.
///
/// The vertical flip is `y' = (1 - y) * h - height`: the box's top edge in
/// detector space is `y + height`, which lands at `(1 - y - height) * h`.
pub fn to_screen_rect(region: &DetectionRegion, viewport: Viewport) -> ScreenRect {
    let width = region.width * viewport.width;
    let height = region.height * viewport.height;
    let x = region.x * viewport.width;
    let y = (1.0 - region.y) * viewport.height - height;
    ScreenRect::new(x, y, width, height)
}

/// Maps every region, preserving detector order.
pub fn map_regions(regions: &[DetectionRegion], viewport: Viewport) -> Vec<ScreenRect> {
    regions
        .iter()
        .map(|r| to_screen_rect(r, viewport))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn assert_rect_eq(actual: ScreenRect, expected: ScreenRect) {
        assert_relative_eq!(actual.x, expected.x, epsilon = 1e-9);
        assert_relative_eq!(actual.y, expected.y, epsilon = 1e-9);
        assert_relative_eq!(actual.width, expected.width, epsilon = 1e-9);
        assert_relative_eq!(actual.height, expected.height, epsilon = 1e-9);
    }

    #[test]
    fn test_full_frame_box_maps_to_full_viewport() {
        let rect = to_screen_rect(
            &DetectionRegion::new(0.0, 0.0, 1.0, 1.0),
            Viewport::new(100.0, 200.0),
        );
        assert_rect_eq(rect, ScreenRect::new(0.0, 0.0, 100.0, 200.0));
    }

    #[test]
    fn test_interior_box_flips_vertical_axis() {
        // width = 0.2*200 = 40, height = 0.1*100 = 10
        // x = 0.25*200 = 50, y = (1-0.5)*100 - 10 = 40
        let rect = to_screen_rect(
            &DetectionRegion::new(0.25, 0.5, 0.2, 0.1),
            Viewport::new(200.0, 100.0),
        );
        assert_rect_eq(rect, ScreenRect::new(50.0, 40.0, 40.0, 10.0));
    }

    // ── Vertical flip at the frame edges ──

    #[rstest]
    #[case::bottom_edge_box(DetectionRegion::new(0.0, 0.0, 0.5, 0.25), 75.0)]
    #[case::top_edge_box(DetectionRegion::new(0.0, 0.75, 0.5, 0.25), 0.0)]
    #[case::centered_box(DetectionRegion::new(0.25, 0.25, 0.5, 0.5), 25.0)]
    fn test_vertical_flip(#[case] region: DetectionRegion, #[case] expected_y: f64) {
        let rect = to_screen_rect(&region, Viewport::new(100.0, 100.0));
        assert_relative_eq!(rect.y, expected_y, epsilon = 1e-9);
    }

    #[test]
    fn test_same_inputs_give_same_output() {
        let region = DetectionRegion::new(0.31, 0.47, 0.12, 0.2);
        let viewport = Viewport::new(375.0, 667.0);
        assert_eq!(
            to_screen_rect(&region, viewport),
            to_screen_rect(&region, viewport)
        );
    }

    #[test]
    fn test_zero_viewport_collapses_to_origin() {
        let rect = to_screen_rect(
            &DetectionRegion::new(0.3, 0.3, 0.2, 0.2),
            Viewport::new(0.0, 0.0),
        );
        assert_rect_eq(rect, ScreenRect::new(0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_map_regions_preserves_order() {
        let regions = [
            DetectionRegion::new(0.5, 0.0, 0.1, 0.1),
            DetectionRegion::new(0.0, 0.0, 0.1, 0.1),
        ];
        let rects = map_regions(&regions, Viewport::new(100.0, 100.0));
        assert_eq!(rects.len(), 2);
        assert_relative_eq!(rects[0].x, 50.0);
        assert_relative_eq!(rects[1].x, 0.0);
    }

    #[test]
    fn test_map_regions_empty() {
        assert!(map_regions(&[], Viewport::new(100.0, 100.0)).is_empty());
    }
}
