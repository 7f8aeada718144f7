use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::overlay::domain::coordinate_mapper::map_regions;
use crate::overlay::domain::overlay_renderer::OverlayRenderer;
use crate::pipeline::frame_pipeline::ResultHandler;
use crate::shared::region::DetectionRegion;
use crate::shared::screen_rect::Viewport;

/// One detection pass on its way to the UI context.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayUpdate {
    pub regions: Vec<DetectionRegion>,
}

/// Outcome of waiting for a single update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    TimedOut,
    Disconnected,
}

/// Creates the boundary between detection and the UI-serialized context.
///
/// The dispatcher half may be cloned and moved to any thread; the receiver
/// half stays on the UI thread and is the only place renderer calls happen.
pub fn ui_channel(viewport: Viewport) -> (OverlayDispatcher, OverlayReceiver) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (
        OverlayDispatcher { tx },
        OverlayReceiver {
            rx,
            viewport,
            delivered: 0,
        },
    )
}

#[derive(Clone)]
pub struct OverlayDispatcher {
    tx: Sender<OverlayUpdate>,
}

impl OverlayDispatcher {
    /// Queues a pass for the UI context. Returns `false` once the receiver is gone.
    pub fn dispatch(&self, regions: Vec<DetectionRegion>) -> bool {
        self.tx.send(OverlayUpdate { regions }).is_ok()
    }

    /// Adapts this dispatcher into a [`FramePipeline`] result handler.
    ///
    /// [`FramePipeline`]: crate::pipeline::frame_pipeline::FramePipeline
    pub fn into_result_handler(self) -> ResultHandler {
        Arc::new(move |regions: Vec<DetectionRegion>| {
            if !self.dispatch(regions) {
                log::debug!("UI context closed, overlay update discarded");
            }
        })
    }
}

/// UI-side end of the overlay channel.
///
/// Holds the current viewport, so layout changes are applied on the same
/// thread that maps and renders.
pub struct OverlayReceiver {
    rx: Receiver<OverlayUpdate>,
    viewport: Viewport,
    delivered: usize,
}

impl OverlayReceiver {
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Number of updates handed to a renderer so far.
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Renders every update already queued without blocking.
    pub fn deliver_pending(&mut self, renderer: &mut dyn OverlayRenderer) -> usize {
        let pending: Vec<OverlayUpdate> = self.rx.try_iter().collect();
        let count = pending.len();
        for update in pending {
            self.deliver(update, renderer);
        }
        count
    }

    /// Waits up to `timeout` for the next update and renders it.
    pub fn deliver_timeout(
        &mut self,
        renderer: &mut dyn OverlayRenderer,
        timeout: Duration,
    ) -> Delivery {
        match self.rx.recv_timeout(timeout) {
            Ok(update) => {
                self.deliver(update, renderer);
                Delivery::Delivered
            }
            Err(RecvTimeoutError::Timeout) => Delivery::TimedOut,
            Err(RecvTimeoutError::Disconnected) => Delivery::Disconnected,
        }
    }

    /// Renders updates until every dispatcher has been dropped.
    pub fn run(&mut self, renderer: &mut dyn OverlayRenderer) -> usize {
        let mut count = 0;
        while let Ok(update) = self.rx.recv() {
            self.deliver(update, renderer);
            count += 1;
        }
        count
    }

    fn deliver(&mut self, update: OverlayUpdate, renderer: &mut dyn OverlayRenderer) {
        let rects = map_regions(&update.regions, self.viewport);
        renderer.on_regions(&rects);
        self.delivered += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::screen_rect::ScreenRect;
    use approx::assert_relative_eq;
    use std::thread;

    #[derive(Default)]
    struct RecordingRenderer {
        calls: Vec<Vec<ScreenRect>>,
    }

    impl OverlayRenderer for RecordingRenderer {
        fn on_regions(&mut self, rects: &[ScreenRect]) {
            self.calls.push(rects.to_vec());
        }
    }

    fn face() -> DetectionRegion {
        DetectionRegion::new(0.25, 0.5, 0.2, 0.1)
    }

    #[test]
    fn test_pending_updates_are_mapped_with_viewport() {
        let (dispatcher, mut receiver) = ui_channel(Viewport::new(200.0, 100.0));
        assert!(dispatcher.dispatch(vec![face()]));

        let mut renderer = RecordingRenderer::default();
        assert_eq!(receiver.deliver_pending(&mut renderer), 1);

        let rect = renderer.calls[0][0];
        assert_relative_eq!(rect.x, 50.0);
        assert_relative_eq!(rect.y, 40.0);
        assert_relative_eq!(rect.width, 40.0);
        assert_relative_eq!(rect.height, 10.0);
    }

    #[test]
    fn test_empty_update_reaches_renderer() {
        let (dispatcher, mut receiver) = ui_channel(Viewport::new(100.0, 100.0));
        dispatcher.dispatch(vec![face()]);
        dispatcher.dispatch(Vec::new());

        let mut renderer = RecordingRenderer::default();
        receiver.deliver_pending(&mut renderer);

        assert_eq!(renderer.calls.len(), 2);
        assert!(renderer.calls[1].is_empty());
        assert_eq!(receiver.delivered(), 2);
    }

    #[test]
    fn test_viewport_change_applies_to_later_updates() {
        let (dispatcher, mut receiver) = ui_channel(Viewport::new(100.0, 100.0));
        let mut renderer = RecordingRenderer::default();

        dispatcher.dispatch(vec![DetectionRegion::new(0.0, 0.0, 1.0, 1.0)]);
        receiver.deliver_pending(&mut renderer);
        receiver.set_viewport(Viewport::new(300.0, 50.0));
        dispatcher.dispatch(vec![DetectionRegion::new(0.0, 0.0, 1.0, 1.0)]);
        receiver.deliver_pending(&mut renderer);

        assert_relative_eq!(renderer.calls[0][0].width, 100.0);
        assert_relative_eq!(renderer.calls[1][0].width, 300.0);
        assert_relative_eq!(renderer.calls[1][0].height, 50.0);
        assert_eq!(receiver.viewport(), Viewport::new(300.0, 50.0));
    }

    #[test]
    fn test_deliver_timeout_reports_state() {
        let (dispatcher, mut receiver) = ui_channel(Viewport::new(10.0, 10.0));
        let mut renderer = RecordingRenderer::default();
        let short = Duration::from_millis(10);

        assert_eq!(receiver.deliver_timeout(&mut renderer, short), Delivery::TimedOut);
        dispatcher.dispatch(Vec::new());
        assert_eq!(receiver.deliver_timeout(&mut renderer, short), Delivery::Delivered);
        drop(dispatcher);
        assert_eq!(
            receiver.deliver_timeout(&mut renderer, short),
            Delivery::Disconnected
        );
    }

    #[test]
    fn test_result_handler_crosses_threads() {
        let (dispatcher, mut receiver) = ui_channel(Viewport::new(100.0, 100.0));
        let handler = dispatcher.into_result_handler();

        let worker = thread::spawn(move || {
            handler(vec![face()]);
            handler(Vec::new());
        });
        worker.join().unwrap();

        let mut renderer = RecordingRenderer::default();
        assert_eq!(receiver.run(&mut renderer), 2);
        assert_eq!(renderer.calls[0].len(), 1);
        assert!(renderer.calls[1].is_empty());
    }

    #[test]
    fn test_dispatch_after_receiver_dropped_returns_false() {
        let (dispatcher, receiver) = ui_channel(Viewport::new(10.0, 10.0));
        drop(receiver);
        assert!(!dispatcher.dispatch(Vec::new()));
    }
}
