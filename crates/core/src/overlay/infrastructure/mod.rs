pub mod log_overlay_renderer;
