pub mod detection_executor;
pub mod error_sink;
pub mod frame_pipeline;
pub mod infrastructure;
pub mod pipeline_logger;
pub mod pipeline_state;
