pub mod inline_detection_executor;
pub mod worker_detection_executor;
