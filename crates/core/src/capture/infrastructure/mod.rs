mod frame_pacer;
pub mod image_sequence_frame_source;
pub mod synthetic_frame_source;
