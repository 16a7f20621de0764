pub mod frame_queue;
pub mod sample_format;
