pub mod audio_source;
pub mod capture_host;
pub mod event_loop;
