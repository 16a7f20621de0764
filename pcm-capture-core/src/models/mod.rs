pub mod device;
pub mod error;
pub mod sample;
pub mod settings;
pub mod state;
