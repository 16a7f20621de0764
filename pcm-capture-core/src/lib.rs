//! # pcm-capture-core
//!
//! Platform-agnostic audio capture core library.
//!
//! Hands frames from a native real-time audio callback to a polling consumer
//! through a lock-free single-producer/single-consumer queue, and owns the
//! device/stream lifecycle around it. Platform backends implement the
//! `CaptureHost` trait and plug into the generic `CaptureBackend`.
//!
//! ## Architecture
//!
//! ```text
//! pcm-capture-core (this crate)
//! ├── traits/       ← AudioSource, CaptureHost, EventLoop
//! ├── models/       ← CaptureError, BackendState, Settings, StereoSample, device/stream info
//! ├── processing/   ← FrameQueue (SPSC ring), FrameBatch sample decoding
//! └── session/      ← CaptureBackend, EventLoopThread, UnsupportedSource
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::device::{CaptureDiagnostics, DeviceId, DeviceInfo, SampleEncoding, StreamFormat};
pub use models::error::CaptureError;
pub use models::sample::{RawFrame, StereoSample};
pub use models::settings::Settings;
pub use models::state::BackendState;
pub use processing::frame_queue::{FrameConsumer, FrameProducer, FrameQueue};
pub use processing::sample_format::FrameBatch;
pub use session::backend::CaptureBackend;
pub use session::event_loop_thread::EventLoopThread;
pub use session::unsupported::UnsupportedSource;
pub use traits::audio_source::AudioSource;
pub use traits::capture_host::{CaptureHost, FrameCallback};
pub use traits::event_loop::{EventLoop, LoopWaker, ParkingLoop};
