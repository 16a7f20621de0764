//! # pcm-capture-macos
//!
//! macOS Core Audio backend for pcm-capture.
//!
//! Provides:
//! - `CoreAudioHost`: default input device lookup, device/stream properties,
//!   IOProc registration via the Core Audio HAL
//! - `CfRunLoop`: CFRunLoop serviced by the backend's helper thread
//! - `open_default_source`: the platform's `AudioSource`, or a silent
//!   `UnsupportedSource` on other platforms
//!
//! ## Usage
//! ```ignore
//! use pcm_capture_core::{Settings, StereoSample};
//!
//! let settings = Settings::default();
//! let mut source = pcm_capture_macos::open_default_source(&settings);
//! let mut block = vec![StereoSample::default(); 800];
//! if source.read(&mut block) {
//!     // hand `block` to the visualizer
//! }
//! ```

use pcm_capture_core::{AudioSource, Settings};

#[cfg(target_os = "macos")]
pub mod core_audio_host;
#[cfg(target_os = "macos")]
mod properties;
#[cfg(target_os = "macos")]
pub mod run_loop;

#[cfg(target_os = "macos")]
pub use core_audio_host::{CoreAudioHost, CoreAudioIoProc};
#[cfg(target_os = "macos")]
pub use run_loop::CfRunLoop;

/// Open the default input device as an `AudioSource`.
///
/// Never fails: if the device cannot be opened the returned source reports
/// unavailability from every `read`.
#[cfg(target_os = "macos")]
pub fn open_default_source(settings: &Settings) -> Box<dyn AudioSource + '_> {
    log::info!("Opening Core Audio input (target {} fps)", settings.fps);
    Box::new(pcm_capture_core::CaptureBackend::new(settings, CoreAudioHost::new()))
}

/// Open the default input device as an `AudioSource`.
///
/// This platform has no capture backend; the source is always silent.
#[cfg(not(target_os = "macos"))]
pub fn open_default_source(settings: &Settings) -> Box<dyn AudioSource + '_> {
    log::debug!("No capture backend for this platform (fps {})", settings.fps);
    Box::new(pcm_capture_core::UnsupportedSource::new())
}
