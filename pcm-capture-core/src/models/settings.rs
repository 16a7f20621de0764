use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::CaptureError;

/// Default frame queue capacity, in raw frames.
///
/// About ten seconds of 48 kHz stereo, so the producer never runs out of room
/// while a consumer keeps polling.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1_000_000;

/// Largest accepted frame queue capacity, in raw frames (256 MiB of `i32`).
pub const MAX_QUEUE_CAPACITY: usize = 1 << 26;

/// Default consumer cadence in frames per second.
pub const DEFAULT_FPS: u32 = 60;

/// Read-only configuration a capture backend borrows for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Target consumer cadence (default: 60). Informational only: the OS
    /// stream decides how often frames arrive.
    pub fps: u32,

    /// Frame queue capacity in raw frames (default: 1,000,000).
    pub queue_capacity: usize,

    /// Log a warning when `read` drains the queue before filling the buffer
    /// (default: true).
    pub warn_on_underrun: bool,
}

impl Settings {
    pub fn validate(&self) -> Result<(), String> {
        if self.fps == 0 {
            return Err("fps must be positive".into());
        }
        if self.queue_capacity < 2 {
            return Err(format!(
                "queue capacity must hold at least one stereo frame, got {}",
                self.queue_capacity
            ));
        }
        if self.queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(format!(
                "queue capacity {} exceeds the maximum of {}",
                self.queue_capacity, MAX_QUEUE_CAPACITY
            ));
        }
        Ok(())
    }

    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CaptureError> {
        serde_json::from_str(json).map_err(|e| CaptureError::Config(e.to_string()))
    }

    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CaptureError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CaptureError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&contents)
    }

    /// Stereo samples a consumer should request per frame to keep up with a
    /// stream running at `sample_rate`.
    pub fn samples_per_frame(&self, sample_rate: f64) -> usize {
        if self.fps == 0 || sample_rate <= 0.0 {
            return 0;
        }
        (sample_rate / self.fps as f64).ceil() as usize
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            warn_on_underrun: true,
        }
    }
}
