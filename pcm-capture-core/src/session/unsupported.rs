use crate::models::error::CaptureError;
use crate::models::sample::StereoSample;
use crate::traits::audio_source::AudioSource;

/// Audio source for platforms without a capture backend.
///
/// Every read yields silence and reports failure.
#[derive(Debug)]
pub struct UnsupportedSource;

impl UnsupportedSource {
    pub fn new() -> Self {
        log::warn!("{}; input will be silent", CaptureError::Unsupported);
        Self
    }
}

impl Default for UnsupportedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for UnsupportedSource {
    fn read(&mut self, buffer: &mut [StereoSample]) -> bool {
        buffer.fill(StereoSample::SILENCE);
        false
    }

    fn is_available(&self) -> bool {
        false
    }
}
