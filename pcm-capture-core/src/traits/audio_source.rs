use crate::models::sample::StereoSample;

/// Pull interface consumers use to obtain captured audio.
///
/// Implemented by:
/// - `CaptureBackend` (any platform with a `CaptureHost`)
/// - `UnsupportedSource` (platforms without a backend)
pub trait AudioSource: Send {
    /// Fill `buffer` with the oldest captured stereo samples.
    ///
    /// The buffer is zero-filled first, so any slot that could not be served
    /// holds silence. Returns `false` when the source cannot deliver audio at
    /// all; a short read on a live source still returns `true`.
    ///
    /// Never blocks. `&mut self` keeps a single consumer per source.
    fn read(&mut self, buffer: &mut [StereoSample]) -> bool;

    /// Whether `read` can currently deliver captured audio.
    fn is_available(&self) -> bool;
}
