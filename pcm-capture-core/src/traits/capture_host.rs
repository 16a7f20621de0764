use crate::models::device::{DeviceId, DeviceInfo, StreamFormat};
use crate::models::error::CaptureError;
use crate::processing::sample_format::FrameBatch;
use crate::traits::event_loop::EventLoop;

/// Callback invoked by the platform on its real-time audio thread.
///
/// Captures only the queue's producer half. Must not block, allocate, or log.
pub type FrameCallback = Box<dyn FnMut(&FrameBatch<'_>) + Send + 'static>;

/// Native audio capability a capture backend is built on.
///
/// Implemented by:
/// - `CoreAudioHost` (macOS HAL)
pub trait CaptureHost: Send {
    /// Handle for a registered I/O callback.
    type IoProc: Send;

    /// Event dispatch mechanism the platform needs serviced while streaming.
    type Loop: EventLoop;

    /// Resolve the system default input device.
    fn default_input_device(&self) -> Result<DeviceId, CaptureError>;

    /// Name, manufacturer, and unique id of `device`.
    fn device_info(&self, device: DeviceId) -> Result<DeviceInfo, CaptureError>;

    /// Format the device delivers to I/O callbacks.
    fn stream_format(&self, device: DeviceId) -> Result<StreamFormat, CaptureError>;

    /// Register `callback` for `device`. `format` is the stream format the
    /// caller observed, if the query succeeded.
    fn create_io_proc(
        &mut self,
        device: DeviceId,
        format: Option<&StreamFormat>,
        callback: FrameCallback,
    ) -> Result<Self::IoProc, CaptureError>;

    /// Begin invoking the registered callback.
    fn start(&mut self, device: DeviceId, io_proc: &Self::IoProc) -> Result<(), CaptureError>;

    /// Stop invoking the callback. Must not return while a callback is still
    /// in flight.
    fn stop(&mut self, device: DeviceId, io_proc: &Self::IoProc) -> Result<(), CaptureError>;

    /// Unregister the callback and release it.
    fn destroy_io_proc(
        &mut self,
        device: DeviceId,
        io_proc: Self::IoProc,
    ) -> Result<(), CaptureError>;
}
