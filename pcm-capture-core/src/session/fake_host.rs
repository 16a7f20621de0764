//! In-memory `CaptureHost` used by the lifecycle tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::device::{DeviceId, DeviceInfo, StreamFormat};
use crate::models::error::CaptureError;
use crate::processing::sample_format::FrameBatch;
use crate::traits::capture_host::{CaptureHost, FrameCallback};
use crate::traits::event_loop::ParkingLoop;

pub const FAKE_DEVICE: DeviceId = DeviceId(42);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    CreateIoProc,
    Start,
    Stop,
    DestroyIoProc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    DefaultDevice,
    DeviceInfo,
    StreamFormat,
    CreateIoProc,
    Start,
    Stop,
}

#[derive(Default)]
struct Shared {
    events: Mutex<Vec<HostEvent>>,
    callback: Mutex<Option<FrameCallback>>,
    running: AtomicBool,
    released: AtomicBool,
    late_writes: AtomicUsize,
}

pub struct FakeHost {
    shared: Arc<Shared>,
    fail_at: Option<FailPoint>,
    next_io_proc: u32,
}

/// Test-side handle standing in for the OS audio thread.
#[derive(Clone)]
pub struct FakeStream {
    shared: Arc<Shared>,
}

impl FakeHost {
    pub fn new() -> (Self, FakeStream) {
        Self::build(None)
    }

    pub fn failing_at(point: FailPoint) -> (Self, FakeStream) {
        Self::build(Some(point))
    }

    fn build(fail_at: Option<FailPoint>) -> (Self, FakeStream) {
        let shared = Arc::new(Shared::default());
        let host = Self {
            shared: Arc::clone(&shared),
            fail_at,
            next_io_proc: 1,
        };
        (host, FakeStream { shared })
    }

    fn check(&self, point: FailPoint, operation: &'static str) -> Result<(), CaptureError> {
        if self.fail_at == Some(point) {
            return Err(CaptureError::Platform {
                operation,
                status: -1,
            });
        }
        Ok(())
    }

    fn record(&self, event: HostEvent) {
        self.shared.events.lock().push(event);
    }
}

impl CaptureHost for FakeHost {
    type IoProc = u32;
    type Loop = ParkingLoop;

    fn default_input_device(&self) -> Result<DeviceId, CaptureError> {
        if self.fail_at == Some(FailPoint::DefaultDevice) {
            return Err(CaptureError::DeviceNotAvailable);
        }
        Ok(FAKE_DEVICE)
    }

    fn device_info(&self, device: DeviceId) -> Result<DeviceInfo, CaptureError> {
        if self.fail_at == Some(FailPoint::DeviceInfo) {
            return Err(CaptureError::PropertyQuery {
                property: "device name",
                status: -2,
            });
        }
        Ok(DeviceInfo {
            id: device,
            name: "Fake Microphone".into(),
            manufacturer: "pcm-capture".into(),
            uid: "fake-mic-uid".into(),
        })
    }

    fn stream_format(&self, _device: DeviceId) -> Result<StreamFormat, CaptureError> {
        if self.fail_at == Some(FailPoint::StreamFormat) {
            return Err(CaptureError::PropertyQuery {
                property: "stream format",
                status: -3,
            });
        }
        Ok(StreamFormat::float32(48000.0, 2))
    }

    fn create_io_proc(
        &mut self,
        _device: DeviceId,
        _format: Option<&StreamFormat>,
        mut callback: FrameCallback,
    ) -> Result<u32, CaptureError> {
        self.check(FailPoint::CreateIoProc, "create io proc")?;
        self.record(HostEvent::CreateIoProc);

        let shared = Arc::clone(&self.shared);
        let guarded: FrameCallback = Box::new(move |batch: &FrameBatch<'_>| {
            if shared.released.load(Ordering::SeqCst) {
                shared.late_writes.fetch_add(1, Ordering::SeqCst);
            }
            callback(batch);
        });
        *self.shared.callback.lock() = Some(guarded);

        let id = self.next_io_proc;
        self.next_io_proc += 1;
        Ok(id)
    }

    fn start(&mut self, _device: DeviceId, _io_proc: &u32) -> Result<(), CaptureError> {
        self.check(FailPoint::Start, "start")?;
        self.record(HostEvent::Start);
        self.shared.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self, _device: DeviceId, _io_proc: &u32) -> Result<(), CaptureError> {
        self.record(HostEvent::Stop);
        // Holding the callback lock waits out any delivery in flight.
        let _callback = self.shared.callback.lock();
        self.shared.running.store(false, Ordering::SeqCst);
        self.check(FailPoint::Stop, "stop")
    }

    fn destroy_io_proc(&mut self, _device: DeviceId, _io_proc: u32) -> Result<(), CaptureError> {
        self.record(HostEvent::DestroyIoProc);
        self.shared.callback.lock().take();
        Ok(())
    }
}

impl FakeStream {
    /// Invoke the registered callback. Unlike a well-behaved OS this fires
    /// whenever a callback is registered, stopped or not, so only
    /// unregistration keeps frames away from a released queue. Returns
    /// `false` when no callback is registered.
    pub fn deliver(&self, samples: &[i32], channels: u16) -> bool {
        let mut callback = self.shared.callback.lock();
        match callback.as_mut() {
            Some(callback) => {
                callback(&FrameBatch::I32 { samples, channels });
                true
            }
            None => false,
        }
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.shared.events.lock().clone()
    }

    pub fn is_registered(&self) -> bool {
        self.shared.callback.lock().is_some()
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Mark the consumer side as gone; any later callback invocation counts
    /// as a late write.
    pub fn mark_released(&self) {
        self.shared.released.store(true, Ordering::SeqCst);
    }

    pub fn late_writes(&self) -> usize {
        self.shared.late_writes.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocation_after_release_is_a_late_write() {
        let (mut host, stream) = FakeHost::new();
        let io_proc = host
            .create_io_proc(FAKE_DEVICE, None, Box::new(|_: &FrameBatch<'_>| {}))
            .unwrap();
        host.start(FAKE_DEVICE, &io_proc).unwrap();

        assert!(stream.deliver(&[1, 2], 2));
        assert_eq!(stream.late_writes(), 0);

        stream.mark_released();
        assert!(stream.deliver(&[3, 4], 2));
        assert_eq!(stream.late_writes(), 1);

        host.destroy_io_proc(FAKE_DEVICE, io_proc).unwrap();
        assert!(!stream.deliver(&[5, 6], 2));
        assert_eq!(stream.late_writes(), 1);
    }

    #[test]
    fn stopped_but_registered_callback_still_fires() {
        let (mut host, stream) = FakeHost::new();
        let io_proc = host
            .create_io_proc(FAKE_DEVICE, None, Box::new(|_: &FrameBatch<'_>| {}))
            .unwrap();
        host.start(FAKE_DEVICE, &io_proc).unwrap();
        host.stop(FAKE_DEVICE, &io_proc).unwrap();

        assert!(!stream.is_running());
        assert!(stream.deliver(&[1, 2], 2));
    }
}
