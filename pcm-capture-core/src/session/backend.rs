use crate::models::device::{CaptureDiagnostics, DeviceId, DeviceInfo, StreamFormat};
use crate::models::error::CaptureError;
use crate::models::sample::StereoSample;
use crate::models::settings::Settings;
use crate::models::state::BackendState;
use crate::processing::frame_queue::{FrameConsumer, FrameQueue};
use crate::processing::sample_format::FrameBatch;
use crate::session::event_loop_thread::EventLoopThread;
use crate::traits::audio_source::AudioSource;
use crate::traits::capture_host::{CaptureHost, FrameCallback};

/// Name of the helper thread that services the platform event loop.
pub const EVENT_LOOP_THREAD_NAME: &str = "pcm-capture-event-loop";

/// Capture backend for one input device, generic over the native host.
///
/// Data flow:
/// ```text
/// [OS audio thread] → FrameCallback → [FrameProducer] ⇒ [FrameConsumer] → read() → caller
/// ```
///
/// Construction acquires the default input device and starts the stream
/// eagerly. Any failure is logged and leaves the backend `Failed`, where
/// `read` reports unavailability. Dropping the backend stops the stream
/// before the queue is released.
pub struct CaptureBackend<'a, H: CaptureHost> {
    host: H,
    settings: &'a Settings,
    state: BackendState,
    device: Option<DeviceId>,
    device_info: Option<DeviceInfo>,
    stream_format: Option<StreamFormat>,
    io_proc: Option<H::IoProc>,
    stream_started: bool,
    event_loop: Option<EventLoopThread>,
    consumer: Option<FrameConsumer>,
    samples_read: u64,
    underruns: u64,
}

impl<'a, H: CaptureHost> CaptureBackend<'a, H> {
    /// Acquire the default input device on `host` and start streaming.
    ///
    /// Never fails outright; check `state()` to see how far it got.
    pub fn new(settings: &'a Settings, host: H) -> Self {
        let mut backend = Self {
            host,
            settings,
            state: BackendState::Uninitialized,
            device: None,
            device_info: None,
            stream_format: None,
            io_proc: None,
            stream_started: false,
            event_loop: None,
            consumer: None,
            samples_read: 0,
            underruns: 0,
        };

        if let Err(e) = settings.validate() {
            log::error!("Invalid capture settings: {}", e);
            backend.state = BackendState::Failed(CaptureError::InvalidSettings(e));
            return backend;
        }

        let (mut producer, consumer) = FrameQueue::new(settings.queue_capacity);
        backend.consumer = Some(consumer);
        let callback: FrameCallback = Box::new(move |batch: &FrameBatch<'_>| {
            producer.push_batch(batch);
        });

        if let Err(e) = backend.initialize(callback) {
            backend.state = BackendState::Failed(e);
        }
        backend
    }

    /// Run the initialization sequence, stopping at the first failure.
    fn initialize(&mut self, callback: FrameCallback) -> Result<(), CaptureError> {
        self.state = BackendState::AcquiringDevice;

        let device = self.host.default_input_device().map_err(|e| {
            log::error!("Error getting default input device: {}", e);
            e
        })?;
        self.device = Some(device);

        self.log_device_info(device);
        self.log_stream_info(device);

        let io_proc = self
            .host
            .create_io_proc(device, self.stream_format.as_ref(), callback)
            .map_err(|e| {
                log::error!("Registering capture callback failed: {}", e);
                e
            })?;
        let io_proc = self.io_proc.insert(io_proc);

        self.host.start(device, io_proc).map_err(|e| {
            log::error!("Starting capture stream failed: {}", e);
            e
        })?;
        self.stream_started = true;

        let spawned = EventLoopThread::spawn::<H::Loop>(EVENT_LOOP_THREAD_NAME);
        let event_loop = spawned.map_err(|e| {
            log::error!("Starting event loop thread failed: {}", e);
            e
        })?;
        self.event_loop = Some(event_loop);

        self.state = BackendState::Streaming;
        log::info!("Capture streaming from device {}", device.0);
        Ok(())
    }

    fn log_device_info(&mut self, device: DeviceId) {
        match self.host.device_info(device) {
            Ok(info) => {
                log::info!("Device {}\t{}\t{}", info.name, info.manufacturer, info.uid);
                self.device_info = Some(info);
            }
            Err(e) => log::error!("Could not get device info: {}", e),
        }
    }

    fn log_stream_info(&mut self, device: DeviceId) {
        match self.host.stream_format(device) {
            Ok(format) => {
                log::info!(
                    "Sample rate: {}\tFormat: {}\tFormat flags: {:#x}\tChannels: {}\tBits: {}",
                    format.sample_rate,
                    format.format_id_string(),
                    format.format_flags,
                    format.channels_per_frame,
                    format.bits_per_channel,
                );
                log::info!(
                    "Target {} fps: about {} samples per read",
                    self.settings.fps,
                    self.settings.samples_per_frame(format.sample_rate),
                );
                if format.sample_encoding().is_none() {
                    log::warn!(
                        "Stream format {} is not decodable; falling back to float32",
                        format.format_id_string()
                    );
                }
                self.stream_format = Some(format);
            }
            Err(e) => log::warn!("Failed to get info on stream: {}", e),
        }
    }

    /// Stop the stream, join the helper thread, and unregister the callback.
    ///
    /// Idempotent, and safe on a backend that never finished starting.
    pub fn stop(&mut self) {
        let Some(device) = self.device else {
            return;
        };

        if let Some(io_proc) = self.io_proc.as_ref() {
            if self.stream_started {
                if let Err(e) = self.host.stop(device, io_proc) {
                    log::error!("Stopping capture stream failed: {}", e);
                }
                self.stream_started = false;
            }
        }

        if let Some(event_loop) = self.event_loop.take() {
            event_loop.stop();
        }

        if let Some(io_proc) = self.io_proc.take() {
            if let Err(e) = self.host.destroy_io_proc(device, io_proc) {
                log::error!("Unregistering capture callback failed: {}", e);
            }
        }

        if self.state.is_streaming() {
            log::debug!("Capture stopped on device {}", device.0);
            self.state = BackendState::Stopped;
        }
    }

    pub fn state(&self) -> &BackendState {
        &self.state
    }

    pub fn device(&self) -> Option<DeviceId> {
        self.device
    }

    pub fn device_info(&self) -> Option<&DeviceInfo> {
        self.device_info.as_ref()
    }

    pub fn stream_format(&self) -> Option<&StreamFormat> {
        self.stream_format.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        self.settings
    }

    pub fn diagnostics(&self) -> CaptureDiagnostics {
        let mut diagnostics = CaptureDiagnostics {
            samples_read: self.samples_read,
            underruns: self.underruns,
            ..CaptureDiagnostics::default()
        };
        if let Some(counters) = self.consumer.as_ref().map(FrameConsumer::counters) {
            diagnostics.callback_count = counters.callbacks();
            diagnostics.frames_captured = counters.captured();
            diagnostics.frames_dropped = counters.dropped();
        }
        diagnostics
    }
}

impl<H: CaptureHost> AudioSource for CaptureBackend<'_, H> {
    fn read(&mut self, buffer: &mut [StereoSample]) -> bool {
        buffer.fill(StereoSample::SILENCE);

        if !self.state.is_streaming() {
            return false;
        }
        let Some(consumer) = self.consumer.as_mut() else {
            return false;
        };

        let requested = buffer.len();
        for (filled, slot) in buffer.iter_mut().enumerate() {
            match consumer.try_dequeue_stereo() {
                Some(sample) => *slot = sample,
                None => {
                    self.underruns += 1;
                    self.samples_read += filled as u64;
                    if self.settings.warn_on_underrun {
                        log::warn!(
                            "Buffer underrun: {} of {} samples available",
                            filled,
                            requested
                        );
                    }
                    return true;
                }
            }
        }

        self.samples_read += requested as u64;
        true
    }

    fn is_available(&self) -> bool {
        self.state.is_streaming()
    }
}

impl<H: CaptureHost> Drop for CaptureBackend<'_, H> {
    fn drop(&mut self) {
        self.stop();
    }
}
