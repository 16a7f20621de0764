//! Core Audio HAL capture host.
//!
//! Registers an IOProc on the default input device and forwards each input
//! buffer to the capture callback as a `FrameBatch`.

use std::ffi::c_void;
use std::slice;

use coreaudio_sys::{
    kAudioDevicePropertyDeviceManufacturer, kAudioDevicePropertyDeviceName,
    kAudioDevicePropertyDeviceUID, kAudioDevicePropertyScopeInput,
    kAudioDevicePropertyStreamFormat, kAudioHardwarePropertyDefaultInputDevice,
    kAudioObjectPropertyScopeGlobal, kAudioObjectSystemObject, AudioBufferList,
    AudioDeviceCreateIOProcID, AudioDeviceDestroyIOProcID, AudioDeviceID, AudioDeviceIOProcID,
    AudioDeviceStart, AudioDeviceStop, AudioObjectID, AudioStreamBasicDescription, AudioTimeStamp,
    OSStatus,
};

use pcm_capture_core::{
    CaptureError, CaptureHost, DeviceId, DeviceInfo, FrameBatch, FrameCallback, SampleEncoding,
    StreamFormat,
};

use crate::properties;
use crate::run_loop::CfRunLoop;

/// State reachable from the real-time thread: the callback and how to decode
/// buffers for it. Nothing else.
struct IoProcContext {
    callback: FrameCallback,
    encoding: SampleEncoding,
}

/// A registered IOProc and the context it was registered with.
pub struct CoreAudioIoProc {
    id: AudioDeviceIOProcID,
    context: *mut IoProcContext,
}

// SAFETY: the context is only dereferenced by the HAL's IO thread while the
// IOProc is registered, and only freed after it has been destroyed.
unsafe impl Send for CoreAudioIoProc {}

/// `CaptureHost` backed by the macOS Core Audio hardware abstraction layer.
#[derive(Debug, Default)]
pub struct CoreAudioHost;

impl CoreAudioHost {
    pub fn new() -> Self {
        Self
    }
}

impl CaptureHost for CoreAudioHost {
    type IoProc = CoreAudioIoProc;
    type Loop = CfRunLoop;

    fn default_input_device(&self) -> Result<DeviceId, CaptureError> {
        // SAFETY: the default-device property is an AudioDeviceID.
        let device: AudioDeviceID = unsafe {
            properties::read(
                kAudioObjectSystemObject as AudioObjectID,
                kAudioHardwarePropertyDefaultInputDevice as u32,
                kAudioObjectPropertyScopeGlobal as u32,
                "default input device",
            )?
        };
        // kAudioObjectUnknown: no input device is configured.
        if device == 0 {
            return Err(CaptureError::DeviceNotAvailable);
        }
        Ok(DeviceId(device))
    }

    fn device_info(&self, device: DeviceId) -> Result<DeviceInfo, CaptureError> {
        let name = properties::read_c_string(
            device.0,
            kAudioDevicePropertyDeviceName as u32,
            "device name",
        )?;
        let manufacturer = properties::read_c_string(
            device.0,
            kAudioDevicePropertyDeviceManufacturer as u32,
            "device manufacturer",
        )?;
        let uid = properties::read_cf_string(
            device.0,
            kAudioDevicePropertyDeviceUID as u32,
            "device UID",
        )?;

        Ok(DeviceInfo {
            id: device,
            name,
            manufacturer,
            uid,
        })
    }

    fn stream_format(&self, device: DeviceId) -> Result<StreamFormat, CaptureError> {
        // SAFETY: the stream format property is an AudioStreamBasicDescription.
        let description: AudioStreamBasicDescription = unsafe {
            properties::read(
                device.0,
                kAudioDevicePropertyStreamFormat as u32,
                kAudioDevicePropertyScopeInput as u32,
                "stream format",
            )?
        };

        Ok(StreamFormat {
            sample_rate: description.mSampleRate,
            format_id: description.mFormatID,
            format_flags: description.mFormatFlags,
            bits_per_channel: description.mBitsPerChannel,
            channels_per_frame: description.mChannelsPerFrame,
            bytes_per_frame: description.mBytesPerFrame,
        })
    }

    fn create_io_proc(
        &mut self,
        device: DeviceId,
        format: Option<&StreamFormat>,
        callback: FrameCallback,
    ) -> Result<CoreAudioIoProc, CaptureError> {
        // The HAL hands IOProcs its canonical float32 format unless told otherwise.
        let encoding = format
            .and_then(StreamFormat::sample_encoding)
            .unwrap_or(SampleEncoding::Float32);
        let context = Box::into_raw(Box::new(IoProcContext { callback, encoding }));

        let mut id: AudioDeviceIOProcID = None;
        // SAFETY: `context` stays alive until destroy_io_proc reclaims it.
        let status = unsafe {
            AudioDeviceCreateIOProcID(device.0, Some(io_proc), context as *mut c_void, &mut id)
        };
        if status != 0 {
            // SAFETY: registration failed, so the HAL holds no reference.
            drop(unsafe { Box::from_raw(context) });
            return Err(CaptureError::Platform {
                operation: "AudioDeviceCreateIOProcID",
                status,
            });
        }

        Ok(CoreAudioIoProc { id, context })
    }

    fn start(&mut self, device: DeviceId, io_proc: &CoreAudioIoProc) -> Result<(), CaptureError> {
        // SAFETY: io_proc.id was returned by AudioDeviceCreateIOProcID for this device.
        let status = unsafe { AudioDeviceStart(device.0, io_proc.id) };
        check(status, "AudioDeviceStart")
    }

    fn stop(&mut self, device: DeviceId, io_proc: &CoreAudioIoProc) -> Result<(), CaptureError> {
        // SAFETY: as in start. AudioDeviceStop returns once the IOProc has
        // stopped being called.
        let status = unsafe { AudioDeviceStop(device.0, io_proc.id) };
        check(status, "AudioDeviceStop")
    }

    fn destroy_io_proc(
        &mut self,
        device: DeviceId,
        io_proc: CoreAudioIoProc,
    ) -> Result<(), CaptureError> {
        // SAFETY: as in start.
        let status = unsafe { AudioDeviceDestroyIOProcID(device.0, io_proc.id) };
        if status != 0 {
            // The HAL may still reference the context; leak it rather than free it.
            return Err(CaptureError::Platform {
                operation: "AudioDeviceDestroyIOProcID",
                status,
            });
        }
        // SAFETY: the IOProc is gone, so nothing else can reach the context.
        drop(unsafe { Box::from_raw(io_proc.context) });
        Ok(())
    }
}

fn check(status: OSStatus, operation: &'static str) -> Result<(), CaptureError> {
    if status == 0 {
        Ok(())
    } else {
        Err(CaptureError::Platform { operation, status })
    }
}

/// IOProc invoked by the HAL on its real-time thread.
///
/// Decodes the first input buffer in place and hands it to the callback. No
/// allocation, locking, or logging happens here.
unsafe extern "C" fn io_proc(
    _device: AudioObjectID,
    _now: *const AudioTimeStamp,
    input_data: *const AudioBufferList,
    _input_time: *const AudioTimeStamp,
    _output_data: *mut AudioBufferList,
    _output_time: *const AudioTimeStamp,
    client_data: *mut c_void,
) -> OSStatus {
    if client_data.is_null() || input_data.is_null() {
        return 0;
    }
    let context = &mut *(client_data as *mut IoProcContext);
    let buffers = &*input_data;
    if buffers.mNumberBuffers == 0 {
        return 0;
    }

    let buffer = &buffers.mBuffers[0];
    if buffer.mData.is_null() || buffer.mDataByteSize == 0 {
        return 0;
    }
    let channels = buffer.mNumberChannels.clamp(1, u16::MAX as u32) as u16;
    let bytes = buffer.mDataByteSize as usize;

    let batch = match context.encoding {
        SampleEncoding::Float32 => FrameBatch::F32 {
            samples: slice::from_raw_parts(buffer.mData as *const f32, bytes / 4),
            channels,
        },
        SampleEncoding::SignedInt32 => FrameBatch::I32 {
            samples: slice::from_raw_parts(buffer.mData as *const i32, bytes / 4),
            channels,
        },
        SampleEncoding::SignedInt16 => FrameBatch::I16 {
            samples: slice::from_raw_parts(buffer.mData as *const i16, bytes / 2),
            channels,
        },
    };
    (context.callback)(&batch);

    0
}

#[cfg(test)]
mod tests {
    use std::ptr;
    use std::sync::mpsc;

    use coreaudio_sys::AudioBuffer;

    use super::*;

    fn context_with_sender(
        encoding: SampleEncoding,
    ) -> (Box<IoProcContext>, mpsc::Receiver<Vec<(i32, i32)>>) {
        let (tx, rx) = mpsc::channel();
        let callback: FrameCallback = Box::new(move |batch: &FrameBatch<'_>| {
            let _ = tx.send(batch.stereo_frames().collect());
        });
        (Box::new(IoProcContext { callback, encoding }), rx)
    }

    unsafe fn invoke(context: &mut IoProcContext, buffers: &AudioBufferList) -> OSStatus {
        io_proc(
            0,
            ptr::null(),
            buffers,
            ptr::null(),
            ptr::null_mut(),
            ptr::null(),
            context as *mut IoProcContext as *mut c_void,
        )
    }

    #[test]
    fn io_proc_decodes_float_input() {
        let (mut context, rx) = context_with_sender(SampleEncoding::Float32);
        let mut samples = [0.5f32, -0.5, 0.0, 1.0];
        let buffers = AudioBufferList {
            mNumberBuffers: 1,
            mBuffers: [AudioBuffer {
                mNumberChannels: 2,
                mDataByteSize: (samples.len() * 4) as u32,
                mData: samples.as_mut_ptr() as *mut c_void,
            }],
        };

        let status = unsafe { invoke(&mut context, &buffers) };
        assert_eq!(status, 0);
        assert_eq!(rx.recv().unwrap(), vec![(1 << 30, -(1 << 30)), (0, i32::MAX)]);
    }

    #[test]
    fn io_proc_decodes_int16_mono_input() {
        let (mut context, rx) = context_with_sender(SampleEncoding::SignedInt16);
        let mut samples = [1i16, -2];
        let buffers = AudioBufferList {
            mNumberBuffers: 1,
            mBuffers: [AudioBuffer {
                mNumberChannels: 1,
                mDataByteSize: (samples.len() * 2) as u32,
                mData: samples.as_mut_ptr() as *mut c_void,
            }],
        };

        unsafe { invoke(&mut context, &buffers) };
        assert_eq!(rx.recv().unwrap(), vec![(65536, 65536), (-131072, -131072)]);
    }

    #[test]
    fn io_proc_ignores_empty_input() {
        let (mut context, rx) = context_with_sender(SampleEncoding::SignedInt32);
        let buffers = AudioBufferList {
            mNumberBuffers: 1,
            mBuffers: [AudioBuffer {
                mNumberChannels: 2,
                mDataByteSize: 0,
                mData: ptr::null_mut(),
            }],
        };

        let status = unsafe { invoke(&mut context, &buffers) };
        assert_eq!(status, 0);
        assert!(rx.try_recv().is_err());
    }
}
