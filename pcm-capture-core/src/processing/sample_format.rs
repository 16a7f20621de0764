//! Decoding of native callback buffers into raw 32-bit frames.
//!
//! Callbacks hand over whatever the device delivers; everything that enters
//! the frame queue is a signed 32-bit left/right pair.

use crate::models::sample::RawFrame;

/// Borrowed view of one callback buffer of interleaved samples.
#[derive(Debug, Clone, Copy)]
pub enum FrameBatch<'a> {
    I16 { samples: &'a [i16], channels: u16 },
    I32 { samples: &'a [i32], channels: u16 },
    F32 { samples: &'a [f32], channels: u16 },
}

impl<'a> FrameBatch<'a> {
    pub fn channels(&self) -> u16 {
        match *self {
            Self::I16 { channels, .. }
            | Self::I32 { channels, .. }
            | Self::F32 { channels, .. } => channels,
        }
    }

    /// Number of complete interleaved frames. A trailing partial frame is ignored.
    pub fn frame_count(&self) -> usize {
        let channels = self.channels() as usize;
        if channels == 0 {
            return 0;
        }
        let len = match self {
            Self::I16 { samples, .. } => samples.len(),
            Self::I32 { samples, .. } => samples.len(),
            Self::F32 { samples, .. } => samples.len(),
        };
        len / channels
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    /// Left/right pair of frame `index`, widened to raw 32-bit frames.
    ///
    /// Mono frames are duplicated into both channels. Channels beyond the
    /// second are ignored.
    pub fn stereo_frame(&self, index: usize) -> Option<(RawFrame, RawFrame)> {
        if index >= self.frame_count() {
            return None;
        }
        let channels = self.channels() as usize;
        let left = index * channels;
        let right = if channels >= 2 { left + 1 } else { left };
        let pair = match self {
            Self::I16 { samples, .. } => (widen_i16(samples[left]), widen_i16(samples[right])),
            Self::I32 { samples, .. } => (samples[left], samples[right]),
            Self::F32 { samples, .. } => {
                (quantize_f32(samples[left]), quantize_f32(samples[right]))
            }
        };
        Some(pair)
    }

    /// Iterator over the left/right pairs of every complete frame.
    pub fn stereo_frames(&self) -> impl Iterator<Item = (RawFrame, RawFrame)> + '_ {
        (0..self.frame_count()).filter_map(move |i| self.stereo_frame(i))
    }
}

/// Scale a 16-bit sample to the full 32-bit range.
pub fn widen_i16(sample: i16) -> RawFrame {
    (sample as i32) << 16
}

/// Convert a float sample in [-1.0, 1.0] to a signed 32-bit sample.
///
/// Out-of-range input is clamped; `as` saturates the +1.0 edge to `i32::MAX`.
pub fn quantize_f32(sample: f32) -> RawFrame {
    if sample.is_nan() {
        return 0;
    }
    (sample.clamp(-1.0, 1.0) as f64 * 2_147_483_648.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widen_i16_keeps_sign_and_scale() {
        assert_eq!(widen_i16(0), 0);
        assert_eq!(widen_i16(1), 65536);
        assert_eq!(widen_i16(-1), -65536);
        assert_eq!(widen_i16(i16::MAX), 0x7FFF_0000);
        assert_eq!(widen_i16(i16::MIN), i32::MIN);
    }

    #[test]
    fn quantize_f32_maps_unit_range() {
        assert_eq!(quantize_f32(0.0), 0);
        assert_eq!(quantize_f32(0.5), 1 << 30);
        assert_eq!(quantize_f32(-0.5), -(1 << 30));
        assert_eq!(quantize_f32(1.0), i32::MAX);
        assert_eq!(quantize_f32(-1.0), i32::MIN);
    }

    #[test]
    fn quantize_f32_clamps_out_of_range() {
        assert_eq!(quantize_f32(3.0), i32::MAX);
        assert_eq!(quantize_f32(-7.5), i32::MIN);
        assert_eq!(quantize_f32(f32::NAN), 0);
    }

    #[test]
    fn stereo_batch_pairs_interleaved_samples() {
        let samples = [1, 2, 3, 4];
        let batch = FrameBatch::I32 {
            samples: &samples,
            channels: 2,
        };
        assert_eq!(batch.frame_count(), 2);
        assert_eq!(batch.stereo_frames().collect::<Vec<_>>(), vec![(1, 2), (3, 4)]);
    }

    #[test]
    fn mono_batch_duplicates_channel() {
        let samples = [1i16, -1];
        let batch = FrameBatch::I16 {
            samples: &samples,
            channels: 1,
        };
        assert_eq!(
            batch.stereo_frames().collect::<Vec<_>>(),
            vec![(65536, 65536), (-65536, -65536)]
        );
    }

    #[test]
    fn surround_batch_keeps_front_pair() {
        let samples = [1, 2, 9, 9, 9, 9, 3, 4, 9, 9, 9, 9];
        let batch = FrameBatch::I32 {
            samples: &samples,
            channels: 6,
        };
        assert_eq!(batch.stereo_frames().collect::<Vec<_>>(), vec![(1, 2), (3, 4)]);
    }

    #[test]
    fn trailing_partial_frame_is_ignored() {
        let samples = [0.5f32, -0.5, 0.25];
        let batch = FrameBatch::F32 {
            samples: &samples,
            channels: 2,
        };
        assert_eq!(batch.frame_count(), 1);
        assert_eq!(batch.stereo_frame(1), None);
        assert_eq!(batch.stereo_frame(0), Some((1 << 30, -(1 << 30))));
    }

    #[test]
    fn zero_channels_is_empty() {
        let batch = FrameBatch::I32 {
            samples: &[1, 2, 3],
            channels: 0,
        };
        assert!(batch.is_empty());
        assert_eq!(batch.stereo_frames().count(), 0);
    }
}
