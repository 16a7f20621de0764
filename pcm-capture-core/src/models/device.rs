/// Opaque platform identifier of an audio device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(pub u32);

/// Descriptive properties of an input device, used for logging only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub id: DeviceId,
    pub name: String,
    pub manufacturer: String,
    pub uid: String,
}

/// Integer/float layout of samples in a native stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleEncoding {
    Float32,
    SignedInt16,
    SignedInt32,
}

/// Linear PCM format id ('lpcm').
pub const FORMAT_LINEAR_PCM: u32 = u32::from_be_bytes(*b"lpcm");

pub const FORMAT_FLAG_IS_FLOAT: u32 = 1 << 0;
pub const FORMAT_FLAG_IS_BIG_ENDIAN: u32 = 1 << 1;
pub const FORMAT_FLAG_IS_SIGNED_INTEGER: u32 = 1 << 2;
pub const FORMAT_FLAG_IS_PACKED: u32 = 1 << 3;
pub const FORMAT_FLAG_IS_NON_INTERLEAVED: u32 = 1 << 5;

/// Basic description of a native stream format.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamFormat {
    pub sample_rate: f64,
    pub format_id: u32,
    pub format_flags: u32,
    pub bits_per_channel: u32,
    pub channels_per_frame: u32,
    pub bytes_per_frame: u32,
}

impl StreamFormat {
    /// Interleaved 32-bit float linear PCM.
    pub fn float32(sample_rate: f64, channels: u32) -> Self {
        Self {
            sample_rate,
            format_id: FORMAT_LINEAR_PCM,
            format_flags: FORMAT_FLAG_IS_FLOAT | FORMAT_FLAG_IS_PACKED,
            bits_per_channel: 32,
            channels_per_frame: channels,
            bytes_per_frame: 4 * channels,
        }
    }

    /// Format id rendered as its four-character code, e.g. `lpcm`.
    ///
    /// Non-printable bytes are replaced with `?`.
    pub fn format_id_string(&self) -> String {
        self.format_id
            .to_be_bytes()
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
            .collect()
    }

    pub fn is_float(&self) -> bool {
        self.format_flags & FORMAT_FLAG_IS_FLOAT != 0
    }

    pub fn is_signed_integer(&self) -> bool {
        self.format_flags & FORMAT_FLAG_IS_SIGNED_INTEGER != 0
    }

    pub fn is_interleaved(&self) -> bool {
        self.format_flags & FORMAT_FLAG_IS_NON_INTERLEAVED == 0
    }

    /// How callback buffers in this format must be decoded.
    ///
    /// Returns `None` for layouts the frame queue cannot take directly
    /// (non-linear-PCM, big-endian, 24-bit, one buffer per channel, ...).
    pub fn sample_encoding(&self) -> Option<SampleEncoding> {
        if self.format_id != FORMAT_LINEAR_PCM
            || self.format_flags & FORMAT_FLAG_IS_BIG_ENDIAN != 0
            || (!self.is_interleaved() && self.channels_per_frame > 1)
        {
            return None;
        }
        match (self.is_float(), self.is_signed_integer(), self.bits_per_channel) {
            (true, _, 32) => Some(SampleEncoding::Float32),
            (false, true, 16) => Some(SampleEncoding::SignedInt16),
            (false, true, 32) => Some(SampleEncoding::SignedInt32),
            _ => None,
        }
    }
}

/// Snapshot of capture counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureDiagnostics {
    pub callback_count: u64,
    pub frames_captured: u64,
    pub frames_dropped: u64,
    pub samples_read: u64,
    pub underruns: u64,
}
