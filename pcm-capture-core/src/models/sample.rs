/// One raw captured integer sample, as stored in the frame queue.
pub type RawFrame = i32;

/// One left/right channel pair as handed to consumers.
///
/// Laid out as two consecutive `RawFrame`s, so a block of interleaved raw
/// frames and a block of `StereoSample`s share the same memory layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct StereoSample {
    pub left: RawFrame,
    pub right: RawFrame,
}

const _: () = assert!(std::mem::size_of::<StereoSample>() == 2 * std::mem::size_of::<RawFrame>());

impl StereoSample {
    pub const SILENCE: Self = Self { left: 0, right: 0 };

    pub const fn new(left: RawFrame, right: RawFrame) -> Self {
        Self { left, right }
    }

    pub fn is_silent(&self) -> bool {
        *self == Self::SILENCE
    }
}
