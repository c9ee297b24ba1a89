//! Audio frame type and the packed word the output device consumes.

use crate::config::OUTPUT_SHIFT;

/// A stereo audio frame (16-bit integer).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub left: i16,
    pub right: i16,
}

impl Frame {
    /// Create a silent frame.
    pub const fn silence() -> Self {
        Self { left: 0, right: 0 }
    }

    /// Downmix 32-bit channel accumulators. Each channel is shifted right
    /// arithmetically and truncated to its low 16 bits.
    #[inline]
    pub const fn from_accumulators(left: i32, right: i32) -> Self {
        Self {
            left: (left >> OUTPUT_SHIFT) as i16,
            right: (right >> OUTPUT_SHIFT) as i16,
        }
    }

    /// Pack into one word: left in the high half, right in the low half.
    #[inline]
    pub const fn to_word(self) -> u32 {
        ((self.left as u16 as u32) << 16) | self.right as u16 as u32
    }

    #[inline]
    pub const fn from_word(word: u32) -> Self {
        Self {
            left: (word >> 16) as u16 as i16,
            right: word as u16 as i16,
        }
    }
}
