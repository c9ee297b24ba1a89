//! Playback position within the looping song.

use core::fmt;

/// Where the sequencer is: bar of the loop, tick within the bar, and output
/// frame within the tick.
///
/// Ordering: bar is primary, then tick, then sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Bar index into the song order (0..loop_bars)
    pub bar: u16,
    /// Tick within the bar (0..ticks_per_bar)
    pub tick: u16,
    /// Output frame within the tick (0..samples_per_tick)
    pub sample: u32,
}

impl Position {
    /// The loop start.
    pub const fn zero() -> Self {
        Self { bar: 0, tick: 0, sample: 0 }
    }

    /// Position reached after `frames` output frames from the loop start.
    pub fn from_frame_count(
        frames: u64,
        samples_per_tick: u32,
        ticks_per_bar: u16,
        loop_bars: usize,
    ) -> Self {
        let spt = samples_per_tick.max(1) as u64;
        let tpb = ticks_per_bar.max(1) as u64;
        let bars = loop_bars.max(1) as u64;

        let ticks = frames / spt;
        Self {
            bar: ((ticks / tpb) % bars) as u16,
            tick: (ticks % tpb) as u16,
            sample: (frames % spt) as u32,
        }
    }

    /// Frames from the loop start to this position.
    pub fn to_frame_count(self, samples_per_tick: u32, ticks_per_bar: u16) -> u64 {
        let ticks = self.bar as u64 * ticks_per_bar as u64 + self.tick as u64;
        ticks * samples_per_tick as u64 + self.sample as u64
    }

    /// Frames in one full pass of the loop.
    pub fn loop_frames(samples_per_tick: u32, ticks_per_bar: u16, loop_bars: usize) -> u64 {
        samples_per_tick as u64 * ticks_per_bar as u64 * loop_bars as u64
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}.{:04}", self.bar, self.tick, self.sample)
    }
}
