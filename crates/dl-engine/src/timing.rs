//! Bar/tick/sample state machine.

use dl_ir::Position;

/// Frames per grid tick, in two integer steps: whole samples per beat
/// first, then per tick.
pub fn samples_per_tick(sample_rate: u32, bpm: u16, beats_per_bar: u8, ticks_per_bar: u16) -> u32 {
    if bpm == 0 || ticks_per_bar == 0 {
        return 0;
    }
    let samples_per_beat = sample_rate as u64 * 60 / bpm as u64;
    (samples_per_beat * beats_per_bar as u64 / ticks_per_bar as u64) as u32
}

/// Position counters advanced once per generated frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timing {
    bar: u16,
    tick: u16,
    sample: u32,
    samples_per_tick: u32,
    ticks_per_bar: u16,
    loop_bars: u16,
}

impl Timing {
    /// Start at the loop origin. All three lengths must be non-zero.
    pub fn new(samples_per_tick: u32, ticks_per_bar: u16, loop_bars: u16) -> Self {
        debug_assert!(samples_per_tick > 0 && ticks_per_bar > 0 && loop_bars > 0);
        Self {
            bar: 0,
            tick: 0,
            sample: 0,
            samples_per_tick,
            ticks_per_bar,
            loop_bars,
        }
    }

    /// True on the first frame of a tick; checked before the frame is mixed.
    #[inline]
    pub fn is_tick_start(&self) -> bool {
        self.sample == 0
    }

    /// Step past the frame just produced.
    #[inline]
    pub fn advance(&mut self) {
        self.sample += 1;
        if self.sample < self.samples_per_tick {
            return;
        }
        self.sample = 0;
        self.tick += 1;
        if self.tick < self.ticks_per_bar {
            return;
        }
        self.tick = 0;
        self.bar += 1;
        if self.bar >= self.loop_bars {
            self.bar = 0;
        }
    }

    pub fn bar(&self) -> u16 {
        self.bar
    }

    pub fn tick(&self) -> u16 {
        self.tick
    }

    pub fn samples_per_tick(&self) -> u32 {
        self.samples_per_tick
    }

    pub fn ticks_per_bar(&self) -> u16 {
        self.ticks_per_bar
    }

    pub fn loop_bars(&self) -> u16 {
        self.loop_bars
    }

    pub fn position(&self) -> Position {
        Position {
            bar: self.bar,
            tick: self.tick,
            sample: self.sample,
        }
    }

    /// Return to the loop origin.
    pub fn reset(&mut self) {
        self.bar = 0;
        self.tick = 0;
        self.sample = 0;
    }
}
