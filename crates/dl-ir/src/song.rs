//! Song sequence and static voice mix.

use alloc::vec::Vec;
use arrayvec::ArrayString;
use thiserror::Error;

use crate::pattern::Pattern;
use crate::sample::{truncated, SampleLibrary};

/// Upper bound on simultaneous voices.
pub const MAX_VOICES: usize = 8;

/// Full-scale pan weight. `pan` feeds the left channel, `PAN_MAX - pan` the right.
pub const PAN_MAX: u8 = 32;

/// Static mix settings for one voice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VoiceSettings {
    /// Left/right balance (0-32, linear)
    pub pan: u8,
    /// Base gain (0-255)
    pub volume: u8,
    /// Library index, or `None` for a silent voice
    pub sample: Option<u8>,
}

impl VoiceSettings {
    pub const fn new(pan: u8, volume: u8, sample: u8) -> Self {
        Self {
            pan,
            volume,
            sample: Some(sample),
        }
    }
}

/// Reasons a song cannot be played against a given library.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SongError {
    #[error("song order is empty")]
    EmptyOrder,
    #[error("song has no voices")]
    NoVoices,
    #[error("song has {0} voices, at most {max} supported", max = MAX_VOICES)]
    TooManyVoices(usize),
    #[error("tempo must be non-zero")]
    ZeroTempo,
    #[error("beats per bar must be non-zero")]
    ZeroBeats,
    #[error("bar {bar} references pattern {pattern}, only {available} defined")]
    UnknownPattern {
        bar: usize,
        pattern: u8,
        available: usize,
    },
    #[error("pattern {pattern} has {found} lanes, song has {expected} voices")]
    LaneMismatch {
        pattern: usize,
        found: usize,
        expected: usize,
    },
    #[error("pattern {pattern} is {found} ticks long, song bar is {expected}")]
    BarLengthMismatch {
        pattern: usize,
        found: u16,
        expected: u16,
    },
    #[error("voice {voice} uses sample {sample}, library holds {available}")]
    UnknownSample {
        voice: usize,
        sample: u8,
        available: usize,
    },
    #[error("voice {voice} pan {pan} exceeds {max}", max = PAN_MAX)]
    PanOutOfRange { voice: usize, pan: u8 },
}

/// A looping song: voices, bar grids, and the bar order.
#[derive(Clone, Debug)]
pub struct Song {
    /// Song title
    pub title: ArrayString<32>,
    /// Tempo in beats per minute
    pub bpm: u16,
    /// Beats in one bar
    pub beats_per_bar: u8,
    /// Ticks in one bar (grid resolution)
    pub ticks_per_bar: u16,
    /// Static per-voice mix
    pub voices: Vec<VoiceSettings>,
    /// Bar grids
    pub patterns: Vec<Pattern>,
    /// Bar order: order[bar] indexes `patterns`; looped
    pub order: Vec<u8>,
}

impl Song {
    /// Create an empty song.
    pub fn new(title: &str, bpm: u16, beats_per_bar: u8, ticks_per_bar: u16) -> Self {
        Self {
            title: truncated(title),
            bpm,
            beats_per_bar,
            ticks_per_bar,
            voices: Vec::new(),
            patterns: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Add a pattern and return its index.
    pub fn add_pattern(&mut self, pattern: Pattern) -> u8 {
        self.patterns.push(pattern);
        (self.patterns.len() - 1) as u8
    }

    /// Append a bar to the order.
    pub fn add_bar(&mut self, pattern: u8) {
        self.order.push(pattern);
    }

    /// Number of bars before the order loops.
    pub fn loop_bars(&self) -> usize {
        self.order.len()
    }

    /// Grid played at `bar` (taken modulo the loop length).
    #[inline]
    pub fn pattern_at(&self, bar: usize) -> &Pattern {
        let idx = self.order[bar % self.order.len()];
        &self.patterns[idx as usize]
    }

    /// Check every index the engine will follow at run time.
    pub fn validate(&self, library: &SampleLibrary) -> Result<(), SongError> {
        if self.bpm == 0 {
            return Err(SongError::ZeroTempo);
        }
        if self.beats_per_bar == 0 {
            return Err(SongError::ZeroBeats);
        }
        if self.order.is_empty() {
            return Err(SongError::EmptyOrder);
        }
        if self.voices.is_empty() {
            return Err(SongError::NoVoices);
        }
        if self.voices.len() > MAX_VOICES {
            return Err(SongError::TooManyVoices(self.voices.len()));
        }

        for (bar, &pattern) in self.order.iter().enumerate() {
            if pattern as usize >= self.patterns.len() {
                return Err(SongError::UnknownPattern {
                    bar,
                    pattern,
                    available: self.patterns.len(),
                });
            }
        }

        for (i, pattern) in self.patterns.iter().enumerate() {
            if pattern.lanes as usize != self.voices.len() {
                return Err(SongError::LaneMismatch {
                    pattern: i,
                    found: pattern.lanes as usize,
                    expected: self.voices.len(),
                });
            }
            if pattern.ticks != self.ticks_per_bar {
                return Err(SongError::BarLengthMismatch {
                    pattern: i,
                    found: pattern.ticks,
                    expected: self.ticks_per_bar,
                });
            }
        }

        for (voice, settings) in self.voices.iter().enumerate() {
            if settings.pan > PAN_MAX {
                return Err(SongError::PanOutOfRange {
                    voice,
                    pan: settings.pan,
                });
            }
            if let Some(sample) = settings.sample {
                if sample as usize >= library.len() {
                    return Err(SongError::UnknownSample {
                        voice,
                        sample,
                        available: library.len(),
                    });
                }
            }
        }

        Ok(())
    }
}
