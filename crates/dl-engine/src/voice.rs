//! Per-voice playback state.

use dl_ir::{SampleLibrary, VoiceSettings, MAX_VOICES, PAN_MAX};

/// Fixed-capacity voice storage; never reallocates after construction.
pub type VoiceBank = heapless::Vec<Voice, MAX_VOICES>;

/// Playback state of one voice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Voice {
    /// Left weight; the right channel gets `PAN_MAX - pan`
    pub pan: u8,
    /// Static base gain
    pub volume: u8,
    /// Library index, `None` for a silent voice
    pub sample: Option<usize>,
    /// Read offset into the sample table; 0 while idle
    pub pos: usize,
    /// Transient gain set by the last trigger
    pub emph: u16,
}

impl Voice {
    pub fn new(settings: &VoiceSettings) -> Self {
        Self {
            pan: settings.pan,
            volume: settings.volume,
            sample: settings.sample.map(usize::from),
            pos: 0,
            emph: 0,
        }
    }

    /// Restart the sample from its first audible element.
    #[inline]
    pub fn trigger(&mut self, emph: u16) {
        self.pos = 1;
        self.emph = emph;
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.pos == 0
    }

    /// Combined gain: emphasis plus base volume.
    #[inline]
    pub fn gain(&self) -> i32 {
        self.emph as i32 + self.volume as i32
    }

    /// Left and right pan weights.
    #[inline]
    pub fn pan_weights(&self) -> (i32, i32) {
        (self.pan as i32, (PAN_MAX - self.pan) as i32)
    }

    /// Read the value under the play head and step past it.
    ///
    /// An idle voice reads the silent head element and stays idle. A
    /// playing voice wraps back to idle at the end of its table. A voice
    /// with no sample, or one the library does not hold, yields silence.
    #[inline]
    pub fn next_value(&mut self, library: &SampleLibrary) -> i16 {
        let Some(table) = self.sample.and_then(|idx| library.get(idx)) else {
            return 0;
        };
        let value = table.get(self.pos);
        if self.pos != 0 {
            self.pos += 1;
            if self.pos >= table.len() {
                self.pos = 0;
            }
        }
        value
    }

    /// Forget any playing hit.
    pub fn silence(&mut self) {
        self.pos = 0;
        self.emph = 0;
    }
}
