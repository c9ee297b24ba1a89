//! Main playback engine.

use alloc::vec::Vec;
use dl_ir::{Position, SampleLibrary, Song};

use crate::config::{EngineConfig, EngineError};
use crate::frame::Frame;
use crate::ring::FrameSource;
use crate::timing::{samples_per_tick, Timing};
use crate::voice::{Voice, VoiceBank};

/// The main playback engine.
///
/// Owns the song, the sample library, every voice and the timing state.
/// Nothing here allocates once [`Engine::new`] returns.
pub struct Engine {
    /// The song being played
    song: Song,
    /// Sample tables the voices read from
    library: SampleLibrary,
    /// Voice states, one per pattern lane
    voices: VoiceBank,
    /// Current playback position
    timing: Timing,
    /// Audio sample rate (e.g., 44100)
    sample_rate: u32,
    /// Frames produced since construction
    frames_rendered: u64,
}

impl Engine {
    /// Validate `song` against `library` and build the engine.
    pub fn new(song: Song, library: SampleLibrary, config: EngineConfig) -> Result<Self, EngineError> {
        song.validate(&library)?;

        let spt = samples_per_tick(
            config.sample_rate,
            song.bpm,
            song.beats_per_bar,
            song.ticks_per_bar,
        );
        if spt == 0 {
            return Err(EngineError::TickTooShort {
                sample_rate: config.sample_rate,
                bpm: song.bpm,
            });
        }
        let loop_bars =
            u16::try_from(song.loop_bars()).map_err(|_| EngineError::LoopTooLong(song.loop_bars()))?;

        let mut voices = VoiceBank::new();
        for settings in &song.voices {
            // validate() caps the count at MAX_VOICES
            let _ = voices.push(Voice::new(settings));
        }

        log::info!(
            "engine: \"{}\" {} Hz, {} BPM, {} samples/tick, {} ticks/bar, {} bars, {} voices",
            song.title,
            config.sample_rate,
            song.bpm,
            spt,
            song.ticks_per_bar,
            loop_bars,
            voices.len()
        );

        Ok(Self {
            timing: Timing::new(spt, song.ticks_per_bar, loop_bars),
            song,
            library,
            voices,
            sample_rate: config.sample_rate,
            frames_rendered: 0,
        })
    }

    /// Generate one frame of audio.
    #[inline]
    pub fn render_frame(&mut self) -> Frame {
        // 1. Trigger voices on the first frame of a tick
        if self.timing.is_tick_start() {
            self.trigger_tick();
        }

        // 2. Mix all voices
        let output = self.mix_voices();

        // 3. Advance time
        self.timing.advance();
        self.frames_rendered += 1;

        output
    }

    /// Render `count` frames into a new buffer.
    pub fn render_frames(&mut self, count: usize) -> Vec<Frame> {
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.render_frame());
        }
        out
    }

    /// Render into an existing buffer.
    pub fn render_into(&mut self, out: &mut [Frame]) {
        for frame in out {
            *frame = self.render_frame();
        }
    }

    fn trigger_tick(&mut self) {
        let tick = self.timing.tick() as usize;
        let pattern = self.song.pattern_at(self.timing.bar() as usize);
        for (lane, voice) in self.voices.iter_mut().enumerate() {
            if let Some(emph) = pattern.hit(lane, tick).emphasis() {
                voice.trigger(emph);
            }
        }
    }

    fn mix_voices(&mut self) -> Frame {
        let mut left: i32 = 0;
        let mut right: i32 = 0;
        for voice in self.voices.iter_mut() {
            let value = voice.next_value(&self.library) as i32;
            let weighted = voice.gain().wrapping_mul(value);
            let (pan_l, pan_r) = voice.pan_weights();
            left = left.wrapping_add(weighted.wrapping_mul(pan_l));
            right = right.wrapping_add(weighted.wrapping_mul(pan_r));
        }
        Frame::from_accumulators(left, right)
    }

    /// Return to the loop start with every voice idle.
    pub fn reset(&mut self) {
        self.timing.reset();
        for voice in self.voices.iter_mut() {
            voice.silence();
        }
        self.frames_rendered = 0;
    }

    pub fn position(&self) -> Position {
        self.timing.position()
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn samples_per_tick(&self) -> u32 {
        self.timing.samples_per_tick()
    }

    /// Frames in one full pass of the song order.
    pub fn loop_frames(&self) -> u64 {
        Position::loop_frames(
            self.timing.samples_per_tick(),
            self.timing.ticks_per_bar(),
            self.timing.loop_bars() as usize,
        )
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn song(&self) -> &Song {
        &self.song
    }

    pub fn library(&self) -> &SampleLibrary {
        &self.library
    }
}

impl FrameSource for Engine {
    #[inline]
    fn next_word(&mut self) -> u32 {
        self.render_frame().to_word()
    }
}
