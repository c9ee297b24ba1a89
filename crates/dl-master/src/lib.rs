//! Headless controller for drumloop.
//!
//! Owns a song and its sample library, runs real-time playback on a fill
//! thread feeding the audio device through the buffer ring, and renders
//! offline for export and tests.

mod playback;
mod wav;

use dl_audio::{AudioError, OutputDevice, SimulatedOutput};
use dl_engine::{BufferRing, Engine, DEFAULT_BLOCK_SIZE, DEFAULT_SLOTS};
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use thiserror::Error;

use playback::PlaybackHandle;

// Re-export common types so callers don't need dl-ir/dl-engine directly.
pub use dl_engine::{EngineConfig, EngineError, Frame};
pub use dl_ir::{PatternError, Position, SampleLibrary, Song};

pub use wav::{frames_to_wav, write_wav};

/// How the fill thread waits while every free slot is already written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FillPolicy {
    /// Spin on the ring indices
    #[default]
    BusyPoll,
    /// Park until the device completes a slot
    Wait,
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Audio(#[from] AudioError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("playback thread exited during startup")]
    PlaybackThread,
}

/// Headless drum machine controller.
pub struct Controller {
    song: Song,
    library: SampleLibrary,
    config: EngineConfig,
    playback: Option<PlaybackHandle>,
}

impl Controller {
    /// Check that `song` plays against `library` at `config` and wrap them.
    pub fn new(song: Song, library: SampleLibrary, config: EngineConfig) -> Result<Self, ControllerError> {
        let controller = Self {
            song,
            library,
            config,
            playback: None,
        };
        controller.engine()?;
        Ok(controller)
    }

    /// The built-in song on the built-in kit.
    pub fn demo(config: EngineConfig) -> Result<Self, ControllerError> {
        let song = dl_ir::demo_song()?;
        let library = dl_ir::drum_kit(config.sample_rate);
        Self::new(song, library, config)
    }

    pub fn song(&self) -> &Song {
        &self.song
    }

    pub fn library(&self) -> &SampleLibrary {
        &self.library
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// A fresh engine positioned at the loop start.
    pub fn engine(&self) -> Result<Engine, EngineError> {
        Engine::new(self.song.clone(), self.library.clone(), self.config)
    }

    // --- Real-time playback ---

    /// Start streaming to the default audio device. Returns once the device
    /// is running or has failed to start.
    pub fn play(&mut self, policy: FillPolicy) -> Result<(), ControllerError> {
        self.stop();

        let engine = self.engine()?;
        let (ready_tx, ready_rx) = mpsc::channel();
        let handle = PlaybackHandle::spawn(engine, policy, ready_tx)?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.playback = Some(handle);
                Ok(())
            }
            Ok(Err(e)) => {
                handle.stop();
                Err(e)
            }
            Err(_) => {
                handle.stop();
                Err(ControllerError::PlaybackThread)
            }
        }
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.playback.take() {
            handle.stop();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback
            .as_ref()
            .is_some_and(|p| !p.finished.load(Ordering::Relaxed))
    }

    /// Position of the audio the device is playing right now.
    pub fn position(&self) -> Option<Position> {
        let pb = self.playback.as_ref()?;
        if pb.finished.load(Ordering::Relaxed) {
            return None;
        }
        let frames = pb.frames_played.load(Ordering::Relaxed);
        Some(Position::from_frame_count(
            frames,
            pb.samples_per_tick,
            self.song.ticks_per_bar,
            self.song.loop_bars(),
        ))
    }

    // --- Offline rendering ---

    /// Render `count` frames straight from a fresh engine.
    pub fn render_frames(&self, count: usize) -> Result<Vec<Frame>, ControllerError> {
        let mut engine = self.engine()?;
        Ok(engine.render_frames(count))
    }

    /// Render `blocks` ring slots by pumping a fresh engine through the
    /// buffer ring into the simulated device.
    pub fn render_blocks(&self, blocks: usize) -> Result<Vec<Frame>, ControllerError> {
        let mut engine = self.engine()?;
        let (mut producer, mut consumer) =
            BufferRing::<DEFAULT_SLOTS, DEFAULT_BLOCK_SIZE>::new().into_split();
        producer.prefill(&mut engine);
        consumer.park();

        let mut device = SimulatedOutput::<DEFAULT_SLOTS, DEFAULT_BLOCK_SIZE>::new(engine.sample_rate());
        device.start(consumer, None)?;

        let mut frames = Vec::with_capacity(blocks * DEFAULT_BLOCK_SIZE);
        for _ in 0..blocks {
            device.stream_frames(&mut frames)?;
            producer.fill_one_buffer(&mut engine);
        }
        device.stop()?;
        Ok(frames)
    }

    /// Frames in `bars` bars at the configured rate.
    pub fn bar_frames(&self, bars: usize) -> Result<usize, ControllerError> {
        let engine = self.engine()?;
        let per_bar = engine.samples_per_tick() as usize * self.song.ticks_per_bar as usize;
        Ok(per_bar * bars)
    }

    /// Render `bars` bars from the loop start as a WAV file image.
    pub fn render_to_wav(&self, bars: usize) -> Result<Vec<u8>, ControllerError> {
        let frames = self.render_frames(self.bar_frames(bars)?)?;
        log::info!("rendered {} bars, {} frames", bars, frames.len());
        Ok(wav::frames_to_wav(&frames, self.config.sample_rate)?)
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.stop();
    }
}
