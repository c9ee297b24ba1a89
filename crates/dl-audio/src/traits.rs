//! Output device trait and error types.

use dl_engine::{RingConsumer, DEFAULT_BLOCK_SIZE, DEFAULT_SLOTS};
use thiserror::Error;

/// Error type for audio operations.
#[derive(Debug, Error)]
pub enum AudioError {
    /// Failed to initialize audio device
    #[error("device init error: {0}")]
    DeviceInit(String),
    /// Failed to create audio stream
    #[error("stream create error: {0}")]
    StreamCreate(String),
    /// Playback error
    #[error("playback error: {0}")]
    Playback(String),
    /// No audio device available
    #[error("no audio device available")]
    NoDevice,
    /// Device asked to stream before `start`
    #[error("device not started")]
    NotStarted,
    /// `start` called while a ring is attached
    #[error("device already started")]
    AlreadyStarted,
    /// Ring started before every slot was written
    #[error("buffer ring not pre-filled")]
    NotPrimed,
}

/// Runs in the device context after each completion with the slot that
/// streams next. Must not block or allocate.
pub type CompletionHook = Box<dyn FnMut(usize) + Send>;

/// A hardware-paced consumer of ring slots.
///
/// `start` arms the device on the slot following the parked one, so a ring
/// parked on slot `N - 1` begins streaming from slot 0. Every time a slot
/// has been streamed in full, the device completes it on the ring and runs
/// the hook.
pub trait OutputDevice<const N: usize = DEFAULT_SLOTS, const SIZE: usize = DEFAULT_BLOCK_SIZE> {
    /// Frame rate the device consumes at.
    fn sample_rate(&self) -> u32;

    /// Take the consumer half and begin streaming.
    fn start(
        &mut self,
        consumer: RingConsumer<N, SIZE>,
        hook: Option<CompletionHook>,
    ) -> Result<(), AudioError>;

    /// Stop streaming and release the ring.
    fn stop(&mut self) -> Result<(), AudioError>;
}
