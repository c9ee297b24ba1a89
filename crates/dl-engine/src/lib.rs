//! Playback engine for the drumloop sequencer.
//!
//! Walks the song position, triggers voices from the pattern grids and mixes
//! them into packed stereo frames. The [`BufferRing`] hands finished blocks
//! from the fill loop to whatever drains the output device.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod config;
mod frame;
mod mixer;
pub mod ring;
mod timing;
mod voice;

pub use config::{
    i2s_sample_rate, EngineConfig, EngineError, HOSTED_SAMPLE_RATE, OUTPUT_SHIFT,
    PICO_I2S_CLKDIV_X100, PICO_SYS_CLOCK_HZ,
};
pub use frame::Frame;
pub use mixer::Engine;
pub use ring::{
    BufferRing, FrameSource, RingConsumer, RingProducer, DEFAULT_BLOCK_SIZE, DEFAULT_SLOTS,
};
pub use timing::{samples_per_tick, Timing};
pub use voice::{Voice, VoiceBank};
