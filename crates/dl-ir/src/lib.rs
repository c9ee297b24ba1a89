//! Core data types for the drumloop sequencer.
//!
//! Sample tables, pattern grids, the song order and the playback position.
//! Everything here is built once at startup and read-only afterwards; the
//! engine crate owns all mutable state.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod demo;
mod kit;
mod pattern;
mod position;
mod sample;
pub mod song;

pub use demo::{demo_song, DEMO_BEATS_PER_BAR, DEMO_BPM, DEMO_TICKS_PER_BAR};
pub use kit::{drum_kit, KIT_NAMES};
pub use pattern::{Hit, Pattern, PatternError, EMPHASIS_STEP, MAX_LEVEL};
pub use position::Position;
pub use sample::{Sample, SampleLibrary};
pub use song::{Song, SongError, VoiceSettings, MAX_VOICES, PAN_MAX};
