//! Output devices for drumloop.
//!
//! A device owns the consumer half of a [`dl_engine::BufferRing`] and drains
//! one slot at a time at its own pace, advancing the ring after each slot.

mod cpal_backend;
mod sim_backend;
mod traits;

pub use cpal_backend::CpalOutput;
pub use sim_backend::SimulatedOutput;
pub use traits::{AudioError, CompletionHook, OutputDevice};
