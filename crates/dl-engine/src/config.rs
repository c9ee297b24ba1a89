//! Engine configuration and construction errors.

use dl_ir::SongError;
use thiserror::Error;

/// Right shift applied to each channel accumulator before truncation.
pub const OUTPUT_SHIFT: u32 = 15;

/// RP2040 system clock.
pub const PICO_SYS_CLOCK_HZ: u32 = 125_000_000;

/// PIO clock divider for the I2S program, times 100 (44.25).
pub const PICO_I2S_CLKDIV_X100: u32 = 4425;

/// Default rate for hosted output devices.
pub const HOSTED_SAMPLE_RATE: u32 = 44_100;

/// Frame rate produced by the I2S program: 32 PIO cycles per channel,
/// two channels per frame.
pub const fn i2s_sample_rate(sys_clock_hz: u32, clkdiv_x100: u32) -> u32 {
    (sys_clock_hz as u64 * 100 / clkdiv_x100 as u64 / 64) as u32
}

/// Fixed parameters chosen before the engine is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Output frame rate in Hz
    pub sample_rate: u32,
}

impl EngineConfig {
    /// Clocked from the Pico I2S divider (44 138 Hz).
    pub const PICO: Self = Self {
        sample_rate: i2s_sample_rate(PICO_SYS_CLOCK_HZ, PICO_I2S_CLKDIV_X100),
    };

    pub const fn hosted() -> Self {
        Self::with_sample_rate(HOSTED_SAMPLE_RATE)
    }

    pub const fn with_sample_rate(sample_rate: u32) -> Self {
        Self { sample_rate }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::hosted()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Song(#[from] SongError),
    #[error("{sample_rate} Hz at {bpm} BPM gives less than one sample per tick")]
    TickTooShort { sample_rate: u32, bpm: u16 },
    #[error("song loop of {0} bars exceeds the position range")]
    LoopTooLong(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pico_rate_matches_clock_divider() {
        assert_eq!(EngineConfig::PICO.sample_rate, 44_138);
    }

    #[test]
    fn default_is_hosted() {
        assert_eq!(EngineConfig::default().sample_rate, HOSTED_SAMPLE_RATE);
    }
}
