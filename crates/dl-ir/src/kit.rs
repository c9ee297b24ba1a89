//! Built-in drum kit.
//!
//! Five one-shot percussion tables synthesized once at startup. The output is
//! deterministic for a given sample rate: noise comes from a fixed-seed
//! xorshift generator.

use alloc::vec::Vec;
use core::f32::consts::TAU;

use crate::sample::{Sample, SampleLibrary};

/// Kit slot names, in library order.
pub const KIT_NAMES: [&str; 5] = ["kick", "clap", "snare", "hihat", "perc"];

/// Peak level of the synthesized tables, as a fraction of full scale.
const HEADROOM: f32 = 0.8;

/// Build the five-piece kit at `sample_rate`.
pub fn drum_kit(sample_rate: u32) -> SampleLibrary {
    let rate = sample_rate.max(1) as f32;
    let mut lib = SampleLibrary::new();
    lib.push(Sample::new("kick", &kick(rate)));
    lib.push(Sample::new("clap", &clap(rate)));
    lib.push(Sample::new("snare", &snare(rate)));
    lib.push(Sample::new("hihat", &hihat(rate)));
    lib.push(Sample::new("perc", &perc(rate)));
    lib
}

/// Fixed-seed xorshift32, mapped to [-1, 1).
struct Noise(u32);

impl Noise {
    fn new() -> Self {
        Self(0x2545_f491)
    }

    fn next(&mut self) -> f32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        (x as i32) as f32 / 2_147_483_648.0
    }
}

fn render(rate: f32, seconds: f32, mut voice: impl FnMut(f32) -> f32) -> Vec<i16> {
    let len = (rate * seconds) as usize;
    (0..len)
        .map(|n| {
            let v = voice(n as f32 / rate).clamp(-1.0, 1.0);
            (v * HEADROOM * 32767.0) as i16
        })
        .collect()
}

fn decay(t: f32, tau: f32) -> f32 {
    libm::expf(-t / tau)
}

/// Sine with an exponential pitch drop from 150 Hz to 45 Hz.
fn kick(rate: f32) -> Vec<i16> {
    let mut phase = 0.0f32;
    render(rate, 0.30, |t| {
        let freq = 45.0 + 105.0 * decay(t, 0.03);
        phase += TAU * freq / rate;
        if phase > TAU {
            phase -= TAU;
        }
        libm::sinf(phase) * decay(t, 0.12)
    })
}

/// Three short noise bursts followed by a longer tail.
fn clap(rate: f32) -> Vec<i16> {
    let mut noise = Noise::new();
    render(rate, 0.25, |t| {
        let burst = [0.0f32, 0.011, 0.022]
            .iter()
            .filter(|&&start| t >= start)
            .map(|&start| decay(t - start, 0.004))
            .fold(0.0f32, f32::max);
        let tail = if t >= 0.022 { decay(t - 0.022, 0.06) } else { 0.0 };
        noise.next() * burst.max(tail)
    })
}

/// Pitched body plus a noise rattle.
fn snare(rate: f32) -> Vec<i16> {
    let mut noise = Noise::new();
    render(rate, 0.20, |t| {
        let body = libm::sinf(TAU * 185.0 * t) * decay(t, 0.05);
        let rattle = noise.next() * decay(t, 0.07);
        0.5 * body + 0.6 * rattle
    })
}

/// First-difference high-passed noise, very short.
fn hihat(rate: f32) -> Vec<i16> {
    let mut noise = Noise::new();
    let mut prev = 0.0f32;
    render(rate, 0.08, |t| {
        let n = noise.next();
        let hp = n - prev;
        prev = n;
        0.5 * hp * decay(t, 0.02)
    })
}

/// Two inharmonic partials, like a small wood block.
fn perc(rate: f32) -> Vec<i16> {
    render(rate, 0.18, |t| {
        let a = libm::sinf(TAU * 520.0 * t);
        let b = libm::sinf(TAU * 790.0 * t);
        (0.7 * a + 0.3 * b) * decay(t, 0.05)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kit_has_five_named_slots() {
        let kit = drum_kit(44_100);
        assert_eq!(kit.len(), KIT_NAMES.len());
        for (i, name) in KIT_NAMES.iter().enumerate() {
            assert_eq!(kit.index_of(name), Some(i));
        }
    }

    #[test]
    fn every_table_starts_silent_and_is_audible() {
        let kit = drum_kit(44_100);
        for sample in kit.iter() {
            assert_eq!(sample.get(0), 0, "{} head must be silent", sample.name);
            assert!(sample.peak() > 1000, "{} too quiet: {}", sample.name, sample.peak());
            assert!(sample.peak() <= (0.8 * 32767.0) as u16 + 1);
        }
    }

    #[test]
    fn lengths_scale_with_sample_rate() {
        let lo = drum_kit(22_050);
        let hi = drum_kit(44_100);
        let kick_lo = lo.get(0).map(Sample::len).unwrap_or(0);
        let kick_hi = hi.get(0).map(Sample::len).unwrap_or(0);
        // 0.30 s plus the head element
        assert_eq!(kick_lo, 6615 + 1);
        assert_eq!(kick_hi, 13230 + 1);
    }

    #[test]
    fn synthesis_is_deterministic() {
        let a = drum_kit(48_000);
        let b = drum_kit(48_000);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x, y);
        }
    }
}
