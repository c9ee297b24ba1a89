//! CPAL-based output device.
//!
//! Stands in for the I2S peripheral and its DMA channel: the stream callback
//! plays the armed ring slot frame by frame and completes it on the ring when
//! the slot runs out.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};
use dl_engine::{Frame, RingConsumer};

use crate::traits::{AudioError, CompletionHook, OutputDevice};

/// CPAL-based audio output.
pub struct CpalOutput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
}

impl CpalOutput {
    /// Open the default output device at its default rate.
    pub fn new() -> Result<Self, AudioError> {
        Self::open(None)
    }

    /// Open the default output device at a fixed rate.
    pub fn with_sample_rate(sample_rate: u32) -> Result<Self, AudioError> {
        Self::open(Some(sample_rate))
    }

    fn open(sample_rate: Option<u32>) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceInit(e.to_string()))?;

        let mut config: StreamConfig = config.into();
        // Force stereo output; the stream callback assumes 2-channel interleaving
        config.channels = 2;
        if let Some(rate) = sample_rate {
            config.sample_rate = SampleRate(rate);
        }

        log::info!(
            "audio device {:?}: {} Hz, {} channels",
            device.name().unwrap_or_default(),
            config.sample_rate.0,
            config.channels
        );

        Ok(Self {
            device,
            config,
            stream: None,
        })
    }
}

/// Streaming state owned by the callback.
struct Cursor<const N: usize, const SIZE: usize> {
    consumer: RingConsumer<N, SIZE>,
    hook: Option<CompletionHook>,
    slot: usize,
    index: usize,
}

impl<const N: usize, const SIZE: usize> Cursor<N, SIZE> {
    #[inline]
    fn next_frame(&mut self) -> Frame {
        if self.index == SIZE {
            // primed before start, so complete() always yields a slot
            if let Some(next) = self.consumer.complete() {
                self.slot = next;
                if let Some(hook) = self.hook.as_mut() {
                    hook(next);
                }
            }
            self.index = 0;
        }
        let word = self.consumer.word(self.slot, self.index);
        self.index += 1;
        Frame::from_word(word)
    }
}

impl<const N: usize, const SIZE: usize> OutputDevice<N, SIZE> for CpalOutput {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    fn start(
        &mut self,
        mut consumer: RingConsumer<N, SIZE>,
        hook: Option<CompletionHook>,
    ) -> Result<(), AudioError> {
        if self.stream.is_some() {
            return Err(AudioError::AlreadyStarted);
        }
        let slot = consumer.complete().ok_or(AudioError::NotPrimed)?;
        let mut cursor = Cursor {
            consumer,
            hook,
            slot,
            index: 0,
        };
        let channels = self.config.channels as usize;

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    // One ring frame per device frame (channels samples per frame)
                    for chunk in data.chunks_mut(channels) {
                        let frame = cursor.next_frame();
                        let left = frame.left as f32 / 32768.0;
                        let right = frame.right as f32 / 32768.0;
                        // Write stereo pair; zero-fill any extra channels
                        for (i, sample) in chunk.iter_mut().enumerate() {
                            *sample = match i {
                                0 => left,
                                1 => right,
                                _ => 0.0,
                            };
                        }
                    }
                },
                |err| log::error!("audio stream error: {}", err),
                None,
            )
            .map_err(|e| AudioError::StreamCreate(e.to_string()))?;

        stream.play().map_err(|e| AudioError::Playback(e.to_string()))?;
        self.stream = Some(stream);
        log::debug!("cpal stream started on slot {}", slot);

        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        if let Some(stream) = self.stream.take() {
            stream.pause().map_err(|e| AudioError::Playback(e.to_string()))?;
            log::debug!("cpal stream stopped");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dl_engine::BufferRing;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn cursor_walks_slots_and_completes_at_each_boundary() {
        let (mut producer, mut consumer) = BufferRing::<4, 2>::new().into_split();
        let mut n = 0u32;
        producer.prefill(&mut || {
            n += 1;
            // distinct left and right halves per frame
            (n << 16) | (n + 100)
        });
        consumer.park();

        let completions = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&completions);
        let hook: CompletionHook = Box::new(move |_slot| {
            counted.fetch_add(1, Ordering::Relaxed);
        });

        let slot = consumer.complete().unwrap();
        let expected_words: Vec<u32> = (0..4)
            .flat_map(|s| (0..2).map(move |i| (s, i)))
            .map(|(s, i)| consumer.word(s, i))
            .collect();
        let mut cursor = Cursor {
            consumer,
            hook: Some(hook),
            slot,
            index: 0,
        };

        let mut slots = Vec::new();
        let mut frames = Vec::new();
        for _ in 0..10 {
            frames.push(cursor.next_frame());
            slots.push(cursor.slot);
        }

        assert_eq!(slots, [0, 0, 1, 1, 2, 2, 3, 3, 0, 0]);
        // boundaries before frames 3, 5, 7 and 9
        assert_eq!(completions.load(Ordering::Relaxed), 4);
        let expected: Vec<Frame> = expected_words
            .iter()
            .cycle()
            .take(10)
            .map(|&w| Frame::from_word(w))
            .collect();
        assert_eq!(frames, expected);
        assert_eq!(frames[0], Frame { left: 1, right: 101 });
        assert_eq!(cursor.consumer.playing(), Some(0));
    }
}
