//! Deterministic output device driven by the caller.
//!
//! Each call to [`SimulatedOutput::stream_block`] plays the armed slot in
//! full and then completes it, exactly as a DMA completion interrupt would.
//! Used for offline rendering and to exercise the ring protocol in tests.

use dl_engine::{Frame, RingConsumer, DEFAULT_BLOCK_SIZE, DEFAULT_SLOTS};

use crate::traits::{AudioError, CompletionHook, OutputDevice};

pub struct SimulatedOutput<const N: usize = DEFAULT_SLOTS, const SIZE: usize = DEFAULT_BLOCK_SIZE> {
    sample_rate: u32,
    consumer: Option<RingConsumer<N, SIZE>>,
    hook: Option<CompletionHook>,
    /// Slot currently armed
    slot: usize,
    blocks_streamed: u64,
}

impl<const N: usize, const SIZE: usize> SimulatedOutput<N, SIZE> {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            consumer: None,
            hook: None,
            slot: 0,
            blocks_streamed: 0,
        }
    }

    /// Stream the armed slot into `out`, then complete it. Returns the slot
    /// that was streamed.
    pub fn stream_block(&mut self, out: &mut [u32; SIZE]) -> Result<usize, AudioError> {
        let consumer = self.consumer.as_mut().ok_or(AudioError::NotStarted)?;
        let streamed = self.slot;
        consumer.read_slot(streamed, out);

        self.slot = consumer.complete().ok_or(AudioError::NotPrimed)?;
        if let Some(hook) = self.hook.as_mut() {
            hook(self.slot);
        }
        self.blocks_streamed += 1;
        Ok(streamed)
    }

    /// Stream one slot and append its frames to `out`.
    pub fn stream_frames(&mut self, out: &mut Vec<Frame>) -> Result<usize, AudioError> {
        let mut block = [0u32; SIZE];
        let slot = self.stream_block(&mut block)?;
        out.extend(block.iter().map(|&w| Frame::from_word(w)));
        Ok(slot)
    }

    /// Slot the next `stream_block` plays, if started.
    pub fn armed_slot(&self) -> Option<usize> {
        self.consumer.as_ref().map(|_| self.slot)
    }

    pub fn blocks_streamed(&self) -> u64 {
        self.blocks_streamed
    }

    pub fn is_started(&self) -> bool {
        self.consumer.is_some()
    }
}

impl<const N: usize, const SIZE: usize> OutputDevice<N, SIZE> for SimulatedOutput<N, SIZE> {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn start(
        &mut self,
        mut consumer: RingConsumer<N, SIZE>,
        hook: Option<CompletionHook>,
    ) -> Result<(), AudioError> {
        if self.consumer.is_some() {
            return Err(AudioError::AlreadyStarted);
        }
        self.slot = consumer.complete().ok_or(AudioError::NotPrimed)?;
        self.consumer = Some(consumer);
        self.hook = hook;
        self.blocks_streamed = 0;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.consumer = None;
        self.hook = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dl_engine::BufferRing;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    type Ring = BufferRing<4, 2>;

    fn counter() -> impl FnMut() -> u32 {
        let mut n = 0;
        move || {
            n += 1;
            n
        }
    }

    #[test]
    fn stream_before_start_fails() {
        let mut sim = SimulatedOutput::<4, 2>::new(8);
        let mut out = [0; 2];
        assert!(matches!(sim.stream_block(&mut out), Err(AudioError::NotStarted)));
    }

    #[test]
    fn start_requires_prefill() {
        let (_producer, consumer) = Ring::new().into_split();
        let mut sim = SimulatedOutput::<4, 2>::new(8);
        assert!(matches!(sim.start(consumer, None), Err(AudioError::NotPrimed)));
        assert!(!sim.is_started());
    }

    #[test]
    fn parked_ring_streams_from_slot_zero() {
        let (mut producer, mut consumer) = Ring::new().into_split();
        let mut src = counter();
        producer.prefill(&mut src);
        consumer.park();

        let mut sim = SimulatedOutput::<4, 2>::new(8);
        sim.start(consumer, None).unwrap();
        assert_eq!(sim.armed_slot(), Some(0));
        // slot 0 is armed, so the producer must wait
        assert!(!producer.fill_one_buffer(&mut src));

        let mut out = [0; 2];
        assert_eq!(sim.stream_block(&mut out).unwrap(), 0);
        assert_eq!(out, [1, 2]);
        assert_eq!(producer.playing(), Some(1));
        assert!(producer.fill_one_buffer(&mut src));
    }

    #[test]
    fn interleaved_fill_keeps_frame_order() {
        let (mut producer, mut consumer) = Ring::new().into_split();
        let mut src = counter();
        producer.prefill(&mut src);
        consumer.park();
        let mut sim = SimulatedOutput::<4, 2>::new(8);
        sim.start(consumer, None).unwrap();

        let mut streamed = Vec::new();
        for _ in 0..10 {
            let mut out = [0; 2];
            sim.stream_block(&mut out).unwrap();
            streamed.extend_from_slice(&out);
            while producer.fill_one_buffer(&mut src) {}
        }
        let expected: Vec<u32> = (1..=20).collect();
        assert_eq!(streamed, expected);
    }

    #[test]
    fn hook_sees_every_completion() {
        let (mut producer, mut consumer) = Ring::new().into_split();
        producer.prefill(&mut counter());
        consumer.park();

        let seen = Arc::new(AtomicUsize::new(0));
        let hook_seen = Arc::clone(&seen);
        let hook: CompletionHook = Box::new(move |_slot| {
            hook_seen.fetch_add(1, Ordering::Relaxed);
        });
        let mut sim = SimulatedOutput::<4, 2>::new(8);
        sim.start(consumer, Some(hook)).unwrap();

        let mut out = [0; 2];
        for _ in 0..3 {
            sim.stream_block(&mut out).unwrap();
        }
        assert_eq!(seen.load(Ordering::Relaxed), 3);
        assert_eq!(sim.blocks_streamed(), 3);
        assert_eq!(sim.armed_slot(), Some(3));
    }

    #[test]
    fn double_start_rejected() {
        let (mut producer, consumer) = Ring::new().into_split();
        producer.prefill(&mut counter());
        let mut sim = SimulatedOutput::<4, 2>::new(8);
        sim.start(consumer, None).unwrap();
        let (_p2, c2) = Ring::new().into_split();
        assert!(matches!(sim.start(c2, None), Err(AudioError::AlreadyStarted)));
        sim.stop().unwrap();
        assert!(!sim.is_started());
    }
}
