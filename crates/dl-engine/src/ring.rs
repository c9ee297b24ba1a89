//! Lock-free ring of output blocks shared by the fill loop and the output
//! device's completion handler.
//!
//! The producer owns `filling` and writes slot contents; the consumer owns
//! `playing`. The consumer may move onto the slot the producer is writing.
//! That race is tolerated: slot words are atomics, so the device streams a
//! mix of old and new frames rather than observing a torn or undefined
//! value.
//!
//! Startup sequence:
//! 1. [`RingProducer::prefill`] writes every slot while nothing plays.
//! 2. [`RingConsumer::park`] places `playing` on the last slot.
//! 3. The device's first [`RingConsumer::complete`] advances to slot 0.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

/// Default number of slots.
pub const DEFAULT_SLOTS: usize = 4;

/// Default frames per slot.
pub const DEFAULT_BLOCK_SIZE: usize = 49;

const IDLE: usize = usize::MAX;

/// Anything that produces packed stereo words one at a time.
pub trait FrameSource {
    fn next_word(&mut self) -> u32;
}

impl<F: FnMut() -> u32> FrameSource for F {
    fn next_word(&mut self) -> u32 {
        self()
    }
}

/// `N` slots of `SIZE` packed frames.
pub struct BufferRing<const N: usize = DEFAULT_SLOTS, const SIZE: usize = DEFAULT_BLOCK_SIZE> {
    slots: [[AtomicU32; SIZE]; N],
    /// Slot the device is streaming, or `IDLE` before startup
    playing: AtomicUsize,
    /// Next slot the fill loop writes
    filling: AtomicUsize,
    /// Set once every slot holds rendered audio
    primed: AtomicBool,
}

impl<const N: usize, const SIZE: usize> BufferRing<N, SIZE> {
    pub const fn new() -> Self {
        assert!(N >= 2, "ring needs at least two slots");
        assert!(SIZE >= 1, "slots must hold at least one frame");
        Self {
            slots: [const { [const { AtomicU32::new(0) }; SIZE] }; N],
            playing: AtomicUsize::new(IDLE),
            filling: AtomicUsize::new(0),
            primed: AtomicBool::new(false),
        }
    }

    /// Hand the ring to exactly one producer and one consumer.
    pub fn into_split(self) -> (RingProducer<N, SIZE>, RingConsumer<N, SIZE>) {
        let ring = Arc::new(self);
        (
            RingProducer {
                ring: Arc::clone(&ring),
                written: 0,
            },
            RingConsumer { ring },
        )
    }

    pub const fn slots(&self) -> usize {
        N
    }

    pub const fn block_size(&self) -> usize {
        SIZE
    }

    fn playing(&self) -> Option<usize> {
        match self.playing.load(Ordering::Acquire) {
            IDLE => None,
            slot => Some(slot),
        }
    }
}

impl<const N: usize, const SIZE: usize> Default for BufferRing<N, SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// Fill-loop side of the ring.
pub struct RingProducer<const N: usize = DEFAULT_SLOTS, const SIZE: usize = DEFAULT_BLOCK_SIZE> {
    ring: Arc<BufferRing<N, SIZE>>,
    written: usize,
}

impl<const N: usize, const SIZE: usize> RingProducer<N, SIZE> {
    /// Render one block into the `filling` slot.
    ///
    /// Returns `false` without touching anything when that slot is the one
    /// being played.
    pub fn fill_one_buffer<S: FrameSource + ?Sized>(&mut self, source: &mut S) -> bool {
        let ring = &*self.ring;
        let filling = ring.filling.load(Ordering::Relaxed);
        if ring.playing.load(Ordering::Acquire) == filling {
            return false;
        }

        for word in &ring.slots[filling] {
            word.store(source.next_word(), Ordering::Relaxed);
        }
        ring.filling.store((filling + 1) % N, Ordering::Release);

        if self.written < N {
            self.written += 1;
            if self.written == N {
                ring.primed.store(true, Ordering::Release);
            }
        }
        true
    }

    /// Write every slot before the device starts. Returns the number of
    /// slots written, which is `N` unless the consumer already runs.
    pub fn prefill<S: FrameSource + ?Sized>(&mut self, source: &mut S) -> usize {
        let mut filled = 0;
        for _ in 0..N {
            if self.fill_one_buffer(source) {
                filled += 1;
            }
        }
        filled
    }

    pub fn filling(&self) -> usize {
        self.ring.filling.load(Ordering::Relaxed)
    }

    pub fn playing(&self) -> Option<usize> {
        self.ring.playing()
    }

    /// True once every slot has been written at least once.
    pub fn is_primed(&self) -> bool {
        self.ring.primed.load(Ordering::Acquire)
    }

    /// Read back one word of a slot.
    pub fn peek(&self, slot: usize, index: usize) -> u32 {
        self.ring.slots[slot][index].load(Ordering::Relaxed)
    }
}

/// Completion-handler side of the ring.
pub struct RingConsumer<const N: usize = DEFAULT_SLOTS, const SIZE: usize = DEFAULT_BLOCK_SIZE> {
    ring: Arc<BufferRing<N, SIZE>>,
}

impl<const N: usize, const SIZE: usize> RingConsumer<N, SIZE> {
    /// Place `playing` on the last slot so the first completion streams
    /// slot 0. Call once after pre-filling and before starting the device.
    pub fn park(&mut self) {
        self.ring.playing.store(N - 1, Ordering::Release);
    }

    /// The device finished a slot: advance `playing` and return the slot to
    /// stream next. Returns `None` until the ring has been pre-filled.
    #[inline]
    pub fn complete(&mut self) -> Option<usize> {
        if !self.ring.primed.load(Ordering::Acquire) {
            return None;
        }
        let next = match self.ring.playing.load(Ordering::Relaxed) {
            IDLE => 0,
            slot => (slot + 1) % N,
        };
        self.ring.playing.store(next, Ordering::Release);
        Some(next)
    }

    pub fn playing(&self) -> Option<usize> {
        self.ring.playing()
    }

    #[inline]
    pub fn word(&self, slot: usize, index: usize) -> u32 {
        self.ring.slots[slot][index].load(Ordering::Relaxed)
    }

    /// Copy a whole slot out.
    pub fn read_slot(&self, slot: usize, out: &mut [u32; SIZE]) {
        for (dst, src) in out.iter_mut().zip(&self.ring.slots[slot]) {
            *dst = src.load(Ordering::Relaxed);
        }
    }

    pub const fn slots(&self) -> usize {
        N
    }

    pub const fn block_size(&self) -> usize {
        SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts up from 1 so every written word is distinguishable.
    struct Counter(u32);

    impl FrameSource for Counter {
        fn next_word(&mut self) -> u32 {
            self.0 += 1;
            self.0
        }
    }

    type SmallRing = BufferRing<4, 3>;

    #[test]
    fn prefill_writes_every_slot_in_order() {
        let (mut producer, consumer) = SmallRing::new().into_split();
        let mut src = Counter(0);
        assert!(!producer.is_primed());
        assert_eq!(producer.prefill(&mut src), 4);
        assert!(producer.is_primed());
        assert_eq!(producer.filling(), 0);
        assert_eq!(consumer.playing(), None);
        for slot in 0..4 {
            let mut block = [0; 3];
            consumer.read_slot(slot, &mut block);
            let base = slot as u32 * 3;
            assert_eq!(block, [base + 1, base + 2, base + 3]);
        }
    }

    #[test]
    fn parked_ring_refills_up_to_playing_slot() {
        let (mut producer, mut consumer) = SmallRing::new().into_split();
        let mut src = Counter(0);
        producer.prefill(&mut src);
        consumer.park();
        assert_eq!(consumer.playing(), Some(3));

        let untouched = consumer.word(3, 0);
        for expected in 0..3 {
            assert_eq!(producer.filling(), expected);
            assert!(producer.fill_one_buffer(&mut src));
        }
        assert_eq!(producer.filling(), 3);
        // slot 3 is playing: no-op
        assert!(!producer.fill_one_buffer(&mut src));
        assert_eq!(producer.filling(), 3);
        assert_eq!(consumer.word(3, 0), untouched);
        // slots 0..3 were rewritten after the pre-fill's 12 words
        assert_eq!(consumer.word(0, 0), 13);
        assert_eq!(consumer.word(2, 2), 21);
    }

    #[test]
    fn blocked_fill_does_not_pull_frames() {
        let (mut producer, mut consumer) = SmallRing::new().into_split();
        let mut src = Counter(0);
        producer.prefill(&mut src);
        consumer.park();
        consumer.complete();
        assert_eq!(consumer.playing(), Some(0));
        assert!(!producer.fill_one_buffer(&mut src));
        assert_eq!(src.0, 12);
    }

    #[test]
    fn completion_walks_slots_in_order() {
        let (mut producer, mut consumer) = SmallRing::new().into_split();
        producer.prefill(&mut Counter(0));
        consumer.park();
        let order: [Option<usize>; 6] = core::array::from_fn(|_| consumer.complete());
        assert_eq!(order, [Some(0), Some(1), Some(2), Some(3), Some(0), Some(1)]);
    }

    #[test]
    fn completion_before_prefill_is_ignored() {
        let (mut producer, mut consumer) = SmallRing::new().into_split();
        assert_eq!(consumer.complete(), None);
        assert_eq!(consumer.playing(), None);
        producer.fill_one_buffer(&mut Counter(0));
        assert_eq!(consumer.complete(), None);
    }

    #[test]
    fn unparked_start_begins_at_slot_zero() {
        let (mut producer, mut consumer) = SmallRing::new().into_split();
        producer.prefill(&mut Counter(0));
        assert_eq!(consumer.complete(), Some(0));
    }

    #[test]
    fn closures_are_sources() {
        let (mut producer, consumer) = BufferRing::<2, 2>::new().into_split();
        let mut n = 100u32;
        producer.fill_one_buffer(&mut || {
            n += 1;
            n
        });
        assert_eq!(consumer.word(0, 1), 102);
    }

    #[test]
    fn default_dimensions() {
        let ring: BufferRing = BufferRing::default();
        assert_eq!((ring.slots(), ring.block_size()), (4, 49));
    }
}
