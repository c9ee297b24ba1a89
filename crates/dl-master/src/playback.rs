//! Real-time playback: the fill thread and its handle.

use dl_audio::{CompletionHook, CpalOutput, OutputDevice};
use dl_engine::{BufferRing, Engine, RingProducer, DEFAULT_BLOCK_SIZE, DEFAULT_SLOTS};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::{ControllerError, FillPolicy};

type Ready = Sender<Result<(), ControllerError>>;

pub(crate) struct PlaybackHandle {
    stop_signal: Arc<AtomicBool>,
    /// Set by the fill thread on exit
    pub(crate) finished: Arc<AtomicBool>,
    /// Frames the device has finished streaming
    pub(crate) frames_played: Arc<AtomicU64>,
    pub(crate) samples_per_tick: u32,
    thread: Option<JoinHandle<()>>,
}

impl PlaybackHandle {
    /// Start the fill thread. It reports device startup on `ready`.
    pub(crate) fn spawn(engine: Engine, policy: FillPolicy, ready: Ready) -> Result<Self, ControllerError> {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));
        let frames_played = Arc::new(AtomicU64::new(0));
        let samples_per_tick = engine.samples_per_tick();

        let stop = stop_signal.clone();
        let done = finished.clone();
        let played = frames_played.clone();

        let thread = std::thread::Builder::new()
            .name("drumloop-fill".into())
            .spawn(move || {
                fill_thread(engine, policy, stop, played, ready);
                done.store(true, Ordering::Relaxed);
            })?;

        Ok(Self {
            stop_signal,
            finished,
            frames_played,
            samples_per_tick,
            thread: Some(thread),
        })
    }

    /// Signal the fill thread and wait for it to release the device.
    pub(crate) fn stop(mut self) {
        self.stop_signal.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            thread.thread().unpark();
            if thread.join().is_err() {
                log::error!("fill thread panicked");
            }
        }
    }
}

fn fill_thread(
    mut engine: Engine,
    policy: FillPolicy,
    stop_signal: Arc<AtomicBool>,
    frames_played: Arc<AtomicU64>,
    ready: Ready,
) {
    let mut output = match CpalOutput::with_sample_rate(engine.sample_rate()) {
        Ok(output) => output,
        Err(e) => {
            let _ = ready.send(Err(e.into()));
            return;
        }
    };

    let (mut producer, mut consumer) = BufferRing::<DEFAULT_SLOTS, DEFAULT_BLOCK_SIZE>::new().into_split();
    let filled = producer.prefill(&mut engine);
    log::debug!("pre-filled {} of {} slots", filled, DEFAULT_SLOTS);
    consumer.park();

    let fill_thread = std::thread::current();
    let wake = policy == FillPolicy::Wait;
    let hook: CompletionHook = Box::new(move |_slot| {
        frames_played.fetch_add(DEFAULT_BLOCK_SIZE as u64, Ordering::Relaxed);
        if wake {
            fill_thread.unpark();
        }
    });

    if let Err(e) = output.start(consumer, Some(hook)) {
        let _ = ready.send(Err(e.into()));
        return;
    }
    let _ = ready.send(Ok(()));
    log::info!("playback started, {:?}", policy);

    let mut bar = engine.position().bar;
    while !stop_signal.load(Ordering::Relaxed) {
        if fill(&mut producer, &mut engine) {
            let now = engine.position().bar;
            if now != bar {
                bar = now;
                log::debug!("filling bar {} (pattern {})", bar, engine.song().order[bar as usize]);
            }
            continue;
        }
        match policy {
            FillPolicy::BusyPoll => std::hint::spin_loop(),
            FillPolicy::Wait => std::thread::park(),
        }
    }

    if let Err(e) = OutputDevice::<DEFAULT_SLOTS, DEFAULT_BLOCK_SIZE>::stop(&mut output) {
        log::warn!("stopping audio device: {}", e);
    }
    log::info!("playback stopped after {} frames", engine.frames_rendered());
}

#[inline]
fn fill(producer: &mut RingProducer, engine: &mut Engine) -> bool {
    #[cfg(feature = "alloc_check")]
    {
        assert_no_alloc::assert_no_alloc(|| producer.fill_one_buffer(engine))
    }
    #[cfg(not(feature = "alloc_check"))]
    {
        producer.fill_one_buffer(engine)
    }
}
