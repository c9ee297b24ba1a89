//! Integration test: built-in song -> engine -> frames, checked against the
//! timing and trigger rules.

use dl_engine::{samples_per_tick, Engine, EngineConfig, Frame};
use dl_ir::{demo_song, drum_kit, Position, DEMO_BEATS_PER_BAR, DEMO_BPM, DEMO_TICKS_PER_BAR};
use dl_master::Controller;

fn demo_engine(config: EngineConfig) -> Engine {
    Engine::new(demo_song().unwrap(), drum_kit(config.sample_rate), config).unwrap()
}

fn has_nonsilent_frames(frames: &[Frame]) -> bool {
    frames.iter().any(|f| f.left != 0 || f.right != 0)
}

#[test]
fn built_in_timing_at_pico_rate() {
    let engine = demo_engine(EngineConfig::PICO);
    assert_eq!(engine.sample_rate(), 44_138);
    assert_eq!(
        engine.samples_per_tick(),
        samples_per_tick(44_138, DEMO_BPM, DEMO_BEATS_PER_BAR, DEMO_TICKS_PER_BAR)
    );
    assert_eq!(engine.samples_per_tick(), 949);
}

#[test]
fn first_tick_triggers_downbeat_voices() {
    let mut engine = demo_engine(EngineConfig::PICO);
    let spt = engine.samples_per_tick() as usize;
    engine.render_frames(spt);

    assert_eq!(engine.position(), Position { bar: 0, tick: 1, sample: 0 });
    // grid 0, tick 0: kick (lane 0) and perc (lane 4)
    let playing: Vec<usize> = engine
        .voices()
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_idle())
        .map(|(lane, _)| lane)
        .collect();
    assert_eq!(playing, vec![0, 4]);
    for lane in [0, 4] {
        assert_eq!(engine.voices()[lane].pos, spt + 1);
        assert_eq!(engine.voices()[lane].emph, 0);
    }
}

#[test]
fn fill_bars_apply_emphasis() {
    let mut engine = demo_engine(EngineConfig::hosted());
    let bar = engine.samples_per_tick() as usize * DEMO_TICKS_PER_BAR as usize;
    // bar 3 is the first to play grid 2
    engine.render_frames(bar * 3 + 1);
    let emph: Vec<u16> = engine.voices().iter().map(|v| v.emph).collect();
    // grid 2 opens with "9", " ", "1", "5", "5", " "
    assert_eq!(emph, vec![96, 0, 0, 48, 48, 0]);
    assert!(engine.voices()[5].is_idle());
}

#[test]
fn output_is_audible() {
    let mut engine = demo_engine(EngineConfig::hosted());
    let spt = engine.samples_per_tick() as usize;
    let frames = engine.render_frames(spt);
    assert!(has_nonsilent_frames(&frames));
}

#[test]
fn loop_wraps_to_origin_and_repeats() {
    let mut engine = demo_engine(EngineConfig::hosted());
    let n = engine.loop_frames() as usize;
    let first = engine.render_frames(n);
    assert_eq!(engine.position(), Position::zero());
    let second = engine.render_frames(n);
    assert_eq!(first.len(), second.len());
    assert!(first == second, "second pass differs from the first");
}

#[test]
fn position_tracks_frame_count() {
    let mut engine = demo_engine(EngineConfig::hosted());
    let spt = engine.samples_per_tick();
    for chunk in [1usize, 947, 948, 5_000, 70_000, 300_000] {
        engine.render_frames(chunk);
        let expected = Position::from_frame_count(engine.frames_rendered(), spt, DEMO_TICKS_PER_BAR, 10);
        assert_eq!(engine.position(), expected);
    }
}

#[test]
fn controller_wav_export() {
    let ctrl = Controller::demo(EngineConfig::hosted()).unwrap();
    let wav = ctrl.render_to_wav(1).unwrap();
    let frames = ctrl.bar_frames(1).unwrap();
    assert_eq!(&wav[0..4], b"RIFF");
    assert_eq!(wav.len(), 44 + frames * 4);
}
