//! drumloop: a looping drum machine.
//!
//! Usage:
//!   drumloop info
//!   drumloop play [--policy wait] [--seconds 30]
//!   drumloop render --wav out.wav [--bars 10]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dl_master::{Controller, EngineConfig, FillPolicy};
use std::io::Write;
use std::time::{Duration, Instant};
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "alloc_check")]
#[global_allocator]
static A: assert_no_alloc::AllocDisabler = assert_no_alloc::AllocDisabler;

#[derive(Parser)]
#[clap(version, about = "A looping drum machine.")]
struct Cli {
    /// Output sample rate in Hz.
    #[arg(short = 'r', long, default_value_t = EngineConfig::hosted().sample_rate)]
    sample_rate: u32,
    /// Use the rate the Pico I2S clock divider produces (overrides --sample-rate).
    #[arg(long)]
    pico: bool,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prints the song, its timing and its pattern grids.
    Info {},
    /// Plays the loop through the default audio device.
    Play {
        /// How the fill thread waits for a free slot.
        #[arg(short, long, value_enum, default_value_t = Policy::BusyPoll)]
        policy: Policy,
        /// Stop after this many seconds; plays until interrupted if omitted.
        #[arg(short, long)]
        seconds: Option<u64>,
    },
    /// Renders bars from the loop start to a WAV file.
    Render {
        /// Output path.
        #[arg(short, long)]
        wav: PathBuf,
        /// Number of bars; one full loop if omitted.
        #[arg(short, long)]
        bars: Option<usize>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    BusyPoll,
    Wait,
}

impl From<Policy> for FillPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::BusyPoll => FillPolicy::BusyPoll,
            Policy::Wait => FillPolicy::Wait,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = if cli.pico {
        EngineConfig::PICO
    } else {
        EngineConfig::with_sample_rate(cli.sample_rate)
    };
    log::debug!("engine config: {:?}", config);
    let mut ctrl = Controller::demo(config).context("building the built-in song")?;

    match cli.command {
        Commands::Info {} => print_info(&ctrl)?,
        Commands::Play { policy, seconds } => play(&mut ctrl, policy.into(), seconds)?,
        Commands::Render { wav, bars } => render(&ctrl, &wav, bars)?,
    }
    Ok(())
}

fn print_info(ctrl: &Controller) -> Result<()> {
    let song = ctrl.song();
    let engine = ctrl.engine()?;

    println!("Title:    {}", song.title);
    println!(
        "Tempo:    {} BPM, {} beats/bar, {} ticks/bar",
        song.bpm, song.beats_per_bar, song.ticks_per_bar
    );
    println!(
        "Timing:   {} Hz, {} samples/tick, {} frames/loop",
        engine.sample_rate(),
        engine.samples_per_tick(),
        engine.loop_frames()
    );
    let order: Vec<String> = song.order.iter().map(u8::to_string).collect();
    println!("Order:    {}", order.join(" "));
    println!();

    println!("Voices:");
    for (i, v) in song.voices.iter().enumerate() {
        let sample = v
            .sample
            .and_then(|s| ctrl.library().get(s as usize))
            .map_or("-", |s| s.name.as_str());
        println!("  {}: {:<6} pan {:>2}  vol {:>3}", i, sample, v.pan, v.volume);
    }
    println!();

    for (p, pattern) in song.patterns.iter().enumerate() {
        println!("Pattern {}:", p);
        for lane in 0..pattern.lanes as usize {
            let row: String = pattern.lane(lane).iter().map(|h| h.symbol()).collect();
            println!("  {} |{}|", lane, row);
        }
    }
    Ok(())
}

fn play(ctrl: &mut Controller, policy: FillPolicy, seconds: Option<u64>) -> Result<()> {
    ctrl.play(policy).context("starting playback")?;
    println!("Playing...");

    let started = Instant::now();
    let limit = seconds.map(Duration::from_secs);
    while ctrl.is_playing() {
        if limit.is_some_and(|l| started.elapsed() >= l) {
            break;
        }
        if let Some(pos) = ctrl.position() {
            print!("\rPosition: {}", pos);
            let _ = std::io::stdout().flush();
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    ctrl.stop();
    println!("\rDone.                    ");
    Ok(())
}

fn render(ctrl: &Controller, path: &Path, bars: Option<usize>) -> Result<()> {
    let bars = bars.unwrap_or_else(|| ctrl.song().loop_bars());
    println!("Rendering {} bars to {} at {} Hz...", bars, path.display(), ctrl.config().sample_rate);

    let wav = ctrl.render_to_wav(bars)?;
    fs::write(path, &wav).with_context(|| format!("writing {}", path.display()))?;

    println!("Wrote {} bytes", wav.len());
    Ok(())
}
