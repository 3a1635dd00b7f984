//! Sound engine soak utility
//!
//! Hammers the sound engine from several producer threads against a
//! simulated backend and reports how many commands were dropped.
//!
//! **Usage:**
//! ```bash
//! racefx-soak [--config <file>] [--producers 4] [--seconds 10] [--latency-ms 2] \
//!             [--interval-ms 1] [--loop-every 5]
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use racefx_sound::{PlayId, SimulatedBackend, SoundEngine, SoundEngineConfig, StatsSnapshot};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for racefx-soak
#[derive(Parser, Debug)]
#[command(name = "racefx-soak")]
#[command(about = "Stress the sound command engine from many threads")]
#[command(version)]
struct Args {
    /// Sound engine config file (TOML)
    #[arg(short, long, env = "RACEFX_SOUND_CONFIG")]
    config: Option<PathBuf>,

    /// Number of producer threads
    #[arg(short, long, default_value = "4")]
    producers: usize,

    /// Test duration (seconds)
    #[arg(short, long, default_value = "10")]
    seconds: u64,

    /// Simulated latency of every backend call (milliseconds)
    #[arg(long, default_value = "2")]
    latency_ms: u64,

    /// Pause between two requests of one producer (milliseconds)
    #[arg(long, default_value = "1")]
    interval_ms: u64,

    /// Every n-th request starts a looped sound instead of a one-shot
    #[arg(long, default_value = "5")]
    loop_every: u64,
}

#[derive(Debug, Default)]
struct ProducerTotals {
    requests: AtomicU64,
    rejected_plays: AtomicU64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = SoundEngineConfig::resolve(args.config.as_deref())
        .context("Failed to load sound engine config")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("racefx_sound={}", config.logging.level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting soak: {} producers, {}s, backend latency {}ms, queue capacity {}",
        args.producers, args.seconds, args.latency_ms, config.queue_capacity
    );

    let backend = SimulatedBackend::new(Duration::from_millis(args.latency_ms));
    let engine = Arc::new(
        SoundEngine::new(backend, config).context("Failed to create sound engine")?,
    );
    engine.start().context("Failed to start sound engine")?;

    let running = Arc::new(AtomicBool::new(true));
    let totals = Arc::new(ProducerTotals::default());
    let producers: Vec<_> = (0..args.producers)
        .map(|index| {
            let engine = Arc::clone(&engine);
            let running = Arc::clone(&running);
            let totals = Arc::clone(&totals);
            let interval = Duration::from_millis(args.interval_ms);
            let loop_every = args.loop_every.max(1);
            thread::Builder::new()
                .name(format!("producer-{}", index))
                .spawn(move || produce(index, &engine, &running, &totals, interval, loop_every))
                .context("Failed to spawn producer thread")
        })
        .collect::<Result<_>>()?;

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(args.seconds)) => {
            info!("Soak duration elapsed");
        },
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, stopping producers");
        },
    }

    running.store(false, Ordering::Relaxed);
    for producer in producers {
        if producer.join().is_err() {
            anyhow::bail!("Producer thread panicked");
        }
    }

    engine.shutdown().context("Sound engine shutdown failed")?;
    report(&totals, &engine.stats());
    Ok(())
}

/// One producer: a mix of one-shots, loops, volume/pitch changes and stops
fn produce(
    index: usize,
    engine: &SoundEngine<SimulatedBackend>,
    running: &AtomicBool,
    totals: &ProducerTotals,
    interval: Duration,
    loop_every: u64,
) {
    let mut looping: Vec<PlayId> = Vec::new();
    let mut request: u64 = 0;

    while running.load(Ordering::Relaxed) {
        request += 1;
        let sound = format!("sfx-{}-{}", index, request % 8);

        if request % loop_every == 0 {
            let id = engine.loop_sound(sound, 0.8, 1.0);
            if id.is_valid() {
                looping.push(id);
            } else {
                totals.rejected_plays.fetch_add(1, Ordering::Relaxed);
            }
        } else if request % 3 == 0 {
            engine.play_and_forget(sound, 0.5);
        } else {
            let id = engine.play(sound, 1.0);
            if !id.is_valid() {
                totals.rejected_plays.fetch_add(1, Ordering::Relaxed);
            }
        }

        for (offset, id) in looping.iter().enumerate() {
            let wobble = (request + offset as u64) % 10;
            engine.set_pitch(*id, 0.9 + wobble as f32 * 0.02);
            engine.set_volume(*id, 0.5 + wobble as f32 * 0.05);
        }
        if looping.len() > 4 {
            engine.stop(looping.remove(0));
        }

        totals.requests.fetch_add(1, Ordering::Relaxed);
        thread::sleep(interval);
    }

    // Never leave a loop running
    for id in looping {
        engine.stop(id);
    }
}

fn report(totals: &ProducerTotals, stats: &StatsSnapshot) {
    println!("requests issued:     {}", totals.requests.load(Ordering::Relaxed));
    println!("plays rejected:      {}", totals.rejected_plays.load(Ordering::Relaxed));
    println!("commands submitted:  {}", stats.submitted);
    println!("commands dropped:    {}", stats.dropped);
    println!("commands executed:   {}", stats.executed);
    println!("invalid play ids:    {}", stats.invalid_ids);
    println!("backend panics:      {}", stats.backend_panics);
    println!("still playing:       {}", stats.playing);
}
