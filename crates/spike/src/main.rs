use agar_core::input::{Command, InputScript, TickInput};
use agar_core::world::{RunSummary, StepMetrics, World};
use agar_core::SimConfig;
use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use rayon::prelude::*;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "agar-sim", about = "Run the cell simulation headlessly")]
struct Args {
    /// Ticks per run.
    #[arg(long, default_value_t = 10_000)]
    steps: usize,
    #[arg(long, default_value_t = 100)]
    sample_every: usize,
    /// Base seed; run `i` uses `seed + i`. Defaults to the config seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Independent runs, executed in parallel.
    #[arg(long, default_value_t = 1)]
    runs: usize,
    /// JSON file with `SimConfig` overrides.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Pick a new random move target every N ticks (0 disables).
    #[arg(long, default_value_t = 240)]
    wander_every: usize,
    /// Issue a split toggle every N ticks (0 disables).
    #[arg(long, default_value_t = 0)]
    toggle_every: usize,
    /// Pace ticks at the configured tick rate. Single run only.
    #[arg(long)]
    realtime: bool,
    /// Write JSON here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn load_config(path: Option<&PathBuf>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    SimConfig::from_json_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}

/// Scripted player: wanders to random points and toggles split on a timer.
fn build_script(config: &SimConfig, args: &Args) -> InputScript {
    let mut rng = ChaCha12Rng::seed_from_u64(config.seed ^ 0x5eed_cafe);
    let mut script = InputScript::new();
    if args.wander_every > 0 {
        for tick in (1..=args.steps).step_by(args.wander_every) {
            let x = rng.random_range(0.0..config.play_area_width);
            let y = rng.random_range(0.0..config.play_area_height);
            script.push(tick, Command::SetMoveTarget { x, y });
        }
    }
    if args.toggle_every > 0 {
        for tick in (args.toggle_every..=args.steps).step_by(args.toggle_every) {
            script.push(tick, Command::ToggleSplit);
        }
    }
    script
}

fn run_batch(base: &SimConfig, args: &Args) -> Result<Vec<RunSummary>> {
    let base_seed = args.seed.unwrap_or(base.seed);
    (0..args.runs)
        .into_par_iter()
        .map(|i| -> Result<RunSummary> {
            let config = SimConfig {
                seed: base_seed.wrapping_add(i as u64),
                ..base.clone()
            };
            let script = build_script(&config, args);
            let mut world = World::try_new(config).context("building world")?;
            let start = Instant::now();
            let summary = world
                .try_run_experiment(args.steps, args.sample_every, &script)
                .context("running experiment")?;
            tracing::info!(
                run = i,
                seed = summary.seed,
                eaten = summary.total_food_eaten,
                final_mass = summary.final_mass,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "run finished"
            );
            Ok(summary)
        })
        .collect()
}

fn run_realtime(config: SimConfig, args: &Args) -> Result<StepMetrics> {
    let config = SimConfig {
        seed: args.seed.unwrap_or(config.seed),
        ..config
    };
    let interval = config.tick_interval();
    let script = build_script(&config, args);
    let mut world = World::try_new(config).context("building world")?;
    for tick in 1..=args.steps {
        let started = Instant::now();
        let input: TickInput = script.input_for(tick);
        world.step(&input);
        if tick % args.sample_every == 0 {
            let m = world.metrics();
            tracing::info!(
                step = m.step,
                cells = m.cell_count,
                food = m.food_count,
                mass = m.total_mass,
                "tick"
            );
        }
        if let Some(rest) = interval.checked_sub(started.elapsed()) {
            std::thread::sleep(rest);
        }
    }
    Ok(world.metrics())
}

fn emit<T: serde::Serialize>(value: &T, out: Option<&PathBuf>) -> Result<()> {
    match out {
        Some(path) => {
            let file = fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            serde_json::to_writer_pretty(file, value).context("writing JSON")?;
            tracing::info!(path = %path.display(), "summary written");
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            serde_json::to_writer_pretty(&mut lock, value).context("writing JSON")?;
            writeln!(lock)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.sample_every == 0 {
        bail!("--sample-every must be positive");
    }
    let config = load_config(args.config.as_ref())?;

    if args.realtime {
        if args.runs != 1 {
            bail!("--realtime supports a single run");
        }
        let metrics = run_realtime(config, &args)?;
        return emit(&metrics, args.out.as_ref());
    }

    let summaries = run_batch(&config, &args)?;
    emit(&summaries, args.out.as_ref())
}
