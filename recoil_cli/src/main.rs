mod simulate;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use recoil_core::settings::{GameSettings, KeyValueStore, MemoryStore, Settings};
use recoil_core::stats::{StatsBook, StatsSummary};
use recoil_core::time::day::format_day;
use recoil_core::weapon::WeaponTable;
use recoil_core::{Rect, Session};
use recoil_runner::FileStore;
use tracing_subscriber::filter::EnvFilter;

use crate::simulate::{run_trial, Script};

#[derive(Debug, Parser)]
#[command(name = "recoil")]
#[command(about = "Recoil-control trainer engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Checks a weapon table and lists its weapons.
    Validate {
        /// Table to check; the bundled table when omitted.
        weapons: Option<PathBuf>,
    },
    /// Runs one scripted trial and prints every shot.
    Simulate(SimulateArgs),
    /// Prints the statistics kept in a settings store.
    Stats {
        #[arg(long)]
        store: PathBuf,
    },
}

#[derive(Debug, Args)]
struct SimulateArgs {
    #[arg(long)]
    weapons: Option<PathBuf>,
    /// Settings file; statistics accumulate across runs when given.
    #[arg(long)]
    store: Option<PathBuf>,
    #[arg(long)]
    weapon: Option<String>,
    #[arg(long)]
    mag: Option<usize>,
    #[arg(long)]
    sens: Option<f64>,
    /// Fire speed in percent.
    #[arg(long)]
    speed: Option<f64>,
    /// stationary, path or moving.
    #[arg(long)]
    motion: Option<String>,
    /// Comma separated modifier ids.
    #[arg(long)]
    modifiers: Option<String>,
    /// Fraction of the recoil the scripted cursor cancels.
    #[arg(long, default_value_t = 1.0)]
    compensate: f64,
    /// Release the trigger after this many shots.
    #[arg(long)]
    release_after: Option<usize>,
    #[arg(long, default_value_t = 16.6)]
    frame_ms: f64,
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(command = ?cli.command, "parsed arguments");

    match cli.command {
        Command::Validate { weapons } => {
            let table = load_table(weapons.as_deref())?;
            for w in table.iter() {
                let mags: Vec<String> = w.mags.iter().map(|m| m.size.to_string()).collect();
                println!(
                    "{}: {} shots, mags {}, {} modifiers",
                    w.name,
                    w.pattern.len(),
                    mags.join("/"),
                    w.overrides.len()
                );
            }
            println!("ok: {} weapons", table.len());
        }
        Command::Simulate(args) => {
            let table = load_table(args.weapons.as_deref())?;
            match &args.store {
                Some(path) => simulate(FileStore::open(path)?, table, &args)?,
                None => simulate(MemoryStore::new(), table, &args)?,
            }
        }
        Command::Stats { store } => {
            let store = FileStore::open(&store)?;
            print_stats(store);
        }
    }

    Ok(())
}

fn load_table(path: Option<&Path>) -> anyhow::Result<WeaponTable> {
    match path {
        Some(p) => recoil_runner::load_weapon_table_from_path(p),
        None => WeaponTable::bundled().context("invalid bundled weapon table"),
    }
}

fn simulate(
    store: impl KeyValueStore + 'static,
    table: WeaponTable,
    args: &SimulateArgs,
) -> anyhow::Result<()> {
    let viewport = Rect::from_size(1920.0, 1080.0);
    let mut session = Session::with_seed(store, table, viewport, args.seed)?;
    apply_args(&mut session, args)?;

    let script = Script {
        compensate: args.compensate,
        release_after: args.release_after,
        frame_ms: args.frame_ms,
    };
    let result = run_trial(&mut session, &script)?;
    println!(
        "score: {}% over {}/{} shots ({})",
        result.percentage,
        result.shots,
        result.magazine_size,
        if result.recordable { "recorded" } else { "not recorded" }
    );
    let game = session.game().clone();
    println!("{}", game.current.get(session.settings()));
    Ok(())
}

fn apply_args(session: &mut Session, args: &SimulateArgs) -> anyhow::Result<()> {
    let game = session.game().clone();
    let settings = session.settings_mut();
    if let Some(w) = &args.weapon {
        game.weapon.set(settings, w.clone())?;
    }
    if let Some(m) = args.mag {
        game.mag.set(settings, m as f64)?;
    }
    if let Some(s) = args.sens {
        game.sens.set(settings, s)?;
    }
    if let Some(s) = args.speed {
        game.fire_speed.set(settings, s)?;
    }
    if let Some(m) = &args.motion {
        game.target_motion.set(settings, m.clone())?;
    }
    if let Some(m) = &args.modifiers {
        game.modifiers.set(settings, m.clone())?;
    }
    Ok(())
}

fn print_stats(store: FileStore) {
    let settings = Settings::new(store);
    let book = StatsBook::load(&settings, GameSettings::default().stats);
    if book.records().is_empty() {
        println!("no statistics");
        return;
    }
    for s in book.records() {
        let summary = StatsSummary::of(s);
        println!(
            "{} mag {} hint={} moving={}: best {}",
            s.setup.weapon, s.setup.mag, s.setup.hint, s.setup.moving, summary.best_all_time
        );
        for d in &s.day_results {
            println!(
                "  {} runs {} median {} best {}",
                format_day(d.day()),
                d.count(),
                d.median(),
                d.best()
            );
        }
        if summary.today_count > 0 {
            println!(
                "  {} runs {} median {} best {}",
                format_day(s.today),
                summary.today_count,
                summary.today_median,
                summary.today_best
            );
        }
    }
}
