use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::info;

use minimax_chess::console::Console;
use minimax_chess::search::Difficulty;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Level {
    Off,
    Easy,
    Medium,
    Hard,
}

impl Level {
    fn difficulty(self) -> Option<Difficulty> {
        match self {
            Level::Off => None,
            Level::Easy => Some(Difficulty::Easy),
            Level::Medium => Some(Difficulty::Medium),
            Level::Hard => Some(Difficulty::Hard),
        }
    }
}

/// Play chess against an alpha-beta engine from the terminal.
#[derive(Debug, Parser)]
#[command(name = "minimax-chess", version, long_about = None)]
struct Cli {
    /// Engine strength; without it both sides are played from the console
    #[arg(value_enum)]
    difficulty: Option<Level>,

    /// Seed for the engine's random weak-play rolls
    seed: Option<u64>,

    /// Resume a game written by the console's `save` command
    #[arg(short, long, value_name = "FILE")]
    load: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let difficulty = cli.difficulty.and_then(Level::difficulty);
    match difficulty {
        Some(difficulty) => info!("engine plays at {} difficulty", difficulty),
        None => info!("engine off"),
    }

    let mut console = Console::new(difficulty, cli.seed);
    if let Some(path) = &cli.load {
        println!("{}", console.load_session(path)?);
    }
    console.run()
}
