//! Minichess CLI - Command-line interface
//!
//! Commands:
//! - new: Write a fresh game blob
//! - show / moves: Inspect a game blob
//! - play / ai: Advance a game blob by one move
//! - selfplay: Engine vs engine
//! - benchmark: Time the search at each difficulty

mod benchmark;
mod game_cmd;
mod selfplay;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "minichess")]
#[command(about = "5x4 minichess engine")]
struct Cli {
    /// Random seed for AI tie-breaking (omit for entropy)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new game and write its blob
    New(game_cmd::NewArgs),
    /// Render the board stored in a blob
    Show(game_cmd::GameFileArgs),
    /// List legal moves for the side to move
    Moves(game_cmd::GameFileArgs),
    /// Apply a move such as "a2 a3"
    Play(game_cmd::PlayArgs),
    /// Let the engine make the next move
    Ai(game_cmd::AiArgs),
    /// Play the engine against itself
    Selfplay(selfplay::SelfplayArgs),
    /// Time the search at each difficulty
    Benchmark(benchmark::BenchmarkArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::New(args) => game_cmd::run_new(args),
        Commands::Show(args) => game_cmd::run_show(args),
        Commands::Moves(args) => game_cmd::run_moves(args),
        Commands::Play(args) => game_cmd::run_play(args),
        Commands::Ai(args) => game_cmd::run_ai(args, cli.seed),
        Commands::Selfplay(args) => selfplay::run(args, cli.seed),
        Commands::Benchmark(args) => benchmark::run(args, cli.seed),
    }
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
