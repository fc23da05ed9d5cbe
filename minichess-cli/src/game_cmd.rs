//! Game commands - create, inspect and advance a stored game
//!
//! Every command works on a wire blob kept in a file, the same form a
//! calling service would keep between requests. A blob that fails its
//! integrity checks is refused.
//!
//! ## Architecture
//!
//! - Level 1: run_*() - one per subcommand
//! - Level 2: load_game(), save_game()
//! - Level 3: render helpers

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use minichess_core::engine;
use minichess_core::{GameState, Layout, MoveError};

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct NewArgs {
    /// Where to write the game blob
    #[arg(long, value_name = "FILE")]
    pub game: PathBuf,

    /// Custom starting layout (JSON)
    #[arg(long, value_name = "FILE")]
    pub layout: Option<PathBuf>,
}

#[derive(Args)]
pub struct GameFileArgs {
    /// Game blob to read
    #[arg(long, value_name = "FILE")]
    pub game: PathBuf,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct PlayArgs {
    /// Game blob to update in place
    #[arg(long, value_name = "FILE")]
    pub game: PathBuf,

    /// Move as two labels, e.g. "a2 a3" or "a2-a3"
    #[arg(value_name = "MOVE", num_args = 1..=2, required = true)]
    pub mv: Vec<String>,
}

#[derive(Args)]
pub struct AiArgs {
    /// Game blob to update in place
    #[arg(long, value_name = "FILE")]
    pub game: PathBuf,

    /// Difficulty 1-4 (out-of-range values are clamped)
    #[arg(long, default_value = "2", allow_negative_numbers = true)]
    pub difficulty: i32,
}

// ============================================================================
// LEVEL 1 - SUBCOMMANDS
// ============================================================================

pub fn run_new(args: NewArgs) -> Result<()> {
    let layout = match &args.layout {
        Some(path) => Some(
            Layout::load(path).with_context(|| format!("Failed to load layout: {}", path.display()))?,
        ),
        None => None,
    };

    let state = engine::new_game(layout.as_ref())?;
    save_game(&args.game, &state)?;

    tracing::info!(
        "New game ({}) written to {}",
        layout.as_ref().map_or("silverman", |l| l.name.as_str()),
        args.game.display()
    );
    print_state(&state);
    Ok(())
}

pub fn run_show(args: GameFileArgs) -> Result<()> {
    let state = load_game(&args.game)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&minichess_core::WireState::from_state(&state))?);
    } else {
        print_state(&state);
        print_history(&state);
    }
    Ok(())
}

pub fn run_moves(args: GameFileArgs) -> Result<()> {
    let state = load_game(&args.game)?;
    let moves = engine::legal_moves(&state);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&moves)?);
        return Ok(());
    }

    if moves.is_empty() {
        println!("No legal moves ({})", state.result().as_str());
        return Ok(());
    }
    for (from, dests) in &moves {
        let dests: Vec<&str> = dests.iter().map(String::as_str).collect();
        println!("{}: {}", from, dests.join(" "));
    }
    Ok(())
}

pub fn run_play(args: PlayArgs) -> Result<()> {
    let state = load_game(&args.game)?;
    let mv = engine::parse_move(&args.mv.join(" "))?;

    let (next, captured) = match engine::apply_move(&state, mv.from, mv.to) {
        Ok(applied) => applied,
        Err(MoveError::Rejected(outcome)) => {
            let code = outcome.reason.map_or("REJECTED", |r| r.as_str());
            bail!("{} rejected: {} ({})", mv, outcome.message, code);
        }
    };

    save_game(&args.game, &next)?;

    match captured {
        Some(piece) => println!("{} captures {}", mv, piece.kind.name()),
        None => println!("{}", mv),
    }
    print_state(&next);
    Ok(())
}

pub fn run_ai(args: AiArgs, seed: Option<u64>) -> Result<()> {
    let state = load_game(&args.game)?;

    let mut rng = match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    };

    let Some(result) = engine::choose_move_with_rng(&state, args.difficulty, &mut rng) else {
        println!("No move available ({})", state.result().as_str());
        return Ok(());
    };

    let (next, _) = engine::apply_move(&state, result.mv.from, result.mv.to)?;
    save_game(&args.game, &next)?;

    println!(
        "{} plays {} (score {}, {} nodes, {:.0?}{})",
        state.side_to_move(),
        result.mv,
        result.score,
        result.nodes,
        result.elapsed,
        if result.timed_out { ", out of time" } else { "" }
    );
    print_state(&next);
    Ok(())
}

// ============================================================================
// LEVEL 2 - STORAGE
// ============================================================================

/// Read and verify a game blob
pub fn load_game(path: &Path) -> Result<GameState> {
    let blob = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read game: {}", path.display()))?;
    let state = engine::deserialize(&blob)
        .with_context(|| format!("Refusing game blob: {}", path.display()))?;
    Ok(state)
}

pub fn save_game(path: &Path, state: &GameState) -> Result<()> {
    let blob = engine::serialize(state)?;
    std::fs::write(path, blob).with_context(|| format!("Failed to write game: {}", path.display()))?;
    Ok(())
}

// ============================================================================
// LEVEL 3 - RENDERING
// ============================================================================

fn print_state(state: &GameState) {
    println!();
    print!("{}", state.board());
    if state.is_over() {
        println!("\nGame over: {}", state.result().as_str());
    } else {
        println!("\n{} to move", state.side_to_move());
    }
}

fn print_history(state: &GameState) {
    if state.history().is_empty() {
        return;
    }
    println!("\nMoves:");
    for record in state.history() {
        let capture = record
            .captured
            .map(|p| format!(" x{}", p.symbol()))
            .unwrap_or_default();
        println!("  {:>3}. {} {}{}", record.seq, record.piece.symbol(), record.as_move(), capture);
    }
}

// ============================================================================
// TESTS
// ============================================================================
