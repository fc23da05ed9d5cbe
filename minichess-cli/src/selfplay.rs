//! Selfplay command - play the engine against itself
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_start(), play_match(), report_results()
//! - Level 3: play_single_game(), compute_match_statistics()
//! - Level 4: formatting utilities

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use minichess_core::search::search;
use minichess_core::{GameResult, GameState, Heuristics, Layout, Move, SearchConfig};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SelfplayArgs {
    /// Custom starting layout (JSON)
    #[arg(long, value_name = "FILE")]
    pub layout: Option<PathBuf>,

    /// Number of games to play
    #[arg(long, default_value = "4")]
    pub games: usize,

    /// White difficulty (1-4)
    #[arg(long, default_value = "2")]
    pub white: i32,

    /// Black difficulty (1-4)
    #[arg(long, default_value = "2")]
    pub black: i32,

    /// Per-move time budget in milliseconds
    #[arg(long, default_value = "3000")]
    pub budget_ms: u64,

    /// Maximum plies per game
    #[arg(long, default_value = "100")]
    pub max_plies: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    result: GameResult,
    plies: usize,
    moves: Vec<Move>,
}

/// Aggregated match results
#[derive(Clone, Debug)]
struct MatchResults {
    games: Vec<GameRecord>,
    white_wins: usize,
    black_wins: usize,
    unfinished: usize,
    avg_plies: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run selfplay command
///
/// 1. Load the starting position
/// 2. Play the games
/// 3. Report results
pub fn run(args: SelfplayArgs, seed: Option<u64>) -> Result<()> {
    let start = load_start(&args)?;

    tracing::info!(
        "Starting selfplay: {} games, white d{} vs black d{}",
        args.games,
        args.white,
        args.black
    );

    let results = play_match(&start, &args, seed);

    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn load_start(args: &SelfplayArgs) -> Result<GameState> {
    let layout = match &args.layout {
        Some(path) => Layout::load(path)
            .with_context(|| format!("Failed to load layout: {}", path.display()))?,
        None => Layout::default(),
    };
    GameState::from_layout(&layout).with_context(|| format!("Invalid layout: {}", layout.name))
}

/// Play all games in the match
fn play_match(start: &GameState, args: &SelfplayArgs, seed: Option<u64>) -> MatchResults {
    let mut rng = create_rng(seed);
    let budget = Duration::from_millis(args.budget_ms);
    let configs = [
        SearchConfig::for_difficulty(args.white).with_time_budget(budget),
        SearchConfig::for_difficulty(args.black).with_time_budget(budget),
    ];

    let mut games = Vec::with_capacity(args.games);
    for game_num in 0..args.games {
        let record = play_single_game(start.clone(), game_num + 1, &configs, args.max_plies, &mut rng);

        tracing::info!(
            "Game {}: {} ({} plies)",
            record.game_number,
            record.result.as_str(),
            record.plies
        );

        games.push(record);
    }

    compute_match_statistics(games)
}

fn report_results(results: &MatchResults, args: &SelfplayArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one game, each side searching with its own config
fn play_single_game(
    initial: GameState,
    game_number: usize,
    configs: &[SearchConfig; 2],
    max_plies: usize,
    rng: &mut ChaCha8Rng,
) -> GameRecord {
    let heuristics = Heuristics::default();
    let mut state = initial;
    let mut moves = Vec::new();

    while !state.is_over() && moves.len() < max_plies {
        let config = &configs[state.side_to_move().index()];
        let Some(result) = search(&state, config, &heuristics, rng) else {
            break;
        };
        if let Err(err) = state.apply_move(result.mv.from, result.mv.to) {
            tracing::warn!("Engine move {} rejected: {}", result.mv, err);
            break;
        }
        moves.push(result.mv);
    }

    GameRecord {
        game_number,
        result: state.result(),
        plies: moves.len(),
        moves,
    }
}

fn compute_match_statistics(games: Vec<GameRecord>) -> MatchResults {
    let count = |result: GameResult| games.iter().filter(|g| g.result == result).count();
    let white_wins = count(GameResult::WhiteWins);
    let black_wins = count(GameResult::BlackWins);
    let unfinished = games.len() - white_wins - black_wins;

    let total_plies: usize = games.iter().map(|g| g.plies).sum();
    let avg_plies = if games.is_empty() {
        0.0
    } else {
        total_plies as f32 / games.len() as f32
    };

    MatchResults {
        games,
        white_wins,
        black_wins,
        unfinished,
        avg_plies,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn percent(part: usize, total: usize) -> f32 {
    if total > 0 {
        part as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

fn print_json_results(results: &MatchResults) {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        result: GameResult,
        plies: usize,
        moves: Vec<String>,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        total_games: usize,
        white_wins: usize,
        black_wins: usize,
        unfinished: usize,
        avg_plies: f32,
        games: Vec<JsonGame>,
    }

    let output = JsonOutput {
        total_games: results.games.len(),
        white_wins: results.white_wins,
        black_wins: results.black_wins,
        unfinished: results.unfinished,
        avg_plies: results.avg_plies,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                result: g.result,
                plies: g.plies,
                moves: g.moves.iter().map(Move::to_string).collect(),
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

fn print_text_results(results: &MatchResults) {
    let total = results.games.len();

    println!("\n=== Selfplay Results ===");
    println!("Total games: {}", total);
    println!("White wins:  {} ({:.1}%)", results.white_wins, percent(results.white_wins, total));
    println!("Black wins:  {} ({:.1}%)", results.black_wins, percent(results.black_wins, total));
    println!("Unfinished:  {} ({:.1}%)", results.unfinished, percent(results.unfinished, total));
    println!("Avg plies:   {:.1}", results.avg_plies);

    println!("\nGame details:");
    for game in &results.games {
        let line: Vec<String> = game.moves.iter().map(Move::to_string).collect();
        println!(
            "  Game {}: {} in {} plies\n    {}",
            game.game_number,
            game.result.as_str(),
            game.plies,
            line.join(" ")
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn record(game_number: usize, result: GameResult, plies: usize) -> GameRecord {
        GameRecord {
            game_number,
            result,
            plies,
            moves: vec![],
        }
    }

    #[test]
    fn test_compute_match_statistics_empty() {
        let results = compute_match_statistics(vec![]);
        assert_eq!(results.white_wins, 0);
        assert_eq!(results.black_wins, 0);
        assert_eq!(results.unfinished, 0);
        assert_eq!(results.avg_plies, 0.0);
    }

    #[test]
    fn test_compute_match_statistics() {
        let results = compute_match_statistics(vec![
            record(1, GameResult::WhiteWins, 10),
            record(2, GameResult::BlackWins, 20),
            record(3, GameResult::Ongoing, 30),
        ]);
        assert_eq!(results.white_wins, 1);
        assert_eq!(results.black_wins, 1);
        assert_eq!(results.unfinished, 1);
        assert_eq!(results.avg_plies, 20.0);
    }

    #[test]
    fn test_play_single_game_respects_ply_cap() {
        let configs = [SearchConfig::for_difficulty(1); 2];
        let mut rng = create_rng(Some(7));
        let game = play_single_game(GameState::default(), 1, &configs, 6, &mut rng);
        assert!(game.plies <= 6);
        assert_eq!(game.moves.len(), game.plies);
    }

    #[test]
    fn test_create_rng_deterministic() {
        let mut rng1 = create_rng(Some(42));
        let mut rng2 = create_rng(Some(42));
        assert_eq!(rng1.gen::<u64>(), rng2.gen::<u64>());
    }
}
