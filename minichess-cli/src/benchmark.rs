//! Benchmark command - time the search at each difficulty
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_positions(), report_results()
//! - Level 3: benchmark_difficulty()
//! - Level 4: timing utilities, formatting

use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Args;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use minichess_core::search::{search, MAX_DIFFICULTY, MIN_DIFFICULTY};
use minichess_core::{GameState, Heuristics, SearchConfig};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct BenchmarkArgs {
    /// Number of positions searched per difficulty
    #[arg(long, default_value = "10")]
    pub positions: usize,

    /// Random plies played from the start to build each position
    #[arg(long, default_value = "6")]
    pub scramble: usize,

    /// Highest difficulty to test
    #[arg(long, default_value = "4")]
    pub max_difficulty: i32,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Results for one difficulty
#[derive(Clone, Debug)]
struct BenchmarkResult {
    difficulty: i32,
    depth: u32,
    searches: usize,
    total_time: Duration,
    max_time: Duration,
    nodes: u64,
    timeouts: usize,
}

impl BenchmarkResult {
    fn avg_time(&self) -> Duration {
        if self.searches == 0 {
            Duration::ZERO
        } else {
            self.total_time / self.searches as u32
        }
    }

    fn nodes_per_second(&self) -> f64 {
        let secs = self.total_time.as_secs_f64();
        if secs > 0.0 {
            self.nodes as f64 / secs
        } else {
            0.0
        }
    }
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run benchmark command
///
/// 1. Build a fixed set of positions
/// 2. Search each one at every difficulty
/// 3. Report results
pub fn run(args: BenchmarkArgs, seed: Option<u64>) -> Result<()> {
    let mut rng = create_rng(seed);
    let positions = build_positions(args.positions, args.scramble, &mut rng);

    tracing::info!("Benchmarking {} positions", positions.len());

    let top = args.max_difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
    let results: Vec<BenchmarkResult> = (MIN_DIFFICULTY..=top)
        .map(|difficulty| {
            tracing::info!("Benchmarking difficulty {}...", difficulty);
            benchmark_difficulty(&positions, difficulty, &mut rng)
        })
        .collect();

    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Positions reached by random play from the default start, all still ongoing
fn build_positions(count: usize, scramble: usize, rng: &mut ChaCha8Rng) -> Vec<GameState> {
    let mut positions = Vec::with_capacity(count);

    while positions.len() < count {
        let mut state = GameState::default();
        for _ in 0..scramble {
            let Some(mv) = state.legal_moves().choose(rng).copied() else {
                break;
            };
            if state.apply_move(mv.from, mv.to).is_err() || state.is_over() {
                break;
            }
        }
        if state.is_over() || state.legal_moves().is_empty() {
            continue;
        }
        positions.push(state);
    }

    positions
}

fn report_results(results: &[BenchmarkResult], args: &BenchmarkArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn benchmark_difficulty(positions: &[GameState], difficulty: i32, rng: &mut ChaCha8Rng) -> BenchmarkResult {
    let config = SearchConfig::for_difficulty(difficulty);
    let heuristics = Heuristics::default();

    let mut result = BenchmarkResult {
        difficulty,
        depth: config.depth,
        searches: 0,
        total_time: Duration::ZERO,
        max_time: Duration::ZERO,
        nodes: 0,
        timeouts: 0,
    };

    for state in positions {
        let start = Instant::now();
        let found = search(state, &config, &heuristics, rng);
        let elapsed = start.elapsed();

        result.searches += 1;
        result.total_time += elapsed;
        result.max_time = result.max_time.max(elapsed);
        if let Some(found) = found {
            result.nodes += found.nodes;
            if found.timed_out {
                result.timeouts += 1;
            }
        }
    }

    result
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

/// Format duration for display
fn format_duration(d: Duration) -> String {
    if d.as_secs() >= 1 {
        format!("{:.2}s", d.as_secs_f64())
    } else if d.as_millis() >= 1 {
        format!("{:.1}ms", d.as_secs_f64() * 1000.0)
    } else {
        format!("{:.1}us", d.as_secs_f64() * 1_000_000.0)
    }
}

fn print_json_results(results: &[BenchmarkResult]) {
    #[derive(serde::Serialize)]
    struct JsonBenchmark {
        difficulty: i32,
        depth: u32,
        searches: usize,
        avg_time_ms: f64,
        max_time_ms: f64,
        nodes: u64,
        nodes_per_second: f64,
        timeouts: usize,
    }

    let output: Vec<JsonBenchmark> = results
        .iter()
        .map(|r| JsonBenchmark {
            difficulty: r.difficulty,
            depth: r.depth,
            searches: r.searches,
            avg_time_ms: r.avg_time().as_secs_f64() * 1000.0,
            max_time_ms: r.max_time.as_secs_f64() * 1000.0,
            nodes: r.nodes,
            nodes_per_second: r.nodes_per_second(),
            timeouts: r.timeouts,
        })
        .collect();

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

fn print_text_results(results: &[BenchmarkResult]) {
    println!("\n=== Search Benchmark Results ===\n");
    println!(
        "{:<10} {:>6} {:>9} {:>10} {:>10} {:>12} {:>9}",
        "Difficulty", "Depth", "Searches", "Avg", "Max", "Nodes/s", "Timeouts"
    );
    println!("{}", "-".repeat(72));

    for r in results {
        println!(
            "{:<10} {:>6} {:>9} {:>10} {:>10} {:>12.0} {:>9}",
            r.difficulty,
            r.depth,
            r.searches,
            format_duration(r.avg_time()),
            format_duration(r.max_time),
            r.nodes_per_second(),
            r.timeouts
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert!(format_duration(Duration::from_micros(500)).contains("us"));
        assert!(format_duration(Duration::from_millis(500)).contains("ms"));
        assert!(format_duration(Duration::from_secs(5)).contains("s"));
    }

    #[test]
    fn test_build_positions_ongoing() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let positions = build_positions(5, 4, &mut rng);
        assert_eq!(positions.len(), 5);
        assert!(positions.iter().all(|p| !p.is_over()));
    }

    #[test]
    fn test_benchmark_difficulty_counts() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let positions = build_positions(2, 2, &mut rng);
        let result = benchmark_difficulty(&positions, 1, &mut rng);
        assert_eq!(result.searches, 2);
        assert_eq!(result.depth, 2);
        assert!(result.nodes > 0);
    }
}
