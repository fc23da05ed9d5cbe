//! Time-bounded minimax with alpha-beta pruning
//!
//! White maximizes, Black minimizes. Each branch plays on its own copy of the
//! board, so nothing is shared between siblings and nothing survives between
//! calls.

use crate::board::{Board, Move};
use crate::eval::{evaluate, Heuristics};
use crate::game::GameState;
use crate::movegen;
use crate::pieces::{Color, PieceKind};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::cmp::Reverse;
use std::time::{Duration, Instant};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Score of a node whose side to move has no reply (negated for White)
pub const NO_MOVES_SCORE: i32 = 9999;

/// Wall-clock budget per search
pub const DEFAULT_TIME_BUDGET: Duration = Duration::from_millis(3000);

/// Fraction of the budget after which the search stops deepening
const SOFT_LIMIT_FRACTION: f64 = 0.9;

/// Nodes between clock reads inside the recursion
const NODE_CHECK_INTERVAL: u64 = 512;

pub const MIN_DIFFICULTY: i32 = 1;
pub const MAX_DIFFICULTY: i32 = 4;

// ============================================================================
// CONFIGURATION AND RESULTS
// ============================================================================

/// Search parameters, built per call
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SearchConfig {
    /// Plies to search from the root
    pub depth: u32,
    pub time_budget: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::for_difficulty(2)
    }
}

impl SearchConfig {
    /// Difficulty 1-4 maps to depth 2-5; anything else is clamped
    pub fn for_difficulty(difficulty: i32) -> Self {
        let difficulty = difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
        Self {
            depth: difficulty as u32 + 1,
            time_budget: DEFAULT_TIME_BUDGET,
        }
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth.max(1);
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    fn soft_limit(&self) -> Duration {
        self.time_budget.mul_f64(SOFT_LIMIT_FRACTION)
    }
}

/// Outcome of one search
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchResult {
    #[serde(rename = "move")]
    pub mv: Move,
    /// Minimax score of `mv`, positive favours White
    pub score: i32,
    pub nodes: u64,
    /// Deepest ply visited
    pub depth: u32,
    pub elapsed: Duration,
    /// Root moves sharing the best score; `mv` was drawn from these
    pub tied: Vec<Move>,
    /// The clock cut the search short
    pub timed_out: bool,
}

// ============================================================================
// ALPHA-BETA AI
// ============================================================================

/// Alpha-Beta AI player
pub struct AlphaBetaAI {
    pub config: SearchConfig,
    pub heuristics: Heuristics,
    rng: ChaCha8Rng,
}

impl AlphaBetaAI {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            heuristics: Heuristics::default(),
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    pub fn with_seed(config: SearchConfig, seed: u64) -> Self {
        Self {
            config,
            heuristics: Heuristics::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn for_difficulty(difficulty: i32) -> Self {
        Self::new(SearchConfig::for_difficulty(difficulty))
    }

    pub fn with_heuristics(mut self, heuristics: Heuristics) -> Self {
        self.heuristics = heuristics;
        self
    }

    /// Pick a move for the side to move
    pub fn choose_move(&mut self, state: &GameState) -> Option<SearchResult> {
        search(state, &self.config, &self.heuristics, &mut self.rng)
    }

    /// Play both sides until the game ends or `max_plies` moves are made
    pub fn play_game(&mut self, initial: GameState, max_plies: usize) -> GameState {
        let mut state = initial;

        while !state.is_over() && state.move_count() < max_plies {
            let Some(result) = self.choose_move(&state) else {
                break;
            };
            if state.apply_move(result.mv.from, result.mv.to).is_err() {
                break;
            }
        }

        state
    }

    /// Evaluate a position
    pub fn evaluate(&self, board: &Board) -> i32 {
        evaluate(board, &self.heuristics)
    }
}

// ============================================================================
// MOVE ORDERING
// ============================================================================

/// Score a move for ordering (higher = search first)
fn move_score(board: &Board, mv: &Move, heuristics: &Heuristics) -> i32 {
    let mut score = 0;

    // Capture bonus (MVV - Most Valuable Victim)
    if let Some(victim) = board.get(mv.to) {
        score += heuristics.piece_value(victim.kind) * 10;
        if let Some(attacker) = board.get(mv.from) {
            score -= heuristics.piece_value(attacker.kind) / 10;
        }
    }

    // Promotion
    if let Some(piece) = board.get(mv.from) {
        if piece.kind == PieceKind::Pawn && mv.to.row == piece.color.promotion_row() {
            score += heuristics.piece_value(PieceKind::Queen);
        }
    }

    score
}

fn order_moves(board: &Board, moves: &mut [Move], heuristics: &Heuristics) {
    moves.sort_by_key(|mv| Reverse(move_score(board, mv, heuristics)));
}

// ============================================================================
// MINIMAX WITH ALPHA-BETA
// ============================================================================

struct Searcher<'a> {
    heuristics: &'a Heuristics,
    start: Instant,
    soft_limit: Duration,
    nodes: u64,
    seldepth: u32,
    stopped: bool,
}

impl<'a> Searcher<'a> {
    fn new(heuristics: &'a Heuristics, config: &SearchConfig) -> Self {
        Self {
            heuristics,
            start: Instant::now(),
            soft_limit: config.soft_limit(),
            nodes: 0,
            seldepth: 0,
            stopped: false,
        }
    }

    /// Latch `stopped` once the soft limit passes
    fn out_of_time(&mut self) -> bool {
        if !self.stopped && self.start.elapsed() >= self.soft_limit {
            self.stopped = true;
        }
        self.stopped
    }

    fn minimax(
        &mut self,
        board: &Board,
        side: Color,
        depth: u32,
        ply: u32,
        mut alpha: i32,
        mut beta: i32,
    ) -> i32 {
        self.nodes += 1;
        self.seldepth = self.seldepth.max(ply);

        if self.nodes % NODE_CHECK_INTERVAL == 0 {
            self.out_of_time();
        }
        if self.stopped {
            return evaluate(board, self.heuristics);
        }

        // A captured King ends the line; material already shows it
        if !board.has_king(Color::White) || !board.has_king(Color::Black) {
            return evaluate(board, self.heuristics);
        }

        let mut moves = movegen::legal_moves(board, side);
        if moves.is_empty() {
            return no_moves_score(side);
        }

        if depth == 0 {
            return evaluate(board, self.heuristics);
        }

        order_moves(board, &mut moves, self.heuristics);

        let maximizing = side == Color::White;
        let mut best: Option<i32> = None;

        for mv in moves {
            if self.out_of_time() {
                break;
            }

            let mut child = *board;
            child.play(mv.from, mv.to);
            let score = self.minimax(&child, side.opponent(), depth - 1, ply + 1, alpha, beta);

            if maximizing {
                best = Some(best.map_or(score, |b| b.max(score)));
                alpha = alpha.max(score);
            } else {
                best = Some(best.map_or(score, |b| b.min(score)));
                beta = beta.min(score);
            }

            if alpha >= beta {
                break;
            }
        }

        best.unwrap_or_else(|| evaluate(board, self.heuristics))
    }
}

fn no_moves_score(side: Color) -> i32 {
    match side {
        Color::White => -NO_MOVES_SCORE,
        Color::Black => NO_MOVES_SCORE,
    }
}

/// Search the current position
///
/// Returns `None` when the game is over or the side to move has no legal
/// move. Otherwise always returns a legal move: if the clock runs out the best
/// move among the root moves already searched is used. Ties at the root are
/// broken by `rng`.
pub fn search<R: Rng + ?Sized>(
    state: &GameState,
    config: &SearchConfig,
    heuristics: &Heuristics,
    rng: &mut R,
) -> Option<SearchResult> {
    if state.is_over() {
        return None;
    }

    let mut moves = state.legal_moves();
    if moves.is_empty() {
        return None;
    }

    let board = state.board();
    let side = state.side_to_move();
    let depth = config.depth.max(1);
    let mut searcher = Searcher::new(heuristics, config);

    order_moves(board, &mut moves, heuristics);
    let total = moves.len();

    // Root children get a full window so equal scores are exact ties
    let mut scored: Vec<(Move, i32)> = Vec::with_capacity(moves.len());
    for mv in moves {
        if !scored.is_empty() && searcher.out_of_time() {
            break;
        }

        let mut child = *board;
        child.play(mv.from, mv.to);
        let score = searcher.minimax(&child, side.opponent(), depth - 1, 1, i32::MIN, i32::MAX);

        // A subtree cut off by the clock is only used if nothing else finished
        if searcher.stopped && !scored.is_empty() {
            break;
        }

        tracing::trace!("root {} -> {}", mv, score);
        scored.push((mv, score));
    }

    let best = match side {
        Color::White => scored.iter().map(|&(_, s)| s).max()?,
        Color::Black => scored.iter().map(|&(_, s)| s).min()?,
    };
    let tied: Vec<Move> = scored
        .iter()
        .filter(|&&(_, s)| s == best)
        .map(|&(mv, _)| mv)
        .collect();
    let &mv = tied.choose(rng)?;

    let elapsed = searcher.start.elapsed();
    if searcher.stopped && scored.len() == 1 && total > 1 {
        tracing::warn!("search clock ran out inside the first root move, playing {} unverified", mv);
    } else if searcher.stopped {
        tracing::debug!(
            "search stopped by clock after {}/{} root moves",
            scored.len(),
            total
        );
    }
    tracing::debug!(
        "search {}: {} score={} depth={} nodes={} elapsed={:?} tied={}",
        side,
        mv,
        best,
        searcher.seldepth,
        searcher.nodes,
        elapsed,
        tied.len()
    );

    Some(SearchResult {
        mv,
        score: best,
        nodes: searcher.nodes,
        depth: searcher.seldepth,
        elapsed,
        tied,
        timed_out: searcher.stopped,
    })
}

// ============================================================================
// TESTS
// ============================================================================
