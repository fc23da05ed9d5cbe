//! Minichess Core - 5x4 rules engine and AI
//!
//! This crate provides the core game logic:
//! - Board geometry (5 rows by 4 columns, square labels)
//! - Piece types and movement rules
//! - Move validation with reason codes, and move generation
//! - Game state machine (captures, promotion, turn order, results)
//! - Position evaluation
//! - Time-bounded alpha-beta AI
//! - Wire form with integrity checks

pub mod board;
pub mod pieces;
pub mod error;
pub mod validate;
pub mod movegen;
pub mod game;
pub mod eval;
pub mod search;
pub mod layout;
pub mod wire;
pub mod engine;

// Re-exports for convenient access
pub use board::{Board, Move, Square, COLS, ROWS};
pub use pieces::{Color, Piece, PieceKind, PieceType, PIECE_TYPES};
pub use error::{EngineError, GridError, IntegrityError, MoveError};
pub use validate::{validate, Outcome, ReasonCode};
pub use game::{GameResult, GameState, MoveRecord};
pub use eval::{evaluate, Heuristics};
pub use search::{AlphaBetaAI, SearchConfig, SearchResult};
pub use layout::Layout;
pub use wire::{from_wire, to_wire, WireState};
