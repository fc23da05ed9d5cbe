//! Single-move legality checks
//!
//! `validate` is independent of `GameState` so collaborators can pre-check a
//! move against any board snapshot. Checks run in a fixed order and the
//! first failure decides the reason code.

use crate::board::{Board, Square};
use crate::pieces::{Color, Piece, PieceKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Why a move was rejected
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    InvalidCoordinates,
    SameSquare,
    NoPieceAtSource,
    WrongTurn,
    CaptureOwnPiece,
    PathBlocked,
    InvalidPawnMove,
    InvalidKnightMove,
    InvalidBishopMove,
    InvalidRookMove,
    InvalidQueenMove,
    InvalidKingMove,
    GameOver,
}

impl ReasonCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ReasonCode::InvalidCoordinates => "INVALID_COORDINATES",
            ReasonCode::SameSquare => "SAME_SQUARE",
            ReasonCode::NoPieceAtSource => "NO_PIECE_AT_SOURCE",
            ReasonCode::WrongTurn => "WRONG_TURN",
            ReasonCode::CaptureOwnPiece => "CAPTURE_OWN_PIECE",
            ReasonCode::PathBlocked => "PATH_BLOCKED",
            ReasonCode::InvalidPawnMove => "INVALID_PAWN_MOVE",
            ReasonCode::InvalidKnightMove => "INVALID_KNIGHT_MOVE",
            ReasonCode::InvalidBishopMove => "INVALID_BISHOP_MOVE",
            ReasonCode::InvalidRookMove => "INVALID_ROOK_MOVE",
            ReasonCode::InvalidQueenMove => "INVALID_QUEEN_MOVE",
            ReasonCode::InvalidKingMove => "INVALID_KING_MOVE",
            ReasonCode::GameOver => "GAME_OVER",
        }
    }

    fn for_kind(kind: PieceKind) -> Self {
        match kind {
            PieceKind::Pawn => ReasonCode::InvalidPawnMove,
            PieceKind::Knight => ReasonCode::InvalidKnightMove,
            PieceKind::Bishop => ReasonCode::InvalidBishopMove,
            PieceKind::Rook => ReasonCode::InvalidRookMove,
            PieceKind::Queen => ReasonCode::InvalidQueenMove,
            PieceKind::King => ReasonCode::InvalidKingMove,
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of validating one candidate move (built fresh per call)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub accepted: bool,
    pub reason: Option<ReasonCode>,
    pub message: String,
    pub details: BTreeMap<String, String>,
}

impl Outcome {
    fn accept(message: impl Into<String>) -> Self {
        Self {
            accepted: true,
            reason: None,
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    pub(crate) fn reject(reason: ReasonCode, message: impl Into<String>) -> Self {
        Self {
            accepted: false,
            reason: Some(reason),
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    pub(crate) fn with_detail(mut self, key: &str, value: impl ToString) -> Self {
        self.details.insert(key.to_string(), value.to_string());
        self
    }
}

/// Decide whether `side` may move the piece on `from` to `to`
pub fn validate(board: &Board, side: Color, from: Square, to: Square) -> Outcome {
    if !from.is_valid() || !to.is_valid() {
        return Outcome::reject(ReasonCode::InvalidCoordinates, "square is off the board")
            .with_detail("from", format!("({},{})", from.row, from.col))
            .with_detail("to", format!("({},{})", to.row, to.col));
    }

    if from == to {
        return Outcome::reject(ReasonCode::SameSquare, "source and destination are the same square")
            .with_detail("square", from);
    }

    let piece = match board.get(from) {
        Some(p) => p,
        None => {
            return Outcome::reject(ReasonCode::NoPieceAtSource, format!("no piece on {}", from))
                .with_detail("from", from);
        }
    };

    if piece.color != side {
        return Outcome::reject(
            ReasonCode::WrongTurn,
            format!("it is {}'s turn, {} belongs to {}", side, from, piece.color),
        )
        .with_detail("side_to_move", side)
        .with_detail("piece", piece);
    }

    if let Some(target) = board.get(to) {
        if target.color == piece.color {
            return Outcome::reject(ReasonCode::CaptureOwnPiece, format!("{} holds a friendly piece", to))
                .with_detail("target", target);
        }
    }

    match check_geometry(board, piece, from, to) {
        Ok(()) => {
            let mut outcome = Outcome::accept(format!("{} {}-{}", piece.kind.name(), from, to))
                .with_detail("piece", piece);
            if let Some(target) = board.get(to) {
                outcome = outcome.with_detail("captures", target);
            }
            outcome
        }
        Err(reason) => {
            let message = match reason {
                ReasonCode::PathBlocked => format!("path from {} to {} is blocked", from, to),
                _ => format!("{} cannot move from {} to {}", piece.kind.name(), from, to),
            };
            Outcome::reject(reason, message)
                .with_detail("piece", piece)
                .with_detail("from", from)
                .with_detail("to", to)
        }
    }
}

// ============================================================================
// PER-KIND RULES
// ============================================================================

fn check_geometry(board: &Board, piece: Piece, from: Square, to: Square) -> Result<(), ReasonCode> {
    let dr = to.row - from.row;
    let dc = to.col - from.col;
    let invalid = ReasonCode::for_kind(piece.kind);

    match piece.kind {
        PieceKind::Pawn => check_pawn(board, piece.color, from, to),
        PieceKind::Knight => {
            let shape = (dr.abs(), dc.abs());
            if shape == (2, 1) || shape == (1, 2) {
                Ok(())
            } else {
                Err(invalid)
            }
        }
        PieceKind::King => {
            if dr.abs() <= 1 && dc.abs() <= 1 {
                Ok(())
            } else {
                Err(invalid)
            }
        }
        PieceKind::Rook => {
            if is_orthogonal(dr, dc) {
                clear_path(board, from, to)
            } else {
                Err(invalid)
            }
        }
        PieceKind::Bishop => {
            if is_diagonal(dr, dc) {
                clear_path(board, from, to)
            } else {
                Err(invalid)
            }
        }
        PieceKind::Queen => {
            if is_orthogonal(dr, dc) || is_diagonal(dr, dc) {
                clear_path(board, from, to)
            } else {
                Err(invalid)
            }
        }
    }
}

fn check_pawn(board: &Board, color: Color, from: Square, to: Square) -> Result<(), ReasonCode> {
    let forward = color.forward();
    let dr = to.row - from.row;
    let dc = to.col - from.col;
    let target = board.get(to);

    if dc == 0 && dr == forward {
        return match target {
            None => Ok(()),
            Some(_) => Err(ReasonCode::InvalidPawnMove),
        };
    }

    if dc == 0 && dr == 2 * forward && from.row == color.pawn_home_row() {
        if !board.is_empty(from.offset(forward, 0)) {
            return Err(ReasonCode::PathBlocked);
        }
        return match target {
            None => Ok(()),
            Some(_) => Err(ReasonCode::InvalidPawnMove),
        };
    }

    if dc.abs() == 1 && dr == forward {
        return match target {
            Some(p) if p.color != color => Ok(()),
            _ => Err(ReasonCode::InvalidPawnMove),
        };
    }

    Err(ReasonCode::InvalidPawnMove)
}

fn is_orthogonal(dr: i8, dc: i8) -> bool {
    (dr == 0) != (dc == 0)
}

fn is_diagonal(dr: i8, dc: i8) -> bool {
    dr != 0 && dr.abs() == dc.abs()
}

/// Interior squares of a straight line must be empty
fn clear_path(board: &Board, from: Square, to: Square) -> Result<(), ReasonCode> {
    let step_r = (to.row - from.row).signum();
    let step_c = (to.col - from.col).signum();
    let mut current = from.offset(step_r, step_c);

    while current != to {
        if !board.is_empty(current) {
            return Err(ReasonCode::PathBlocked);
        }
        current = current.offset(step_r, step_c);
    }

    Ok(())
}
