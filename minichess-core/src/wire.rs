//! Wire form of a game state
//!
//! JSON document carrying the board, turn, history, captured lists and
//! result, plus a version tag, a dimension tag, a derived piece-count table
//! and a SHA-256 checksum. Decoding is the trust boundary for state handed
//! back after external storage: anything inconsistent is rejected whole.

use crate::board::{Board, Square, COLS, ROWS};
use crate::error::IntegrityError;
use crate::game::{GameResult, GameState, MoveRecord};
use crate::pieces::{Color, Piece, ALL_KINDS};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};

/// Current wire version
pub const WIRE_VERSION: u32 = 1;

/// One move record on the wire
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMove {
    pub from: String,
    pub to: String,
    pub piece: String,
    pub captured: Option<String>,
    pub seq: u32,
}

/// Captured pieces, keyed by the capturing color
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireCaptured {
    pub white: Vec<String>,
    pub black: Vec<String>,
}

/// Serialized game state
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireState {
    pub version: u32,
    /// [rows, cols]
    pub dimensions: [usize; 2],
    pub board: Vec<Vec<String>>,
    pub turn: Color,
    pub history: Vec<WireMove>,
    pub captured: WireCaptured,
    pub move_count: usize,
    pub result: GameResult,
    pub piece_counts: BTreeMap<String, u32>,
    pub checksum: String,
}

// ============================================================================
// ENCODE
// ============================================================================

impl WireState {
    pub fn from_state(state: &GameState) -> Self {
        let board = state.board();
        let white = state.captured_by(Color::White);
        let black = state.captured_by(Color::Black);

        Self {
            version: WIRE_VERSION,
            dimensions: [ROWS as usize, COLS as usize],
            board: board.to_rows(),
            turn: state.side_to_move(),
            history: state.history().iter().map(wire_move).collect(),
            captured: WireCaptured {
                white: symbols(white),
                black: symbols(black),
            },
            move_count: state.move_count(),
            result: state.result(),
            piece_counts: piece_counts(board),
            checksum: checksum(board, state.side_to_move(), state.move_count(), state.result(), [white, black]),
        }
    }
}

fn wire_move(record: &MoveRecord) -> WireMove {
    WireMove {
        from: record.from.label(),
        to: record.to.label(),
        piece: record.piece.symbol().to_string(),
        captured: record.captured.map(|p| p.symbol().to_string()),
        seq: record.seq,
    }
}

fn symbols(pieces: &[Piece]) -> Vec<String> {
    pieces.iter().map(|p| p.symbol().to_string()).collect()
}

/// Count of every piece symbol on the board, zeros included
fn piece_counts(board: &Board) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for color in [Color::White, Color::Black] {
        for kind in ALL_KINDS {
            let piece = Piece::new(color, kind);
            counts.insert(piece.symbol().to_string(), board.count(piece) as u32);
        }
    }
    counts
}

/// SHA-256 over board, turn, move count, result and sorted captured lists
fn checksum(
    board: &Board,
    turn: Color,
    move_count: usize,
    result: GameResult,
    captured: [&[Piece]; 2],
) -> String {
    let mut hasher = Sha256::new();

    for row in board.to_rows() {
        hasher.update(row.concat().as_bytes());
        hasher.update(b"/");
    }
    hasher.update(format!("|{}|{}|{}|", turn, move_count, result.as_str()).as_bytes());

    for pieces in captured {
        let mut sorted: Vec<char> = pieces.iter().map(Piece::symbol).collect();
        sorted.sort_unstable();
        hasher.update(sorted.into_iter().collect::<String>().as_bytes());
        hasher.update(b"|");
    }

    hex::encode(hasher.finalize())
}

// ============================================================================
// DECODE
// ============================================================================

impl WireState {
    /// Verify and rebuild the game state
    ///
    /// Order: structure (dimensions, symbols, move records), then the
    /// piece-count table, then the checksum.
    pub fn into_state(self) -> Result<GameState, IntegrityError> {
        if self.version != WIRE_VERSION {
            return Err(IntegrityError::UnsupportedVersion(self.version));
        }

        if self.dimensions != [ROWS as usize, COLS as usize] {
            return Err(IntegrityError::DimensionMismatch(format!(
                "tagged {}x{}, expected {}x{}",
                self.dimensions[0], self.dimensions[1], ROWS, COLS
            )));
        }
        let board = Board::from_rows(&self.board)?;

        let history = decode_history(&self.history, self.turn)?;
        if self.move_count != history.len() {
            return Err(IntegrityError::InvalidHistory {
                index: history.len(),
                reason: format!("move count {} but {} records", self.move_count, history.len()),
            });
        }

        let captured = [
            decode_pieces(&self.captured.white)?,
            decode_pieces(&self.captured.black)?,
        ];
        check_captured(&history, &captured)?;

        check_piece_counts(&board, &self.piece_counts)?;

        let expected = checksum(
            &board,
            self.turn,
            self.move_count,
            self.result,
            [&captured[0], &captured[1]],
        );
        if !expected.eq_ignore_ascii_case(self.checksum.trim()) {
            return Err(IntegrityError::ChecksumMismatch);
        }

        Ok(GameState::from_parts(board, self.turn, history, captured, self.result))
    }
}

fn decode_piece(symbol: &str) -> Result<Piece, IntegrityError> {
    match Piece::parse_cell(symbol) {
        Ok(Some(piece)) => Ok(piece),
        _ => Err(IntegrityError::UnknownSymbol(symbol.to_string())),
    }
}

fn decode_pieces(symbols: &[String]) -> Result<Vec<Piece>, IntegrityError> {
    symbols.iter().map(|s| decode_piece(s)).collect()
}

fn decode_history(moves: &[WireMove], turn: Color) -> Result<Vec<MoveRecord>, IntegrityError> {
    let len = moves.len();
    let mut history = Vec::with_capacity(len);

    for (index, mv) in moves.iter().enumerate() {
        let invalid = |reason: String| IntegrityError::InvalidHistory { index, reason };

        if mv.seq as usize != index + 1 {
            return Err(invalid(format!("sequence number {} out of order", mv.seq)));
        }

        let from = Square::from_label(&mv.from).ok_or_else(|| invalid(format!("bad square {:?}", mv.from)))?;
        let to = Square::from_label(&mv.to).ok_or_else(|| invalid(format!("bad square {:?}", mv.to)))?;
        if from == to {
            return Err(invalid("source equals destination".to_string()));
        }

        let piece = decode_piece(&mv.piece)?;
        let captured = mv.captured.as_deref().map(decode_piece).transpose()?;

        // Turns alternate, and the last mover is the side not on move
        let moves_after = len - 1 - index;
        let expected_mover = if moves_after % 2 == 0 { turn.opponent() } else { turn };
        if piece.color != expected_mover {
            return Err(invalid(format!("{} moved out of turn", piece.color)));
        }
        if let Some(taken) = captured {
            if taken.color == piece.color {
                return Err(invalid("captured a friendly piece".to_string()));
            }
        }

        history.push(MoveRecord {
            from,
            to,
            piece,
            captured,
            seq: mv.seq,
        });
    }

    Ok(history)
}

/// Captured lists must equal the history's captures grouped by mover
fn check_captured(history: &[MoveRecord], captured: &[Vec<Piece>; 2]) -> Result<(), IntegrityError> {
    for color in [Color::White, Color::Black] {
        let mut from_history: Vec<Piece> = history
            .iter()
            .filter(|r| r.piece.color == color)
            .filter_map(|r| r.captured)
            .collect();
        let mut listed = captured[color.index()].clone();
        from_history.sort();
        listed.sort();
        if from_history != listed {
            return Err(IntegrityError::CapturedMismatch);
        }
    }
    Ok(())
}

fn check_piece_counts(board: &Board, claimed: &BTreeMap<String, u32>) -> Result<(), IntegrityError> {
    let actual = piece_counts(board);
    let symbols: BTreeSet<&String> = actual.keys().chain(claimed.keys()).collect();

    for symbol in symbols {
        let have = actual.get(symbol).copied();
        let said = claimed.get(symbol).copied();
        if have != said {
            return Err(IntegrityError::PieceCountMismatch {
                symbol: symbol.clone(),
                claimed: said.unwrap_or(0),
                actual: have.unwrap_or(0),
            });
        }
    }
    Ok(())
}

// ============================================================================
// BLOB
// ============================================================================

/// Encode a state as a JSON blob
pub fn to_wire(state: &GameState) -> Result<String, serde_json::Error> {
    serde_json::to_string(&WireState::from_state(state))
}

/// Decode and verify a JSON blob
pub fn from_wire(blob: &str) -> Result<GameState, IntegrityError> {
    let result = serde_json::from_str::<WireState>(blob)
        .map_err(|e| IntegrityError::Malformed(e.to_string()))
        .and_then(WireState::into_state);

    if let Err(err) = &result {
        tracing::warn!("rejected wire state: {}", err);
    }
    result
}
