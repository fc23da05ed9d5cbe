//! Position evaluation

use crate::board::{Board, Square, COLS, ROWS};
use crate::pieces::{Color, Piece, PieceKind};
use serde::{Deserialize, Serialize};

/// Heuristic weights for position evaluation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heuristics {
    /// Base value of each piece kind (indexed by `PieceKind as usize`)
    pub piece_values: [i32; 6],
    /// Per row a pawn has travelled from its own back rank
    pub pawn_advance: i32,
    /// Any piece standing on the b or c file
    pub central_file: i32,
    /// King on an edge file
    pub king_edge: i32,
    /// Extra for a King tucked into a corner
    pub king_corner: i32,
    /// Queen inside the central zone (rows 1-3, files b-c)
    pub queen_center: i32,
    /// Rook on a file with no pawns of either color
    pub rook_open_file: i32,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            piece_values: [
                100,    // Pawn
                320,    // Knight
                330,    // Bishop
                500,    // Rook
                900,    // Queen
                20_000, // King
            ],
            pawn_advance: 10,
            central_file: 10,
            king_edge: 10,
            king_corner: 10,
            queen_center: 15,
            rook_open_file: 20,
        }
    }
}

impl Heuristics {
    pub fn piece_value(&self, kind: PieceKind) -> i32 {
        self.piece_values[kind as usize]
    }
}

/// Static score of a board, positive favours White
///
/// Terms are symmetric: mirroring the board and swapping colors negates the
/// score.
pub fn evaluate(board: &Board, heuristics: &Heuristics) -> i32 {
    let open_files = open_files(board);
    let mut score = 0;

    for (sq, piece) in board.pieces() {
        let value = heuristics.piece_value(piece.kind) + positional_bonus(sq, piece, &open_files, heuristics);
        match piece.color {
            Color::White => score += value,
            Color::Black => score -= value,
        }
    }

    score
}

fn positional_bonus(sq: Square, piece: Piece, open_files: &[bool; COLS as usize], h: &Heuristics) -> i32 {
    let mut bonus = 0;

    if is_central_file(sq.col) {
        bonus += h.central_file;
    }

    match piece.kind {
        PieceKind::Pawn => {
            bonus += h.pawn_advance * rows_advanced(sq, piece.color);
        }
        PieceKind::King => {
            let edge_file = sq.col == 0 || sq.col == COLS - 1;
            let edge_rank = sq.row == 0 || sq.row == ROWS - 1;
            if edge_file {
                bonus += h.king_edge;
                if edge_rank {
                    bonus += h.king_corner;
                }
            }
        }
        PieceKind::Queen => {
            if (1..=3).contains(&sq.row) && is_central_file(sq.col) {
                bonus += h.queen_center;
            }
        }
        PieceKind::Rook => {
            if open_files[sq.col as usize] {
                bonus += h.rook_open_file;
            }
        }
        PieceKind::Knight | PieceKind::Bishop => {}
    }

    bonus
}

fn is_central_file(col: i8) -> bool {
    col == 1 || col == 2
}

/// Rows travelled from the color's own back rank
fn rows_advanced(sq: Square, color: Color) -> i32 {
    match color {
        Color::White => (ROWS - 1 - sq.row) as i32,
        Color::Black => sq.row as i32,
    }
}

fn open_files(board: &Board) -> [bool; COLS as usize] {
    let mut open = [true; COLS as usize];
    for (sq, piece) in board.pieces() {
        if piece.kind == PieceKind::Pawn {
            open[sq.col as usize] = false;
        }
    }
    open
}
