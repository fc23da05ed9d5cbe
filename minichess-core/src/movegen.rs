//! Move generation
//!
//! Offset and ray enumeration with capture-or-stop semantics. Produces exactly
//! the destinations `validate` accepts, without running the full check chain
//! per candidate.

use crate::board::{Board, Move, Square};
use crate::pieces::{Color, MoveType, Piece};
use rustc_hash::FxHashSet;

/// Legal destinations for the piece on `square`
///
/// Empty when the square is off the board, empty, or holds a piece of the
/// other color.
pub fn legal_destinations(board: &Board, side: Color, square: Square) -> FxHashSet<Square> {
    let mut moves = Vec::new();
    if let Some(piece) = board.get(square) {
        if piece.color == side {
            generate_piece_moves(board, square, piece, &mut moves);
        }
    }
    moves.into_iter().map(|mv| mv.to).collect()
}

/// All legal moves for `side`, in row-major order of the moving piece
pub fn legal_moves(board: &Board, side: Color) -> Vec<Move> {
    let mut moves = Vec::with_capacity(32);
    for (pos, piece) in board.pieces() {
        if piece.color == side {
            generate_piece_moves(board, pos, piece, &mut moves);
        }
    }
    moves
}

/// Whether `side` has at least one legal move
pub fn has_legal_move(board: &Board, side: Color) -> bool {
    let mut moves = Vec::new();
    for (pos, piece) in board.pieces() {
        if piece.color != side {
            continue;
        }
        generate_piece_moves(board, pos, piece, &mut moves);
        if !moves.is_empty() {
            return true;
        }
    }
    false
}

fn generate_piece_moves(board: &Board, pos: Square, piece: Piece, moves: &mut Vec<Move>) {
    let pt = piece.kind.piece_type();

    match pt.move_type {
        MoveType::Pawn => generate_pawn_moves(board, pos, piece, moves),
        MoveType::Step | MoveType::Jump => generate_leap_moves(board, pos, piece, pt.directions, moves),
        MoveType::Slide => generate_slide_moves(board, pos, piece, pt.directions, moves),
    }
}

fn generate_pawn_moves(board: &Board, pos: Square, piece: Piece, moves: &mut Vec<Move>) {
    let forward = piece.color.forward();

    let one = pos.offset(forward, 0);
    if one.is_valid() && board.is_empty(one) {
        moves.push(Move::new(pos, one));

        let two = pos.offset(2 * forward, 0);
        if pos.row == piece.color.pawn_home_row() && two.is_valid() && board.is_empty(two) {
            moves.push(Move::new(pos, two));
        }
    }

    for dc in [-1, 1] {
        let diag = pos.offset(forward, dc);
        if let Some(occupant) = board.get(diag) {
            if occupant.color != piece.color {
                moves.push(Move::new(pos, diag));
            }
        }
    }
}

fn generate_leap_moves(
    board: &Board,
    pos: Square,
    piece: Piece,
    offsets: &[(i8, i8)],
    moves: &mut Vec<Move>,
) {
    for &(dr, dc) in offsets {
        let dest = pos.offset(dr, dc);
        if !dest.is_valid() {
            continue;
        }

        match board.get(dest) {
            Some(occupant) if occupant.color == piece.color => {}
            _ => moves.push(Move::new(pos, dest)),
        }
    }
}

fn generate_slide_moves(
    board: &Board,
    pos: Square,
    piece: Piece,
    directions: &[(i8, i8)],
    moves: &mut Vec<Move>,
) {
    for &(dr, dc) in directions {
        let mut current = pos;

        loop {
            current = current.offset(dr, dc);
            if !current.is_valid() {
                break;
            }

            if let Some(occupant) = board.get(current) {
                if occupant.color != piece.color {
                    moves.push(Move::new(pos, current));
                }
                break; // Blocked
            }

            moves.push(Move::new(pos, current));
        }
    }
}
