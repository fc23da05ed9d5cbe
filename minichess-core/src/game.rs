//! Game state and move application

use crate::board::{Board, Move, Square};
use crate::error::{GridError, MoveError};
use crate::layout::Layout;
use crate::movegen;
use crate::pieces::{Color, Piece};
use crate::validate::{validate, Outcome, ReasonCode};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Game result
///
/// `Stalemate` is representable (and survives the wire form) but the rules
/// never produce it: a side left without legal moves loses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    Ongoing,
    WhiteWins,
    BlackWins,
    Stalemate,
}

impl GameResult {
    pub fn is_terminal(self) -> bool {
        self != GameResult::Ongoing
    }

    pub fn win_for(color: Color) -> Self {
        match color {
            Color::White => GameResult::WhiteWins,
            Color::Black => GameResult::BlackWins,
        }
    }

    pub fn winner(self) -> Option<Color> {
        match self {
            GameResult::WhiteWins => Some(Color::White),
            GameResult::BlackWins => Some(Color::Black),
            GameResult::Ongoing | GameResult::Stalemate => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameResult::Ongoing => "ongoing",
            GameResult::WhiteWins => "white_wins",
            GameResult::BlackWins => "black_wins",
            GameResult::Stalemate => "stalemate",
        }
    }
}

/// An applied move (immutable once recorded)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub from: Square,
    pub to: Square,
    /// The piece as it stood on `from`, before any promotion
    pub piece: Piece,
    pub captured: Option<Piece>,
    /// 1-based position in the history
    pub seq: u32,
}

impl MoveRecord {
    pub fn as_move(&self) -> Move {
        Move::new(self.from, self.to)
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Game state
///
/// Mutated only through `apply_move`; every other method is a read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    side_to_move: Color,
    history: Vec<MoveRecord>,
    /// Pieces taken, indexed by the capturing color
    captured: [Vec<Piece>; 2],
    result: GameResult,
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Fresh game from a layout, White to move
    pub fn from_layout(layout: &Layout) -> Result<Self, GridError> {
        Ok(Self::from_board(layout.to_board()?, Color::White))
    }

    /// Fresh game from an arbitrary board
    ///
    /// The game starts `Ongoing`; the result is only decided after a move is
    /// applied.
    pub fn from_board(board: Board, side_to_move: Color) -> Self {
        Self {
            board,
            side_to_move,
            history: Vec::new(),
            captured: [Vec::new(), Vec::new()],
            result: GameResult::Ongoing,
        }
    }

    /// Reassemble a previously serialized state (fields already verified)
    pub(crate) fn from_parts(
        board: Board,
        side_to_move: Color,
        history: Vec<MoveRecord>,
        captured: [Vec<Piece>; 2],
        result: GameResult,
    ) -> Self {
        Self {
            board,
            side_to_move,
            history,
            captured,
            result,
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn move_count(&self) -> usize {
        self.history.len()
    }

    /// Pieces `color` has captured, in capture order
    pub fn captured_by(&self, color: Color) -> &[Piece] {
        &self.captured[color.index()]
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn is_over(&self) -> bool {
        self.result.is_terminal()
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.history.last()
    }

    // ========================================================================
    // MOVE QUERIES
    // ========================================================================

    /// All legal moves for the side to move (none once the game is over)
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.is_over() {
            return vec![];
        }
        movegen::legal_moves(&self.board, self.side_to_move)
    }

    /// Legal destinations for the piece on `square`
    pub fn legal_destinations(&self, square: Square) -> FxHashSet<Square> {
        if self.is_over() {
            return FxHashSet::default();
        }
        movegen::legal_destinations(&self.board, self.side_to_move, square)
    }

    /// Validate a move against this state without applying it
    pub fn validate(&self, from: Square, to: Square) -> Outcome {
        if self.is_over() {
            return Outcome::reject(ReasonCode::GameOver, "the game is already over")
                .with_detail("result", self.result.as_str());
        }
        validate(&self.board, self.side_to_move, from, to)
    }

    // ========================================================================
    // APPLY MOVE
    // ========================================================================

    /// Apply a move in place, returning the captured piece
    ///
    /// On rejection nothing changes and the validation outcome is returned.
    pub fn apply_move(&mut self, from: Square, to: Square) -> Result<Option<Piece>, MoveError> {
        let outcome = self.validate(from, to);
        if !outcome.accepted {
            return Err(MoveError::Rejected(outcome));
        }

        let mover = self.side_to_move;
        let piece = match self.board.get(from) {
            Some(p) => p,
            None => return Err(MoveError::Rejected(outcome)),
        };

        let captured = self.board.play(from, to);
        if let Some(taken) = captured {
            self.captured[mover.index()].push(taken);
        }

        self.history.push(MoveRecord {
            from,
            to,
            piece,
            captured,
            seq: self.history.len() as u32 + 1,
        });
        self.side_to_move = mover.opponent();
        self.result = compute_result(&self.board, self.side_to_move);

        tracing::debug!(
            "{} {} {}-{}{} -> {:?}",
            mover,
            piece.kind.name(),
            from,
            to,
            captured.map(|c| format!(" x{}", c)).unwrap_or_default(),
            self.result
        );

        Ok(captured)
    }

    /// Apply a move to a copy, leaving `self` untouched
    pub fn with_move(&self, from: Square, to: Square) -> Result<(Self, Option<Piece>), MoveError> {
        let mut next = self.clone();
        let captured = next.apply_move(from, to)?;
        Ok((next, captured))
    }
}

impl Default for GameState {
    fn default() -> Self {
        let board = Layout::default().to_board().unwrap_or_default();
        Self::from_board(board, Color::White)
    }
}

/// Terminal detection after a move
///
/// A missing King decides the game outright. Otherwise a side to move with no
/// legal moves has lost.
pub fn compute_result(board: &Board, side_to_move: Color) -> GameResult {
    match (board.has_king(Color::White), board.has_king(Color::Black)) {
        (true, false) => return GameResult::WhiteWins,
        (false, true) => return GameResult::BlackWins,
        (false, false) => return GameResult::win_for(side_to_move.opponent()),
        (true, true) => {}
    }

    if movegen::has_legal_move(board, side_to_move) {
        GameResult::Ongoing
    } else {
        GameResult::win_for(side_to_move.opponent())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::PieceKind;

    fn sq(row: i8, col: i8) -> Square {
        Square::new(row, col)
    }

    fn board_from(rows: &[&str]) -> Board {
        Layout::from_strings("test", rows).to_board().unwrap()
    }

    #[test]
    fn test_game_creation() {
        let game = GameState::default();
        assert_eq!(game.side_to_move(), Color::White);
        assert_eq!(game.result(), GameResult::Ongoing);
        assert_eq!(game.move_count(), 0);
        assert!(game.captured_by(Color::White).is_empty());
    }

    #[test]
    fn test_opening_push() {
        let mut game = GameState::default();
        let captured = game.apply_move(sq(3, 0), sq(2, 0)).unwrap();
        assert_eq!(captured, None);
        assert_eq!(game.board().get(sq(2, 0)), Some(Piece::new(Color::White, PieceKind::Pawn)));
        assert!(game.board().is_empty(sq(3, 0)));
        assert_eq!(game.side_to_move(), Color::Black);
        assert_eq!(game.history().len(), 1);
        assert_eq!(game.history()[0].seq, 1);
    }

    #[test]
    fn test_turn_alternation() {
        let mut game = GameState::default();
        game.apply_move(sq(3, 1), sq(2, 1)).unwrap();
        assert_eq!(game.side_to_move(), Color::Black);
        game.apply_move(sq(1, 2), sq(2, 2)).unwrap();
        assert_eq!(game.side_to_move(), Color::White);
        assert_eq!(game.history()[1].seq, 2);
    }

    #[test]
    fn test_rejected_move_is_atomic() {
        let mut game = GameState::default();
        game.apply_move(sq(3, 1), sq(2, 1)).unwrap();
        let before = game.clone();

        let err = game.apply_move(sq(4, 0), sq(2, 0)).unwrap_err();
        assert_eq!(err.outcome().reason, Some(ReasonCode::WrongTurn));
        assert_eq!(game, before);

        let err = game.apply_move(sq(1, 1), sq(3, 1)).unwrap_err();
        assert_eq!(err.outcome().reason, Some(ReasonCode::PathBlocked));
        assert_eq!(game, before);
    }

    #[test]
    fn test_capture_bookkeeping() {
        let board = board_from(&["k...", "..p.", ".P..", "....", "K..."]);
        let mut game = GameState::from_board(board, Color::White);
        let captured = game.apply_move(sq(2, 1), sq(1, 2)).unwrap();
        let black_pawn = Piece::new(Color::Black, PieceKind::Pawn);
        assert_eq!(captured, Some(black_pawn));
        assert_eq!(game.captured_by(Color::White), &[black_pawn]);
        assert!(game.captured_by(Color::Black).is_empty());
        assert_eq!(game.history()[0].captured, Some(black_pawn));
    }

    #[test]
    fn test_promotion_records_pawn() {
        for col in 0..4 {
            let board = board_from(&["....", "PPPP", "....", "k...", "...K"]);
            let mut game = GameState::from_board(board, Color::White);
            game.apply_move(sq(1, col), sq(0, col)).unwrap();
            assert_eq!(game.board().get(sq(0, col)), Some(Piece::new(Color::White, PieceKind::Queen)));
            assert_eq!(game.history()[0].piece.kind, PieceKind::Pawn);
        }
    }

    #[test]
    fn test_black_promotion() {
        let board = board_from(&["k...", "....", "....", "...p", "K..."]);
        let mut game = GameState::from_board(board, Color::Black);
        game.apply_move(sq(3, 3), sq(4, 3)).unwrap();
        assert_eq!(game.board().get(sq(4, 3)), Some(Piece::new(Color::Black, PieceKind::Queen)));
    }

    #[test]
    fn test_king_capture_wins() {
        let board = board_from(&["....", "....", "..K.", "....", "kR.."]);
        let mut game = GameState::from_board(board, Color::White);
        let captured = game.apply_move(sq(4, 1), sq(4, 0)).unwrap();
        assert_eq!(captured, Some(Piece::new(Color::Black, PieceKind::King)));
        assert_eq!(game.result(), GameResult::WhiteWins);
        assert!(game.legal_moves().is_empty());
    }

    #[test]
    fn test_no_moves_loses() {
        // White's king is walled in by its own pawns, none of which can move
        let board = board_from(&["KP..", "PP..", "....", "....", "...k"]);
        let mut game = GameState::from_board(board, Color::Black);
        assert_eq!(game.result(), GameResult::Ongoing);
        game.apply_move(sq(4, 3), sq(4, 2)).unwrap();
        assert_eq!(game.result(), GameResult::BlackWins);
        assert_eq!(compute_result(game.board(), Color::White), GameResult::BlackWins);
    }

    #[test]
    fn test_move_after_game_over() {
        let board = board_from(&["....", "....", "..K.", "....", "kR.."]);
        let mut game = GameState::from_board(board, Color::White);
        game.apply_move(sq(4, 1), sq(4, 0)).unwrap();
        let before = game.clone();
        let err = game.apply_move(sq(2, 2), sq(3, 2)).unwrap_err();
        assert_eq!(err.outcome().reason, Some(ReasonCode::GameOver));
        assert_eq!(game, before);
    }

    #[test]
    fn test_with_move_leaves_original() {
        let game = GameState::default();
        let (next, _) = game.with_move(sq(3, 2), sq(2, 2)).unwrap();
        assert_eq!(game.move_count(), 0);
        assert_eq!(next.move_count(), 1);
    }
}
