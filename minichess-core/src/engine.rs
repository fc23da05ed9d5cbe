//! Engine facade
//!
//! The small surface handed to callers: create a game, apply a move, list
//! legal moves by square label, ask the AI for a move, and move states in and
//! out of their wire form. Every call is synchronous and touches only the
//! state it is given.

use crate::board::{Move, Square};
use crate::error::{EngineError, MoveError};
use crate::eval::Heuristics;
use crate::game::GameState;
use crate::layout::Layout;
use crate::pieces::Piece;
use crate::search::{search, SearchConfig, SearchResult};
use crate::wire;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, BTreeSet};

/// Start a game from `layout`, or the default setup when `None`
pub fn new_game(layout: Option<&Layout>) -> Result<GameState, EngineError> {
    match layout {
        Some(layout) => Ok(GameState::from_layout(layout)?),
        None => Ok(GameState::from_layout(&Layout::default())?),
    }
}

/// Apply a move to a copy of `state`
///
/// The input state is never touched; on rejection the caller still holds it
/// unchanged.
pub fn apply_move(
    state: &GameState,
    from: Square,
    to: Square,
) -> Result<(GameState, Option<Piece>), MoveError> {
    state.with_move(from, to)
}

/// Legal destinations keyed by source label, e.g. `"a2" -> {"a3"}`
///
/// Squares with no legal destination are omitted. Empty once the game is over.
pub fn legal_moves(state: &GameState) -> BTreeMap<String, BTreeSet<String>> {
    let mut map: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for mv in state.legal_moves() {
        map.entry(mv.from.label()).or_default().insert(mv.to.label());
    }
    map
}

/// Pick a move for the side to move at the given difficulty (clamped to 1..=4)
pub fn choose_move(state: &GameState, difficulty: i32) -> Option<SearchResult> {
    let mut rng = ChaCha8Rng::from_entropy();
    choose_move_with_rng(state, difficulty, &mut rng)
}

/// As `choose_move`, with the tie-breaking randomness supplied by the caller
pub fn choose_move_with_rng<R: Rng + ?Sized>(
    state: &GameState,
    difficulty: i32,
    rng: &mut R,
) -> Option<SearchResult> {
    let config = SearchConfig::for_difficulty(difficulty);
    search(state, &config, &Heuristics::default(), rng)
}

pub fn serialize(state: &GameState) -> Result<String, EngineError> {
    Ok(wire::to_wire(state)?)
}

pub fn deserialize(blob: &str) -> Result<GameState, EngineError> {
    Ok(wire::from_wire(blob)?)
}

/// Parse a square label such as `"b3"`
pub fn parse_square(label: &str) -> Result<Square, EngineError> {
    Square::from_label(label.trim()).ok_or_else(|| EngineError::InvalidSquare(label.to_string()))
}

/// Parse a move written as `"a2 a3"`, `"a2-a3"` or `"a2a3"`
pub fn parse_move(text: &str) -> Result<Move, EngineError> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    if cleaned.len() != 4 || !cleaned.is_ascii() {
        return Err(EngineError::InvalidSquare(text.to_string()));
    }

    let (from, to) = cleaned.split_at(2);
    Ok(Move::new(parse_square(from)?, parse_square(to)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GridError;
    use crate::pieces::Color;
    use crate::validate::ReasonCode;

    #[test]
    fn test_new_game() {
        let game = new_game(None).unwrap();
        assert_eq!(game.side_to_move(), Color::White);
        assert_eq!(game.move_count(), 0);

        let custom = new_game(Some(&Layout::kings_only())).unwrap();
        assert_eq!(custom.board().pieces().count(), 2);
    }

    #[test]
    fn test_new_game_invalid_layout() {
        let bad = Layout::from_strings("bad", &["rqkr", "pppp", "...."]);
        assert!(matches!(
            new_game(Some(&bad)),
            Err(EngineError::InvalidLayout(GridError::BadRowCount { rows: 3 }))
        ));
    }

    #[test]
    fn test_apply_move_leaves_input() {
        let game = new_game(None).unwrap();
        let (next, captured) = apply_move(&game, Square::new(3, 0), Square::new(2, 0)).unwrap();
        assert_eq!(captured, None);
        assert_eq!(next.move_count(), 1);
        assert_eq!(game.move_count(), 0);

        let err = apply_move(&game, Square::new(1, 0), Square::new(2, 0)).unwrap_err();
        assert_eq!(err.outcome().reason, Some(ReasonCode::WrongTurn));
    }

    #[test]
    fn test_legal_moves_labels() {
        let game = new_game(None).unwrap();
        let map = legal_moves(&game);
        assert_eq!(map.len(), 4);
        for file in ["a", "b", "c", "d"] {
            let dests = &map[&format!("{}2", file)];
            assert_eq!(dests.len(), 1);
            assert!(dests.contains(&format!("{}3", file)));
        }
    }

    #[test]
    fn test_choose_move_clamps_difficulty() {
        let game = new_game(None).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for difficulty in [-5, 0, 1, 9] {
            let result = choose_move_with_rng(&game, difficulty, &mut rng).unwrap();
            assert!(game.validate(result.mv.from, result.mv.to).accepted);
        }
    }

    #[test]
    fn test_serialize_round_trip() {
        let game = new_game(None).unwrap();
        let (game, _) = apply_move(&game, Square::new(3, 2), Square::new(2, 2)).unwrap();
        let blob = serialize(&game).unwrap();
        assert_eq!(deserialize(&blob).unwrap(), game);
        assert!(matches!(deserialize("[]"), Err(EngineError::Integrity(_))));
    }

    #[test]
    fn test_parse_move() {
        let expected = Move::new(Square::new(3, 0), Square::new(2, 0));
        assert_eq!(parse_move("a2 a3").unwrap(), expected);
        assert_eq!(parse_move("a2-a3").unwrap(), expected);
        assert_eq!(parse_move("a2a3").unwrap(), expected);
        assert!(matches!(parse_move("a2 e9"), Err(EngineError::InvalidSquare(_))));
        assert!(matches!(parse_move("a2"), Err(EngineError::InvalidSquare(_))));
    }
}
