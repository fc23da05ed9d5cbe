//! Integration tests for the minichess engine
//!
//! Tests the full stack through the public API: rules, state machine,
//! search and the wire form.

use minichess_core::{
    board::{Board, Square},
    engine,
    game::{GameResult, GameState},
    movegen,
    pieces::{Color, Piece, PieceKind},
    validate::{validate, ReasonCode},
    wire::{from_wire, to_wire, WireState},
    IntegrityError, Layout,
};
use pretty_assertions::assert_eq;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::time::{Duration, Instant};

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn sq(row: i8, col: i8) -> Square {
    Square::new(row, col)
}

fn piece(color: Color, kind: PieceKind) -> Piece {
    Piece::new(color, kind)
}

/// Play random legal moves from the default start
fn random_game(rng: &mut ChaCha8Rng, max_plies: usize) -> GameState {
    let mut state = GameState::default();
    for _ in 0..max_plies {
        let Some(mv) = state.legal_moves().choose(rng).copied() else {
            break;
        };
        state.apply_move(mv.from, mv.to).unwrap();
    }
    state
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn test_scenario_opening_push() {
    let state = engine::new_game(None).unwrap();
    let (next, captured) = engine::apply_move(&state, sq(3, 0), sq(2, 0)).unwrap();

    assert_eq!(captured, None);
    assert_eq!(next.board().get(sq(2, 0)), Some(piece(Color::White, PieceKind::Pawn)));
    assert_eq!(next.board().get(sq(3, 0)), None);
    assert_eq!(next.side_to_move(), Color::Black);
    assert_eq!(next.history().len(), 1);
}

#[test]
fn test_scenario_lone_kings() {
    let mut board = Board::empty();
    board.set(sq(4, 2), Some(piece(Color::White, PieceKind::King)));
    board.set(sq(0, 2), Some(piece(Color::Black, PieceKind::King)));
    let state = GameState::from_board(board, Color::Black);

    let moves = engine::legal_moves(&state);
    assert_eq!(moves.len(), 1);
    assert_eq!(moves["c5"].len(), 5);
    assert_eq!(state.result(), GameResult::Ongoing);
}

#[test]
fn test_scenario_rook_takes_king() {
    let mut board = Board::empty();
    board.set(sq(4, 1), Some(piece(Color::White, PieceKind::Rook)));
    board.set(sq(4, 0), Some(piece(Color::Black, PieceKind::King)));
    let mut state = GameState::from_board(board, Color::White);

    let captured = state.apply_move(sq(4, 1), sq(4, 0)).unwrap();
    assert_eq!(captured, Some(piece(Color::Black, PieceKind::King)));
    assert_eq!(state.result(), GameResult::WhiteWins);
    assert_eq!(state.captured_by(Color::White), &[piece(Color::Black, PieceKind::King)]);
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[test]
fn test_validator_generator_equivalence() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);

    for _ in 0..200 {
        let plies = rng.gen_range(0..20);
        let state = random_game(&mut rng, plies);
        let board = state.board();
        for side in [Color::White, Color::Black] {
            for from in Square::all() {
                let generated = movegen::legal_destinations(board, side, from);
                let validated: Vec<Square> = Square::all()
                    .filter(|&to| validate(board, side, from, to).accepted)
                    .collect();
                assert_eq!(generated.len(), validated.len(), "from {} for {}", from, side);
                assert!(validated.iter().all(|to| generated.contains(to)));
            }
        }
    }
}

#[test]
fn test_round_trip_reachable_states() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);

    for plies in 0..40 {
        let state = random_game(&mut rng, plies);
        let blob = engine::serialize(&state).unwrap();
        let decoded = engine::deserialize(&blob).unwrap();
        assert_eq!(decoded, state);
    }
}

#[test]
fn test_tamper_every_cell() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let state = random_game(&mut rng, 8);
    let wire = WireState::from_state(&state);

    for row in 0..5 {
        for col in 0..4 {
            let mut tampered = wire.clone();
            let cell = &mut tampered.board[row][col];
            *cell = if cell.as_str() == "." { "N".to_string() } else { ".".to_string() };
            let err = tampered.into_state().unwrap_err();
            assert!(
                matches!(err, IntegrityError::PieceCountMismatch { .. }),
                "cell ({}, {}) gave {:?}",
                row,
                col,
                err
            );
        }
    }
}

#[test]
fn test_tamper_every_count() {
    let state = random_game(&mut ChaCha8Rng::seed_from_u64(6), 5);
    let wire = WireState::from_state(&state);

    for symbol in wire.piece_counts.keys() {
        let mut tampered = wire.clone();
        *tampered.piece_counts.get_mut(symbol).unwrap() += 1;
        assert!(matches!(
            tampered.into_state(),
            Err(IntegrityError::PieceCountMismatch { .. })
        ));
    }
}

#[test]
fn test_tampered_blob_text() {
    let state = engine::new_game(None).unwrap();
    let blob = to_wire(&state).unwrap();
    let tampered = blob.replacen("\"turn\":\"white\"", "\"turn\":\"black\"", 1);
    assert_ne!(tampered, blob);
    assert_eq!(from_wire(&tampered), Err(IntegrityError::ChecksumMismatch));
}

#[test]
fn test_turn_alternation() {
    let mut state = GameState::default();
    state.apply_move(sq(3, 1), sq(2, 1)).unwrap();
    assert_eq!(state.side_to_move(), Color::Black);
    state.apply_move(sq(1, 1), sq(2, 2)).unwrap_err();
    state.apply_move(sq(1, 2), sq(2, 2)).unwrap();
    assert_eq!(state.side_to_move(), Color::White);
}

#[test]
fn test_rejected_move_is_atomic() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut state = random_game(&mut rng, 6);
    let before = state.clone();

    for (from, to) in [
        (sq(0, 0), sq(0, 0)),
        (sq(-1, 0), sq(0, 0)),
        (sq(2, 3), sq(5, 3)),
    ] {
        let err = state.apply_move(from, to).unwrap_err();
        assert!(err.outcome().reason.is_some());
        assert_eq!(state, before);
    }
}

#[test]
fn test_reason_codes() {
    let state = GameState::default();
    let reason = |from, to| state.validate(from, to).reason;

    assert_eq!(reason(sq(5, 0), sq(4, 0)), Some(ReasonCode::InvalidCoordinates));
    assert_eq!(reason(sq(4, 0), sq(4, 0)), Some(ReasonCode::SameSquare));
    assert_eq!(reason(sq(2, 0), sq(1, 0)), Some(ReasonCode::NoPieceAtSource));
    assert_eq!(reason(sq(1, 0), sq(2, 0)), Some(ReasonCode::WrongTurn));
    assert_eq!(reason(sq(4, 0), sq(3, 0)), Some(ReasonCode::CaptureOwnPiece));
    assert_eq!(reason(sq(4, 0), sq(2, 0)), Some(ReasonCode::PathBlocked));
    assert_eq!(reason(sq(3, 0), sq(1, 0)), Some(ReasonCode::InvalidPawnMove));
    assert_eq!(reason(sq(4, 2), sq(2, 2)), Some(ReasonCode::InvalidKingMove));
}

#[test]
fn test_promotion_every_file() {
    for col in 0..4 {
        let mut board = Board::empty();
        board.set(sq(1, col), Some(piece(Color::White, PieceKind::Pawn)));
        board.set(sq(4, 0), Some(piece(Color::White, PieceKind::King)));
        board.set(sq(4, 3), Some(piece(Color::Black, PieceKind::King)));
        let mut state = GameState::from_board(board, Color::White);

        state.apply_move(sq(1, col), sq(0, col)).unwrap();
        assert_eq!(state.board().get(sq(0, col)), Some(piece(Color::White, PieceKind::Queen)));
        assert_eq!(state.history()[0].piece, piece(Color::White, PieceKind::Pawn));
    }
}

// ============================================================================
// SEARCH
// ============================================================================

#[test]
fn test_search_time_bound() {
    let mut rng = ChaCha8Rng::seed_from_u64(17);
    let state = random_game(&mut rng, 4);

    for difficulty in 1..=4 {
        let start = Instant::now();
        let result = engine::choose_move_with_rng(&state, difficulty, &mut rng).unwrap();
        assert!(start.elapsed() < Duration::from_millis(3500), "difficulty {}", difficulty);
        assert!(state.validate(result.mv.from, result.mv.to).accepted);
    }
}

#[test]
fn test_search_takes_free_king() {
    let layout = Layout::from_strings("test", &["k...", "....", "....", "....", "R..K"]);
    let state = engine::new_game(Some(&layout)).unwrap();
    let result = engine::choose_move(&state, 1).unwrap();
    assert_eq!((result.mv.from, result.mv.to), (sq(4, 0), sq(0, 0)));
}

#[test]
fn test_no_move_after_game_over() {
    let layout = Layout::from_strings("test", &["k...", "....", "....", "....", "R..K"]);
    let state = engine::new_game(Some(&layout)).unwrap();
    let (state, _) = engine::apply_move(&state, sq(4, 0), sq(0, 0)).unwrap();

    assert_eq!(state.result(), GameResult::WhiteWins);
    assert!(engine::legal_moves(&state).is_empty());
    assert!(engine::choose_move(&state, 2).is_none());

    let err = engine::apply_move(&state, sq(4, 3), sq(3, 3)).unwrap_err();
    assert_eq!(err.outcome().reason, Some(ReasonCode::GameOver));
}

#[test]
fn test_selfplay_finishes_or_caps() {
    let mut ai = minichess_core::AlphaBetaAI::with_seed(
        minichess_core::SearchConfig::for_difficulty(1),
        8,
    );
    let end = ai.play_game(GameState::default(), 30);
    assert!(end.is_over() || end.move_count() == 30);

    // Every recorded move replays cleanly from the start
    let mut replay = GameState::default();
    for record in end.history() {
        replay.apply_move(record.from, record.to).unwrap();
    }
    assert_eq!(replay, end);
}
