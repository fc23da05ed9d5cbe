//! Piece type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Side color
///
/// White starts on row 4 and advances toward row 0; Black starts on row 0
/// and advances toward row 4.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Row delta of one forward step
    pub fn forward(self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// Row from which pawns may advance two squares
    pub fn pawn_home_row(self) -> i8 {
        match self {
            Color::White => 3,
            Color::Black => 1,
        }
    }

    /// Row on which pawns promote
    pub fn promotion_row(self) -> i8 {
        match self {
            Color::White => 0,
            Color::Black => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Piece kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

pub const ALL_KINDS: [PieceKind; 6] = [
    PieceKind::Pawn,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Rook,
    PieceKind::Queen,
    PieceKind::King,
];

/// Movement type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveType {
    Pawn,   // Forward push, double push from home row, diagonal capture
    Step,   // One square along any offset, no interior
    Jump,   // Fixed leap, ignores blocking
    Slide,  // Any distance along a ray, blocked by pieces
}

/// Direction vectors (drow, dcol)
pub const ORTHOGONAL: &[(i8, i8)] = &[(-1, 0), (1, 0), (0, -1), (0, 1)];
pub const DIAGONAL: &[(i8, i8)] = &[(-1, -1), (-1, 1), (1, -1), (1, 1)];
pub const ROYAL: &[(i8, i8)] = &[
    (-1, 0), (1, 0), (0, -1), (0, 1),
    (-1, -1), (-1, 1), (1, -1), (1, 1),
];
pub const KNIGHT_JUMPS: &[(i8, i8)] = &[
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

/// Piece type definition
#[derive(Clone, Debug)]
pub struct PieceType {
    pub kind: PieceKind,
    pub name: &'static str,
    pub symbol: char,
    pub move_type: MoveType,
    pub directions: &'static [(i8, i8)],
}

impl PieceType {
    const fn new(
        kind: PieceKind,
        name: &'static str,
        symbol: char,
        move_type: MoveType,
        directions: &'static [(i8, i8)],
    ) -> Self {
        Self {
            kind,
            name,
            symbol,
            move_type,
            directions,
        }
    }
}

/// All piece types, indexed by `PieceKind as usize`
pub static PIECE_TYPES: [PieceType; 6] = [
    PieceType::new(PieceKind::Pawn, "Pawn", 'P', MoveType::Pawn, &[]),
    PieceType::new(PieceKind::Knight, "Knight", 'N', MoveType::Jump, KNIGHT_JUMPS),
    PieceType::new(PieceKind::Bishop, "Bishop", 'B', MoveType::Slide, DIAGONAL),
    PieceType::new(PieceKind::Rook, "Rook", 'R', MoveType::Slide, ORTHOGONAL),
    PieceType::new(PieceKind::Queen, "Queen", 'Q', MoveType::Slide, ROYAL),
    PieceType::new(PieceKind::King, "King", 'K', MoveType::Step, ROYAL),
];

impl PieceKind {
    pub fn piece_type(self) -> &'static PieceType {
        &PIECE_TYPES[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.piece_type().name
    }

    /// Look up a kind by its uppercase symbol
    pub fn from_symbol(symbol: char) -> Option<Self> {
        let upper = symbol.to_ascii_uppercase();
        PIECE_TYPES.iter().find(|pt| pt.symbol == upper).map(|pt| pt.kind)
    }
}

/// Symbol used for an empty square in layouts and on the wire
pub const EMPTY_SYMBOL: &str = ".";

/// A piece on the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    pub fn is_king(&self) -> bool {
        self.kind == PieceKind::King
    }

    /// Uppercase for White, lowercase for Black
    pub fn symbol(&self) -> char {
        let symbol = self.kind.piece_type().symbol;
        match self.color {
            Color::White => symbol,
            Color::Black => symbol.to_ascii_lowercase(),
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        let kind = PieceKind::from_symbol(symbol)?;
        let color = if symbol.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Self { color, kind })
    }

    /// Parse one grid cell. `Ok(None)` is an empty square, `Err(())` an unknown symbol.
    pub fn parse_cell(cell: &str) -> Result<Option<Self>, ()> {
        let cell = cell.trim();
        if cell.is_empty() || cell == EMPTY_SYMBOL {
            return Ok(None);
        }
        let mut chars = cell.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Piece::from_symbol(c).map(Some).ok_or(()),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
