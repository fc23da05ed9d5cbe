//! Board geometry and the 5x4 piece grid

use crate::error::GridError;
use crate::pieces::{Color, Piece, PieceKind, EMPTY_SYMBOL};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of rows (ranks)
pub const ROWS: i8 = 5;
/// Number of columns (files)
pub const COLS: i8 = 4;

/// File letters, column 0 first
pub const FILES: [char; 4] = ['a', 'b', 'c', 'd'];

/// A board square. Row 0 is Black's back rank, row 4 is White's.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Square {
    pub row: i8,
    pub col: i8,
}

impl Square {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    /// Check if this square is on the board
    pub fn is_valid(&self) -> bool {
        (0..ROWS).contains(&self.row) && (0..COLS).contains(&self.col)
    }

    /// Square shifted by (drow, dcol); may be off the board
    pub fn offset(&self, drow: i8, dcol: i8) -> Square {
        Square::new(self.row + drow, self.col + dcol)
    }

    /// File letter + rank digit, rank 1 being White's home rank
    pub fn label(&self) -> String {
        if !self.is_valid() {
            return format!("({},{})", self.row, self.col);
        }
        format!("{}{}", FILES[self.col as usize], ROWS - self.row)
    }

    /// Parse a label such as `b3`
    pub fn from_label(label: &str) -> Option<Square> {
        let mut chars = label.trim().chars();
        let file = chars.next()?.to_ascii_lowercase();
        let rank = chars.next()?.to_digit(10)? as i8;
        if chars.next().is_some() {
            return None;
        }
        let col = FILES.iter().position(|&f| f == file)? as i8;
        let square = Square::new(ROWS - rank, col);
        square.is_valid().then_some(square)
    }

    /// All squares in row-major order
    pub fn all() -> impl Iterator<Item = Square> {
        (0..ROWS).flat_map(|row| (0..COLS).map(move |col| Square::new(row, col)))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// A (from, to) pair
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    pub const fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// The 5x4 grid (copy to branch)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [[Option<Piece>; COLS as usize]; ROWS as usize],
}

impl Board {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a board from a grid of piece symbols
    ///
    /// Rejects grids that are not 5x4, unknown symbols, and more than one
    /// King per color.
    pub fn from_rows<S: AsRef<str>>(rows: &[Vec<S>]) -> Result<Self, GridError> {
        if rows.len() != ROWS as usize {
            return Err(GridError::BadRowCount { rows: rows.len() });
        }

        let mut board = Board::empty();
        for (r, row) in rows.iter().enumerate() {
            if row.len() != COLS as usize {
                return Err(GridError::BadRowLength { row: r, len: row.len() });
            }
            for (c, cell) in row.iter().enumerate() {
                let piece = Piece::parse_cell(cell.as_ref()).map_err(|_| GridError::UnknownSymbol {
                    row: r,
                    col: c,
                    symbol: cell.as_ref().to_string(),
                })?;
                board.cells[r][c] = piece;
            }
        }

        for color in [Color::White, Color::Black] {
            if board.count(Piece::new(color, PieceKind::King)) > 1 {
                return Err(GridError::TooManyKings(color));
            }
        }

        Ok(board)
    }

    /// Grid of symbols, `.` for empty squares
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        self.cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Some(piece) => piece.symbol().to_string(),
                        None => EMPTY_SYMBOL.to_string(),
                    })
                    .collect()
            })
            .collect()
    }

    /// Piece at square (None if empty or off the board)
    pub fn get(&self, sq: Square) -> Option<Piece> {
        if !sq.is_valid() {
            return None;
        }
        self.cells[sq.row as usize][sq.col as usize]
    }

    /// Place or clear a square. Off-board squares are ignored.
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        if sq.is_valid() {
            self.cells[sq.row as usize][sq.col as usize] = piece;
        }
    }

    pub fn is_empty(&self, sq: Square) -> bool {
        self.get(sq).is_none()
    }

    /// Iterate occupied squares in row-major order
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.get(sq).map(|piece| (sq, piece)))
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|(_, piece)| piece.color == color && piece.is_king())
            .map(|(sq, _)| sq)
    }

    pub fn has_king(&self, color: Color) -> bool {
        self.king_square(color).is_some()
    }

    /// Number of squares holding exactly this piece
    pub fn count(&self, piece: Piece) -> usize {
        self.pieces().filter(|&(_, p)| p == piece).count()
    }

    /// Move a piece without legality checks
    ///
    /// Clears the source, replaces whatever stood on the destination and
    /// promotes a pawn reaching its far rank to a Queen. Returns the
    /// captured piece, if any.
    pub fn play(&mut self, from: Square, to: Square) -> Option<Piece> {
        let mut piece = self.get(from)?;
        let captured = self.get(to);

        if piece.kind == PieceKind::Pawn && to.row == piece.color.promotion_row() {
            piece.kind = PieceKind::Queen;
        }

        self.set(from, None);
        self.set(to, Some(piece));
        captured
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..ROWS {
            write!(f, "{} ", ROWS - row)?;
            for col in 0..COLS {
                match self.get(Square::new(row, col)) {
                    Some(piece) => write!(f, " {}", piece)?,
                    None => write!(f, " {}", EMPTY_SYMBOL)?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "  ")?;
        for file in FILES {
            write!(f, " {}", file)?;
        }
        writeln!(f)
    }
}
