//! Layout - starting position definition

use crate::board::Board;
use crate::error::GridError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Starting position as a named 5x4 grid of piece symbols
///
/// Row 0 is Black's back rank. White pieces are uppercase, Black lowercase,
/// `.` marks an empty square.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl Layout {
    pub fn new(name: &str, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.to_string(),
            rows,
        }
    }

    /// Build from rows written as strings, one char per square (`"rqkr"`)
    pub fn from_strings(name: &str, rows: &[&str]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.chars().map(|c| c.to_string()).collect())
            .collect();
        Self::new(name, rows)
    }

    /// Snapshot an existing board
    pub fn from_board(name: &str, board: &Board) -> Self {
        Self::new(name, board.to_rows())
    }

    /// Convert to a board, rejecting malformed grids
    pub fn to_board(&self) -> Result<Board, GridError> {
        Board::from_rows(&self.rows)
    }

    /// Load from JSON file
    ///
    /// Accepts either a full `{"name", "rows"}` object or a bare array of rows.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;

        if let Ok(layout) = serde_json::from_str::<Layout>(&content) {
            layout.to_board()?;
            return Ok(layout);
        }

        let rows: Vec<Vec<String>> = serde_json::from_str(&content)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("custom");
        let layout = Self::new(name, rows);
        layout.to_board()?;
        Ok(layout)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Lone kings facing each other on the c-file
    pub fn kings_only() -> Self {
        Self::from_strings("kings-only", &["..k.", "....", "....", "....", "..K."])
    }
}

impl Default for Layout {
    /// 4x5 Silverman setup
    fn default() -> Self {
        Self::from_strings("silverman", &["rqkr", "pppp", "....", "PPPP", "RQKR"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Square;
    use crate::pieces::{Color, Piece, PieceKind};

    #[test]
    fn test_default_layout() {
        let board = Layout::default().to_board().unwrap();
        assert_eq!(board.king_square(Color::White), Some(Square::new(4, 2)));
        assert_eq!(board.king_square(Color::Black), Some(Square::new(0, 2)));
        assert_eq!(board.count(Piece::new(Color::White, PieceKind::Pawn)), 4);
        assert_eq!(board.count(Piece::new(Color::Black, PieceKind::Rook)), 2);
        assert_eq!(board.pieces().count(), 16);
    }

    #[test]
    fn test_board_snapshot() {
        let layout = Layout::default();
        let board = layout.to_board().unwrap();
        assert_eq!(Layout::from_board("silverman", &board), layout);
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("minichess-layout-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let path = dir.join("kings.json");
        Layout::kings_only().save(&path).unwrap();
        assert_eq!(Layout::load(&path).unwrap(), Layout::kings_only());

        let bare = dir.join("bare.json");
        std::fs::write(&bare, r#"[["k",".",".","."],[".",".",".","."],[".",".",".","."],[".",".",".","."],["K",".",".","."]]"#).unwrap();
        let loaded = Layout::load(&bare).unwrap();
        assert_eq!(loaded.name, "bare");

        let broken = dir.join("broken.json");
        std::fs::write(&broken, r#"[["k","x"]]"#).unwrap();
        assert!(Layout::load(&broken).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }
}
