//! Error types

use crate::pieces::Color;
use crate::validate::Outcome;

/// A piece grid that is not a well-formed 5x4 board
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("expected 5 rows, got {rows}")]
    BadRowCount { rows: usize },

    #[error("row {row} has {len} cells, expected 4")]
    BadRowLength { row: usize, len: usize },

    #[error("unknown piece symbol {symbol:?} at row {row}, col {col}")]
    UnknownSymbol { row: usize, col: usize, symbol: String },

    #[error("{0} has more than one king")]
    TooManyKings(Color),
}

/// A rejected move
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MoveError {
    #[error("move rejected: {}", .0.message)]
    Rejected(Outcome),
}

impl MoveError {
    pub fn outcome(&self) -> &Outcome {
        match self {
            MoveError::Rejected(outcome) => outcome,
        }
    }
}

/// Tampering or corruption detected while decoding a wire blob
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityError {
    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("unsupported wire version {0}")]
    UnsupportedVersion(u32),

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("unknown piece symbol {0:?}")]
    UnknownSymbol(String),

    #[error("{0} has more than one king")]
    TooManyKings(Color),

    #[error("invalid move record {index}: {reason}")]
    InvalidHistory { index: usize, reason: String },

    #[error("captured pieces do not match move history")]
    CapturedMismatch,

    #[error("piece count mismatch for {symbol:?}: table says {claimed}, board has {actual}")]
    PieceCountMismatch { symbol: String, claimed: u32, actual: u32 },

    #[error("checksum mismatch")]
    ChecksumMismatch,
}

impl From<GridError> for IntegrityError {
    fn from(err: GridError) -> Self {
        match err {
            GridError::BadRowCount { .. } | GridError::BadRowLength { .. } => {
                IntegrityError::DimensionMismatch(err.to_string())
            }
            GridError::UnknownSymbol { symbol, .. } => IntegrityError::UnknownSymbol(symbol),
            GridError::TooManyKings(color) => IntegrityError::TooManyKings(color),
        }
    }
}

/// Top-level engine error
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid layout: {0}")]
    InvalidLayout(#[from] GridError),

    #[error("invalid square label {0:?}")]
    InvalidSquare(String),

    #[error(transparent)]
    Move(#[from] MoveError),

    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    #[error("failed to encode state: {0}")]
    Encode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_error_maps_to_integrity() {
        let err: IntegrityError = GridError::BadRowCount { rows: 3 }.into();
        assert!(matches!(err, IntegrityError::DimensionMismatch(_)));

        let err: IntegrityError = GridError::UnknownSymbol {
            row: 0,
            col: 0,
            symbol: "X".to_string(),
        }
        .into();
        assert_eq!(err, IntegrityError::UnknownSymbol("X".to_string()));
    }

    #[test]
    fn test_messages() {
        let err = EngineError::InvalidLayout(GridError::TooManyKings(Color::White));
        assert_eq!(err.to_string(), "invalid layout: white has more than one king");
    }
}
