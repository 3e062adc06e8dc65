use thiserror::Error;

use crate::board::{Color, Square};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseSquareError {
    #[error("expected two characters like \"e2\", got {0:?}")]
    Length(String),
    #[error("invalid file {0:?}")]
    File(char),
    #[error("invalid rank {0:?}")]
    Rank(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("missing piece placement field")]
    Empty,
    #[error("expected 8 ranks, found {0}")]
    RankCount(usize),
    #[error("rank {rank} does not describe exactly 8 squares")]
    RankWidth { rank: usize },
    #[error("invalid piece character {0:?}")]
    Piece(char),
    #[error("invalid side to move {0:?}")]
    SideToMove(String),
    #[error("{color} has {count} pieces, at most 16 are allowed")]
    TooManyPieces { color: Color, count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown difficulty {0:?}, expected easy, medium or hard")]
pub struct ParseDifficultyError(pub String);

/// Reasons the turn controller refuses a move.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("the game is over")]
    GameOver,
    #[error("square {0} is off the board")]
    OffBoard(Square),
    #[error("no piece on {0}")]
    EmptySquare(Square),
    #[error("it is {expected}'s turn")]
    WrongSide { expected: Color },
    #[error("{from}{to} is not a legal move")]
    Illegal { from: Square, to: Square },
}

/// Failures while saving or restoring a game session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file i/o failed")]
    Io(#[from] std::io::Error),
    #[error("session file is not valid JSON")]
    Json(#[from] serde_json::Error),
    #[error("move {index} {text:?} is not in coordinate form like e2e4")]
    Notation { index: usize, text: String },
    #[error("move {index} {text:?} cannot be replayed")]
    Replay {
        index: usize,
        text: String,
        #[source]
        source: MoveError,
    },
    #[error("replayed game has {actual} to move, session says {expected}")]
    SideToMove { expected: Color, actual: Color },
}
