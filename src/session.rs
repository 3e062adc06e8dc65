use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::board::{Color, Square};
use crate::error::SessionError;
use crate::game::Game;
use crate::search::Difficulty;

/// Default file name used by the console when `save` / `load` get no path.
pub const DEFAULT_SESSION_FILE: &str = "chess_session.json";

/// A saved game: the moves from the standard start position in long
/// coordinate form, plus the engine setting. Restoring replays the moves
/// through `Game::make_move`, so a tampered file cannot produce an illegal
/// position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub moves: Vec<String>,
    pub side_to_move: Color,
    pub engine: Option<Difficulty>,
}

impl Session {
    pub fn capture(game: &Game, engine: Option<Difficulty>) -> Self {
        Session {
            moves: game.history().iter().map(|mv| mv.to_string()).collect(),
            side_to_move: game.side_to_move(),
            engine,
        }
    }

    pub fn replay(&self) -> Result<Game, SessionError> {
        let mut game = Game::new();
        for (index, text) in self.moves.iter().enumerate() {
            let (from, to) = parse_coordinates(text).ok_or_else(|| SessionError::Notation {
                index,
                text: text.clone(),
            })?;
            game.make_move(from, to).map_err(|source| SessionError::Replay {
                index,
                text: text.clone(),
                source,
            })?;
        }
        if game.side_to_move() != self.side_to_move {
            return Err(SessionError::SideToMove {
                expected: self.side_to_move,
                actual: game.side_to_move(),
            });
        }
        Ok(game)
    }

    pub fn to_json(&self) -> Result<String, SessionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, SessionError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        info!("saved {} moves to {}", self.moves.len(), path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref();
        let session = Self::from_json(&fs::read_to_string(path)?)?;
        info!("loaded {} moves from {}", session.moves.len(), path.display());
        Ok(session)
    }
}

/// `e2e4` or `e7e8q`. The promotion letter is accepted and ignored since
/// pawns always promote to a queen.
fn parse_coordinates(text: &str) -> Option<(Square, Square)> {
    if !matches!(text.len(), 4 | 5) {
        return None;
    }
    let from = text.get(0..2)?.parse().ok()?;
    let to = text.get(2..4)?.parse().ok()?;
    match text.get(4..) {
        Some("") | Some("q") => Some((from, to)),
        _ => None,
    }
}
