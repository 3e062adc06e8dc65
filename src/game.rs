use log::{debug, info};

use crate::board::{Board, Color, Square};
use crate::error::{FenError, MoveError};
use crate::movegen;
use crate::moves::Move;
use crate::rules::{self, GameState};

/// Played moves plus a browsing cursor. The cursor counts how many moves
/// from the start are "in view"; it does not change the game itself.
#[derive(Debug, Clone, Default)]
pub struct MoveHistory {
    moves: Vec<Move>,
    current: usize,
}

impl MoveHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends after the cursor. Moves beyond the cursor are discarded first.
    pub fn add(&mut self, mv: Move) {
        self.remove_after_current();
        self.moves.push(mv);
        self.current = self.moves.len();
    }

    /// Steps the cursor back over one move and returns it.
    pub fn previous_move(&mut self) -> Option<&Move> {
        if self.current == 0 {
            return None;
        }
        self.current -= 1;
        self.moves.get(self.current)
    }

    /// Steps the cursor forward over one move and returns it.
    pub fn next_move(&mut self) -> Option<&Move> {
        let mv = self.moves.get(self.current)?;
        self.current += 1;
        Some(mv)
    }

    pub fn go_to_start(&mut self) {
        self.current = 0;
    }

    pub fn go_to_end(&mut self) {
        self.current = self.moves.len();
    }

    /// Returns false and leaves the cursor alone when `index` is past the end.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index > self.moves.len() {
            return false;
        }
        self.current = index;
        true
    }

    pub fn last(&self) -> Option<&Move> {
        self.moves.last()
    }

    pub fn remove_last(&mut self) -> Option<Move> {
        let mv = self.moves.pop()?;
        self.current = self.current.min(self.moves.len());
        Some(mv)
    }

    pub fn remove_after_current(&mut self) {
        self.moves.truncate(self.current);
    }

    pub fn clear(&mut self) {
        self.moves.clear();
        self.current = 0;
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.moves.iter()
    }
}

impl<'a> IntoIterator for &'a MoveHistory {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, Copy)]
struct Snapshot {
    board: Board,
    side_to_move: Color,
    last_move: Option<Move>,
    move_count: u32,
    state: GameState,
}

/// Turn controller: owns the board and decides whose move it is.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    side_to_move: Color,
    last_move: Option<Move>,
    move_count: u32,
    history: MoveHistory,
    undo_stack: Vec<Snapshot>,
    state: GameState,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    pub fn new() -> Self {
        Self::from_board(Board::new(), Color::White)
    }

    /// Placement, side to move and castling fields are read; the rest is ignored.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let board = Board::from_fen(fen)?;
        let side_to_move = match fen.split_whitespace().nth(1) {
            None | Some("w") => Color::White,
            Some("b") => Color::Black,
            Some(other) => return Err(FenError::SideToMove(other.to_string())),
        };
        Ok(Self::from_board(board, side_to_move))
    }

    pub fn from_board(board: Board, side_to_move: Color) -> Self {
        Self {
            state: rules::game_state(&board, side_to_move, None),
            board,
            side_to_move,
            last_move: None,
            move_count: 0,
            history: MoveHistory::new(),
            undo_stack: Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Plays the legal move of the piece on `from` that lands on `to`.
    pub fn make_move(&mut self, from: Square, to: Square) -> Result<Move, MoveError> {
        if self.state.is_over() {
            return Err(MoveError::GameOver);
        }
        for sq in [from, to] {
            if !sq.is_valid() {
                return Err(MoveError::OffBoard(sq));
            }
        }
        let piece = self.board.get(from).ok_or(MoveError::EmptySquare(from))?;
        if piece.color != self.side_to_move {
            return Err(MoveError::WrongSide {
                expected: self.side_to_move,
            });
        }

        let mv = self
            .valid_moves_from(from)
            .into_iter()
            .find(|mv| mv.to == to)
            .ok_or(MoveError::Illegal { from, to })?;
        self.apply(mv);
        Ok(mv)
    }

    fn apply(&mut self, mv: Move) {
        self.undo_stack.push(Snapshot {
            board: self.board,
            side_to_move: self.side_to_move,
            last_move: self.last_move,
            move_count: self.move_count,
            state: self.state,
        });

        let mover = self.side_to_move;
        self.board.execute_move(&mv);
        self.history.go_to_end();
        self.history.add(mv);
        self.last_move = Some(mv);
        self.move_count += 1;
        self.side_to_move = mover.opposite();
        self.state = rules::game_state(&self.board, self.side_to_move, self.last_move.as_ref());

        info!("{} played {}", mover, mv.to_algebraic());
        match self.state {
            GameState::Checkmate(winner) => info!("checkmate, {} wins", winner),
            GameState::Stalemate => info!("stalemate"),
            GameState::InsufficientMaterial => info!("draw by insufficient material"),
            GameState::Check(color) => debug!("{} is in check", color),
            GameState::Ongoing => {}
        }
    }

    /// Takes back the most recent move, returning it.
    pub fn undo(&mut self) -> Option<Move> {
        let snapshot = self.undo_stack.pop()?;
        self.board = snapshot.board;
        self.side_to_move = snapshot.side_to_move;
        self.last_move = snapshot.last_move;
        self.move_count = snapshot.move_count;
        self.state = snapshot.state;

        let mv = self.history.remove_last();
        if let Some(mv) = &mv {
            debug!("took back {}", mv.to_algebraic());
        }
        mv
    }

    pub fn valid_moves_from(&self, from: Square) -> Vec<Move> {
        match self.board.get(from) {
            Some(piece) if piece.color == self.side_to_move => {
                movegen::valid_moves_for_piece(&self.board, from, self.last_move.as_ref())
            }
            _ => Vec::new(),
        }
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        movegen::all_valid_moves(&self.board, self.side_to_move, self.last_move.as_ref())
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.last_move.as_ref()
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    /// Moves the history cursor back one move. The position is unchanged.
    pub fn step_back(&mut self) -> Option<Move> {
        self.history.previous_move().copied()
    }

    pub fn step_forward(&mut self) -> Option<Move> {
        self.history.next_move().copied()
    }

    pub fn view_move(&mut self, index: usize) -> bool {
        self.history.go_to(index)
    }

    pub fn view_latest(&mut self) {
        self.history.go_to_end();
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }
}
