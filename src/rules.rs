//! Legality predicates, attack detection and game-end classification.
//!
//! Everything here is a pure function of a board plus the previous move.
//! Illegal input is a `false` return, never a panic.

use crate::board::{Board, Color, PieceKind, Square};
use crate::movegen;
use crate::moves::Move;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Ongoing,
    Check(Color),
    /// The winning color.
    Checkmate(Color),
    Stalemate,
    InsufficientMaterial,
}

impl GameState {
    pub fn is_over(&self) -> bool {
        matches!(
            self,
            GameState::Checkmate(_) | GameState::Stalemate | GameState::InsufficientMaterial
        )
    }
}

fn deltas(from: Square, to: Square) -> (i8, i8) {
    (to.row - from.row, to.col - from.col)
}

/// Destination is empty or holds an opponent of the piece on `from`.
fn can_land_on(board: &Board, from: Square, to: Square) -> bool {
    match (board.get(from), board.get(to)) {
        (_, None) => true,
        (Some(mover), Some(target)) => mover.color != target.color,
        (None, Some(_)) => false,
    }
}

/// Geometry check for a single `from -> to` relocation, ignoring whether it
/// would leave the mover's king attacked.
pub fn is_basic_move_legal(board: &Board, from: Square, to: Square, last_move: Option<&Move>) -> bool {
    if !from.is_valid() || !to.is_valid() || from == to {
        return false;
    }
    let Some(piece) = board.get(from) else {
        return false;
    };

    match piece.kind {
        PieceKind::Pawn => is_valid_pawn_move(board, from, to, piece.color, last_move),
        PieceKind::Knight => is_valid_knight_move(board, from, to),
        PieceKind::Bishop => is_valid_bishop_move(board, from, to),
        PieceKind::Rook => is_valid_rook_move(board, from, to),
        PieceKind::Queen => is_valid_queen_move(board, from, to),
        PieceKind::King => is_valid_king_move(board, from, to),
    }
}

pub fn is_valid_pawn_move(
    board: &Board,
    from: Square,
    to: Square,
    color: Color,
    last_move: Option<&Move>,
) -> bool {
    let direction = color.forward();
    let (d_row, d_col) = deltas(from, to);

    if d_col == 0 && d_row == direction {
        return board.is_square_empty(to);
    }
    if d_col == 0 && d_row == 2 * direction && from.row == color.pawn_start_row() {
        return board.is_square_empty(from.offset(direction, 0)) && board.is_square_empty(to);
    }
    if d_col.abs() == 1 && d_row == direction {
        if board.is_occupied_by(to, color.opposite()) {
            return true;
        }
        return can_en_passant(board, from, to, last_move);
    }
    false
}

pub fn is_valid_knight_move(board: &Board, from: Square, to: Square) -> bool {
    let (d_row, d_col) = deltas(from, to);
    let l_shape = matches!((d_row.abs(), d_col.abs()), (2, 1) | (1, 2));
    l_shape && can_land_on(board, from, to)
}

pub fn is_valid_bishop_move(board: &Board, from: Square, to: Square) -> bool {
    let (d_row, d_col) = deltas(from, to);
    d_row.abs() == d_col.abs() && is_path_clear(board, from, to) && can_land_on(board, from, to)
}

pub fn is_valid_rook_move(board: &Board, from: Square, to: Square) -> bool {
    (from.row == to.row || from.col == to.col)
        && is_path_clear(board, from, to)
        && can_land_on(board, from, to)
}

pub fn is_valid_queen_move(board: &Board, from: Square, to: Square) -> bool {
    is_valid_rook_move(board, from, to) || is_valid_bishop_move(board, from, to)
}

pub fn is_valid_king_move(board: &Board, from: Square, to: Square) -> bool {
    let (d_row, d_col) = deltas(from, to);

    if d_row.abs() <= 1 && d_col.abs() <= 1 && (d_row, d_col) != (0, 0) {
        return can_land_on(board, from, to);
    }
    if d_row == 0 && d_col.abs() == 2 {
        let rook_col = if d_col > 0 { 7 } else { 0 };
        return can_castle(board, from, Square::new(from.row, rook_col));
    }
    false
}

/// Every square strictly between `from` and `to` is empty.
///
/// Only meaningful for rank, file and diagonal lines; any other geometry
/// reports `false`.
pub fn is_path_clear(board: &Board, from: Square, to: Square) -> bool {
    let (d_row, d_col) = deltas(from, to);
    if d_row != 0 && d_col != 0 && d_row.abs() != d_col.abs() {
        return false;
    }
    let step = (d_row.signum(), d_col.signum());

    let mut current = from.offset(step.0, step.1);
    while current != to {
        if !current.is_valid() || !board.is_square_empty(current) {
            return false;
        }
        current = current.offset(step.0, step.1);
    }
    true
}

/// King on its home square and rook on its corner, neither moved, nothing
/// between them, king not in check and the two squares it travels through
/// not attacked.
pub fn can_castle(board: &Board, king_sq: Square, rook_sq: Square) -> bool {
    let (Some(king), Some(rook)) = (board.get(king_sq), board.get(rook_sq)) else {
        return false;
    };
    if king.kind != PieceKind::King || rook.kind != PieceKind::Rook || king.color != rook.color {
        return false;
    }
    if king.has_moved || rook.has_moved {
        return false;
    }
    let home = king.color.back_rank();
    if king_sq != Square::new(home, 4) || rook_sq.row != home || !matches!(rook_sq.col, 0 | 7) {
        return false;
    }
    if !is_path_clear(board, king_sq, rook_sq) {
        return false;
    }
    if is_king_in_check(board, king.color) {
        return false;
    }

    let direction = if rook_sq.col > king_sq.col { 1 } else { -1 };
    let opponent = king.color.opposite();
    !is_square_attacked(board, king_sq.offset(0, direction), opponent)
        && !is_square_attacked(board, king_sq.offset(0, 2 * direction), opponent)
}

/// The last move was an enemy pawn's double step landing beside the pawn on
/// `from`, and `to` is the square it skipped over.
pub fn can_en_passant(board: &Board, from: Square, to: Square, last_move: Option<&Move>) -> bool {
    let Some(last) = last_move else {
        return false;
    };
    if !last.is_valid() {
        return false;
    }
    let Some(pawn) = board.get(from) else {
        return false;
    };
    if pawn.kind != PieceKind::Pawn {
        return false;
    }
    match board.get(last.to) {
        Some(p) if p.kind == PieceKind::Pawn && p.color != pawn.color => {}
        _ => return false,
    }
    if (last.to.row - last.from.row).abs() != 2 {
        return false;
    }
    if last.to.row != from.row || (last.to.col - from.col).abs() != 1 {
        return false;
    }
    to == Square::new(from.row + pawn.color.forward(), last.to.col)
}

/// A pawn standing on its own final rank.
pub fn can_promote(board: &Board, pos: Square) -> bool {
    match board.get(pos) {
        Some(piece) => piece.kind == PieceKind::Pawn && pos.row == piece.color.promotion_row(),
        None => false,
    }
}

/// A board without a king of `color` is never in check.
pub fn is_king_in_check(board: &Board, color: Color) -> bool {
    match board.find_king(color) {
        Some(king) => is_square_attacked(board, king, color.opposite()),
        None => false,
    }
}

/// Some piece of `attacker` could strike `pos`. Pawns use their capture
/// diagonals, kings plain adjacency. The occupant of `pos` is not considered,
/// so defended pieces count as attacked.
pub fn is_square_attacked(board: &Board, pos: Square, attacker: Color) -> bool {
    board.pieces(attacker).any(|(from, piece)| {
        if from == pos {
            return false;
        }
        let (d_row, d_col) = deltas(from, pos);
        match piece.kind {
            PieceKind::Pawn => d_row == attacker.forward() && d_col.abs() == 1,
            PieceKind::Knight => matches!((d_row.abs(), d_col.abs()), (2, 1) | (1, 2)),
            PieceKind::Bishop => d_row.abs() == d_col.abs() && is_path_clear(board, from, pos),
            PieceKind::Rook => (d_row == 0 || d_col == 0) && is_path_clear(board, from, pos),
            PieceKind::Queen => is_path_clear(board, from, pos),
            PieceKind::King => d_row.abs() <= 1 && d_col.abs() <= 1,
        }
    })
}

/// Plays `mv` on a private copy and reports whether `color`'s king is then attacked.
pub fn would_be_in_check(mut board: Board, mv: &Move, color: Color) -> bool {
    board.execute_move(mv);
    is_king_in_check(&board, color)
}

pub fn is_checkmate(board: &Board, color: Color, last_move: Option<&Move>) -> bool {
    is_king_in_check(board, color) && movegen::all_valid_moves(board, color, last_move).is_empty()
}

pub fn is_stalemate(board: &Board, color: Color, last_move: Option<&Move>) -> bool {
    !is_king_in_check(board, color) && movegen::all_valid_moves(board, color, last_move).is_empty()
}

/// King against king, or king and one minor piece against a lone king.
pub fn is_draw_by_insufficient_material(board: &Board) -> bool {
    let white = board.count_pieces(Color::White);
    let black = board.count_pieces(Color::Black);

    let lone_minor = |color: Color| {
        board.count_kind(PieceKind::Bishop, color) == 1 || board.count_kind(PieceKind::Knight, color) == 1
    };

    match (white, black) {
        (1, 1) => true,
        (2, 1) => lone_minor(Color::White),
        (1, 2) => lone_minor(Color::Black),
        _ => false,
    }
}

/// Classifies the position for the side about to move.
pub fn game_state(board: &Board, side_to_move: Color, last_move: Option<&Move>) -> GameState {
    let in_check = is_king_in_check(board, side_to_move);
    if movegen::all_valid_moves(board, side_to_move, last_move).is_empty() {
        return if in_check {
            GameState::Checkmate(side_to_move.opposite())
        } else {
            GameState::Stalemate
        };
    }
    if is_draw_by_insufficient_material(board) {
        return GameState::InsufficientMaterial;
    }
    if in_check {
        GameState::Check(side_to_move)
    } else {
        GameState::Ongoing
    }
}
