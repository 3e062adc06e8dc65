use crate::board::{Board, Color, PieceKind, Square};
use crate::moves::Move;
use crate::rules;

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1), (0, 1),
    (1, -1), (1, 0), (1, 1),
];

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Pseudo-legal moves of the piece on `pos`: geometry only, own king safety
/// not checked. Empty for an empty square.
pub fn possible_moves_for_piece(board: &Board, pos: Square, last_move: Option<&Move>) -> Vec<Move> {
    let mut moves = Vec::new();
    push_possible_moves(board, pos, last_move, &mut moves);
    moves
}

/// Appends the pseudo-legal moves of the piece on `pos` to `out`.
pub fn push_possible_moves(board: &Board, pos: Square, last_move: Option<&Move>, out: &mut Vec<Move>) {
    let Some(piece) = board.get(pos) else {
        return;
    };

    match piece.kind {
        PieceKind::Pawn => generate_pawn_moves(board, pos, piece.color, last_move, out),
        PieceKind::Knight => generate_steps(board, pos, piece.color, PieceKind::Knight, &KNIGHT_OFFSETS, out),
        PieceKind::Bishop => generate_slides(board, pos, piece.color, PieceKind::Bishop, &BISHOP_DIRECTIONS, out),
        PieceKind::Rook => generate_slides(board, pos, piece.color, PieceKind::Rook, &ROOK_DIRECTIONS, out),
        PieceKind::Queen => {
            generate_slides(board, pos, piece.color, PieceKind::Queen, &ROOK_DIRECTIONS, out);
            generate_slides(board, pos, piece.color, PieceKind::Queen, &BISHOP_DIRECTIONS, out);
        }
        PieceKind::King => {
            generate_steps(board, pos, piece.color, PieceKind::King, &KING_OFFSETS, out);
            if !piece.has_moved {
                generate_castles(board, pos, out);
            }
        }
    }
}

fn generate_pawn_moves(
    board: &Board,
    pos: Square,
    color: Color,
    last_move: Option<&Move>,
    out: &mut Vec<Move>,
) {
    let direction = color.forward();
    // Promotion always picks a queen.
    let promote = |mv: Move| {
        if mv.to.row == color.promotion_row() {
            mv.with_promotion(PieceKind::Queen)
        } else {
            mv
        }
    };

    let forward = pos.offset(direction, 0);
    if board.is_square_empty(forward) {
        out.push(promote(Move::new(pos, forward, PieceKind::Pawn)));

        let double = pos.offset(2 * direction, 0);
        if pos.row == color.pawn_start_row() && board.is_square_empty(double) {
            out.push(Move::new(pos, double, PieceKind::Pawn));
        }
    }

    for d_col in [-1, 1] {
        let diagonal = pos.offset(direction, d_col);
        if !diagonal.is_valid() {
            continue;
        }
        if let Some(target) = board.get(diagonal) {
            if target.color != color {
                out.push(promote(Move::capture(pos, diagonal, PieceKind::Pawn, Some(target.kind))));
            }
        } else if rules::can_en_passant(board, pos, diagonal, last_move) {
            out.push(Move::new_en_passant(pos, diagonal));
        }
    }
}

fn generate_steps(
    board: &Board,
    pos: Square,
    color: Color,
    kind: PieceKind,
    offsets: &[(i8, i8)],
    out: &mut Vec<Move>,
) {
    for &(d_row, d_col) in offsets {
        let to = pos.offset(d_row, d_col);
        if !to.is_valid() {
            continue;
        }
        match board.get(to) {
            None => out.push(Move::new(pos, to, kind)),
            Some(target) if target.color != color => {
                out.push(Move::capture(pos, to, kind, Some(target.kind)))
            }
            Some(_) => {}
        }
    }
}

/// Walks each ray until the edge or the first occupied square, which is
/// included only when it holds an opponent.
fn generate_slides(
    board: &Board,
    pos: Square,
    color: Color,
    kind: PieceKind,
    directions: &[(i8, i8)],
    out: &mut Vec<Move>,
) {
    for &(d_row, d_col) in directions {
        let mut to = pos.offset(d_row, d_col);
        while to.is_valid() {
            match board.get(to) {
                None => out.push(Move::new(pos, to, kind)),
                Some(target) => {
                    if target.color != color {
                        out.push(Move::capture(pos, to, kind, Some(target.kind)));
                    }
                    break;
                }
            }
            to = to.offset(d_row, d_col);
        }
    }
}

fn generate_castles(board: &Board, pos: Square, out: &mut Vec<Move>) {
    if rules::can_castle(board, pos, Square::new(pos.row, 7)) {
        out.push(Move::new_castling(pos, Square::new(pos.row, 6)));
    }
    if rules::can_castle(board, pos, Square::new(pos.row, 0)) {
        out.push(Move::new_castling(pos, Square::new(pos.row, 2)));
    }
}

/// Pseudo-legal moves of the piece on `pos` that do not leave its own king attacked.
pub fn valid_moves_for_piece(board: &Board, pos: Square, last_move: Option<&Move>) -> Vec<Move> {
    let Some(piece) = board.get(pos) else {
        return Vec::new();
    };
    let mut moves = possible_moves_for_piece(board, pos, last_move);
    moves.retain(|mv| !rules::would_be_in_check(*board, mv, piece.color));
    moves
}

/// Every legal move of `color`, grouped by piece in a1..h8 order.
pub fn all_valid_moves(board: &Board, color: Color, last_move: Option<&Move>) -> Vec<Move> {
    let mut moves = Vec::new();
    for (pos, _) in board.pieces(color) {
        push_possible_moves(board, pos, last_move, &mut moves);
    }
    moves.retain(|mv| !rules::would_be_in_check(*board, mv, color));
    moves
}

/// Counts leaf positions `depth` plies below the given one.
pub fn perft(board: &Board, color: Color, last_move: Option<&Move>, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = all_valid_moves(board, color, last_move);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for mv in &moves {
        let mut next = *board;
        next.execute_move(mv);
        nodes += perft(&next, color.opposite(), Some(mv), depth - 1);
    }
    nodes
}
