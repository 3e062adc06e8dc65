use crate::board::{Board, Color, PieceKind, Square};
use crate::movegen;

pub struct Evaluator {
    // Piece values, the king is never counted as material
    pub pawn_value: i32,
    pub knight_value: i32,
    pub bishop_value: i32,
    pub rook_value: i32,
    pub queen_value: i32,

    // Positional bonuses, row 0 is the owner's back rank
    pub pawn_position_bonus: [[i32; 8]; 8],
    pub knight_position_bonus: [[i32; 8]; 8],
    pub bishop_position_bonus: [[i32; 8]; 8],
    pub rook_position_bonus: [[i32; 8]; 8],
    pub queen_position_bonus: [[i32; 8]; 8],

    // Bonus per reachable square
    pub mobility_weight: i32,

    // Pawn structure weights
    pub doubled_pawn_penalty: i32,
    pub pawn_advance_bonus: i32,

    // King safety weights
    pub back_rank_king_bonus: i32,
    pub flank_king_bonus: i32,
    pub exposed_king_penalty: i32,
    pub missing_king_penalty: i32,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            pawn_value: 100,
            knight_value: 320,
            bishop_value: 330,
            rook_value: 500,
            queen_value: 900,

            // Pawns gain with every rank advanced
            pawn_position_bonus: [
                [0, 0, 0, 0, 0, 0, 0, 0],
                [5, 5, 5, 5, 5, 5, 5, 5],
                [10, 10, 10, 10, 10, 10, 10, 10],
                [15, 15, 15, 15, 15, 15, 15, 15],
                [20, 20, 20, 20, 20, 20, 20, 20],
                [25, 25, 25, 25, 25, 25, 25, 25],
                [30, 30, 30, 30, 30, 30, 30, 30],
                [35, 35, 35, 35, 35, 35, 35, 35],
            ],

            // Knights want the central block
            knight_position_bonus: [
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 15, 15, 15, 15, 0, 0],
                [0, 0, 30, 30, 30, 30, 0, 0],
                [0, 0, 30, 30, 30, 30, 0, 0],
                [0, 0, 15, 15, 15, 15, 0, 0],
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 0, 0, 0, 0, 0, 0],
            ],

            bishop_position_bonus: [
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 20, 20, 20, 20, 0, 0],
                [0, 0, 20, 20, 20, 20, 0, 0],
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 0, 0, 0, 0, 0, 0],
            ],

            // Rooks on the seventh
            rook_position_bonus: [
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 0, 0, 0, 0, 0, 0],
                [20, 20, 20, 20, 20, 20, 20, 20],
                [0, 0, 0, 0, 0, 0, 0, 0],
            ],

            queen_position_bonus: [
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 10, 10, 10, 10, 0, 0],
                [0, 0, 10, 10, 10, 10, 0, 0],
                [0, 0, 10, 10, 10, 10, 0, 0],
                [0, 0, 10, 10, 10, 10, 0, 0],
                [0, 0, 0, 0, 0, 0, 0, 0],
                [0, 0, 0, 0, 0, 0, 0, 0],
            ],

            mobility_weight: 10,

            doubled_pawn_penalty: 50,
            pawn_advance_bonus: 10,

            back_rank_king_bonus: 30,
            flank_king_bonus: 20,
            exposed_king_penalty: 40,
            missing_king_penalty: 10000,
        }
    }

    /// Score of `board` for `perspective`; positive is good for that side.
    ///
    /// Every term is computed for White and the total negated for Black, so
    /// `evaluate(b, c) == -evaluate(b, c.opposite())` always holds.
    pub fn evaluate(&self, board: &Board, perspective: Color) -> i32 {
        let mut score = self.evaluate_material(board);

        score += self.evaluate_position(board) / 2;

        let mobility = self.evaluate_mobility(board, Color::White) - self.evaluate_mobility(board, Color::Black);
        score += mobility / 3;

        let king_safety =
            self.evaluate_king_safety(board, Color::White) - self.evaluate_king_safety(board, Color::Black);
        score += king_safety / 4;

        score += self.evaluate_pawn_structure(board) / 5;

        match perspective {
            Color::White => score,
            Color::Black => -score,
        }
    }

    pub fn piece_value(&self, kind: PieceKind) -> i32 {
        match kind {
            PieceKind::Pawn => self.pawn_value,
            PieceKind::Knight => self.knight_value,
            PieceKind::Bishop => self.bishop_value,
            PieceKind::Rook => self.rook_value,
            PieceKind::Queen => self.queen_value,
            PieceKind::King => 0,
        }
    }

    /// White material minus Black material.
    pub fn evaluate_material(&self, board: &Board) -> i32 {
        Square::all()
            .filter_map(|sq| board.get(sq))
            .map(|piece| match piece.color {
                Color::White => self.piece_value(piece.kind),
                Color::Black => -self.piece_value(piece.kind),
            })
            .sum()
    }

    /// White table bonus minus Black table bonus.
    pub fn evaluate_position(&self, board: &Board) -> i32 {
        let mut score = 0;
        for sq in Square::all() {
            if let Some(piece) = board.get(sq) {
                let bonus = self.position_bonus(piece.kind, sq, piece.color);
                score += match piece.color {
                    Color::White => bonus,
                    Color::Black => -bonus,
                };
            }
        }
        score
    }

    fn position_bonus(&self, kind: PieceKind, sq: Square, color: Color) -> i32 {
        let row = (match color {
            Color::White => sq.row,
            Color::Black => 7 - sq.row,
        }) as usize;
        let col = sq.col as usize;

        match kind {
            PieceKind::Pawn => self.pawn_position_bonus[row][col],
            PieceKind::Knight => self.knight_position_bonus[row][col],
            PieceKind::Bishop => self.bishop_position_bonus[row][col],
            PieceKind::Rook => self.rook_position_bonus[row][col],
            PieceKind::Queen => self.queen_position_bonus[row][col],
            PieceKind::King => 0,
        }
    }

    /// Pseudo-legal destinations of every piece of `color`, scaled by the
    /// mobility weight. King safety is not checked.
    pub fn evaluate_mobility(&self, board: &Board, color: Color) -> i32 {
        let mut moves = Vec::with_capacity(64);
        for (pos, _) in board.pieces(color) {
            movegen::push_possible_moves(board, pos, None, &mut moves);
        }
        moves.len() as i32 * self.mobility_weight
    }

    pub fn evaluate_king_safety(&self, board: &Board, color: Color) -> i32 {
        let Some(king) = board.find_king(color) else {
            return -self.missing_king_penalty;
        };

        let mut safety = 0;
        if king.row == color.back_rank() {
            safety += self.back_rank_king_bonus;
            if king.col <= 2 || king.col >= 6 {
                safety += self.flank_king_bonus;
            }
        }

        let advanced = match color {
            Color::White => king.row >= 3,
            Color::Black => king.row <= 4,
        };
        if (2..=5).contains(&king.col) && advanced {
            safety -= self.exposed_king_penalty;
        }
        safety
    }

    /// Doubled pawn penalties and advancement bonuses, White minus Black.
    pub fn evaluate_pawn_structure(&self, board: &Board) -> i32 {
        let mut score = 0;
        let mut white_files = [0i32; 8];
        let mut black_files = [0i32; 8];

        for sq in Square::all() {
            let Some(piece) = board.get(sq) else {
                continue;
            };
            if piece.kind != PieceKind::Pawn {
                continue;
            }
            let col = sq.col as usize;
            match piece.color {
                Color::White => {
                    white_files[col] += 1;
                    score += sq.row as i32 * self.pawn_advance_bonus;
                }
                Color::Black => {
                    black_files[col] += 1;
                    score -= (7 - sq.row as i32) * self.pawn_advance_bonus;
                }
            }
        }

        for col in 0..8 {
            if white_files[col] > 1 {
                score -= self.doubled_pawn_penalty * (white_files[col] - 1);
            }
            if black_files[col] > 1 {
                score += self.doubled_pawn_penalty * (black_files[col] - 1);
            }
        }
        score
    }
}
