use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FenError, ParseSquareError};
use crate::moves::Move;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Upper-case letter used by FEN and board keys.
    pub fn symbol(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }

    pub fn from_symbol(c: char) -> Option<PieceKind> {
        match c.to_ascii_uppercase() {
            'P' => Some(PieceKind::Pawn),
            'N' => Some(PieceKind::Knight),
            'B' => Some(PieceKind::Bishop),
            'R' => Some(PieceKind::Rook),
            'Q' => Some(PieceKind::Queen),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PieceKind::Pawn => "Pawn",
            PieceKind::Knight => "Knight",
            PieceKind::Bishop => "Bishop",
            PieceKind::Rook => "Rook",
            PieceKind::Queen => "Queen",
            PieceKind::King => "King",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta of a pawn push.
    pub fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    pub fn back_rank(self) -> i8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    pub fn pawn_start_row(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    pub fn promotion_row(self) -> i8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

/// Occupant of a square. Empty squares are `None` at the board level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    /// Set the first time the piece is relocated by an executed move, never cleared.
    pub has_moved: bool,
}

impl Piece {
    pub fn new(kind: PieceKind, color: Color) -> Self {
        Self {
            kind,
            color,
            has_moved: false,
        }
    }

    pub fn moved(mut self) -> Self {
        self.has_moved = true;
        self
    }

    /// FEN letter: upper case for White, lower case for Black.
    pub fn symbol(&self) -> char {
        let c = self.kind.symbol();
        match self.color {
            Color::White => c,
            Color::Black => c.to_ascii_lowercase(),
        }
    }

    pub fn from_symbol(c: char) -> Option<Piece> {
        let kind = PieceKind::from_symbol(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece::new(kind, color))
    }
}

/// A (row, column) coordinate. Row 0 is White's back rank, column 0 is the a-file.
///
/// Components are signed so that off-board coordinates can be represented and
/// rejected; ordering is by row, then column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    pub row: i8,
    pub col: i8,
}

impl Square {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    pub fn is_valid(&self) -> bool {
        (0..8).contains(&self.row) && (0..8).contains(&self.col)
    }

    pub fn offset(&self, d_row: i8, d_col: i8) -> Square {
        Square::new(self.row + d_row, self.col + d_col)
    }

    /// All 64 squares, a1 first, h8 last.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8).flat_map(|row| (0..8).map(move |col| Square::new(row, col)))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}{}", (b'a' + self.col as u8) as char, self.row + 1)
        } else {
            write!(f, "({},{})", self.row, self.col)
        }
    }
}

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (file, rank) = match (chars.next(), chars.next(), chars.next()) {
            (Some(file), Some(rank), None) => (file, rank),
            _ => return Err(ParseSquareError::Length(s.to_string())),
        };
        let file = file.to_ascii_lowercase();
        if !('a'..='h').contains(&file) {
            return Err(ParseSquareError::File(file));
        }
        if !('1'..='8').contains(&rank) {
            return Err(ParseSquareError::Rank(rank));
        }
        Ok(Square::new(rank as i8 - '1' as i8, file as i8 - 'a' as i8))
    }
}

pub const CAPTURE_CAPACITY: usize = 16;

/// Fixed-capacity record of pieces of one color removed from the board, in
/// capture order. Lives inline in `Board` so copying a board never allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapturedPieces {
    pieces: [Piece; CAPTURE_CAPACITY],
    len: u8,
}

impl CapturedPieces {
    fn new() -> Self {
        Self {
            pieces: [Piece::new(PieceKind::Pawn, Color::White); CAPTURE_CAPACITY],
            len: 0,
        }
    }

    fn push(&mut self, piece: Piece) {
        let len = self.len as usize;
        if len < CAPTURE_CAPACITY {
            self.pieces[len] = piece;
            self.len += 1;
        }
    }

    pub fn as_slice(&self) -> &[Piece] {
        &self.pieces[..self.len as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
    white_captured: CapturedPieces,
    black_captured: CapturedPieces,
}

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// The standard starting position.
    pub fn new() -> Self {
        let mut board = Self::empty();
        for (col, &kind) in BACK_RANK.iter().enumerate() {
            let col = col as i8;
            board.put(Square::new(0, col), Piece::new(kind, Color::White));
            board.put(Square::new(1, col), Piece::new(PieceKind::Pawn, Color::White));
            board.put(Square::new(6, col), Piece::new(PieceKind::Pawn, Color::Black));
            board.put(Square::new(7, col), Piece::new(kind, Color::Black));
        }
        board
    }

    pub fn empty() -> Self {
        Self {
            squares: [[None; 8]; 8],
            white_captured: CapturedPieces::new(),
            black_captured: CapturedPieces::new(),
        }
    }

    /// Loads the placement field of a FEN string.
    ///
    /// If the castling field is present, kings and rooks without a matching
    /// right are marked as moved; otherwise everything starts unmoved.
    /// At most 16 pieces per color are accepted, the capacity of the
    /// captured-piece records.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        let placement = parts.first().ok_or(FenError::Empty)?;
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::RankCount(ranks.len()));
        }

        let mut board = Self::empty();
        for (i, rank) in ranks.iter().enumerate() {
            let row = 7 - i as i8;
            let mut col = 0usize;
            for c in rank.chars() {
                if let Some(skip) = c.to_digit(10) {
                    col += skip as usize;
                    if col > 8 {
                        return Err(FenError::RankWidth { rank: 8 - i });
                    }
                } else {
                    let piece = Piece::from_symbol(c).ok_or(FenError::Piece(c))?;
                    if col >= 8 {
                        return Err(FenError::RankWidth { rank: 8 - i });
                    }
                    board.put(Square::new(row, col as i8), piece);
                    col += 1;
                }
            }
            if col != 8 {
                return Err(FenError::RankWidth { rank: 8 - i });
            }
        }

        for color in [Color::White, Color::Black] {
            let count = board.count_pieces(color);
            if count > CAPTURE_CAPACITY {
                return Err(FenError::TooManyPieces { color, count });
            }
        }

        if let Some(castling) = parts.get(2) {
            board.apply_castling_field(castling);
        }
        Ok(board)
    }

    fn apply_castling_field(&mut self, field: &str) {
        for row in [0, 7] {
            for col in 0..8 {
                let sq = Square::new(row, col);
                if let Some(piece) = self.get(sq) {
                    if matches!(piece.kind, PieceKind::King | PieceKind::Rook) {
                        self.put(sq, piece.moved());
                    }
                }
            }
        }
        for c in field.chars() {
            let (color, rook_col) = match c {
                'K' => (Color::White, 7),
                'Q' => (Color::White, 0),
                'k' => (Color::Black, 7),
                'q' => (Color::Black, 0),
                _ => continue,
            };
            let row = color.back_rank();
            for sq in [Square::new(row, 4), Square::new(row, rook_col)] {
                if let Some(mut piece) = self.get(sq) {
                    if piece.color == color {
                        piece.has_moved = false;
                        self.put(sq, piece);
                    }
                }
            }
        }
    }

    pub fn get(&self, sq: Square) -> Option<Piece> {
        if !sq.is_valid() {
            return None;
        }
        self.squares[sq.row as usize][sq.col as usize]
    }

    /// Overwrites a square. Off-board squares are ignored.
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        if sq.is_valid() {
            self.squares[sq.row as usize][sq.col as usize] = piece;
        }
    }

    pub fn put(&mut self, sq: Square, piece: Piece) {
        self.set(sq, Some(piece));
    }

    pub fn remove(&mut self, sq: Square) -> Option<Piece> {
        let piece = self.get(sq);
        self.set(sq, None);
        piece
    }

    pub fn clear(&mut self) {
        *self = Self::empty();
    }

    /// False for off-board squares.
    pub fn is_square_empty(&self, sq: Square) -> bool {
        sq.is_valid() && self.get(sq).is_none()
    }

    pub fn is_occupied_by(&self, sq: Square, color: Color) -> bool {
        matches!(self.get(sq), Some(piece) if piece.color == color)
    }

    /// Relocates whatever stands on `from`, recording any piece on `to` as captured.
    pub fn move_piece(&mut self, from: Square, to: Square) -> bool {
        if !from.is_valid() || !to.is_valid() {
            return false;
        }
        let Some(piece) = self.remove(from) else {
            return false;
        };
        if let Some(captured) = self.get(to) {
            self.record_capture(captured);
        }
        self.put(to, piece.moved());
        true
    }

    /// Applies a well-formed move, including the rook hop of a castle, the
    /// pawn removal of en passant and promotion replacement.
    ///
    /// The move is trusted: legality is the rules engine's job.
    pub fn execute_move(&mut self, mv: &Move) -> bool {
        if !mv.is_valid() {
            return false;
        }
        let (from, to) = (mv.from, mv.to);

        if mv.is_castling {
            if !self.move_piece(from, to) {
                return false;
            }
            let (rook_from, rook_to) = if to.col > from.col {
                (Square::new(from.row, 7), Square::new(from.row, 5))
            } else {
                (Square::new(from.row, 0), Square::new(from.row, 3))
            };
            self.move_piece(rook_from, rook_to);
            return true;
        }

        if mv.is_en_passant {
            if !self.move_piece(from, to) {
                return false;
            }
            if let Some(pawn) = self.remove(Square::new(from.row, to.col)) {
                self.record_capture(pawn);
            }
            return true;
        }

        if let Some(kind) = mv.promotion {
            let Some(pawn) = self.remove(from) else {
                return false;
            };
            if let Some(captured) = self.get(to) {
                self.record_capture(captured);
            }
            self.put(to, Piece::new(kind, pawn.color).moved());
            return true;
        }

        self.move_piece(from, to)
    }

    /// Appends to the list of the captured piece's own color.
    fn record_capture(&mut self, piece: Piece) {
        match piece.color {
            Color::White => self.white_captured.push(piece),
            Color::Black => self.black_captured.push(piece),
        }
    }

    /// Pieces of `color` no longer on the board, oldest capture first.
    pub fn captured(&self, color: Color) -> &[Piece] {
        match color {
            Color::White => self.white_captured.as_slice(),
            Color::Black => self.black_captured.as_slice(),
        }
    }

    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces(color)
            .find(|(_, piece)| piece.kind == PieceKind::King)
            .map(|(sq, _)| sq)
    }

    /// Every occupied square of `color` in a1..h8 order.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| match self.get(sq) {
            Some(piece) if piece.color == color => Some((sq, piece)),
            _ => None,
        })
    }

    pub fn count_pieces(&self, color: Color) -> usize {
        self.pieces(color).count()
    }

    pub fn count_kind(&self, kind: PieceKind, color: Color) -> usize {
        self.pieces(color).filter(|(_, p)| p.kind == kind).count()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in (0..8).rev() {
            write!(f, "{} ", row + 1)?;
            for col in 0..8 {
                let c = self.get(Square::new(row, col)).map_or('.', |p| p.symbol());
                write!(f, "{}", c)?;
                if col < 7 {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        write!(f, "  a b c d e f g h")
    }
}
