use std::fmt;

use crate::board::{PieceKind, Square};

/// A single ply. Built by the generator, then handed to `Board::execute_move`
/// unchanged; it keeps no reference back to the board it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: PieceKind,
    pub captured: Option<PieceKind>,
    pub promotion: Option<PieceKind>,
    pub is_en_passant: bool,
    pub is_castling: bool,
}

impl Move {
    pub fn new(from: Square, to: Square, piece: PieceKind) -> Self {
        Self {
            from,
            to,
            piece,
            captured: None,
            promotion: None,
            is_en_passant: false,
            is_castling: false,
        }
    }

    pub fn capture(from: Square, to: Square, piece: PieceKind, captured: Option<PieceKind>) -> Self {
        Self {
            captured,
            ..Self::new(from, to, piece)
        }
    }

    pub fn new_en_passant(from: Square, to: Square) -> Self {
        Self {
            captured: Some(PieceKind::Pawn),
            is_en_passant: true,
            ..Self::new(from, to, PieceKind::Pawn)
        }
    }

    pub fn new_castling(from: Square, to: Square) -> Self {
        Self {
            is_castling: true,
            ..Self::new(from, to, PieceKind::King)
        }
    }

    pub fn with_promotion(mut self, kind: PieceKind) -> Self {
        self.promotion = Some(kind);
        self
    }

    pub fn is_promotion(&self) -> bool {
        self.promotion.is_some()
    }

    pub fn is_capture(&self) -> bool {
        self.captured.is_some() || self.is_en_passant
    }

    /// Both coordinates on the board.
    pub fn is_valid(&self) -> bool {
        self.from.is_valid() && self.to.is_valid()
    }

    /// Short algebraic form without check markers, e.g. `Nxf3`, `exd6 e.p.`, `O-O`.
    pub fn to_algebraic(&self) -> String {
        if self.is_castling {
            return if self.to.col > self.from.col { "O-O" } else { "O-O-O" }.to_string();
        }

        let mut result = String::new();
        if self.piece != PieceKind::Pawn {
            result.push(self.piece.symbol());
        }
        if self.is_capture() {
            if self.piece == PieceKind::Pawn {
                result.push((b'a' + self.from.col as u8) as char);
            }
            result.push('x');
        }
        result.push_str(&self.to.to_string());
        if let Some(kind) = self.promotion {
            result.push('=');
            result.push(kind.symbol());
        }
        if self.is_en_passant {
            result.push_str(" e.p.");
        }
        result
    }
}

/// Long coordinate form, e.g. `e2e4`, `e7e8q`.
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.symbol().to_ascii_lowercase())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn notation() {
        let mv = Move::capture(sq("g1"), sq("f3"), PieceKind::Knight, Some(PieceKind::Pawn));
        assert_eq!(mv.to_algebraic(), "Nxf3");
        assert_eq!(mv.to_string(), "g1f3");

        let ep = Move::new_en_passant(sq("e5"), sq("d6"));
        assert_eq!(ep.to_algebraic(), "exd6 e.p.");

        let promo = Move::new(sq("a7"), sq("a8"), PieceKind::Pawn).with_promotion(PieceKind::Queen);
        assert_eq!(promo.to_algebraic(), "a8=Q");
        assert_eq!(promo.to_string(), "a7a8q");

        assert_eq!(Move::new_castling(sq("e1"), sq("c1")).to_algebraic(), "O-O-O");
    }

    #[test]
    fn validity_requires_on_board_squares() {
        assert!(Move::new(sq("e2"), sq("e4"), PieceKind::Pawn).is_valid());
        assert!(!Move::new(Square::new(-1, 0), sq("e4"), PieceKind::Pawn).is_valid());
    }
}
