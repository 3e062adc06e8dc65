use serde::Serialize;

use crate::board::{Board, Color, Piece, Square};
use crate::game::Game;
use crate::rules::{self, GameState};

/// JSON shape of the whole board, rank 8 first, files a to h within a rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardView {
    pub squares: Vec<SquareView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SquareView {
    pub row: i8,
    pub col: i8,
    pub piece: Option<PieceView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieceView {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub color: Color,
    pub symbol: char,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    pub current_player: Color,
    pub is_game_over: bool,
    pub is_check: bool,
    pub is_checkmate: bool,
    pub move_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovesView {
    pub moves: Vec<TargetView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetView {
    pub to: String,
}

impl From<Piece> for PieceView {
    fn from(piece: Piece) -> Self {
        PieceView {
            kind: piece.kind.name(),
            color: piece.color,
            symbol: piece.symbol(),
        }
    }
}

impl BoardView {
    pub fn new(board: &Board) -> Self {
        let squares = (0..8)
            .rev()
            .flat_map(|row| (0..8).map(move |col| Square::new(row, col)))
            .map(|sq| SquareView {
                row: sq.row,
                col: sq.col,
                piece: board.get(sq).map(PieceView::from),
            })
            .collect();
        BoardView { squares }
    }
}

impl StatusView {
    pub fn new(game: &Game) -> Self {
        let side = game.side_to_move();
        StatusView {
            current_player: side,
            is_game_over: game.is_over(),
            is_check: rules::is_king_in_check(game.board(), side),
            is_checkmate: matches!(game.state(), GameState::Checkmate(_)),
            move_count: game.move_count(),
        }
    }
}

impl MovesView {
    /// Destinations of the piece on `from`. Empty for an empty square, an
    /// enemy piece or a square off the board.
    pub fn new(game: &Game, from: Square) -> Self {
        let moves = game
            .valid_moves_from(from)
            .iter()
            .map(|mv| TargetView { to: mv.to.to_string() })
            .collect();
        MovesView { moves }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn board_lists_rank_eight_first() {
        let value = serde_json::to_value(BoardView::new(&Board::new())).unwrap();
        let squares = value["squares"].as_array().unwrap();
        assert_eq!(squares.len(), 64);
        assert_eq!(
            squares[0],
            json!({"row": 7, "col": 0, "piece": {"type": "Rook", "color": "Black", "symbol": "r"}})
        );
        assert_eq!(squares[63]["piece"]["symbol"], "R");
        assert_eq!(squares[63]["piece"]["color"], "White");
        assert_eq!(squares[27], json!({"row": 4, "col": 3, "piece": null}));
    }

    #[test]
    fn status_after_fools_mate() {
        let mut game = Game::new();
        for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")] {
            game.make_move(sq(from), sq(to)).unwrap();
        }
        assert_eq!(
            serde_json::to_value(StatusView::new(&game)).unwrap(),
            json!({
                "currentPlayer": "White",
                "isGameOver": true,
                "isCheck": true,
                "isCheckmate": true,
                "moveCount": 4
            })
        );
    }

    #[test]
    fn moves_of_a_piece() {
        let game = Game::new();
        assert_eq!(
            serde_json::to_string(&MovesView::new(&game, sq("g1"))).unwrap(),
            r#"{"moves":[{"to":"f3"},{"to":"h3"}]}"#
        );
        assert_eq!(
            serde_json::to_string(&MovesView::new(&game, Square::new(9, 0))).unwrap(),
            r#"{"moves":[]}"#
        );
        assert!(MovesView::new(&game, sq("e7")).moves.is_empty());
    }
}
