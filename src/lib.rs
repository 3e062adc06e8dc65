pub mod board;
pub mod console;
pub mod error;
pub mod evaluation;
pub mod game;
pub mod movegen;
pub mod moves;
pub mod rules;
pub mod search;
pub mod session;
pub mod transposition;
pub mod view;

pub use board::{Board, Color, Piece, PieceKind, Square};
pub use error::{FenError, MoveError, ParseDifficultyError, ParseSquareError, SessionError};
pub use evaluation::Evaluator;
pub use game::{Game, MoveHistory};
pub use moves::Move;
pub use rules::GameState;
pub use search::{Difficulty, DifficultyConfig, Search, SearchStats};
pub use session::Session;
pub use transposition::{BoardKey, TranspositionTable};
pub use view::{BoardView, MovesView, StatusView};

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn fen(s: &str) -> Board {
        Board::from_fen(s).unwrap()
    }

    #[test]
    fn test_initial_position() {
        let board = Board::new();
        let moves = movegen::all_valid_moves(&board, Color::White, None);
        assert_eq!(moves.len(), 20);

        for mv in &moves {
            assert!(rules::is_basic_move_legal(&board, mv.from, mv.to, None));
            assert!(!rules::would_be_in_check(board, mv, Color::White));
        }
        assert_eq!(movegen::all_valid_moves(&board, Color::Black, None).len(), 20);
    }

    #[test]
    fn test_perft() {
        let board = Board::new();
        assert_eq!(movegen::perft(&board, Color::White, None, 1), 20);
        assert_eq!(movegen::perft(&board, Color::White, None, 2), 400);
        assert_eq!(movegen::perft(&board, Color::White, None, 3), 8902);
    }

    #[test]
    fn test_generated_moves_are_legal() {
        let positions = [
            ("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq", Color::White),
            ("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq", Color::Black),
            ("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8", Color::White),
        ];
        for (placement, color) in positions {
            let board = fen(placement);
            for mv in movegen::all_valid_moves(&board, color, None) {
                assert!(rules::is_basic_move_legal(&board, mv.from, mv.to, None), "{mv}");
                let mut next = board;
                assert!(next.execute_move(&mv));
                assert!(!rules::is_king_in_check(&next, color), "{mv} leaves the king attacked");
            }
        }
    }

    #[test]
    fn test_fools_mate() {
        let mut board = Board::new();
        let mut last = None;
        for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")] {
            let mv = movegen::valid_moves_for_piece(&board, sq(from), last.as_ref())
                .into_iter()
                .find(|mv| mv.to == sq(to))
                .unwrap();
            board.execute_move(&mv);
            last = Some(mv);
        }

        assert!(rules::is_king_in_check(&board, Color::White));
        assert!(rules::is_checkmate(&board, Color::White, last.as_ref()));
        assert!(!rules::is_stalemate(&board, Color::White, last.as_ref()));
        assert_eq!(
            rules::game_state(&board, Color::White, last.as_ref()),
            GameState::Checkmate(Color::Black)
        );
    }

    #[test]
    fn test_stalemate() {
        // Black king a8, White queen b6, White king c1, Black to move.
        let board = fen("k7/8/1Q6/8/8/8/8/2K5");
        assert!(!rules::is_king_in_check(&board, Color::Black));
        assert!(rules::is_stalemate(&board, Color::Black, None));
        assert!(!rules::is_checkmate(&board, Color::Black, None));
        assert_eq!(rules::game_state(&board, Color::Black, None), GameState::Stalemate);
    }

    #[test]
    fn test_en_passant() {
        let mut board = fen("4k3/3p4/8/4P3/8/8/8/4K3");
        let double = Move::new(sq("d7"), sq("d5"), PieceKind::Pawn);
        board.execute_move(&double);

        assert!(rules::can_en_passant(&board, sq("e5"), sq("d6"), Some(&double)));
        assert!(!rules::can_en_passant(&board, sq("e5"), sq("d6"), None));
        let moves = movegen::valid_moves_for_piece(&board, sq("e5"), Some(&double));
        let ep = moves.iter().find(|mv| mv.is_en_passant).unwrap();
        assert_eq!(ep.to, sq("d6"));

        board.execute_move(ep);
        assert_eq!(board.get(sq("d5")), None);
        assert_eq!(board.get(sq("d6")).map(|p| p.kind), Some(PieceKind::Pawn));
        assert_eq!(board.captured(Color::Black).len(), 1);

        // A single step does not open en passant.
        let mut board = fen("4k3/8/3p4/4P3/8/8/8/4K3");
        let single = Move::new(sq("d6"), sq("d5"), PieceKind::Pawn);
        board.execute_move(&single);
        assert!(!rules::can_en_passant(&board, sq("e5"), sq("d6"), Some(&single)));
    }

    #[test]
    fn test_en_passant_escapes_check() {
        // b7-b5 checks the king on a4; every other escape is covered.
        let mut board = fen("1r5k/1p6/3b4/P7/K7/7r/8/8");
        let double = Move::new(sq("b7"), sq("b5"), PieceKind::Pawn);
        board.execute_move(&double);
        assert!(rules::is_king_in_check(&board, Color::White));

        let moves = movegen::all_valid_moves(&board, Color::White, Some(&double));
        assert_eq!(moves.len(), 1);
        assert!(moves[0].is_en_passant);
        assert!(!rules::is_checkmate(&board, Color::White, Some(&double)));
        assert!(rules::is_checkmate(&board, Color::White, None));
    }

    #[test]
    fn test_castling() {
        let board = fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq");
        assert!(rules::can_castle(&board, sq("e1"), sq("h1")));
        assert!(rules::can_castle(&board, sq("e1"), sq("a1")));

        let castles: Vec<_> = movegen::valid_moves_for_piece(&board, sq("e1"), None)
            .into_iter()
            .filter(|mv| mv.is_castling)
            .collect();
        assert_eq!(castles.len(), 2);

        let short = castles.iter().find(|mv| mv.to == sq("g1")).unwrap();
        let mut after = board;
        after.execute_move(short);
        assert_eq!(after.get(sq("g1")).map(|p| p.kind), Some(PieceKind::King));
        assert_eq!(after.get(sq("f1")).map(|p| p.kind), Some(PieceKind::Rook));
        assert_eq!(after.get(sq("h1")), None);
        assert_eq!(after.get(sq("e1")), None);

        // Moved rook.
        let board = fen("r3k2r/8/8/8/8/8/8/R3K2R w Qkq");
        assert!(!rules::can_castle(&board, sq("e1"), sq("h1")));
        assert!(rules::can_castle(&board, sq("e1"), sq("a1")));

        // Blocked path.
        let board = fen("r3k2r/8/8/8/8/8/8/R2QK1NR w KQkq");
        assert!(!rules::can_castle(&board, sq("e1"), sq("h1")));
        assert!(!rules::can_castle(&board, sq("e1"), sq("a1")));

        // King in check.
        let board = fen("r3k2r/8/8/8/8/8/4r3/R3K2R w KQkq");
        assert!(!rules::can_castle(&board, sq("e1"), sq("h1")));

        // Transit square attacked.
        let board = fen("r3k2r/8/8/8/8/8/5r2/R3K2R w KQkq");
        assert!(!rules::can_castle(&board, sq("e1"), sq("h1")));
        assert!(rules::can_castle(&board, sq("e1"), sq("a1")));

        // Landing square attacked, kingside.
        let board = fen("r3k2r/8/8/8/8/8/6r1/R3K2R w KQkq");
        assert!(!rules::is_king_in_check(&board, Color::White));
        assert!(!rules::can_castle(&board, sq("e1"), sq("h1")));
        assert!(rules::can_castle(&board, sq("e1"), sq("a1")));
        assert!(movegen::valid_moves_for_piece(&board, sq("e1"), None)
            .iter()
            .all(|mv| mv.to != sq("g1")));

        // Landing square attacked, queenside.
        let board = fen("r3k2r/8/8/8/8/8/2r5/R3K2R w KQkq");
        assert!(!rules::can_castle(&board, sq("e1"), sq("a1")));
        assert!(rules::can_castle(&board, sq("e1"), sq("h1")));
        assert!(movegen::valid_moves_for_piece(&board, sq("e1"), None)
            .iter()
            .all(|mv| mv.to != sq("c1")));

        // Only the king's squares matter: b1 under attack still allows O-O-O.
        let board = fen("r3k2r/8/8/8/8/8/1r6/R3K2R w KQkq");
        assert!(rules::can_castle(&board, sq("e1"), sq("a1")));

        // Moved king, even when back home.
        let mut board = fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq");
        let king = board.remove(sq("e1")).unwrap();
        board.put(sq("e1"), king.moved());
        assert!(!rules::can_castle(&board, sq("e1"), sq("h1")));
        assert!(movegen::valid_moves_for_piece(&board, sq("e1"), None)
            .iter()
            .all(|mv| !mv.is_castling));
    }

    #[test]
    fn test_promotion() {
        let board = fen("8/P6k/8/8/8/8/8/K7");
        let moves = movegen::valid_moves_for_piece(&board, sq("a7"), None);
        assert_eq!(moves.len(), 1);
        let promo = moves[0];
        assert_eq!(promo.promotion, Some(PieceKind::Queen));

        let mut after = board;
        after.execute_move(&promo);
        assert!(!rules::can_promote(&after, sq("a8")));
        let queen = after.get(sq("a8")).unwrap();
        assert_eq!(queen.kind, PieceKind::Queen);
        assert_eq!(queen.color, Color::White);
        assert!(queen.has_moved);

        let mut pawn_on_last = Board::empty();
        pawn_on_last.put(sq("c8"), Piece::new(PieceKind::Pawn, Color::White));
        assert!(rules::can_promote(&pawn_on_last, sq("c8")));
        assert!(!rules::can_promote(&pawn_on_last, sq("c7")));
    }

    #[test]
    fn test_insufficient_material() {
        assert!(rules::is_draw_by_insufficient_material(&fen("4k3/8/8/8/8/8/8/4K3")));
        assert!(rules::is_draw_by_insufficient_material(&fen("4k3/8/8/8/8/8/8/4KN2")));
        assert!(rules::is_draw_by_insufficient_material(&fen("4kb2/8/8/8/8/8/8/4K3")));
        assert!(!rules::is_draw_by_insufficient_material(&fen("4k3/8/8/8/8/8/8/4KR2")));
        assert!(!rules::is_draw_by_insufficient_material(&fen("4k3/8/8/8/8/8/8/4K2P")));
        assert!(!rules::is_draw_by_insufficient_material(&Board::new()));
    }

    #[test]
    fn test_piece_predicates() {
        let board = Board::new();
        assert!(rules::is_valid_knight_move(&board, sq("g1"), sq("f3")));
        assert!(!rules::is_valid_knight_move(&board, sq("g1"), sq("e2")));
        assert!(!rules::is_valid_bishop_move(&board, sq("c1"), sq("e3")));
        assert!(!rules::is_valid_rook_move(&board, sq("a1"), sq("a3")));
        assert!(rules::is_valid_pawn_move(&board, sq("e2"), sq("e4"), Color::White, None));
        assert!(!rules::is_valid_pawn_move(&board, sq("e2"), sq("e5"), Color::White, None));
        assert!(!rules::is_basic_move_legal(&board, sq("e2"), sq("e2"), None));
        assert!(!rules::is_basic_move_legal(&board, sq("e4"), sq("e5"), None));
        assert!(!rules::is_basic_move_legal(&board, Square::new(-1, 4), sq("e5"), None));

        let open = fen("4k3/8/8/8/3Q4/8/8/4K3");
        assert!(rules::is_valid_queen_move(&open, sq("d4"), sq("h8")));
        assert!(rules::is_valid_queen_move(&open, sq("d4"), sq("d8")));
        assert!(!rules::is_valid_queen_move(&open, sq("d4"), sq("e6")));
        assert!(!rules::is_path_clear(&open, sq("d4"), sq("e6")));
        assert!(rules::is_valid_king_move(&open, sq("e1"), sq("f2")));
        assert!(!rules::is_valid_king_move(&open, sq("e1"), sq("e3")));
    }

    #[test]
    fn test_attacks() {
        let board = fen("4k3/8/8/8/8/2n5/8/R3K3");
        assert!(rules::is_square_attacked(&board, sq("e2"), Color::Black));
        assert!(rules::is_square_attacked(&board, sq("a8"), Color::White));
        assert!(!rules::is_square_attacked(&board, sq("h8"), Color::White));
        assert!(!rules::is_king_in_check(&board, Color::White));

        let no_king = fen("8/8/8/8/8/8/8/R7");
        assert!(!rules::is_king_in_check(&no_king, Color::White));
    }
}
