use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::board::{Board, Color, PieceKind};
use crate::error::ParseDifficultyError;
use crate::evaluation::Evaluator;
use crate::movegen;
use crate::moves::Move;
use crate::rules;
use crate::transposition::{BoardKey, TranspositionTable};

/// Magnitude of a checkmate score before the remaining depth is applied.
pub const MATE_SCORE: i32 = 20_000;
/// Window bound, far outside any reachable score.
pub const INFINITY: i32 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn config(self) -> DifficultyConfig {
        match self {
            Difficulty::Easy => DifficultyConfig {
                depth: 2,
                use_transposition_table: false,
                use_full_evaluation: false,
                randomness: 30,
            },
            Difficulty::Medium => DifficultyConfig {
                depth: 4,
                use_transposition_table: true,
                use_full_evaluation: true,
                randomness: 10,
            },
            Difficulty::Hard => DifficultyConfig {
                depth: 6,
                use_transposition_table: true,
                use_full_evaluation: true,
                randomness: 0,
            },
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ParseDifficultyError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyConfig {
    pub depth: u32,
    pub use_transposition_table: bool,
    /// Full five-term evaluation at the leaves, material only otherwise.
    pub use_full_evaluation: bool,
    /// Chance in percent of playing a uniformly random legal move instead of searching.
    pub randomness: u8,
}

/// Counters for one `best_move` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes_evaluated: u64,
    pub cache_hits: u64,
    pub pruned_branches: u64,
    pub depth: u32,
    /// Root score of the chosen move; `None` when it was picked at random.
    pub score: Option<i32>,
}

/// Score of a node whose side to move is checkmated, `depth` plies above the floor.
/// Positive when the minimizing side is mated.
pub fn mate_score(maximizing: bool, depth: u32) -> i32 {
    if maximizing {
        -MATE_SCORE + depth as i32
    } else {
        MATE_SCORE - depth as i32
    }
}

pub struct Search {
    evaluator: Evaluator,
    transposition_table: TranspositionTable,
    difficulty: Option<Difficulty>,
    config: DifficultyConfig,
    rng: StdRng,
    stats: SearchStats,
}

impl Search {
    pub fn new(difficulty: Difficulty) -> Self {
        Self::build(Some(difficulty), difficulty.config(), StdRng::from_entropy())
    }

    /// Fixed seed, so random weak-play picks are reproducible.
    pub fn with_seed(difficulty: Difficulty, seed: u64) -> Self {
        Self::build(Some(difficulty), difficulty.config(), StdRng::seed_from_u64(seed))
    }

    pub fn with_config(config: DifficultyConfig, seed: u64) -> Self {
        Self::build(None, config, StdRng::seed_from_u64(seed))
    }

    fn build(difficulty: Option<Difficulty>, config: DifficultyConfig, rng: StdRng) -> Self {
        Self {
            evaluator: Evaluator::new(),
            transposition_table: TranspositionTable::default(),
            difficulty,
            config,
            rng,
            stats: SearchStats::default(),
        }
    }

    /// Picks a move for `color`, or `None` when it has no legal move.
    pub fn best_move(&mut self, board: &Board, color: Color, last_move: Option<&Move>) -> Option<Move> {
        let config = self.config;
        self.reset_statistics();
        self.stats.depth = config.depth;

        let board = *board;
        let mut moves = movegen::all_valid_moves(&board, color, last_move);
        if moves.is_empty() {
            debug!("{} has no legal moves", color);
            return None;
        }

        if config.randomness > 0 && self.rng.gen_range(0..100u32) < u32::from(config.randomness) {
            let mv = *moves.choose(&mut self.rng)?;
            debug!("random move {} for {}", mv, color);
            return Some(mv);
        }

        self.order_moves(&mut moves);

        let mut best_move = moves[0];
        let mut best_score = -INFINITY;
        let mut alpha = -INFINITY;
        let beta = INFINITY;
        let child_depth = config.depth.saturating_sub(1);

        for mv in &moves {
            let mut next = board;
            next.execute_move(mv);

            let score = self.minimax(&next, child_depth, alpha, beta, false, color, Some(mv), &config);
            debug!("{} scored {}", mv, score);

            if score > best_score {
                best_score = score;
                best_move = *mv;
            }
            alpha = alpha.max(score);
        }

        self.stats.score = Some(best_score);
        info!(
            "{} chose {} (score {}, depth {}, nodes {}, cache hits {}, pruned {}, hit rate {:.1}%)",
            color,
            best_move,
            best_score,
            config.depth,
            self.stats.nodes_evaluated,
            self.stats.cache_hits,
            self.stats.pruned_branches,
            self.cache_hit_rate()
        );
        Some(best_move)
    }

    /// Alpha-beta minimax. Scores are always from `root_color`'s point of view;
    /// `maximizing` says whether `root_color` is to move at this node.
    ///
    /// A cache hit returns immediately, before mate or stalemate detection.
    #[allow(clippy::too_many_arguments)]
    pub fn minimax(
        &mut self,
        board: &Board,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
        root_color: Color,
        last_move: Option<&Move>,
        config: &DifficultyConfig,
    ) -> i32 {
        self.stats.nodes_evaluated += 1;

        if depth == 0 {
            return self.leaf_score(board, root_color, config);
        }

        let key = if config.use_transposition_table {
            let key = BoardKey::new(board);
            if let Some(score) = self.transposition_table.lookup(&key) {
                self.stats.cache_hits += 1;
                return score;
            }
            Some(key)
        } else {
            None
        };

        let side = if maximizing { root_color } else { root_color.opposite() };
        let moves = movegen::all_valid_moves(board, side, last_move);

        // No moves: checkmate if in check, stalemate otherwise.
        if moves.is_empty() {
            if !rules::is_king_in_check(board, side) {
                return 0;
            }
            return mate_score(maximizing, depth);
        }

        let mut best_score = if maximizing { -INFINITY } else { INFINITY };
        for mv in &moves {
            let mut next = *board;
            next.execute_move(mv);

            let score = self.minimax(&next, depth - 1, alpha, beta, !maximizing, root_color, Some(mv), config);
            if maximizing {
                best_score = best_score.max(score);
                alpha = alpha.max(score);
            } else {
                best_score = best_score.min(score);
                beta = beta.min(score);
            }

            if beta <= alpha {
                self.stats.pruned_branches += 1;
                break;
            }
        }

        if let Some(key) = key {
            self.transposition_table.store(key, best_score);
        }
        best_score
    }

    fn leaf_score(&self, board: &Board, root_color: Color, config: &DifficultyConfig) -> i32 {
        if config.use_full_evaluation {
            return self.evaluator.evaluate(board, root_color);
        }
        let material = self.evaluator.evaluate_material(board);
        match root_color {
            Color::White => material,
            Color::Black => -material,
        }
    }

    /// Stable sort by a static guess: captures by victim value, then
    /// promotions, castles and central destinations.
    pub fn order_moves(&self, moves: &mut [Move]) {
        moves.sort_by_key(|mv| Reverse(self.move_order_score(mv)));
    }

    fn move_order_score(&self, mv: &Move) -> i32 {
        let mut score = 0;
        if mv.is_capture() {
            let victim = mv.captured.unwrap_or(PieceKind::Pawn);
            score += 10 + self.evaluator.piece_value(victim) / 10;
        }
        if mv.is_promotion() {
            score += 9;
        }
        if mv.is_castling {
            score += 5;
        }
        if (3..=4).contains(&mv.to.row) && (3..=4).contains(&mv.to.col) {
            score += 1;
        }
        score
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = Some(difficulty);
        self.config = difficulty.config();
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    pub fn config(&self) -> &DifficultyConfig {
        &self.config
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Cumulative over the cache's lifetime, reset only when it is cleared.
    pub fn cache_hit_rate(&self) -> f32 {
        self.transposition_table.hit_rate()
    }

    pub fn reset_statistics(&mut self) {
        self.stats = SearchStats::default();
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }
}
