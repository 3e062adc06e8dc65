use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::board::{Color, Square};
use crate::game::Game;
use crate::rules::GameState;
use crate::search::{Difficulty, Search};
use crate::session::{Session, DEFAULT_SESSION_FILE};
use crate::view::{BoardView, MovesView, StatusView};

const HELP: &str = "\
commands:
  new                             start a new game
  difficulty <easy|medium|hard|off>  choose the engine, or play both sides yourself
  move <from> <to>                play a move, e.g. move e2 e4
  ai                              let the engine play the side to move
  undo                            take back the last move (and the engine's reply)
  board                           show the board
  status                          show the game state
  moves <square>                  list legal destinations of a piece
  history                         list the moves played
  save [file]                     save the game (default chess_session.json)
  load [file]                     restore a saved game and its engine setting
  json board|status|moves <sq>    print the board, state or piece moves as JSON
  help                            show this text
  quit                            leave";

/// Line-oriented front end. With an engine enabled, every human move is
/// answered automatically.
pub struct Console {
    game: Game,
    engine: Option<Search>,
    seed: Option<u64>,
}

impl Console {
    pub fn new(difficulty: Option<Difficulty>, seed: Option<u64>) -> Self {
        let mut console = Console {
            game: Game::new(),
            engine: None,
            seed,
        };
        console.set_engine(difficulty);
        console
    }

    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        writeln!(stdout, "{}\ntype help for commands", self.board_text())?;
        write!(stdout, "> ")?;
        stdout.flush()?;

        for line in stdin.lock().lines() {
            let line = line.context("failed to read from stdin")?;
            let command = line.trim();
            if command == "quit" || command == "exit" {
                break;
            }

            match self.handle_command(command) {
                Ok(reply) if reply.is_empty() => {}
                Ok(reply) => writeln!(stdout, "{}", reply)?,
                Err(e) => writeln!(stdout, "error: {:#}", e)?,
            }
            write!(stdout, "> ")?;
            stdout.flush()?;
        }
        Ok(())
    }

    pub fn handle_command(&mut self, command: &str) -> Result<String> {
        let parts: Vec<&str> = command.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(String::new());
        }

        match parts[0] {
            "new" => Ok(self.handle_new()),
            "difficulty" => self.handle_difficulty(&parts[1..]),
            "move" => self.handle_move(&parts[1..]),
            "ai" => self.handle_ai(),
            "undo" => self.handle_undo(),
            "board" => Ok(self.board_text()),
            "status" => Ok(self.status_text()),
            "moves" => self.handle_moves(&parts[1..]),
            "history" => Ok(self.history_text()),
            "save" => self.handle_save(parts.get(1).copied()),
            "load" => self.load_session(parts.get(1).copied().unwrap_or(DEFAULT_SESSION_FILE)),
            "json" => self.handle_json(&parts[1..]),
            "help" => Ok(HELP.to_string()),
            "quit" | "exit" => Ok(String::new()),
            other => bail!("unknown command {:?}, type help for a list", other),
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn engine(&self) -> Option<&Search> {
        self.engine.as_ref()
    }

    /// Replaces the current game with the one saved at `path`. The engine
    /// setting comes from the file; the seed stays the console's.
    pub fn load_session(&mut self, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let session = Session::load(path)
            .with_context(|| format!("failed to read session {}", path.display()))?;
        self.game = session
            .replay()
            .with_context(|| format!("failed to restore session {}", path.display()))?;
        self.set_engine(session.engine);
        Ok(format!(
            "loaded {} moves from {}\n{}",
            session.moves.len(),
            path.display(),
            self.board_text()
        ))
    }

    fn set_engine(&mut self, difficulty: Option<Difficulty>) {
        self.engine = difficulty.map(|difficulty| match self.seed {
            Some(seed) => Search::with_seed(difficulty, seed),
            None => Search::new(difficulty),
        });
    }

    fn handle_new(&mut self) -> String {
        self.game.reset();
        format!("new game\n{}", self.board_text())
    }

    fn handle_difficulty(&mut self, args: &[&str]) -> Result<String> {
        let Some(&arg) = args.first() else {
            return Ok(match self.engine.as_ref().and_then(Search::difficulty) {
                Some(difficulty) => format!("difficulty is {}", difficulty),
                None => "engine is off".to_string(),
            });
        };
        if arg == "off" {
            self.engine = None;
            return Ok("engine off, you play both sides".to_string());
        }

        let difficulty: Difficulty = arg.parse()?;
        match self.engine.as_mut() {
            Some(engine) => engine.set_difficulty(difficulty),
            None => self.set_engine(Some(difficulty)),
        }
        Ok(format!("difficulty set to {}", difficulty))
    }

    fn handle_move(&mut self, args: &[&str]) -> Result<String> {
        let [from, to] = args else {
            bail!("usage: move <from> <to>");
        };
        let from: Square = from.parse()?;
        let to: Square = to.parse()?;

        let mover = self.game.side_to_move();
        let mv = self.game.make_move(from, to)?;
        let mut reply = format!("{} played {}", mover, mv.to_algebraic());

        if self.engine.is_some() && !self.game.is_over() {
            reply.push('\n');
            reply.push_str(&self.engine_reply()?);
        }
        reply.push('\n');
        reply.push_str(&self.board_text());
        Ok(reply)
    }

    fn handle_ai(&mut self) -> Result<String> {
        if self.engine.is_none() {
            bail!("engine is off, choose a difficulty first");
        }
        let reply = self.engine_reply()?;
        Ok(format!("{}\n{}", reply, self.board_text()))
    }

    fn engine_reply(&mut self) -> Result<String> {
        if self.game.is_over() {
            bail!("the game is over");
        }
        let Some(engine) = self.engine.as_mut() else {
            bail!("engine is off");
        };
        let side = self.game.side_to_move();
        let mv = engine
            .best_move(self.game.board(), side, self.game.last_move())
            .with_context(|| format!("{} has no legal move", side))?;
        let mv = self.game.make_move(mv.from, mv.to)?;
        Ok(format!("engine ({}) played {}", side, mv.to_algebraic()))
    }

    fn handle_undo(&mut self) -> Result<String> {
        let Some(first) = self.game.undo() else {
            bail!("nothing to undo");
        };
        let mut undone = vec![first];

        // Take back the human move as well, so the same side is to move again.
        if self.engine.is_some() {
            if let Some(second) = self.game.undo() {
                undone.push(second);
            }
        }

        let names: Vec<String> = undone.iter().map(|mv| mv.to_algebraic()).collect();
        Ok(format!("took back {}\n{}", names.join(", "), self.board_text()))
    }

    fn handle_moves(&self, args: &[&str]) -> Result<String> {
        let [square] = args else {
            bail!("usage: moves <square>");
        };
        let from: Square = square.parse()?;
        let moves = self.game.valid_moves_from(from);
        if moves.is_empty() {
            return Ok(format!("no legal moves from {}", from));
        }
        let names: Vec<String> = moves.iter().map(|mv| mv.to_algebraic()).collect();
        Ok(names.join(" "))
    }

    fn handle_save(&self, path: Option<&str>) -> Result<String> {
        let path = path.unwrap_or(DEFAULT_SESSION_FILE);
        let engine = self.engine.as_ref().and_then(Search::difficulty);
        Session::capture(&self.game, engine)
            .save(path)
            .with_context(|| format!("failed to save session {}", path))?;
        Ok(format!("saved {} moves to {}", self.game.history().len(), path))
    }

    fn handle_json(&self, args: &[&str]) -> Result<String> {
        let json = match args {
            ["board"] => serde_json::to_string(&BoardView::new(self.game.board()))?,
            ["status"] => serde_json::to_string(&StatusView::new(&self.game))?,
            ["moves", square] => {
                let from: Square = square.parse()?;
                serde_json::to_string(&MovesView::new(&self.game, from))?
            }
            _ => bail!("usage: json board|status|moves <square>"),
        };
        Ok(json)
    }

    fn board_text(&self) -> String {
        format!("{}\n{} to move", self.game.board(), self.game.side_to_move())
    }

    fn status_text(&self) -> String {
        let mut text = match self.game.state() {
            GameState::Ongoing => format!("{} to move", self.game.side_to_move()),
            GameState::Check(color) => format!("{} is in check", color),
            GameState::Checkmate(winner) => format!("checkmate, {} wins", winner),
            GameState::Stalemate => "stalemate".to_string(),
            GameState::InsufficientMaterial => "draw by insufficient material".to_string(),
        };
        let _ = write!(text, "\nmoves played: {}", self.game.move_count());

        for color in [Color::White, Color::Black] {
            let lost: String = self.game.board().captured(color).iter().map(|p| p.symbol()).collect();
            if !lost.is_empty() {
                let _ = write!(text, "\n{} lost: {}", color, lost);
            }
        }

        match &self.engine {
            Some(engine) => {
                let stats = engine.stats();
                let level = engine.difficulty().map_or("custom".to_string(), |d| d.to_string());
                let _ = write!(
                    text,
                    "\nengine: {}, last search {} nodes, cache hit rate {:.1}%",
                    level,
                    stats.nodes_evaluated,
                    engine.cache_hit_rate()
                );
            }
            None => text.push_str("\nengine: off"),
        }
        text
    }

    fn history_text(&self) -> String {
        let history = self.game.history();
        if history.is_empty() {
            return "no moves yet".to_string();
        }
        history
            .iter()
            .collect::<Vec<_>>()
            .chunks(2)
            .enumerate()
            .map(|(i, pair)| {
                let plies: Vec<String> = pair.iter().map(|mv| mv.to_algebraic()).collect();
                format!("{}. {}", i + 1, plies.join(" "))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_player_moves() {
        let mut console = Console::new(None, None);
        let reply = console.handle_command("move e2 e4").unwrap();
        assert!(reply.starts_with("White played e4"));

        console.handle_command("move e7 e5").unwrap();
        assert_eq!(console.handle_command("history").unwrap(), "1. e4 e5");
        assert_eq!(console.game().move_count(), 2);
    }

    #[test]
    fn bad_input_is_an_error_not_a_panic() {
        let mut console = Console::new(None, None);
        assert!(console.handle_command("move e2").is_err());
        assert!(console.handle_command("move e2 z9").is_err());
        assert!(console.handle_command("move e2 e5").is_err());
        assert!(console.handle_command("difficulty expert").is_err());
        assert!(console.handle_command("ai").is_err());
        assert!(console.handle_command("undo").is_err());
        assert!(console.handle_command("castle").is_err());
        assert_eq!(console.handle_command("   ").unwrap(), "");
        assert_eq!(console.game().move_count(), 0);
    }

    #[test]
    fn engine_answers_and_undo_takes_back_both() {
        let mut console = Console::new(Some(Difficulty::Easy), Some(42));
        let reply = console.handle_command("move d2 d4").unwrap();
        assert!(reply.contains("engine (Black) played"));
        assert_eq!(console.game().move_count(), 2);
        assert_eq!(console.game().side_to_move(), Color::White);

        console.handle_command("undo").unwrap();
        assert_eq!(console.game().move_count(), 0);
    }

    #[test]
    fn listing_moves() {
        let mut console = Console::new(None, None);
        assert_eq!(console.handle_command("moves e2").unwrap(), "e3 e4");
        assert_eq!(console.handle_command("moves e7").unwrap(), "no legal moves from e7");
        assert_eq!(console.handle_command("moves g1").unwrap(), "Nf3 Nh3");
    }

    #[test]
    fn difficulty_switching() {
        let mut console = Console::new(None, Some(1));
        assert_eq!(console.handle_command("difficulty").unwrap(), "engine is off");
        console.handle_command("difficulty medium").unwrap();
        assert_eq!(console.engine().and_then(Search::difficulty), Some(Difficulty::Medium));
        console.handle_command("difficulty off").unwrap();
        assert!(console.engine().is_none());
    }

    #[test]
    fn status_reports_the_result() {
        let mut console = Console::new(None, None);
        for command in ["move f2 f3", "move e7 e5", "move g2 g4", "move d8 h4"] {
            console.handle_command(command).unwrap();
        }
        let status = console.handle_command("status").unwrap();
        assert!(status.starts_with("checkmate, Black wins"));
        assert!(console.handle_command("move a2 a3").is_err());
    }

    #[test]
    fn json_commands() {
        let mut console = Console::new(None, None);
        console.handle_command("move e2 e4").unwrap();
        assert_eq!(
            console.handle_command("json status").unwrap(),
            r#"{"currentPlayer":"Black","isGameOver":false,"isCheck":false,"isCheckmate":false,"moveCount":1}"#
        );
        assert_eq!(
            console.handle_command("json moves b8").unwrap(),
            r#"{"moves":[{"to":"a6"},{"to":"c6"}]}"#
        );
        let board = console.handle_command("json board").unwrap();
        assert!(board.starts_with(r#"{"squares":[{"row":7,"col":0,"#));
        assert!(console.handle_command("json").is_err());
        assert!(console.handle_command("json moves z9").is_err());
    }

    #[test]
    fn save_then_load_restores_game_and_engine() {
        let path = std::env::temp_dir()
            .join(format!("minimax-chess-console-{}.json", std::process::id()));
        let path_text = path.to_str().unwrap();

        let mut console = Console::new(None, Some(3));
        for command in ["move e2 e4", "move e7 e5", "move g1 f3"] {
            console.handle_command(command).unwrap();
        }
        console.handle_command("difficulty medium").unwrap();
        assert_eq!(
            console.handle_command(&format!("save {}", path_text)).unwrap(),
            format!("saved 3 moves to {}", path_text)
        );

        let mut restored = Console::new(None, None);
        let reply = restored.handle_command(&format!("load {}", path_text)).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(reply.starts_with("loaded 3 moves"));
        assert_eq!(restored.game().board(), console.game().board());
        assert_eq!(restored.game().side_to_move(), Color::Black);
        assert_eq!(restored.handle_command("history").unwrap(), "1. e4 e5\n2. Nf3");
        assert_eq!(restored.engine().and_then(Search::difficulty), Some(Difficulty::Medium));

        assert!(restored.handle_command(&format!("load {}", path_text)).is_err());
        assert_eq!(restored.game().move_count(), 3);
    }
}
