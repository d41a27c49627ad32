use std::io::{self, BufRead};
use std::time::Duration;

use cozy_chess::Color;

use crate::board::cozy::Position;
use crate::search::mcts::{Mcts, SearchSettings};
use crate::search::timeman;

/// Budget used for `go infinite`.
const INFINITE_MS: u64 = 1_000_000_000;

pub struct UciEngine {
    pos: Position,
    searcher: Mcts,
    online: bool,
}

impl UciEngine {
    pub fn new(mut settings: SearchSettings, online: bool) -> Self {
        // Progress lines are protocol output in a UCI session.
        settings.report = true;
        Self { pos: Position::startpos(), searcher: Mcts::new(settings), online }
    }

    fn cmd_uci(&self) {
        println!("id name MonteBot {}", env!("CARGO_PKG_VERSION"));
        println!("id author MonteBot Team");
        println!(
            "option name Exploration type string default {:.3}",
            self.searcher.settings().exploration
        );
        println!("option name Seed type string default <empty>");
        println!("uciok");
    }

    fn cmd_isready(&self) {
        println!("readyok");
    }

    fn cmd_ucinewgame(&mut self) {
        self.pos = Position::startpos();
    }

    fn cmd_position(&mut self, args: &str) {
        // Supports: 'position startpos [moves ...]' and 'position fen <fen> [moves ...]'
        let mut tokens = args.split_whitespace();
        match tokens.next() {
            Some("startpos") => {
                self.pos = Position::startpos();
            }
            Some("fen") => {
                let fen_fields: Vec<&str> = tokens.by_ref().take(6).collect();
                if fen_fields.len() == 6 {
                    let fen = fen_fields.join(" ");
                    if let Ok(p) = Position::from_fen(&fen) {
                        self.pos = p;
                    }
                }
            }
            _ => return,
        }
        if let Some("moves") = tokens.next() {
            for mv in tokens {
                if self.pos.make_move_uci(mv).is_err() {
                    log::warn!("ignoring illegal move in position command: {mv}");
                    break;
                }
            }
        }
    }

    fn cmd_setoption(&mut self, args: &str) {
        let tokens: Vec<&str> = args.split_whitespace().collect();
        let Some(value_at) = tokens.iter().position(|t| *t == "value") else { return };
        if tokens.first() != Some(&"name") {
            return;
        }
        let name = tokens[1..value_at].join(" ");
        let value = tokens[value_at + 1..].join(" ");
        match name.as_str() {
            "Exploration" => {
                if let Ok(c) = value.parse::<f64>() {
                    self.searcher.set_exploration(c);
                }
            }
            "Seed" => {
                if let Ok(seed) = value.parse::<u64>() {
                    self.searcher.set_seed(Some(seed));
                }
            }
            _ => {}
        }
    }

    fn cmd_go(&mut self, args: &str) {
        let mut wtime = 0u64;
        let mut btime = 0u64;
        let mut winc = 0u64;
        let mut binc = 0u64;
        let mut movetime: Option<u64> = None;
        let mut infinite = false;

        let mut tokens = args.split_whitespace();
        while let Some(tok) = tokens.next() {
            match tok {
                "wtime" => wtime = tokens.next().and_then(|s| s.parse().ok()).unwrap_or(0),
                "btime" => btime = tokens.next().and_then(|s| s.parse().ok()).unwrap_or(0),
                "winc" => winc = tokens.next().and_then(|s| s.parse().ok()).unwrap_or(0),
                "binc" => binc = tokens.next().and_then(|s| s.parse().ok()).unwrap_or(0),
                "movetime" => movetime = tokens.next().and_then(|s| s.parse().ok()),
                "infinite" => infinite = true,
                _ => {}
            }
        }

        let budget_ms = if infinite {
            INFINITE_MS
        } else if let Some(ms) = movetime {
            ms
        } else {
            let (left, inc) = match self.pos.side_to_move() {
                Color::White => (wtime, winc),
                Color::Black => (btime, binc),
            };
            timeman::allocate(left, inc, self.online)
        };

        let res = self.searcher.search(&mut self.pos, Duration::from_millis(budget_ms));
        match res.best {
            Some(best) => println!("bestmove {}", best),
            None => println!("bestmove 0000"),
        }
    }

    pub fn run_loop(&mut self) {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(s) => s.trim().to_string(),
                Err(_) => break,
            };
            if line.is_empty() { continue; }
            if line == "uci" { self.cmd_uci(); continue; }
            if line == "isready" { self.cmd_isready(); continue; }
            if line == "ucinewgame" { self.cmd_ucinewgame(); continue; }
            if line == "quit" { break; }
            if let Some(rest) = line.strip_prefix("position ") { self.cmd_position(rest); continue; }
            if let Some(rest) = line.strip_prefix("setoption ") { self.cmd_setoption(rest); continue; }
            if let Some(rest) = line.strip_prefix("go ") { self.cmd_go(rest); continue; }
            if line == "go" { self.cmd_go(""); continue; }
            // 'stop' is only meaningful between searches in this design.
            if line == "stop" { continue; }
        }
    }
}
