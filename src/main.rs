use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use montebot::board::cozy::Position;
use montebot::search::mcts::{Mcts, SearchSettings};
use montebot::uci::UciEngine;

#[derive(Parser, Debug)]
#[command(author, version, about = "Monte-Carlo tree search chess engine", long_about = None)]
struct Args {
    /// Run a one-second search from the start position and print NPS
    #[arg(long)]
    bench: bool,

    /// Reserve extra move time for network lag when playing online
    #[arg(long)]
    online: bool,

    /// Path to a JSON file overriding the default search settings
    #[arg(long)]
    settings: Option<PathBuf>,
}

fn load_settings(path: Option<&PathBuf>) -> Result<SearchSettings> {
    match path {
        Some(p) => {
            let raw = std::fs::read_to_string(p)?;
            Ok(serde_json::from_str(&raw)?)
        }
        None => Ok(SearchSettings::default()),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let settings = load_settings(args.settings.as_ref())?;

    if args.bench {
        let mut pos = Position::startpos();
        let mut searcher = Mcts::new(settings);
        let start = Instant::now();
        let res = searcher.search(&mut pos, Duration::from_millis(1000));
        let nps = res.playouts as f64 / start.elapsed().as_secs_f64();
        println!("1 nodes {} nps", nps as u64);
        return Ok(());
    }

    println!("MonteBot {}", env!("CARGO_PKG_VERSION"));
    let mut engine = UciEngine::new(settings, args.online);
    engine.run_loop();
    Ok(())
}
