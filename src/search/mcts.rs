use cozy_chess::{Color, Move};
use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::board::cozy::Position;
use crate::search::eval::{Evaluator, MaterialEvaluator};
use crate::search::priority::score_move;

/// Which child-selection formula drives the descent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionPolicy {
    /// value/visits + C * sqrt(ln(parent visits) / visits)
    Ucb1,
    /// value/visits + C * prior * sqrt(parent visits) / (1 + visits)
    Puct,
}

/// All search tunables in one place so independent searches never share state.
/// Serde-deserializable so a settings file can override any of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub policy: SelectionPolicy,
    /// Exploration constant C in the selection formula.
    pub exploration: f64,
    /// Hard playout cap, the safety valve independent of the clock.
    pub max_playouts: u64,
    /// Playouts between wall-clock checks.
    pub check_interval: u64,
    /// Playouts between `info` progress lines.
    pub report_interval: u64,
    /// Emit UCI `info` progress lines on stdout.
    pub report: bool,
    /// Fixed rollout RNG seed; None seeds from entropy.
    pub seed: Option<u64>,
    /// Depth at which rollouts always stop on the evaluator.
    pub max_rollout_depth: u32,
    /// Below this depth rollout moves are sampled from the top third by
    /// priority score; past it, uniformly from all legal moves.
    pub guided_rollout_depth: u32,
    /// Constant probability of an evaluation cutoff at any rollout depth.
    pub eval_cutoff_noise: f64,
    /// Added cutoff probability, divided by the remaining depth budget.
    pub eval_cutoff_ramp: f64,
    /// Piece count at or below which the fast material estimate may end a
    /// rollout early.
    pub low_material_pieces: u32,
    /// Magnitude the fast estimate must exceed to be trusted as an outcome.
    pub material_cutoff: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            policy: SelectionPolicy::Puct,
            exploration: std::f64::consts::SQRT_2,
            max_playouts: 50_000,
            check_interval: 1_000,
            report_interval: 3_000,
            report: false,
            seed: None,
            max_rollout_depth: 30,
            guided_rollout_depth: 20,
            eval_cutoff_noise: 0.02,
            eval_cutoff_ramp: 0.5,
            low_material_pieces: 16,
            material_cutoff: 0.6,
        }
    }
}

// Non-linear remap of evaluator output used at rollout cutoffs: mid-confidence
// scores are stretched, near-certain ones compressed. Piecewise linear with
// f(0) = 0 and f(1) = 1.
pub const RESCALE_MID_LO: f64 = 0.5;
pub const RESCALE_MID_HI: f64 = 0.8;
pub const RESCALE_MID_SLOPE: f64 = 1.5;
pub const RESCALE_HIGH_SLOPE: f64 = 0.25;

pub fn rescale_eval(v: f64) -> f64 {
    let a = v.abs().min(1.0);
    let mapped = if a <= RESCALE_MID_LO {
        a
    } else if a <= RESCALE_MID_HI {
        RESCALE_MID_LO + (a - RESCALE_MID_LO) * RESCALE_MID_SLOPE
    } else {
        RESCALE_MID_LO
            + (RESCALE_MID_HI - RESCALE_MID_LO) * RESCALE_MID_SLOPE
            + (a - RESCALE_MID_HI) * RESCALE_HIGH_SLOPE
    };
    mapped.min(1.0).copysign(v)
}

/// Average value converted to the centipawn-like integer scale reported to
/// the caller (+10000 = certain win for the mover).
pub fn to_cp(visits: u32, value_sum: f64) -> i32 {
    if visits == 0 {
        return 0;
    }
    (value_sum / visits as f64 * 10_000.0).round() as i32
}

type NodeId = u32;
const ROOT: NodeId = 0;

/// One tree position. `value_sum` is from the perspective of the side that
/// played `mv`; the root carries the null-move sentinel `mv == None`.
struct Node {
    mv: Option<Move>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    visits: u32,
    value_sum: f64,
    prior: f64,
}

/// Arena of nodes indexed by `NodeId`. Parent links are indices, never owning;
/// teardown is dropping the vector.
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn new() -> Self {
        Self {
            nodes: vec![Node {
                mv: None,
                parent: None,
                children: Vec::new(),
                visits: 0,
                value_sum: 0.0,
                prior: 1.0,
            }],
        }
    }

    fn alloc(&mut self, mv: Move, parent: NodeId, prior: f64) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(Node {
            mv: Some(mv),
            parent: Some(parent),
            children: Vec::new(),
            visits: 0,
            value_sum: 0.0,
            prior,
        });
        self.nodes[parent as usize].children.push(id);
        id
    }
}

/// Result of one `search` call. `best == None` is the null-move sentinel: the
/// root position has no legal reply and the game is over.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub best: Option<Move>,
    pub score_cp: i32,
    pub playouts: u64,
}

/// Monte-Carlo tree searcher. One live tree and board per `search` call; the
/// tree is rebuilt from scratch every move.
pub struct Mcts {
    settings: SearchSettings,
    evaluator: Box<dyn Evaluator>,
    rng: SmallRng,
    tree: Tree,
    playouts: u64,
}

impl Default for Mcts {
    fn default() -> Self {
        Self::new(SearchSettings::default())
    }
}

impl Mcts {
    pub fn new(settings: SearchSettings) -> Self {
        Self::with_evaluator(settings, Box::new(MaterialEvaluator))
    }

    pub fn with_evaluator(settings: SearchSettings, evaluator: Box<dyn Evaluator>) -> Self {
        let rng = match settings.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self { settings, evaluator, rng, tree: Tree::new(), playouts: 0 }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    pub fn set_exploration(&mut self, c: f64) {
        self.settings.exploration = c;
    }

    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.settings.seed = seed;
    }

    /// Run playouts until the wall-clock budget or the playout cap is hit and
    /// return the most-visited root move. The board is mutated during each
    /// playout but restored before this returns.
    pub fn search(&mut self, pos: &mut Position, budget: Duration) -> SearchOutcome {
        let start = Instant::now();
        self.tree = Tree::new();
        self.playouts = 0;
        // Reseed per search so a fixed seed reproduces the whole search, not
        // just the first one.
        self.rng = match self.settings.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let mut last_check = 0u64;

        while self.playouts < self.settings.max_playouts {
            if self.playouts - last_check >= self.settings.check_interval {
                if start.elapsed() >= budget {
                    break;
                }
                last_check = self.playouts;
                if self.settings.report && self.playouts % self.settings.report_interval == 0 {
                    self.report_progress(start);
                }
            }
            self.select(ROOT, pos);
            self.playouts += 1;
            if self.tree.nodes[ROOT as usize].children.is_empty() {
                // Terminal root: no decision to refine.
                break;
            }
        }

        let mut best: Option<Move> = None;
        let mut best_visits = 0u32;
        let mut score_cp = 0;
        let root = &self.tree.nodes[ROOT as usize];
        for &c in &root.children {
            let child = &self.tree.nodes[c as usize];
            if child.visits > best_visits {
                best_visits = child.visits;
                best = child.mv;
                score_cp = to_cp(child.visits, child.value_sum);
            }
        }
        debug!(
            "search done: {} playouts in {:?}, best {:?} cp {}",
            self.playouts,
            start.elapsed(),
            best,
            score_cp
        );
        SearchOutcome { best, score_cp, playouts: self.playouts }
    }

    fn selection_value(&self, id: NodeId, parent_visits: u32) -> f64 {
        let node = &self.tree.nodes[id as usize];
        if node.visits == 0 {
            // Unvisited children outrank every visited sibling.
            return f64::INFINITY;
        }
        let q = node.value_sum / node.visits as f64;
        let c = self.settings.exploration;
        match self.settings.policy {
            SelectionPolicy::Ucb1 => {
                q + c * ((parent_visits.max(1) as f64).ln() / node.visits as f64).sqrt()
            }
            SelectionPolicy::Puct => {
                q + c * node.prior * (parent_visits as f64).sqrt() / (1.0 + node.visits as f64)
            }
        }
    }

    // Phase 1: descend to a frontier node, expand it, and run one simulation.
    // The node's own move is applied around the whole descent and undone on
    // every path out.
    fn select(&mut self, id: NodeId, pos: &mut Position) {
        let mv = self.tree.nodes[id as usize].mv;
        if let Some(m) = mv {
            pos.make(m);
        }

        if self.tree.nodes[id as usize].children.is_empty() {
            self.expand(id, pos);
            let n_children = self.tree.nodes[id as usize].children.len();
            if n_children == 0 {
                // Terminal node: score it directly.
                let score = -self.simulate(pos, 0);
                self.backpropagate(id, score);
            } else {
                let pick = self.tree.nodes[id as usize].children
                    [self.rng.gen_range(0..n_children)];
                if let Some(cm) = self.tree.nodes[pick as usize].mv {
                    pos.make(cm);
                    let score = -self.simulate(pos, 0);
                    pos.unmake();
                    self.backpropagate(pick, score);
                }
            }
        } else {
            let parent_visits = self.tree.nodes[id as usize].visits;
            let n_children = self.tree.nodes[id as usize].children.len();
            let mut best_id = self.tree.nodes[id as usize].children[0];
            let mut best_value = f64::NEG_INFINITY;
            for i in 0..n_children {
                let c = self.tree.nodes[id as usize].children[i];
                let v = self.selection_value(c, parent_visits);
                if v > best_value {
                    best_value = v;
                    best_id = c;
                }
            }
            self.select(best_id, pos);
        }

        if mv.is_some() {
            pos.unmake();
        }
    }

    // Phase 2: one child per legal move with a normalized prior. Childless
    // afterwards means the node is terminal.
    fn expand(&mut self, id: NodeId, pos: &Position) {
        if pos.is_game_over() {
            return;
        }
        let moves = pos.legal_moves();
        if moves.is_empty() {
            return;
        }
        let scores: Vec<f64> = moves.iter().map(|&m| score_move(pos.board(), m)).collect();
        let total: f64 = scores.iter().sum();
        let uniform = 1.0 / moves.len() as f64;
        for (&m, &s) in moves.iter().zip(scores.iter()) {
            // Degenerate-score guard: fall back to uniform priors.
            let prior = if total > 0.0 { s / total } else { uniform };
            self.tree.alloc(m, id, prior);
        }
    }

    // Phase 3: play forward until a terminal state or an evaluation cutoff.
    // Returns a score in [-1, 1] from the perspective of the side to move.
    fn simulate(&mut self, pos: &mut Position, depth: u32) -> f64 {
        let side = if pos.side_to_move() == Color::White { 1.0 } else { -1.0 };

        if pos.king_missing(Color::Black) {
            return side;
        }
        if pos.king_missing(Color::White) {
            return -side;
        }
        if pos.is_repetition() || pos.halfmove_clock() >= 100 {
            return 0.0;
        }

        // Low-material positions with a confident material verdict end here,
        // cutting off long endgame rollouts.
        if pos.piece_count() <= self.settings.low_material_pieces {
            let m = self.evaluator.fast_evaluate(pos.board());
            if m.abs() > self.settings.material_cutoff {
                return m * side;
            }
        }

        let cutoff = if depth >= self.settings.max_rollout_depth {
            true
        } else {
            let remaining = (self.settings.max_rollout_depth - depth) as f64;
            let p = self.settings.eval_cutoff_noise + self.settings.eval_cutoff_ramp / remaining;
            self.rng.gen::<f64>() < p
        };
        if cutoff {
            return rescale_eval(self.evaluator.evaluate(pos.board())) * side;
        }

        let moves = pos.legal_moves();
        if moves.is_empty() {
            // Legal movegen: no replies is checkmate or stalemate.
            return if pos.in_check() { -1.0 } else { 0.0 };
        }

        let mv = if depth < self.settings.guided_rollout_depth {
            let mut scored: Vec<(f64, Move)> =
                moves.iter().map(|&m| (score_move(pos.board(), m), m)).collect();
            scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
            let pool = (scored.len() / 3).max(1);
            scored[self.rng.gen_range(0..pool)].1
        } else {
            moves[self.rng.gen_range(0..moves.len())]
        };

        pos.make(mv);
        let score = -self.simulate(pos, depth + 1);
        pos.unmake();
        score
    }

    // Phase 4: add the score and a visit along the path to the root, flipping
    // the sign each ply. Sole writer of node statistics.
    fn backpropagate(&mut self, id: NodeId, mut score: f64) {
        let mut cur = Some(id);
        while let Some(i) = cur {
            let node = &mut self.tree.nodes[i as usize];
            node.value_sum += score;
            node.visits += 1;
            score = -score;
            cur = node.parent;
        }
    }

    fn report_progress(&self, start: Instant) {
        let root = &self.tree.nodes[ROOT as usize];
        let mut pv = String::from("0000");
        let mut most_visited = 0u32;
        for &c in &root.children {
            let child = &self.tree.nodes[c as usize];
            if child.visits > most_visited {
                most_visited = child.visits;
                if let Some(m) = child.mv {
                    pv = format!("{}", m);
                }
            }
        }
        let elapsed = start.elapsed();
        let nps = self.playouts as f64 / elapsed.as_secs_f64().max(1e-9);
        println!(
            "info depth {} time {} nodes {} score cp {} nps {} pv {}",
            self.playouts / 10_000 + 1,
            elapsed.as_millis(),
            self.playouts,
            -to_cp(root.visits, root.value_sum),
            nps as u64,
            pv
        );
    }
}
