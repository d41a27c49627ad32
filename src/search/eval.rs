use cozy_chess::{Board, Color, Piece};

const PAWN: i32 = 100;
const KNIGHT: i32 = 320;
const BISHOP: i32 = 330;
const ROOK: i32 = 500;
const QUEEN: i32 = 900;

/// Centipawn scale of the full evaluation: +-EVAL_SCALE_CP maps to +-1.0.
pub const EVAL_SCALE_CP: f64 = 1000.0;
/// Weight of one extra legal move, in centipawns.
pub const MOBILITY_WEIGHT_CP: f64 = 4.0;

// fast_evaluate buckets: a 500cp lead is near-decisive, 300cp is a clear edge,
// anything smaller scales linearly.
pub const FAST_DECISIVE_CP: f64 = 500.0;
pub const FAST_DECISIVE_SCORE: f64 = 0.95;
pub const FAST_EDGE_CP: f64 = 300.0;
pub const FAST_EDGE_SCORE: f64 = 0.8;
pub const FAST_LINEAR_DIVISOR: f64 = 250.0;
pub const FAST_LINEAR_CAP: f64 = 0.7;

pub fn piece_value_cp(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => PAWN,
        Piece::Knight => KNIGHT,
        Piece::Bishop => BISHOP,
        Piece::Rook => ROOK,
        Piece::Queen => QUEEN,
        Piece::King => 0,
    }
}

fn count_piece(board: &Board, color: Color, piece: Piece) -> i32 {
    let bb = board.colors(color) & board.pieces(piece);
    bb.into_iter().count() as i32
}

// Side-agnostic material in centipawns: positive means White has more material.
pub fn material_eval_cp(board: &Board) -> i32 {
    let w = Color::White;
    let b = Color::Black;
    (count_piece(board, w, Piece::Pawn) - count_piece(board, b, Piece::Pawn)) * PAWN
        + (count_piece(board, w, Piece::Knight) - count_piece(board, b, Piece::Knight)) * KNIGHT
        + (count_piece(board, w, Piece::Bishop) - count_piece(board, b, Piece::Bishop)) * BISHOP
        + (count_piece(board, w, Piece::Rook) - count_piece(board, b, Piece::Rook)) * ROOK
        + (count_piece(board, w, Piece::Queen) - count_piece(board, b, Piece::Queen)) * QUEEN
}

fn count_moves(board: &Board) -> usize {
    let mut ct = 0usize;
    board.generate_moves(|moves| { ct += moves.len(); false });
    ct
}

/// Position evaluation consumed by the rollout policy. Both outputs are
/// white-positive; the search layer handles side-to-move sign flips.
pub trait Evaluator {
    /// Higher-fidelity evaluation, clamped to [-1, 1].
    fn evaluate(&self, board: &Board) -> f64;
    /// Cheap material-only estimate, clamped to [-0.95, 0.95]. Used for early
    /// rollout cutoffs in low-material positions.
    fn fast_evaluate(&self, board: &Board) -> f64;
}

/// Material plus a small mobility term. Stands in for a network evaluator;
/// anything implementing [`Evaluator`] can be plugged into the searcher.
#[derive(Debug, Default, Clone, Copy)]
pub struct MaterialEvaluator;

impl Evaluator for MaterialEvaluator {
    fn evaluate(&self, board: &Board) -> f64 {
        let material = material_eval_cp(board) as f64;
        // Mobility needs a null move to count the opponent's replies; skip the
        // term when in check (no null move exists).
        let mobility = match board.null_move() {
            Some(mirror) => {
                let diff = count_moves(board) as f64 - count_moves(&mirror) as f64;
                if board.side_to_move() == Color::White { diff } else { -diff }
            }
            None => 0.0,
        };
        ((material + MOBILITY_WEIGHT_CP * mobility) / EVAL_SCALE_CP).clamp(-1.0, 1.0)
    }

    fn fast_evaluate(&self, board: &Board) -> f64 {
        let diff = material_eval_cp(board) as f64;
        if diff >= FAST_DECISIVE_CP { return FAST_DECISIVE_SCORE; }
        if diff <= -FAST_DECISIVE_CP { return -FAST_DECISIVE_SCORE; }
        if diff >= FAST_EDGE_CP { return FAST_EDGE_SCORE; }
        if diff <= -FAST_EDGE_CP { return -FAST_EDGE_SCORE; }
        (diff / FAST_LINEAR_DIVISOR).clamp(-FAST_LINEAR_CAP, FAST_LINEAR_CAP)
    }
}
