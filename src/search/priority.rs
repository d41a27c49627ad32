use cozy_chess::{Board, Color, Move, Piece};

use crate::search::eval::piece_value_cp;

// Tunable heuristics. The values are hand-picked, not derived.
/// Divisor turning a victim's centipawn value into a capture bonus
/// (pawn capture +0.5, queen capture +4.5).
pub const CAPTURE_VALUE_SCALE: f64 = 200.0;
pub const PROMOTION_BONUS: f64 = 1.0;
/// Bonus for a non-pawn, non-king piece landing on the central 4x4 region.
pub const CENTER_BONUS: f64 = 0.4;
/// Bonus for pushing a pawn into the last two ranks.
pub const PAWN_ADVANCE_BONUS: f64 = 0.8;
/// King moves are dampened while enough material is on the board that king
/// activity is a liability rather than an asset.
pub const KING_MOVE_FACTOR: f64 = 0.3;
pub const ENDGAME_PIECE_COUNT: u32 = 16;

fn is_central(mv: Move) -> bool {
    let f = mv.to.file() as usize;
    let r = mv.to.rank() as usize;
    (2..=5).contains(&f) && (2..=5).contains(&r)
}

/// Heuristic desirability of `mv` in `board`, always positive. Pure function
/// of its inputs; used to normalize expansion priors and to bias rollout
/// move sampling.
pub fn score_move(board: &Board, mv: Move) -> f64 {
    let mut score = 1.0;
    let stm = board.side_to_move();

    if board.colors(!stm).has(mv.to) {
        if let Some(victim) = board.piece_on(mv.to) {
            score += piece_value_cp(victim) as f64 / CAPTURE_VALUE_SCALE;
        }
    }
    if mv.promotion.is_some() {
        score += PROMOTION_BONUS;
    }

    match board.piece_on(mv.from) {
        Some(Piece::Pawn) => {
            let rank = mv.to.rank() as usize;
            let near_promotion = match stm {
                Color::White => rank >= 6,
                Color::Black => rank <= 1,
            };
            if near_promotion {
                score += PAWN_ADVANCE_BONUS;
            }
        }
        Some(Piece::King) => {
            let pieces = board.occupied().into_iter().count() as u32;
            if pieces > ENDGAME_PIECE_COUNT {
                score *= KING_MOVE_FACTOR;
            }
        }
        Some(_) => {
            if is_central(mv) {
                score += CENTER_BONUS;
            }
        }
        None => {}
    }

    score
}
